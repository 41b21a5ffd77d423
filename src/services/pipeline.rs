//! Frame loop shared by all analyzers
//!
//! source -> detector -> analyzer step -> annotations -> overlay -> sink,
//! one frame at a time, then `finalize`. The sink is finished on every exit
//! path, including errors.

use std::path::Path;

use crate::error::Result;
use crate::models::{AnalysisResult, FrameMeta, KeypointFrame};
use crate::services::analyzers::{AnalyzerKind, RunSummary, TestAnalyzer};
use crate::services::frame_io::{FrameSink, FrameSource, VideoMetadata};
use crate::services::overlay::OverlayRenderer;
use crate::services::pose_detector::PoseDetector;

/// Everything one run needs besides the analyzer
pub struct FrameLoop<'a> {
    pub source: &'a mut dyn FrameSource,
    pub sink: &'a mut dyn FrameSink,
    pub detector: &'a mut dyn PoseDetector,
    pub renderer: &'a OverlayRenderer,
    /// Reported back in the result record
    pub output_path: &'a Path,
}

impl FrameLoop<'_> {
    /// Run whichever analyzer `kind` holds
    pub fn run_kind(self, kind: &AnalyzerKind) -> Result<AnalysisResult> {
        match kind {
            AnalyzerKind::VerticalJump(analyzer) => self.run(analyzer),
            AnalyzerKind::SitUps(analyzer) => self.run(analyzer),
            AnalyzerKind::ShuttleRun(analyzer) => self.run(analyzer),
            AnalyzerKind::EnduranceRun(analyzer) => self.run(analyzer),
        }
    }

    pub fn run<A: TestAnalyzer>(self, analyzer: &A) -> Result<AnalysisResult> {
        let video = *self.source.metadata();
        let processed = process_frames(
            analyzer,
            &video,
            self.source,
            self.sink,
            self.detector,
            self.renderer,
        );
        let finished = self.sink.finish();

        let (state, frames_processed) = match processed {
            Ok(done) => done,
            Err(e) => {
                if let Err(finish_err) = finished {
                    tracing::warn!("Failed to finalize output after error: {}", finish_err);
                }
                return Err(e);
            }
        };
        finished?;

        if frames_processed != video.frame_count {
            tracing::warn!(
                "Processed {} frames but the source reported {}",
                frames_processed,
                video.frame_count
            );
        }

        let summary = RunSummary {
            video,
            frames_processed,
            output_path: self.output_path.to_path_buf(),
        };
        Ok(analyzer.finalize(state, &summary))
    }
}

fn process_frames<A: TestAnalyzer>(
    analyzer: &A,
    video: &VideoMetadata,
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    detector: &mut dyn PoseDetector,
    renderer: &OverlayRenderer,
) -> Result<(A::State, u64)> {
    let mut state = analyzer.init(video);
    let mut processed: u64 = 0;
    let mut detector_failures: u64 = 0;

    while let Some(mut frame) = source.next_frame()? {
        let meta = FrameMeta::new(processed, video.fps);

        let keypoints = match detector.detect(&frame) {
            Ok(keypoints) => keypoints,
            Err(e) => {
                tracing::warn!("Pose detection failed on frame {}: {}", meta.index, e);
                detector_failures += 1;
                KeypointFrame::empty()
            }
        };

        state = analyzer.step(state, &keypoints, &meta);
        let annotations = analyzer.annotations(&state, &keypoints, &meta);
        renderer.render(&mut frame.image, &keypoints, &annotations);
        sink.write_frame(&frame)?;

        processed += 1;
    }

    if detector_failures > 0 {
        tracing::warn!(
            "Pose detection failed on {} of {} frames",
            detector_failures,
            processed
        );
    }
    tracing::debug!("Processed {} frames", processed);

    Ok((state, processed))
}
