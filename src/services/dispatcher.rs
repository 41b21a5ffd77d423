use std::path::Path;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::models::{AnalysisOutcome, AnalysisRequest, AnalysisResult, TestType};
use crate::services::analyzers::AnalyzerKind;
use crate::services::frame_io::{FrameSink, FrameSource, ImageSequenceSink, ImageSequenceSource};
use crate::services::overlay::OverlayRenderer;
use crate::services::pipeline::FrameLoop;
use crate::services::pose_detector::PoseDetector;

/// Selects the analyzer for a test type and drives one run
pub struct Dispatcher {
    config: AnalysisConfig,
}

impl Dispatcher {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze the frame sequence at `request.input_path`
    ///
    /// The test type is resolved before anything is opened, so an unknown
    /// type fails without touching the input or the detector.
    pub fn run_analysis(
        &self,
        request: &AnalysisRequest,
        detector: &mut dyn PoseDetector,
    ) -> Result<AnalysisResult> {
        let test_type: TestType = request.test_type.parse()?;

        if let Some(level) = &request.user_level {
            tracing::info!("Athlete reported level: {}", level);
        }

        let renderer = self.renderer()?;
        let mut source = ImageSequenceSource::open(&request.input_path)?;
        let mut sink = ImageSequenceSink::create(&request.output_path, source.metadata())?;

        self.run_loop(
            test_type,
            FrameLoop {
                source: &mut source,
                sink: &mut sink,
                detector,
                renderer: &renderer,
                output_path: &request.output_path,
            },
        )
    }

    /// Run `test_type` over caller-supplied frame I/O
    pub fn run_with(
        &self,
        test_type: TestType,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        detector: &mut dyn PoseDetector,
        output_path: &Path,
    ) -> Result<AnalysisResult> {
        let renderer = match self.renderer() {
            Ok(renderer) => renderer,
            Err(e) => {
                if let Err(finish_err) = sink.finish() {
                    tracing::warn!("Failed to finalize output after error: {}", finish_err);
                }
                return Err(e);
            }
        };

        self.run_loop(
            test_type,
            FrameLoop {
                source,
                sink,
                detector,
                renderer: &renderer,
                output_path,
            },
        )
    }

    /// Run and fold any failure into `{"error": message}`
    pub fn analyze(
        &self,
        request: &AnalysisRequest,
        detector: &mut dyn PoseDetector,
    ) -> AnalysisOutcome {
        let result = self.run_analysis(request, detector);
        if let Err(e) = &result {
            tracing::error!("Analysis failed: {}", e);
        }
        result.into()
    }

    fn renderer(&self) -> Result<OverlayRenderer> {
        let renderer = OverlayRenderer::new(&self.config.overlay)?
            .with_min_keypoint_confidence(self.config.detector.min_keypoint_confidence);
        if !renderer.has_font() {
            tracing::warn!(
                "No overlay font configured (overlay.font_path), text overlays will be missing from the annotated frames"
            );
        }
        Ok(renderer)
    }

    fn run_loop(&self, test_type: TestType, frame_loop: FrameLoop<'_>) -> Result<AnalysisResult> {
        let analyzer = AnalyzerKind::for_test(test_type, &self.config);
        tracing::info!("Running {} analysis", test_type.label());

        let result = frame_loop.run_kind(&analyzer)?;

        tracing::info!(
            "{} analysis complete, output written to {}",
            test_type.label(),
            result.analysis_video_path().display()
        );
        Ok(result)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
