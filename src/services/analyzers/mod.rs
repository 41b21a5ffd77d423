//! Per-test keypoint state machines
//!
//! Each analyzer is a pure fold over the keypoint stream: `init` builds the
//! run state, `step` consumes one frame, and `finalize` turns the final state
//! into a result record. The frame loop that drives them lives in
//! [`crate::services::pipeline`].

mod endurance_run;
mod shuttle_run;
mod situps;
mod vertical_jump;

pub use endurance_run::{EnduranceRunAnalyzer, EnduranceRunState};
pub use shuttle_run::{ShuttleRunAnalyzer, ShuttleRunState, ShuttleSide};
pub use situps::{SitUpPhase, SitUpsAnalyzer, SitUpsState};
pub use vertical_jump::{VerticalJumpAnalyzer, VerticalJumpState};

use std::path::PathBuf;

use crate::config::AnalysisConfig;
use crate::models::{AnalysisResult, FrameMeta, KeypointFrame, TestType};
use crate::services::frame_io::VideoMetadata;
use crate::services::overlay::Annotation;

/// Facts about a finished frame loop, handed to `finalize`
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub video: VideoMetadata,
    pub frames_processed: u64,
    pub output_path: PathBuf,
}

/// A fitness test expressed as a fold over keypoint frames
pub trait TestAnalyzer {
    type State;

    fn test_type(&self) -> TestType;

    /// Fresh state for one run
    fn init(&self, video: &VideoMetadata) -> Self::State;

    /// Advance the state by one frame; frames arrive in order, exactly once
    fn step(&self, state: Self::State, frame: &KeypointFrame, meta: &FrameMeta) -> Self::State;

    /// Overlays for the frame just stepped
    fn annotations(
        &self,
        state: &Self::State,
        frame: &KeypointFrame,
        meta: &FrameMeta,
    ) -> Vec<Annotation>;

    fn finalize(&self, state: Self::State, summary: &RunSummary) -> AnalysisResult;
}

/// The analyzer selected for a run
#[derive(Debug, Clone)]
pub enum AnalyzerKind {
    VerticalJump(VerticalJumpAnalyzer),
    SitUps(SitUpsAnalyzer),
    ShuttleRun(ShuttleRunAnalyzer),
    EnduranceRun(EnduranceRunAnalyzer),
}

impl AnalyzerKind {
    /// Build the analyzer for `test_type` from the run configuration
    pub fn for_test(test_type: TestType, config: &AnalysisConfig) -> Self {
        let min_confidence = config.detector.min_keypoint_confidence;
        match test_type {
            TestType::VerticalJump => AnalyzerKind::VerticalJump(
                VerticalJumpAnalyzer::new(config.vertical_jump.clone())
                    .with_min_keypoint_confidence(min_confidence),
            ),
            TestType::SitUps => AnalyzerKind::SitUps(
                SitUpsAnalyzer::new(config.situps.clone())
                    .with_min_keypoint_confidence(min_confidence),
            ),
            TestType::ShuttleRun => AnalyzerKind::ShuttleRun(
                ShuttleRunAnalyzer::new(config.shuttle_run.clone())
                    .with_min_keypoint_confidence(min_confidence),
            ),
            TestType::EnduranceRun => AnalyzerKind::EnduranceRun(
                EnduranceRunAnalyzer::new(config.endurance_run.clone())
                    .with_min_keypoint_confidence(min_confidence),
            ),
        }
    }

    pub fn test_type(&self) -> TestType {
        match self {
            AnalyzerKind::VerticalJump(a) => a.test_type(),
            AnalyzerKind::SitUps(a) => a.test_type(),
            AnalyzerKind::ShuttleRun(a) => a.test_type(),
            AnalyzerKind::EnduranceRun(a) => a.test_type(),
        }
    }
}

/// Fold `analyzer` over an in-memory keypoint stream without any frame I/O
pub fn analyze_keypoints<A: TestAnalyzer>(
    analyzer: &A,
    video: &VideoMetadata,
    frames: &[KeypointFrame],
) -> AnalysisResult {
    let state = frames
        .iter()
        .enumerate()
        .fold(analyzer.init(video), |state, (index, frame)| {
            analyzer.step(state, frame, &FrameMeta::new(index as u64, video.fps))
        });

    analyzer.finalize(
        state,
        &RunSummary {
            video: *video,
            frames_processed: frames.len() as u64,
            output_path: PathBuf::new(),
        },
    )
}
