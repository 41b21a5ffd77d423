use crate::config::VerticalJumpConfig;
use crate::models::analysis_result::round2;
use crate::models::{
    AnalysisResult, AssessedLevel, CocoKeypoint, FrameMeta, KeypointFrame, PassFailStatus,
    TestType, VerticalJumpResult,
};
use crate::services::analyzers::{RunSummary, TestAnalyzer};
use crate::services::frame_io::VideoMetadata;
use crate::services::overlay::Annotation;

/// Counts jumps from the rise of the left ankle above its resting height
#[derive(Debug, Clone, Default)]
pub struct VerticalJumpAnalyzer {
    config: VerticalJumpConfig,
    min_keypoint_confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerticalJumpState {
    /// Ankle y of the first frame with a subject
    pub baseline_y: Option<i32>,
    /// Highest point (smallest y) of the current jump
    pub peak_y: i32,
    pub jumping: bool,
    pub jump_heights: Vec<i32>,
}

impl VerticalJumpAnalyzer {
    pub fn new(config: VerticalJumpConfig) -> Self {
        Self {
            config,
            min_keypoint_confidence: 0.0,
        }
    }

    pub fn with_min_keypoint_confidence(mut self, min_confidence: f32) -> Self {
        self.min_keypoint_confidence = min_confidence;
        self
    }

    /// Pass/fail and level for the best jump
    pub fn assess(&self, max_jump_height_px: i32) -> (PassFailStatus, AssessedLevel) {
        let status = if max_jump_height_px >= self.config.pass_threshold_px {
            PassFailStatus::Pass
        } else {
            PassFailStatus::Fail
        };

        let level = if max_jump_height_px >= self.config.advanced_threshold_px {
            AssessedLevel::Advanced
        } else if max_jump_height_px >= self.config.intermediate_threshold_px {
            AssessedLevel::Intermediate
        } else {
            AssessedLevel::Beginner
        };

        (status, level)
    }
}

impl TestAnalyzer for VerticalJumpAnalyzer {
    type State = VerticalJumpState;

    fn test_type(&self) -> TestType {
        TestType::VerticalJump
    }

    fn init(&self, _video: &VideoMetadata) -> VerticalJumpState {
        VerticalJumpState::default()
    }

    fn step(
        &self,
        mut state: VerticalJumpState,
        frame: &KeypointFrame,
        _meta: &FrameMeta,
    ) -> VerticalJumpState {
        let Some(ankle) = frame.joint(CocoKeypoint::LeftAnkle, self.min_keypoint_confidence) else {
            return state;
        };
        let ankle_y = ankle.y as i32;
        let baseline = *state.baseline_y.get_or_insert(ankle_y);

        if !state.jumping && ankle_y < baseline - self.config.takeoff_threshold_px {
            state.jumping = true;
            state.peak_y = ankle_y;
        }

        if state.jumping {
            state.peak_y = state.peak_y.min(ankle_y);

            if ankle_y >= baseline - self.config.landing_threshold_px {
                state.jumping = false;
                let height = baseline - state.peak_y;
                if height > 0 {
                    state.jump_heights.push(height);
                    tracing::info!("Jump {} landed: {}px", state.jump_heights.len(), height);
                }
                state.peak_y = baseline;
            }
        }

        state
    }

    fn annotations(
        &self,
        state: &VerticalJumpState,
        _frame: &KeypointFrame,
        _meta: &FrameMeta,
    ) -> Vec<Annotation> {
        vec![Annotation::text(
            format!("Jumps: {}", state.jump_heights.len()),
            10,
            40,
        )]
    }

    fn finalize(&self, state: VerticalJumpState, summary: &RunSummary) -> AnalysisResult {
        if state.jumping {
            tracing::debug!("Video ended mid-jump, last jump not recorded");
        }

        let max_jump_height_px = state.jump_heights.iter().copied().max().unwrap_or(0);
        let (pass_fail_status, assessed_level) = self.assess(max_jump_height_px);

        AnalysisResult::VerticalJump(VerticalJumpResult {
            total_jumps: state.jump_heights.len(),
            jump_heights_px: state.jump_heights,
            max_jump_height_px,
            duration_seconds: round2(summary.video.duration_seconds()),
            analysis_video_path: summary.output_path.clone(),
            pass_fail_status,
            assessed_level,
        })
    }
}
