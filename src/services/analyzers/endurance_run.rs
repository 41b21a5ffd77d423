use crate::config::EnduranceRunConfig;
use crate::models::analysis_result::round2;
use crate::models::{
    ActivityLabel, AnalysisResult, EnduranceRunResult, FrameMeta, KeypointFrame, TestType,
};
use crate::services::analyzers::{RunSummary, TestAnalyzer};
use crate::services::frame_io::VideoMetadata;
use crate::services::keypoint_processor::{displacement, PositionHistory};
use crate::services::overlay::Annotation;

/// Classifies each frame as running, walking or stopped from hip movement
#[derive(Debug, Clone, Default)]
pub struct EnduranceRunAnalyzer {
    config: EnduranceRunConfig,
    min_keypoint_confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnduranceRunState {
    pub hip_history: PositionHistory<2>,
    /// One label per processed frame
    pub activity_log: Vec<ActivityLabel>,
}

impl EnduranceRunState {
    pub fn current_activity(&self) -> ActivityLabel {
        self.activity_log
            .last()
            .copied()
            .unwrap_or(ActivityLabel::Stopped)
    }
}

impl EnduranceRunAnalyzer {
    pub fn new(config: EnduranceRunConfig) -> Self {
        Self {
            config,
            min_keypoint_confidence: 0.0,
        }
    }

    pub fn with_min_keypoint_confidence(mut self, min_confidence: f32) -> Self {
        self.min_keypoint_confidence = min_confidence;
        self
    }

    /// Label for a per-frame hip displacement in pixels
    pub fn classify(&self, displacement_px: f32) -> ActivityLabel {
        if displacement_px > self.config.running_threshold_px {
            ActivityLabel::Running
        } else if displacement_px > self.config.walking_threshold_px {
            ActivityLabel::Walking
        } else {
            ActivityLabel::Stopped
        }
    }
}

/// Share of each label in `log`, as percentages rounded to 2 decimals
///
/// Returns `(running, walking, stopped)`; all zero for an empty log.
pub fn activity_percentages(log: &[ActivityLabel]) -> (f64, f64, f64) {
    if log.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let total = log.len() as f64;
    let share = |label: ActivityLabel| {
        let count = log.iter().filter(|&&l| l == label).count() as f64;
        round2(count / total * 100.0)
    };
    (
        share(ActivityLabel::Running),
        share(ActivityLabel::Walking),
        share(ActivityLabel::Stopped),
    )
}

impl TestAnalyzer for EnduranceRunAnalyzer {
    type State = EnduranceRunState;

    fn test_type(&self) -> TestType {
        TestType::EnduranceRun
    }

    fn init(&self, video: &VideoMetadata) -> EnduranceRunState {
        EnduranceRunState {
            hip_history: PositionHistory::new(),
            activity_log: Vec::with_capacity(video.frame_count.min(1 << 20) as usize),
        }
    }

    fn step(
        &self,
        mut state: EnduranceRunState,
        frame: &KeypointFrame,
        _meta: &FrameMeta,
    ) -> EnduranceRunState {
        let mut activity = ActivityLabel::Stopped;

        if let Some(hip) = frame.hip_center(self.min_keypoint_confidence) {
            state.hip_history.push(hip);
            if let Some((previous, current)) = state.hip_history.last_pair() {
                activity = self.classify(displacement(previous, current));
            }
        }

        state.activity_log.push(activity);
        state
    }

    fn annotations(
        &self,
        state: &EnduranceRunState,
        _frame: &KeypointFrame,
        _meta: &FrameMeta,
    ) -> Vec<Annotation> {
        vec![Annotation::text(
            format!("Activity: {}", state.current_activity()),
            10,
            40,
        )]
    }

    fn finalize(&self, state: EnduranceRunState, summary: &RunSummary) -> AnalysisResult {
        let (run_percentage, walk_percentage, stop_percentage) =
            activity_percentages(&state.activity_log);

        tracing::debug!(
            "Activity over {} frames: {:.2}% running, {:.2}% walking, {:.2}% stopped",
            state.activity_log.len(),
            run_percentage,
            walk_percentage,
            stop_percentage
        );

        AnalysisResult::EnduranceRun(EnduranceRunResult {
            run_percentage,
            walk_percentage,
            stop_percentage,
            analysis_video_path: summary.output_path.clone(),
        })
    }
}
