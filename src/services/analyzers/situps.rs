use image::Rgb;

use crate::config::SitUpsConfig;
use crate::models::{
    AnalysisResult, CocoKeypoint, FrameMeta, KeypointFrame, SitUpsResult, TestType,
};
use crate::services::analyzers::{RunSummary, TestAnalyzer};
use crate::services::frame_io::VideoMetadata;
use crate::services::keypoint_processor::{calculate_joint_angle, Point};
use crate::services::overlay::Annotation;

/// Torso position in the sit-up cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SitUpPhase {
    #[default]
    Down,
    Up,
}

/// Counts sit-ups from the shoulder-hip-knee angle on the left side
#[derive(Debug, Clone, Default)]
pub struct SitUpsAnalyzer {
    config: SitUpsConfig,
    min_keypoint_confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SitUpsState {
    pub rep_count: u32,
    pub phase: SitUpPhase,
    /// Torso angle and hip position from the latest frame, if measurable
    pub last_angle: Option<(f32, Point)>,
}

impl SitUpsAnalyzer {
    pub fn new(config: SitUpsConfig) -> Self {
        Self {
            config,
            min_keypoint_confidence: 0.0,
        }
    }

    pub fn with_min_keypoint_confidence(mut self, min_confidence: f32) -> Self {
        self.min_keypoint_confidence = min_confidence;
        self
    }

    /// Torso angle at the hip, with the hip position
    fn torso_angle(&self, frame: &KeypointFrame) -> Option<(f32, Point)> {
        let min = self.min_keypoint_confidence;
        let shoulder = frame.joint(CocoKeypoint::LeftShoulder, min)?;
        let hip = frame.joint(CocoKeypoint::LeftHip, min)?;
        let knee = frame.joint(CocoKeypoint::LeftKnee, min)?;

        let angle = calculate_joint_angle(
            (shoulder.x, shoulder.y),
            (hip.x, hip.y),
            (knee.x, knee.y),
        );
        Some((angle, (hip.x, hip.y)))
    }

    /// Advance the rep state machine by one measured angle
    pub fn apply_angle(&self, mut state: SitUpsState, angle: f32) -> SitUpsState {
        match state.phase {
            SitUpPhase::Down if angle < self.config.up_threshold_degrees => {
                state.phase = SitUpPhase::Up;
                state.rep_count += 1;
                tracing::info!("Sit-up #{} detected", state.rep_count);
            }
            SitUpPhase::Up if angle > self.config.down_threshold_degrees => {
                state.phase = SitUpPhase::Down;
            }
            _ => {}
        }
        state
    }
}

impl TestAnalyzer for SitUpsAnalyzer {
    type State = SitUpsState;

    fn test_type(&self) -> TestType {
        TestType::SitUps
    }

    fn init(&self, _video: &VideoMetadata) -> SitUpsState {
        SitUpsState::default()
    }

    fn step(&self, mut state: SitUpsState, frame: &KeypointFrame, _meta: &FrameMeta) -> SitUpsState {
        state.last_angle = self.torso_angle(frame);
        match state.last_angle {
            Some((angle, _)) => self.apply_angle(state, angle),
            None => state,
        }
    }

    fn annotations(
        &self,
        state: &SitUpsState,
        _frame: &KeypointFrame,
        _meta: &FrameMeta,
    ) -> Vec<Annotation> {
        let mut annotations = Vec::with_capacity(2);
        if let Some((angle, (hip_x, hip_y))) = state.last_angle {
            annotations.push(Annotation::Text {
                text: format!("Angle: {}", angle as i32),
                x: hip_x as i32 + 10,
                y: hip_y as i32,
                color: Rgb([255, 255, 255]),
            });
        }
        annotations.push(Annotation::text(
            format!("Sit-ups: {}", state.rep_count),
            10,
            40,
        ));
        annotations
    }

    fn finalize(&self, state: SitUpsState, summary: &RunSummary) -> AnalysisResult {
        AnalysisResult::SitUps(SitUpsResult {
            total_reps: state.rep_count,
            analysis_video_path: summary.output_path.clone(),
        })
    }
}
