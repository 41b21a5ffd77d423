use crate::config::ShuttleRunConfig;
use crate::models::analysis_result::round2;
use crate::models::{AnalysisResult, FrameMeta, KeypointFrame, ShuttleRunResult, TestType};
use crate::services::analyzers::{RunSummary, TestAnalyzer};
use crate::services::frame_io::VideoMetadata;
use crate::services::overlay::Annotation;

/// Which side of the course the athlete last reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShuttleSide {
    #[default]
    Unset,
    Left,
    Right,
}

/// Counts laps between two vertical guide lines using the hip center
#[derive(Debug, Clone, Default)]
pub struct ShuttleRunAnalyzer {
    config: ShuttleRunConfig,
    min_keypoint_confidence: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShuttleRunState {
    pub line_one_x: i32,
    pub line_two_x: i32,
    pub lap_count: u32,
    pub side: ShuttleSide,
    /// Timestamp of the first frame with a subject
    pub start_time: Option<f64>,
    pub total_time_seconds: f64,
}

impl ShuttleRunAnalyzer {
    pub fn new(config: ShuttleRunConfig) -> Self {
        Self {
            config,
            min_keypoint_confidence: 0.0,
        }
    }

    pub fn with_min_keypoint_confidence(mut self, min_confidence: f32) -> Self {
        self.min_keypoint_confidence = min_confidence;
        self
    }

    /// Guide line columns for a frame `width` pixels wide
    pub fn guide_lines(&self, width: u32) -> (i32, i32) {
        let width = width as f64;
        (
            (width * self.config.line_one_fraction) as i32,
            (width * self.config.line_two_fraction) as i32,
        )
    }

    /// Advance the side/lap state machine by one hip position
    pub fn apply_position(&self, mut state: ShuttleRunState, hip_x: f32) -> ShuttleRunState {
        let past_line_one = hip_x < state.line_one_x as f32;
        let past_line_two = hip_x > state.line_two_x as f32;

        match state.side {
            ShuttleSide::Unset if past_line_one => state.side = ShuttleSide::Left,
            ShuttleSide::Unset if past_line_two => state.side = ShuttleSide::Right,
            ShuttleSide::Left if past_line_two => {
                state.lap_count += 1;
                state.side = ShuttleSide::Right;
                tracing::info!("Lap {} completed", state.lap_count);
            }
            ShuttleSide::Right if past_line_one => {
                state.lap_count += 1;
                state.side = ShuttleSide::Left;
                tracing::info!("Lap {} completed", state.lap_count);
            }
            _ => {}
        }
        state
    }
}

impl TestAnalyzer for ShuttleRunAnalyzer {
    type State = ShuttleRunState;

    fn test_type(&self) -> TestType {
        TestType::ShuttleRun
    }

    fn init(&self, video: &VideoMetadata) -> ShuttleRunState {
        let (line_one_x, line_two_x) = self.guide_lines(video.width);
        ShuttleRunState {
            line_one_x,
            line_two_x,
            ..Default::default()
        }
    }

    fn step(
        &self,
        mut state: ShuttleRunState,
        frame: &KeypointFrame,
        meta: &FrameMeta,
    ) -> ShuttleRunState {
        if let Some((hip_x, _)) = frame.hip_center(self.min_keypoint_confidence) {
            if state.start_time.is_none() {
                tracing::debug!("Athlete first seen at {:.2}s", meta.timestamp_seconds);
                state.start_time = Some(meta.timestamp_seconds);
            }
            state = self.apply_position(state, hip_x);
        }

        if let Some(start) = state.start_time {
            state.total_time_seconds = meta.timestamp_seconds - start;
        }
        state
    }

    fn annotations(
        &self,
        state: &ShuttleRunState,
        _frame: &KeypointFrame,
        _meta: &FrameMeta,
    ) -> Vec<Annotation> {
        let mut annotations = vec![
            Annotation::guide_line(state.line_one_x),
            Annotation::guide_line(state.line_two_x),
        ];
        if state.start_time.is_some() {
            annotations.push(Annotation::text(
                format!("Time: {:.2}s", state.total_time_seconds),
                10,
                80,
            ));
        }
        annotations.push(Annotation::text(
            format!("Laps: {}", state.lap_count),
            10,
            40,
        ));
        annotations
    }

    fn finalize(&self, state: ShuttleRunState, summary: &RunSummary) -> AnalysisResult {
        AnalysisResult::ShuttleRun(ShuttleRunResult {
            total_laps: state.lap_count,
            total_time_seconds: round2(state.total_time_seconds),
            analysis_video_path: summary.output_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analyzers::analyze_keypoints;
    use crate::services::analyzers::test_support::{subject, video};
    use pretty_assertions::assert_eq;

    fn hips_at(x: f32) -> KeypointFrame {
        subject(&[(11, x - 10.0, 300.0), (12, x + 10.0, 300.0)])
    }

    fn run(frames: &[KeypointFrame]) -> ShuttleRunResult {
        // 640 wide: lines at 160 and 480
        match analyze_keypoints(
            &ShuttleRunAnalyzer::default(),
            &video(frames.len() as u64),
            frames,
        ) {
            AnalysisResult::ShuttleRun(r) => r,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_guide_lines_truncate() {
        assert_eq!(ShuttleRunAnalyzer::default().guide_lines(641), (160, 480));
        assert_eq!(ShuttleRunAnalyzer::default().guide_lines(10), (2, 7));
    }

    #[test]
    fn test_full_crossings_count_laps() {
        let frames: Vec<_> = [100.0, 300.0, 500.0, 300.0, 100.0, 300.0]
            .iter()
            .map(|&x| hips_at(x))
            .collect();
        let result = run(&frames);
        assert_eq!(result.total_laps, 2);
    }

    #[test]
    fn test_partial_crossing_is_not_a_lap() {
        let frames: Vec<_> = [100.0, 300.0, 470.0, 300.0, 150.0]
            .iter()
            .map(|&x| hips_at(x))
            .collect();
        assert_eq!(run(&frames).total_laps, 0);
    }

    #[test]
    fn test_hip_on_a_guide_line_is_not_past_it() {
        let frames: Vec<_> = [100.0, 300.0, 480.0, 300.0]
            .iter()
            .map(|&x| hips_at(x))
            .collect();
        assert_eq!(run(&frames).total_laps, 0);

        let analyzer = ShuttleRunAnalyzer::default();
        let state = analyzer.init(&video(1));
        let state = analyzer.apply_position(state, 160.0);
        assert_eq!(state.side, ShuttleSide::Unset);
        let state = analyzer.apply_position(state, 480.0);
        assert_eq!(state.side, ShuttleSide::Unset);
        let state = analyzer.apply_position(state, 481.0);
        assert_eq!(state.side, ShuttleSide::Right);
    }

    #[test]
    fn test_hips_past_the_left_frame_edge_count() {
        let frames: Vec<_> = [-1.0, 300.0, 500.0, 300.0, -1.0]
            .iter()
            .map(|&x| hips_at(x))
            .collect();
        assert_eq!(run(&frames).total_laps, 2);
    }

    #[test]
    fn test_middle_start_needs_a_side_first() {
        let frames: Vec<_> = [300.0, 500.0, 100.0]
            .iter()
            .map(|&x| hips_at(x))
            .collect();
        // First side reached is right; only the return to the left counts
        assert_eq!(run(&frames).total_laps, 1);
    }

    #[test]
    fn test_timer_starts_at_first_detection() {
        let mut frames = vec![KeypointFrame::empty(); 15];
        frames.extend((0..45).map(|_| hips_at(300.0)));
        frames.extend(vec![KeypointFrame::empty(); 30]);

        let result = run(&frames);
        // First seen at frame 15, last frame is 89: 74 frames at 30 fps
        assert_eq!(result.total_time_seconds, 2.47);
    }

    #[test]
    fn test_no_detections() {
        let result = run(&vec![KeypointFrame::empty(); 10]);
        assert_eq!(result.total_laps, 0);
        assert_eq!(result.total_time_seconds, 0.0);
    }

    #[test]
    fn test_overlays() {
        let analyzer = ShuttleRunAnalyzer::default();
        let meta = FrameMeta::new(0, 30.0);
        let state = analyzer.init(&video(1));

        let before_start = analyzer.annotations(&state, &KeypointFrame::empty(), &meta);
        assert_eq!(
            before_start,
            vec![
                Annotation::guide_line(160),
                Annotation::guide_line(480),
                Annotation::text("Laps: 0", 10, 40),
            ]
        );

        let state = analyzer.step(state, &hips_at(100.0), &meta);
        let started = analyzer.annotations(&state, &hips_at(100.0), &meta);
        assert!(started.contains(&Annotation::text("Time: 0.00s", 10, 80)));
    }
}
