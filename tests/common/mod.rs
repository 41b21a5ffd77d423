#![allow(dead_code)]

use fitness_assessment::error::{AnalysisError, Result};
use fitness_assessment::models::{Keypoint, KeypointFrame, COCO_KEYPOINT_COUNT};
use fitness_assessment::services::frame_io::{Frame, FrameSink, FrameSource, VideoMetadata};
use fitness_assessment::services::PoseDetector;
use image::RgbImage;
use std::collections::VecDeque;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

pub fn metadata(frame_count: u64) -> VideoMetadata {
    VideoMetadata {
        fps: 30.0,
        width: WIDTH,
        height: HEIGHT,
        frame_count,
    }
}

/// In-memory frame source with blank frames
pub struct MemorySource {
    metadata: VideoMetadata,
    remaining: VecDeque<u64>,
    /// Index at which `next_frame` fails with a decode error
    pub fail_at: Option<u64>,
}

impl MemorySource {
    pub fn new(frame_count: u64) -> Self {
        Self {
            metadata: metadata(frame_count),
            remaining: (0..frame_count).collect(),
            fail_at: None,
        }
    }

    /// Source whose container reports a different frame count than it yields
    pub fn with_reported_count(mut self, reported: u64) -> Self {
        self.metadata.frame_count = reported;
        self
    }
}

impl FrameSource for MemorySource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(index) = self.remaining.pop_front() else {
            return Ok(None);
        };
        if self.fail_at == Some(index) {
            return Err(AnalysisError::Decode {
                index,
                reason: "corrupt frame".to_string(),
            });
        }
        Ok(Some(Frame {
            index,
            image: RgbImage::new(self.metadata.width, self.metadata.height),
        }))
    }
}

/// Collects written frames in memory
#[derive(Default)]
pub struct MemorySink {
    pub frames: Vec<Frame>,
    pub finish_calls: usize,
    /// Number of frames accepted before writes start failing
    pub fail_after: Option<usize>,
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.fail_after == Some(self.frames.len()) {
            return Err(AnalysisError::Sink("disk full".to_string()));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finish_calls += 1;
        Ok(())
    }
}

/// Returns scripted keypoints in call order; `None` entries fail
pub struct ScriptedDetector {
    script: VecDeque<Option<KeypointFrame>>,
    pub calls: usize,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Option<KeypointFrame>>) -> Self {
        Self {
            script: script.into(),
            calls: 0,
        }
    }

    pub fn from_frames(frames: Vec<KeypointFrame>) -> Self {
        Self::new(frames.into_iter().map(Some).collect())
    }
}

impl PoseDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<KeypointFrame> {
        self.calls += 1;
        match self.script.pop_front() {
            Some(Some(frame)) => Ok(frame),
            Some(None) => Err(AnalysisError::Detector("inference timed out".to_string())),
            None => Ok(KeypointFrame::empty()),
        }
    }
}

mockall::mock! {
    pub Detector {}

    impl PoseDetector for Detector {
        fn detect(&mut self, frame: &Frame) -> Result<KeypointFrame>;
    }
}

/// A fully visible subject standing mid-frame, with `joints` overridden
pub fn subject(joints: &[(usize, f32, f32)]) -> KeypointFrame {
    let mut keypoints = vec![Keypoint::new(320.0, 240.0, 0.9); COCO_KEYPOINT_COUNT];
    for &(index, x, y) in joints {
        keypoints[index] = Keypoint::new(x, y, 0.9);
    }
    KeypointFrame::new(keypoints)
}

pub fn ankle_at(y: f32) -> KeypointFrame {
    subject(&[(15, 320.0, y)])
}

pub fn hips_at(x: f32) -> KeypointFrame {
    subject(&[(11, x - 10.0, 300.0), (12, x + 10.0, 300.0)])
}

/// Torso at `degrees` from the thigh, measured at the left hip
pub fn torso_at(degrees: f32) -> KeypointFrame {
    let (hip_x, hip_y) = (300.0, 400.0);
    let rad = degrees.to_radians();
    subject(&[
        (11, hip_x, hip_y),
        (13, hip_x + 100.0, hip_y),
        (5, hip_x + 100.0 * rad.cos(), hip_y - 100.0 * rad.sin()),
    ])
}
