//! Keypoint models for single-subject pose streams
//!
//! A detector produces one `KeypointFrame` per video frame. Analyzers read
//! joints by COCO index and never mutate the frame.

use serde::{Deserialize, Serialize};

/// Number of joints in the COCO skeleton
pub const COCO_KEYPOINT_COUNT: usize = 17;

/// A detected body joint in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// X coordinate in pixels
    pub x: f32,
    /// Y coordinate in pixels (grows downward)
    pub y: f32,
    /// Detection confidence (0-1)
    #[serde(default = "full_confidence")]
    pub confidence: f32,
    /// Whether the detector considered this joint visible
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

fn full_confidence() -> f32 {
    1.0
}

fn visible_by_default() -> bool {
    true
}

impl Keypoint {
    /// Create a keypoint, marking it visible when confidence exceeds 0.5
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            confidence,
            visible: confidence > 0.5,
        }
    }

    /// Check if keypoint is usable (visible with sufficient confidence)
    ///
    /// Coordinates are not bounds-checked: detections near the frame edge can
    /// land slightly outside it and still locate the joint.
    pub fn is_valid(&self, min_confidence: f32) -> bool {
        self.visible && self.confidence >= min_confidence
    }

    /// Calculate Euclidean distance to another keypoint
    pub fn distance_to(&self, other: &Keypoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between this keypoint and another
    pub fn midpoint(&self, other: &Keypoint) -> (f32, f32) {
        ((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// COCO keypoint indices for joint calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CocoKeypoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl CocoKeypoint {
    /// Get keypoint name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Limb connections drawn on annotated frames
pub const SKELETON_EDGES: [(CocoKeypoint, CocoKeypoint); 16] = [
    (CocoKeypoint::Nose, CocoKeypoint::LeftEye),
    (CocoKeypoint::Nose, CocoKeypoint::RightEye),
    (CocoKeypoint::LeftEye, CocoKeypoint::LeftEar),
    (CocoKeypoint::RightEye, CocoKeypoint::RightEar),
    (CocoKeypoint::LeftShoulder, CocoKeypoint::RightShoulder),
    (CocoKeypoint::LeftShoulder, CocoKeypoint::LeftElbow),
    (CocoKeypoint::LeftElbow, CocoKeypoint::LeftWrist),
    (CocoKeypoint::RightShoulder, CocoKeypoint::RightElbow),
    (CocoKeypoint::RightElbow, CocoKeypoint::RightWrist),
    (CocoKeypoint::LeftShoulder, CocoKeypoint::LeftHip),
    (CocoKeypoint::RightShoulder, CocoKeypoint::RightHip),
    (CocoKeypoint::LeftHip, CocoKeypoint::RightHip),
    (CocoKeypoint::LeftHip, CocoKeypoint::LeftKnee),
    (CocoKeypoint::LeftKnee, CocoKeypoint::LeftAnkle),
    (CocoKeypoint::RightHip, CocoKeypoint::RightKnee),
    (CocoKeypoint::RightKnee, CocoKeypoint::RightAnkle),
];

/// Keypoints of the single subject detected in one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeypointFrame {
    /// Whether the detector found a subject in this frame
    pub subject_visible: bool,
    /// COCO-ordered keypoints; empty when no subject was found
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

impl KeypointFrame {
    /// Frame with no detected subject
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            subject_visible: !keypoints.is_empty(),
            keypoints,
        }
    }

    /// Whether analyzers should consider this frame at all
    pub fn has_subject(&self) -> bool {
        self.subject_visible && !self.keypoints.is_empty()
    }

    /// Get a joint if the subject is present and the joint passes `min_confidence`
    pub fn joint(&self, joint: CocoKeypoint, min_confidence: f32) -> Option<&Keypoint> {
        if !self.has_subject() {
            return None;
        }
        self.keypoints
            .get(joint.index())
            .filter(|kp| kp.is_valid(min_confidence))
    }

    /// Midpoint of the left and right hip joints
    pub fn hip_center(&self, min_confidence: f32) -> Option<(f32, f32)> {
        let left = self.joint(CocoKeypoint::LeftHip, min_confidence)?;
        let right = self.joint(CocoKeypoint::RightHip, min_confidence)?;
        Some(left.midpoint(right))
    }
}

/// Position of a frame within the video
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMeta {
    /// 0-based frame index
    pub index: u64,
    /// Seconds since the start of the video
    pub timestamp_seconds: f64,
}

impl FrameMeta {
    pub fn new(index: u64, fps: f64) -> Self {
        let timestamp_seconds = if fps > 0.0 { index as f64 / fps } else { 0.0 };
        Self {
            index,
            timestamp_seconds,
        }
    }
}
