//! Pose detector boundary
//!
//! A detector maps one frame to the keypoints of at most one subject. The
//! analyzers never call a detector directly; the frame loop owns it for the
//! duration of a run, so each run can get its own instance or a test double.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::KeypointFrame;
use crate::services::frame_io::Frame;

/// Maps a frame to the single subject's keypoints
#[cfg_attr(test, mockall::automock)]
pub trait PoseDetector {
    /// Detect the subject in `frame`
    ///
    /// Returns `KeypointFrame::empty()` when nobody is in view. Errors are
    /// treated by the caller as "no subject this frame".
    fn detect(&mut self, frame: &Frame) -> Result<KeypointFrame>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeypointTrack {
    Wrapped { frames: Vec<KeypointFrame> },
    Bare(Vec<KeypointFrame>),
}

/// Replays keypoints recorded earlier, indexed by frame number
///
/// Frames beyond the end of the recording report no subject.
#[derive(Debug, Clone, Default)]
pub struct RecordedPoseDetector {
    frames: Vec<KeypointFrame>,
}

impl RecordedPoseDetector {
    pub fn from_frames(frames: Vec<KeypointFrame>) -> Self {
        Self { frames }
    }

    /// Load a JSON track: either `{"frames": [...]}` or a bare array
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let track: KeypointTrack = serde_json::from_str(&contents)?;
        let frames = match track {
            KeypointTrack::Wrapped { frames } => frames,
            KeypointTrack::Bare(frames) => frames,
        };

        tracing::info!(
            "Loaded keypoint track with {} frames from {}",
            frames.len(),
            path.as_ref().display()
        );
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PoseDetector for RecordedPoseDetector {
    fn detect(&mut self, frame: &Frame) -> Result<KeypointFrame> {
        let index = usize::try_from(frame.index).unwrap_or(usize::MAX);
        Ok(self.frames.get(index).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Keypoint;
    use image::RgbImage;

    fn frame(index: u64) -> Frame {
        Frame {
            index,
            image: RgbImage::new(1, 1),
        }
    }

    #[test]
    fn test_replays_by_index() {
        let recorded = vec![
            KeypointFrame::new(vec![Keypoint::new(1.0, 2.0, 0.9)]),
            KeypointFrame::empty(),
        ];
        let mut detector = RecordedPoseDetector::from_frames(recorded.clone());

        assert_eq!(detector.detect(&frame(0)).unwrap(), recorded[0]);
        assert!(!detector.detect(&frame(1)).unwrap().has_subject());
        assert!(!detector.detect(&frame(7)).unwrap().has_subject());
    }

    #[test]
    fn test_loads_both_track_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let wrapped = dir.path().join("wrapped.json");
        let bare = dir.path().join("bare.json");
        fs::write(
            &wrapped,
            r#"{"frames": [{"subject_visible": true, "keypoints": [{"x": 1, "y": 2}]}]}"#,
        )
        .unwrap();
        fs::write(&bare, r#"[{"subject_visible": false}, {"subject_visible": false}]"#).unwrap();

        assert_eq!(RecordedPoseDetector::from_file(&wrapped).unwrap().len(), 1);
        assert_eq!(RecordedPoseDetector::from_file(&bare).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_track_file() {
        assert!(RecordedPoseDetector::from_file("/nonexistent/track.json").is_err());
    }
}
