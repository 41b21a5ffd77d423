use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pose detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// ONNX pose model (YOLOv8n-pose export)
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Minimum person detection confidence
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// IoU above which overlapping detections are suppressed
    #[serde(default = "default_nms_threshold")]
    pub nms_threshold: f32,

    /// Joints below this confidence are ignored by the analyzers
    #[serde(default)]
    pub min_keypoint_confidence: f32,
}

/// Annotated output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// TrueType font for counters and labels; text is skipped without one
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub draw_skeleton: bool,

    /// Text height in pixels
    #[serde(default = "default_text_scale")]
    pub text_scale: f32,
}

fn default_confidence_threshold() -> f32 {
    0.5
}

fn default_nms_threshold() -> f32 {
    0.45
}

fn default_true() -> bool {
    true
}

fn default_text_scale() -> f32 {
    32.0
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            confidence_threshold: default_confidence_threshold(),
            nms_threshold: default_nms_threshold(),
            min_keypoint_confidence: 0.0,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            draw_skeleton: default_true(),
            text_scale: default_text_scale(),
        }
    }
}
