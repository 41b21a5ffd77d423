//! Overlay drawing for annotated output frames
//!
//! Analyzers describe what to draw as `Annotation` values; the renderer turns
//! them into pixels along with the detected skeleton.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};
use std::fs;

use crate::config::OverlayConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{KeypointFrame, SKELETON_EDGES};

pub const TEXT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const GUIDE_LINE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const SKELETON_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const JOINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const JOINT_RADIUS: i32 = 3;

/// One drawing instruction for the current frame
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Text with its top-left corner at (x, y)
    Text {
        text: String,
        x: i32,
        y: i32,
        color: Rgb<u8>,
    },
    /// Full-height line at column x
    VerticalLine { x: i32, color: Rgb<u8> },
}

impl Annotation {
    pub fn text(text: impl Into<String>, x: i32, y: i32) -> Self {
        Annotation::Text {
            text: text.into(),
            x,
            y,
            color: TEXT_COLOR,
        }
    }

    pub fn guide_line(x: i32) -> Self {
        Annotation::VerticalLine {
            x,
            color: GUIDE_LINE_COLOR,
        }
    }
}

/// Draws skeletons and annotations onto frames
pub struct OverlayRenderer {
    font: Option<FontVec>,
    scale: PxScale,
    draw_skeleton: bool,
    min_keypoint_confidence: f32,
}

impl std::fmt::Debug for OverlayRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("has_font", &self.font.is_some())
            .field("scale", &self.scale)
            .field("draw_skeleton", &self.draw_skeleton)
            .field("min_keypoint_confidence", &self.min_keypoint_confidence)
            .finish()
    }
}

impl OverlayRenderer {
    /// Build a renderer, loading the configured font if any
    pub fn new(config: &OverlayConfig) -> Result<Self> {
        let font = match &config.font_path {
            Some(path) => {
                let bytes = fs::read(path).map_err(|e| AnalysisError::Font {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                let font = FontVec::try_from_vec(bytes).map_err(|e| AnalysisError::Font {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                Some(font)
            }
            None => None,
        };

        Ok(Self {
            font,
            scale: PxScale::from(config.text_scale),
            draw_skeleton: config.draw_skeleton,
            min_keypoint_confidence: 0.0,
        })
    }

    /// Only draw joints at or above this confidence
    pub fn with_min_keypoint_confidence(mut self, min_confidence: f32) -> Self {
        self.min_keypoint_confidence = min_confidence;
        self
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw the skeleton (if enabled) and then every annotation, in order
    pub fn render(&self, canvas: &mut RgbImage, keypoints: &KeypointFrame, annotations: &[Annotation]) {
        if self.draw_skeleton {
            self.draw_skeleton(canvas, keypoints);
        }

        for annotation in annotations {
            match annotation {
                Annotation::Text { text, x, y, color } => {
                    if let Some(font) = &self.font {
                        draw_text_mut(canvas, *color, *x, *y, self.scale, font, text);
                    }
                }
                Annotation::VerticalLine { x, color } => {
                    let bottom = canvas.height().saturating_sub(1) as f32;
                    for column in [*x, x + 1] {
                        let column = column as f32;
                        draw_line_segment_mut(canvas, (column, 0.0), (column, bottom), *color);
                    }
                }
            }
        }
    }

    fn draw_skeleton(&self, canvas: &mut RgbImage, keypoints: &KeypointFrame) {
        let min = self.min_keypoint_confidence;
        for (from, to) in SKELETON_EDGES {
            if let (Some(a), Some(b)) = (keypoints.joint(from, min), keypoints.joint(to, min)) {
                draw_line_segment_mut(canvas, (a.x, a.y), (b.x, b.y), SKELETON_COLOR);
            }
        }

        if !keypoints.has_subject() {
            return;
        }
        for kp in keypoints.keypoints.iter().filter(|kp| kp.is_valid(min)) {
            draw_filled_circle_mut(
                canvas,
                (kp.x.round() as i32, kp.y.round() as i32),
                JOINT_RADIUS,
                JOINT_COLOR,
            );
        }
    }
}
