//! Pose detection using ONNX Runtime
//!
//! Runs a YOLOv8n-pose export on each frame and reports the most confident
//! person in pixel coordinates of the original frame.
//!
//! Model Details:
//! - Input: [1, 3, 640, 640] FP32 (NCHW, RGB, normalized [0,1])
//! - Output: [1, 56, 8400] FP32 (56 = 4 bbox + 1 conf + 51 keypoints)
//! - Keypoints: 17 COCO format (nose, eyes, ears, shoulders, elbows, wrists, hips, knees, ankles)

use anyhow::{Context, Result};
use image::{imageops, imageops::FilterType, ImageBuffer, Rgb, RgbImage};
use ndarray::{s, Array2, Array4, Ix3};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;
use std::path::Path;

use crate::config::DetectorConfig;
use crate::error::AnalysisError;
use crate::models::{Keypoint, KeypointFrame, COCO_KEYPOINT_COUNT};
use crate::services::frame_io::Frame;
use crate::services::pose_detector::PoseDetector;

const MODEL_INPUT_SIZE: u32 = 640;

/// A candidate person from one anchor of the model output
#[derive(Debug, Clone)]
struct PersonCandidate {
    /// Bounding box center x, y and size (model input pixels)
    bbox: (f32, f32, f32, f32),
    confidence: f32,
    /// (x, y, confidence) per COCO joint
    keypoints: Vec<(f32, f32, f32)>,
}

/// Letterbox placement of a frame inside the square model input
#[derive(Debug, Clone, Copy, PartialEq)]
struct Letterbox {
    scale: f32,
    new_width: u32,
    new_height: u32,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn fit(width: u32, height: u32, target: u32) -> Self {
        let scale = (target as f32 / width as f32).min(target as f32 / height as f32);
        let new_width = ((width as f32 * scale) as u32).clamp(1, target);
        let new_height = ((height as f32 * scale) as u32).clamp(1, target);
        Self {
            scale,
            new_width,
            new_height,
            pad_x: (target - new_width) / 2,
            pad_y: (target - new_height) / 2,
        }
    }

    /// Map a point from model input space back to frame pixels
    fn to_frame(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x as f32) / self.scale,
            (y - self.pad_y as f32) / self.scale,
        )
    }
}

/// YOLOv8-pose detector backed by an ONNX Runtime session
pub struct YoloPoseDetector {
    session: Session,
    confidence_threshold: f32,
    nms_iou_threshold: f32,
    min_keypoint_confidence: f32,
}

impl YoloPoseDetector {
    /// Load the ONNX model
    ///
    /// # Example
    /// ```no_run
    /// use fitness_assessment::services::pose_estimation_service::YoloPoseDetector;
    ///
    /// let detector = YoloPoseDetector::new("models/pose_v1.onnx")
    ///     .expect("Failed to load model");
    /// ```
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(model_path.as_ref())
            .context("Failed to load ONNX model")?;

        tracing::info!(
            "Loaded pose estimation model from {}",
            model_path.as_ref().display()
        );

        Ok(Self {
            session,
            confidence_threshold: 0.5,
            nms_iou_threshold: 0.45,
            min_keypoint_confidence: 0.0,
        })
    }

    /// Load the model named in `config` and apply its thresholds
    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let model_path = config
            .model_path
            .as_ref()
            .context("detector.model_path is not set")?;
        Ok(Self::new(model_path)?
            .with_confidence_threshold(config.confidence_threshold)
            .with_nms_threshold(config.nms_threshold)
            .with_min_keypoint_confidence(config.min_keypoint_confidence))
    }

    /// Set the confidence threshold for detection filtering
    ///
    /// Default: 0.5
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the NMS IoU threshold for filtering overlapping detections
    ///
    /// Default: 0.45
    pub fn with_nms_threshold(mut self, threshold: f32) -> Self {
        self.nms_iou_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Joints below this confidence are reported as not visible
    pub fn with_min_keypoint_confidence(mut self, threshold: f32) -> Self {
        self.min_keypoint_confidence = threshold.clamp(0.0, 1.0);
        self
    }

    /// Run the model on one frame and return the most confident person
    fn estimate_pose(&mut self, image: &RgbImage) -> Result<KeypointFrame> {
        let letterbox = Letterbox::fit(image.width(), image.height(), MODEL_INPUT_SIZE);
        let input_tensor = preprocess_image(image, &letterbox);

        let output: Array2<f32> = {
            let outputs = self
                .session
                .run(ort::inputs!["images" => TensorRef::from_array_view(&input_tensor)?])
                .context("Failed to run inference")?;
            let raw = outputs["output0"]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?
                .into_dimensionality::<Ix3>()
                .context("Unexpected output rank")?;
            // [1, 56, 8400] -> [8400, 56]
            let rows = raw.slice(s![0, .., ..]).t().to_owned();
            rows
        };

        let candidates = collect_candidates(&output, self.confidence_threshold);
        let persons = apply_nms(candidates, self.nms_iou_threshold);

        if persons.len() > 1 {
            tracing::debug!(
                "{} people in view, keeping the most confident",
                persons.len()
            );
        }

        let Some(best) = persons.into_iter().next() else {
            return Ok(KeypointFrame::empty());
        };

        let min_confidence = self.min_keypoint_confidence;
        let keypoints = best
            .keypoints
            .iter()
            .map(|&(x, y, confidence)| {
                let (px, py) = letterbox.to_frame(x, y);
                Keypoint {
                    x: px,
                    y: py,
                    confidence,
                    visible: confidence >= min_confidence,
                }
            })
            .collect();

        Ok(KeypointFrame::new(keypoints))
    }
}

impl PoseDetector for YoloPoseDetector {
    fn detect(&mut self, frame: &Frame) -> crate::error::Result<KeypointFrame> {
        self.estimate_pose(&frame.image)
            .map_err(|e| AnalysisError::Detector(format!("{:#}", e)))
    }
}

/// Letterbox resize, RGB normalization to [0, 1], NCHW layout
fn preprocess_image(image: &RgbImage, letterbox: &Letterbox) -> Array4<f32> {
    let target = MODEL_INPUT_SIZE;
    let resized = imageops::resize(
        image,
        letterbox.new_width,
        letterbox.new_height,
        FilterType::Triangle,
    );

    let mut padded: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(target, target, Rgb([114, 114, 114]));
    imageops::overlay(
        &mut padded,
        &resized,
        letterbox.pad_x as i64,
        letterbox.pad_y as i64,
    );

    let mut input_tensor = Array4::<f32>::zeros((1, 3, target as usize, target as usize));
    for (x, y, pixel) in padded.enumerate_pixels() {
        for channel in 0..3 {
            input_tensor[[0, channel, y as usize, x as usize]] = pixel[channel] as f32 / 255.0;
        }
    }
    input_tensor
}

/// Rows are [x, y, w, h, conf, kp1_x, kp1_y, kp1_conf, ..., kp17_conf]
fn collect_candidates(output: &Array2<f32>, confidence_threshold: f32) -> Vec<PersonCandidate> {
    output
        .rows()
        .into_iter()
        .filter(|row| row.len() >= 5 + COCO_KEYPOINT_COUNT * 3 && row[4] >= confidence_threshold)
        .map(|row| PersonCandidate {
            bbox: (row[0], row[1], row[2], row[3]),
            confidence: row[4],
            keypoints: (0..COCO_KEYPOINT_COUNT)
                .map(|kp| {
                    let base = 5 + kp * 3;
                    (row[base], row[base + 1], row[base + 2])
                })
                .collect(),
        })
        .collect()
}

/// Non-Maximum Suppression, most confident first
fn apply_nms(mut detections: Vec<PersonCandidate>, iou_threshold: f32) -> Vec<PersonCandidate> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<PersonCandidate> = Vec::new();
    for det in detections {
        if keep
            .iter()
            .all(|kept| calculate_iou(kept.bbox, det.bbox) < iou_threshold)
        {
            keep.push(det);
        }
    }
    keep
}

/// Intersection over Union for two center-format boxes
fn calculate_iou(bbox1: (f32, f32, f32, f32), bbox2: (f32, f32, f32, f32)) -> f32 {
    let (x1, y1, w1, h1) = bbox1;
    let (x2, y2, w2, h2) = bbox2;

    let inter_w = ((x1 + w1 / 2.0).min(x2 + w2 / 2.0) - (x1 - w1 / 2.0).max(x2 - w2 / 2.0)).max(0.0);
    let inter_h = ((y1 + h1 / 2.0).min(y2 + h2 / 2.0) - (y1 - h1 / 2.0).max(y2 - h2 / 2.0)).max(0.0);
    let inter_area = inter_w * inter_h;

    let union_area = w1 * h1 + w2 * h2 - inter_area;
    if union_area > 0.0 {
        inter_area / union_area
    } else {
        0.0
    }
}
