// Frame I/O, pose detection and analysis services

pub mod analyzers;
pub mod dispatcher;
pub mod frame_io;
pub mod keypoint_processor;
pub mod overlay;
pub mod pipeline;
pub mod pose_detector;
#[cfg(feature = "onnx")]
pub mod pose_estimation_service;

pub use analyzers::{AnalyzerKind, RunSummary, TestAnalyzer};
pub use dispatcher::Dispatcher;
pub use frame_io::{FrameSink, FrameSource, ImageSequenceSink, ImageSequenceSource, VideoMetadata};
pub use overlay::{Annotation, OverlayRenderer};
pub use pose_detector::{PoseDetector, RecordedPoseDetector};
#[cfg(feature = "onnx")]
pub use pose_estimation_service::YoloPoseDetector;
