//! Fitness test analysis over pose keypoint streams.
//!
//! A [`Dispatcher`] picks the analyzer for a test type, pulls frames from a
//! [`FrameSource`], runs an injected [`PoseDetector`] on each one, and
//! writes annotated frames to a [`FrameSink`] while the analyzer folds the
//! keypoints into an [`AnalysisResult`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use models::{AnalysisOutcome, AnalysisRequest, AnalysisResult, TestType};
pub use services::{Dispatcher, FrameSink, FrameSource, PoseDetector};
