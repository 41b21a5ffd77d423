// Keypoint and result data models

pub mod analysis_result;
pub mod keypoint;

pub use analysis_result::*;
pub use keypoint::*;
