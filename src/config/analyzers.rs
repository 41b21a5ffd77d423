//! Calibration constants for the test analyzers.
//!
//! All thresholds are raw pixel or degree values tuned for a subject filmed
//! full-body from a fixed camera a few metres away. They are not normalized
//! by subject size, frame resolution or frame rate.

use serde::{Deserialize, Serialize};

/// Vertical jump thresholds (pixels)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalJumpConfig {
    /// Ankle rise above baseline that starts a jump
    pub takeoff_threshold_px: i32,
    /// Distance from baseline within which the ankle counts as landed
    pub landing_threshold_px: i32,
    /// Minimum best jump for a pass (also the beginner level)
    pub pass_threshold_px: i32,
    pub intermediate_threshold_px: i32,
    pub advanced_threshold_px: i32,
}

impl Default for VerticalJumpConfig {
    fn default() -> Self {
        Self {
            takeoff_threshold_px: 20,
            landing_threshold_px: 5,
            pass_threshold_px: 20,
            intermediate_threshold_px: 45,
            advanced_threshold_px: 70,
        }
    }
}

/// Sit-up torso angle thresholds (degrees)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitUpsConfig {
    /// Angle below which the torso is up; crossing it counts a rep
    pub up_threshold_degrees: f32,
    /// Angle above which the torso is back down
    pub down_threshold_degrees: f32,
}

impl Default for SitUpsConfig {
    fn default() -> Self {
        Self {
            up_threshold_degrees: 100.0,
            down_threshold_degrees: 150.0,
        }
    }
}

/// Shuttle run guide line positions (fractions of frame width)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuttleRunConfig {
    pub line_one_fraction: f64,
    pub line_two_fraction: f64,
}

impl Default for ShuttleRunConfig {
    fn default() -> Self {
        Self {
            line_one_fraction: 0.25,
            line_two_fraction: 0.75,
        }
    }
}

/// Endurance run hip displacement thresholds (pixels per frame)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnduranceRunConfig {
    pub running_threshold_px: f32,
    pub walking_threshold_px: f32,
}

impl Default for EnduranceRunConfig {
    fn default() -> Self {
        Self {
            running_threshold_px: 10.0,
            walking_threshold_px: 2.0,
        }
    }
}
