mod analyzers;
mod runtime;

pub use analyzers::*;
pub use runtime::*;

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub vertical_jump: VerticalJumpConfig,

    #[serde(default)]
    pub situps: SitUpsConfig,

    #[serde(default)]
    pub shuttle_run: ShuttleRunConfig,

    #[serde(default)]
    pub endurance_run: EnduranceRunConfig,

    #[serde(default)]
    pub detector: DetectorConfig,

    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl AnalysisConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            AnalysisError::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override detector and overlay settings from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Override settings from `lookup`, which maps variable names to values
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("FITNESS_MODEL_PATH") {
            self.detector.model_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("FITNESS_FONT_PATH") {
            self.overlay.font_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup("FITNESS_MIN_KEYPOINT_CONFIDENCE") {
            self.detector.min_keypoint_confidence = value.parse().map_err(|_| {
                AnalysisError::Config(format!(
                    "FITNESS_MIN_KEYPOINT_CONFIDENCE must be a number, got '{}'",
                    value
                ))
            })?;
        }
        self.validate()
    }

    /// Reject threshold combinations that would break the state machines
    pub fn validate(&self) -> Result<()> {
        let jump = &self.vertical_jump;
        if jump.landing_threshold_px >= jump.takeoff_threshold_px {
            return Err(AnalysisError::Config(
                "vertical_jump.landing_threshold_px must be below takeoff_threshold_px".to_string(),
            ));
        }
        if !(jump.pass_threshold_px <= jump.intermediate_threshold_px
            && jump.intermediate_threshold_px <= jump.advanced_threshold_px)
        {
            return Err(AnalysisError::Config(
                "vertical_jump level thresholds must be ascending".to_string(),
            ));
        }

        if self.situps.up_threshold_degrees >= self.situps.down_threshold_degrees {
            return Err(AnalysisError::Config(
                "situps.up_threshold_degrees must be below down_threshold_degrees".to_string(),
            ));
        }

        let shuttle = &self.shuttle_run;
        if !(0.0..=1.0).contains(&shuttle.line_one_fraction)
            || !(0.0..=1.0).contains(&shuttle.line_two_fraction)
            || shuttle.line_one_fraction >= shuttle.line_two_fraction
        {
            return Err(AnalysisError::Config(
                "shuttle_run line fractions must satisfy 0 <= one < two <= 1".to_string(),
            ));
        }

        if self.endurance_run.walking_threshold_px > self.endurance_run.running_threshold_px {
            return Err(AnalysisError::Config(
                "endurance_run.walking_threshold_px must not exceed running_threshold_px"
                    .to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.detector.min_keypoint_confidence) {
            return Err(AnalysisError::Config(
                "detector.min_keypoint_confidence must be within 0..=1".to_string(),
            ));
        }

        Ok(())
    }
}
