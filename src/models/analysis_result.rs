use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Fitness tests supported by the analysis system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestType {
    VerticalJump,
    SitUps,
    ShuttleRun,
    EnduranceRun,
}

impl TestType {
    pub const ALL: [TestType; 4] = [
        TestType::VerticalJump,
        TestType::SitUps,
        TestType::ShuttleRun,
        TestType::EnduranceRun,
    ];

    /// Identifier accepted by the dispatcher
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::VerticalJump => "vertical-jump",
            TestType::SitUps => "sit-ups",
            TestType::ShuttleRun => "shuttle-run",
            TestType::EnduranceRun => "endurance-run",
        }
    }

    /// Human-readable name used in result records
    pub fn label(&self) -> &'static str {
        match self {
            TestType::VerticalJump => "Vertical Jump",
            TestType::SitUps => "Sit-ups",
            TestType::ShuttleRun => "Shuttle Run",
            TestType::EnduranceRun => "Endurance Run",
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        TestType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| AnalysisError::UnsupportedTestType(s.to_string()))
    }
}

/// Pass/fail verdict for the vertical jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassFailStatus {
    Pass,
    Fail,
}

/// Skill level assessed from the best jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssessedLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for AssessedLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssessedLevel::Beginner => write!(f, "Beginner"),
            AssessedLevel::Intermediate => write!(f, "Intermediate"),
            AssessedLevel::Advanced => write!(f, "Advanced"),
        }
    }
}

/// Per-frame activity classification for the endurance run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLabel {
    Stopped,
    Walking,
    Running,
}

impl std::fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityLabel::Stopped => write!(f, "Stopped"),
            ActivityLabel::Walking => write!(f, "Walking"),
            ActivityLabel::Running => write!(f, "Running"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalJumpResult {
    pub total_jumps: usize,
    pub jump_heights_px: Vec<i32>,
    pub max_jump_height_px: i32,
    pub duration_seconds: f64,
    pub analysis_video_path: PathBuf,
    pub pass_fail_status: PassFailStatus,
    pub assessed_level: AssessedLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitUpsResult {
    pub total_reps: u32,
    pub analysis_video_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShuttleRunResult {
    pub total_laps: u32,
    pub total_time_seconds: f64,
    pub analysis_video_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnduranceRunResult {
    pub run_percentage: f64,
    pub walk_percentage: f64,
    pub stop_percentage: f64,
    pub analysis_video_path: PathBuf,
}

/// Summary metrics of one completed analysis run
///
/// Serializes as a flat record tagged with a `test_type` label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test_type")]
pub enum AnalysisResult {
    #[serde(rename = "Vertical Jump")]
    VerticalJump(VerticalJumpResult),
    #[serde(rename = "Sit-ups")]
    SitUps(SitUpsResult),
    #[serde(rename = "Shuttle Run")]
    ShuttleRun(ShuttleRunResult),
    #[serde(rename = "Endurance Run")]
    EnduranceRun(EnduranceRunResult),
}

impl AnalysisResult {
    pub fn test_type(&self) -> TestType {
        match self {
            AnalysisResult::VerticalJump(_) => TestType::VerticalJump,
            AnalysisResult::SitUps(_) => TestType::SitUps,
            AnalysisResult::ShuttleRun(_) => TestType::ShuttleRun,
            AnalysisResult::EnduranceRun(_) => TestType::EnduranceRun,
        }
    }

    pub fn analysis_video_path(&self) -> &PathBuf {
        match self {
            AnalysisResult::VerticalJump(r) => &r.analysis_video_path,
            AnalysisResult::SitUps(r) => &r.analysis_video_path,
            AnalysisResult::ShuttleRun(r) => &r.analysis_video_path,
            AnalysisResult::EnduranceRun(r) => &r.analysis_video_path,
        }
    }
}

/// What the caller receives: a result record or `{"error": message}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Completed(AnalysisResult),
    Failed { error: String },
}

impl AnalysisOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisOutcome::Failed { .. })
    }
}

impl From<Result<AnalysisResult, AnalysisError>> for AnalysisOutcome {
    fn from(result: Result<AnalysisResult, AnalysisError>) -> Self {
        match result {
            Ok(result) => AnalysisOutcome::Completed(result),
            Err(e) => AnalysisOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Request to analyze one video
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub test_type: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Athlete's self-reported level; recorded but not used in scoring
    #[serde(default)]
    pub user_level: Option<String>,
}

/// Round to two decimal places for reporting
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
