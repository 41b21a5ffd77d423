use anyhow::{Context, Result};
use clap::Args;
use fitness_assessment::models::{AnalysisOutcome, AnalysisRequest, AnalysisResult};
use fitness_assessment::services::RecordedPoseDetector;
use fitness_assessment::{AnalysisConfig, Dispatcher, PoseDetector, TestType};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct AnalyzeCommand {
    /// Test type (vertical-jump, sit-ups, shuttle-run, endurance-run)
    #[arg(short, long = "test")]
    pub test_type: String,

    /// Directory of input frames
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for annotated frames (default: <uuid>_output next to the input)
    ///
    /// Counter text is only drawn when overlay.font_path points at a TTF font.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Recorded keypoint track (JSON) to use instead of a pose model
    #[arg(short, long, conflicts_with = "model")]
    pub keypoints: Option<PathBuf>,

    /// ONNX pose model (overrides detector.model_path)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Athlete's self-reported level
    #[arg(long)]
    pub user_level: Option<String>,
}

impl AnalyzeCommand {
    /// Run the analysis and print the outcome as JSON
    ///
    /// Failures are reported on stdout as `{"error": ...}` with exit status 1.
    pub fn execute(&self, config_path: Option<&Path>) -> Result<ExitCode> {
        let outcome = match self.run(config_path) {
            Ok(result) => AnalysisOutcome::Completed(result),
            Err(e) => {
                tracing::error!("Analysis failed: {:#}", e);
                AnalysisOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        println!("{}", serde_json::to_string_pretty(&outcome)?);

        Ok(if outcome.is_error() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }

    fn run(&self, config_path: Option<&Path>) -> Result<AnalysisResult> {
        // Reject unknown tests before loading configuration or any detector
        let _: TestType = self.test_type.parse()?;
        let mut config = crate::config::load(config_path)?;

        if let Some(model) = &self.model {
            config.detector.model_path = Some(model.clone());
        }

        let request = AnalysisRequest {
            test_type: self.test_type.clone(),
            input_path: self.input.clone(),
            output_path: self
                .output
                .clone()
                .unwrap_or_else(|| default_output_path(&self.input)),
            user_level: self.user_level.clone(),
        };

        let mut detector = self.detector(&config)?;
        let result = Dispatcher::new(config).run_analysis(&request, detector.as_mut())?;
        Ok(result)
    }

    fn detector(&self, config: &AnalysisConfig) -> Result<Box<dyn PoseDetector>> {
        if let Some(track) = &self.keypoints {
            let detector = RecordedPoseDetector::from_file(track)
                .with_context(|| format!("Failed to load keypoint track {}", track.display()))?;
            return Ok(Box::new(detector));
        }
        model_detector(config)
    }
}

#[cfg(feature = "onnx")]
fn model_detector(config: &AnalysisConfig) -> Result<Box<dyn PoseDetector>> {
    use fitness_assessment::services::YoloPoseDetector;

    Ok(Box::new(YoloPoseDetector::from_config(&config.detector)?))
}

#[cfg(not(feature = "onnx"))]
fn model_detector(config: &AnalysisConfig) -> Result<Box<dyn PoseDetector>> {
    match &config.detector.model_path {
        Some(path) => anyhow::bail!(
            "Cannot load {}: built without ONNX support, use --keypoints",
            path.display()
        ),
        None => anyhow::bail!("No pose source: pass --keypoints or --model"),
    }
}

/// `<uuid>_output` next to the input
fn default_output_path(input: &Path) -> PathBuf {
    let name = format!("{}_output", Uuid::new_v4());
    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
