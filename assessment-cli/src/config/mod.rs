use anyhow::{bail, Context, Result};
use fitness_assessment::AnalysisConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Get config directory path (<platform config dir>/fitness-assessment/)
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not find configuration directory")?;
    Ok(base.join("fitness-assessment"))
}

/// Get default config file path
pub fn default_config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// The file a run reads: the explicit one if given, else the default location
pub fn resolve_config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_file(),
    }
}

/// Load configuration, then apply environment overrides
///
/// An explicitly named file must exist; a missing default file means defaults.
pub fn load(explicit: Option<&Path>) -> Result<AnalysisConfig> {
    let config_file = match resolve_config_file(explicit) {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!("{:#}, using defaults", e);
            let mut config = AnalysisConfig::default();
            config
                .apply_env_overrides()
                .context("Invalid environment override")?;
            return Ok(config);
        }
    };

    let mut config = if config_file.exists() {
        tracing::debug!("Loading configuration from {}", config_file.display());
        AnalysisConfig::from_file(&config_file)
            .with_context(|| format!("Failed to load {}", config_file.display()))?
    } else if explicit.is_some() {
        bail!("Config file not found: {}", config_file.display());
    } else {
        tracing::debug!("Config file not found, using defaults");
        AnalysisConfig::default()
    };

    config
        .apply_env_overrides()
        .context("Invalid environment override")?;
    Ok(config)
}

/// Write `config` to `path`, creating parent directories
pub fn save(config: &AnalysisConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}
