use anyhow::Result;
use colored::Colorize;
use fitness_assessment::AnalysisConfig;
use std::path::Path;

use crate::config;

pub fn show_config(explicit: Option<&Path>) -> Result<()> {
    let config = config::load(explicit)?;
    let config_str = toml::to_string_pretty(&config)?;

    println!("{}", "# Effective configuration".dimmed());
    println!("{}", config_str);

    Ok(())
}

pub fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let config_file = config::resolve_config_file(explicit)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    config::save(&AnalysisConfig::default(), &config_file)?;
    println!(
        "{} Configuration initialized at: {}",
        "✓".green(),
        config_file.display()
    );

    Ok(())
}
