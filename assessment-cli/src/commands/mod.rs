mod analyze;
mod config_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use fitness_assessment::TestType;
use std::path::PathBuf;
use std::process::ExitCode;

pub use analyze::AnalyzeCommand;

#[derive(Parser)]
#[command(name = "fitness-assessment")]
#[command(about = "Analyze fitness test videos from pose keypoints", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "FITNESS_ASSESSMENT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a recorded fitness test
    Analyze(AnalyzeCommand),

    /// List supported test types
    Tests,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn execute(self) -> Result<ExitCode> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        let config_path = self.config.as_deref();

        match self.command {
            Commands::Analyze(cmd) => cmd.execute(config_path),
            Commands::Tests => {
                list_tests();
                Ok(ExitCode::SUCCESS)
            }
            Commands::Config(subcmd) => {
                match subcmd {
                    ConfigSubcommands::Show => config_cmd::show_config(config_path)?,
                    ConfigSubcommands::Init { force } => {
                        config_cmd::init_config(config_path, force)?
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn list_tests() {
    for test_type in TestType::ALL {
        println!("{} {}", format!("{:<15}", test_type.as_str()).bold(), test_type.label());
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
