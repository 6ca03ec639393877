//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{check::CheckCommand, convert::ConvertCommand, sign::SignCommand};
use crate::config::Settings;

/// apk2aab - APK to Android App Bundle converter
///
/// Repackages an APK as an .aab bundle and optionally signs it with
/// jarsigner.
#[derive(Parser, Debug)]
#[command(name = "apk2aab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Settings file (default: config.toml in the platform config directory)
    #[arg(long, global = true, env = "APK2AAB_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an APK into an app bundle
    Convert(ConvertCommand),

    /// Sign and verify an existing app bundle
    Sign(SignCommand),

    /// Check external tool availability
    Check(CheckCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let settings = match Settings::load(self.config.as_deref()) {
            Ok(settings) => settings,
            Err(e) => {
                e.display_with_hints();
                std::process::exit(1);
            }
        };

        // Execute the subcommand
        match self.command {
            Commands::Convert(cmd) => cmd.execute(self.verbose, settings),
            Commands::Sign(cmd) => cmd.execute(self.verbose, settings),
            Commands::Check(cmd) => cmd.execute(self.verbose, settings),
        }
    }
}
