//! apk2aab - convert Android APKs into app bundles and sign them
//!
//! ## Architecture
//!
//! ```text
//! CLI → Converter → extract → base module → BundleConfig → zip
//!                          └→ keystore provisioning → jarsigner sign/verify
//! ```

mod bundle;
mod cli;
mod commands;
mod config;
mod converter;
mod error;
mod exec;
mod progress;
mod signing;
mod utils;

#[cfg(test)]
mod testutil;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    cli.execute()
}

/// `warn` by default, `debug` with `--verbose`; `RUST_LOG` overrides both
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
