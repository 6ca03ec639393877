//! Command implementations
//!
//! Each command module provides a clap-derived struct and execute method.

pub mod check;
pub mod convert;
pub mod sign;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;

use crate::bundle::archive;
use crate::converter::{ConversionResult, Converter};
use crate::signing::CertificateInfo;
use crate::utils::terminal;

/// Signing identity options shared by `convert` and `sign`
#[derive(Args, Debug, Clone, Default)]
pub struct CertificateArgs {
    /// Keystore to sign with (default: the Android debug keystore)
    #[arg(long, value_name = "PATH")]
    pub keystore: Option<PathBuf>,

    /// Keystore password
    #[arg(long, env = "APK2AAB_KS_PASS", hide_env_values = true, value_name = "PASS")]
    pub ks_pass: Option<String>,

    /// Key alias inside the keystore
    #[arg(long, value_name = "ALIAS")]
    pub alias: Option<String>,

    /// Key password (default: the keystore password)
    #[arg(long, env = "APK2AAB_KEY_PASS", hide_env_values = true, value_name = "PASS")]
    pub key_pass: Option<String>,

    /// Display name for the certificate
    #[arg(long, value_name = "NAME")]
    pub cert_name: Option<String>,
}

impl CertificateArgs {
    /// Whether any option implies signing
    ///
    /// Passwords are ignored here since they may come from the environment.
    pub fn requested(&self) -> bool {
        self.keystore.is_some() || self.alias.is_some() || self.cert_name.is_some()
    }

    /// Build the signing identity
    pub fn certificate(&self) -> Result<CertificateInfo> {
        let Some(keystore) = &self.keystore else {
            if self.alias.is_some() {
                bail!("--alias requires --keystore");
            }
            return Ok(CertificateInfo::default_debug());
        };

        let Some(store_password) = self.ks_pass.clone() else {
            bail!("--keystore requires --ks-pass (or APK2AAB_KS_PASS)");
        };
        let Some(alias) = self.alias.clone() else {
            bail!("--keystore requires --alias");
        };
        let key_password = self.key_pass.clone().unwrap_or_else(|| store_password.clone());
        let name = self.cert_name.clone().unwrap_or_else(|| {
            keystore
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| keystore.display().to_string())
        });

        Ok(CertificateInfo::custom(
            name,
            keystore,
            store_password,
            alias,
            key_password,
        ))
    }
}

/// Runtime for driving the async pipeline from a synchronous command
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Print the outcome of a job, exiting with status 1 on failure
///
/// Without `verbose` the job transcript has only been shown on the spinner,
/// so a failure replays it before the error.
pub(crate) fn report_outcome(
    converter: &Converter,
    result: ConversionResult,
    verbose: bool,
) -> Result<()> {
    log::debug!(
        "Job finished in state {} (error kind: {:?})",
        converter.state(),
        result.error_kind()
    );

    if !result.is_success() {
        if !verbose && !result.logs().is_empty() {
            eprintln!("\n{}", style("JOB LOG:").cyan().bold());
            for line in result.logs() {
                eprintln!("  {}", line);
            }
        }
        match result.error() {
            Some(err) => err.display_with_hints(),
            None => terminal::print_error(result.message()),
        }
        std::process::exit(1);
    }

    terminal::print_success(result.message());
    if let Some(path) = result.output_path() {
        terminal::print_info(&format!("Output: {}", path.display()));
        if let Err(e) = archive::print_zip_tree(path, "    ") {
            log::warn!("Could not list {}: {}", path.display(), e);
        }
    }
    Ok(())
}
