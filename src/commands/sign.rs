//! Sign command implementation

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use super::{report_outcome, runtime, CertificateArgs};
use crate::config::Settings;
use crate::converter::Converter;
use crate::utils::terminal;

/// Sign and verify an existing bundle in place
#[derive(Args, Debug)]
pub struct SignCommand {
    /// Bundle to sign
    pub bundle: PathBuf,

    #[command(flatten)]
    pub certificate: CertificateArgs,
}

impl SignCommand {
    pub fn execute(self, verbose: bool, settings: Settings) -> Result<()> {
        let certificate = self.certificate.certificate()?;
        terminal::print_info(&format!(
            "Signing {} with {}",
            self.bundle.display(),
            certificate.name()
        ));

        let converter = Converter::new(settings);
        let renderer = Arc::new(terminal::ProgressRenderer::new("Signing...", verbose));
        let result =
            runtime()?.block_on(converter.sign(&self.bundle, &certificate, renderer.clone()));
        renderer.finish();

        report_outcome(&converter, result, verbose)
    }
}
