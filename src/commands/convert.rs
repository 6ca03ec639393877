//! Convert command implementation

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;

use super::{report_outcome, runtime, CertificateArgs};
use crate::config::Settings;
use crate::converter::{ConversionJob, Converter};
use crate::utils::{paths, terminal};

/// Convert an APK into an Android App Bundle
#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// APK to convert
    pub input: PathBuf,

    /// Output bundle (default: the input path with an .aab extension)
    #[arg(short, long, value_name = "AAB")]
    pub output: Option<PathBuf>,

    /// Sign the bundle, with the debug identity unless --keystore is given
    #[arg(long)]
    pub sign: bool,

    #[command(flatten)]
    pub certificate: CertificateArgs,
}

impl ConvertCommand {
    pub fn execute(self, verbose: bool, settings: Settings) -> Result<()> {
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| paths::default_output_path(&self.input));
        if paths::is_same_file(&self.input, &output) {
            bail!(
                "Output {} would overwrite the input; pass -o with a different path",
                output.display()
            );
        }

        let mut job = ConversionJob::new(&self.input, &output);
        if self.sign || self.certificate.requested() {
            job = job.with_certificate(self.certificate.certificate()?);
        }

        terminal::print_info(&format!(
            "Converting {} -> {}",
            self.input.display(),
            output.display()
        ));
        if let Some(cert) = &job.certificate {
            terminal::print_info(&format!("Signing with {}", cert.name()));
        }

        let converter = Converter::new(settings);
        let renderer = Arc::new(terminal::ProgressRenderer::new("Converting...", verbose));
        let result = runtime()?.block_on(converter.run(&job, renderer.clone()));
        renderer.finish();

        report_outcome(&converter, result, verbose)
    }
}
