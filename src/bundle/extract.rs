//! APK extraction
//!
//! The APK is unpacked with the external `unzip` tool when it is
//! available (or required by settings), otherwise in-process with the
//! `zip` crate. Either way relative entry paths are preserved and the
//! source file is only read.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use zip::ZipArchive;

use crate::config::settings::{ExtractMethod, Settings, ToolSettings};
use crate::error::ConvertError;
use crate::exec::{run_streaming, ToolCommand};
use crate::progress::Transcript;
use crate::utils::tools::{self, Tool};

/// Unpacks input archives into a directory
#[derive(Debug, Clone)]
pub struct Extractor {
    method: ExtractMethod,
    tools: ToolSettings,
}

/// How a particular extraction will run once the method is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
enum Backend {
    Unzip(PathBuf),
    Builtin,
}

impl Extractor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            method: settings.extract.method,
            tools: settings.tools.clone(),
        }
    }

    #[cfg(test)]
    pub fn with_method(method: ExtractMethod, tools: ToolSettings) -> Self {
        Self { method, tools }
    }

    fn backend(&self) -> Result<Backend, ConvertError> {
        match self.method {
            ExtractMethod::Builtin => Ok(Backend::Builtin),
            ExtractMethod::Unzip => tools::require(Tool::Unzip, &self.tools).map(Backend::Unzip),
            ExtractMethod::Auto => Ok(tools::locate(Tool::Unzip, &self.tools)
                .map(Backend::Unzip)
                .unwrap_or(Backend::Builtin)),
        }
    }

    /// Unpack `archive` into `dest`
    ///
    /// `dest` may exist only if it is empty.
    pub async fn extract(
        &self,
        archive: &Path,
        dest: &Path,
        transcript: &Transcript,
    ) -> Result<(), ConvertError> {
        if !archive.is_file() {
            return Err(ConvertError::not_found("Input APK", archive));
        }
        prepare_destination(dest)?;

        match self.backend()? {
            Backend::Unzip(unzip) => {
                extract_with_unzip(&unzip, archive, dest, transcript, self.tools.timeout()).await
            }
            Backend::Builtin => {
                log::debug!("Extracting {} in-process", archive.display());
                let archive = archive.to_path_buf();
                let dest = dest.to_path_buf();
                tokio::task::spawn_blocking(move || extract_builtin(&archive, &dest))
                    .await
                    .map_err(|e| ConvertError::ExtractionFailed {
                        message: format!("Extraction task failed: {}", e),
                        stderr: String::new(),
                        source: None,
                    })?
            }
        }
    }
}

fn prepare_destination(dest: &Path) -> Result<(), ConvertError> {
    if dest.exists() {
        let mut entries = std::fs::read_dir(dest).map_err(|e| {
            ConvertError::io(format!("Failed to read directory: {}", dest.display()), e)
        })?;
        if entries.next().is_some() {
            return Err(ConvertError::extraction_failed(
                format!("Destination is not empty: {}", dest.display()),
                "",
            ));
        }
        return Ok(());
    }
    std::fs::create_dir_all(dest).map_err(|e| {
        ConvertError::io(format!("Failed to create directory: {}", dest.display()), e)
    })
}

async fn extract_with_unzip(
    unzip: &Path,
    archive: &Path,
    dest: &Path,
    transcript: &Transcript,
    timeout: Duration,
) -> Result<(), ConvertError> {
    let cmd = ToolCommand::new(unzip)
        .arg("-q")
        .arg("-o")
        .path_arg(archive)
        .arg("-d")
        .path_arg(dest);

    let result = run_streaming(&cmd, transcript, timeout).await?;
    if !result.success {
        return Err(ConvertError::extraction_failed(
            format!("unzip exited with code {}", result.exit_code),
            result.stderr,
        ));
    }
    Ok(())
}

/// Unpack with the zip crate
///
/// Entries whose names would escape `dest` are rejected by the zip crate.
pub fn extract_builtin(archive: &Path, dest: &Path) -> Result<(), ConvertError> {
    let file = File::open(archive)
        .map_err(|e| ConvertError::io(format!("Failed to open {}", archive.display()), e))?;

    let mut zip = ZipArchive::new(file).map_err(|e| ConvertError::ExtractionFailed {
        message: format!("{} is not a valid zip archive", archive.display()),
        stderr: e.to_string(),
        source: Some(e.into()),
    })?;

    zip.extract(dest).map_err(|e| ConvertError::ExtractionFailed {
        message: format!("Failed to extract {}", archive.display()),
        stderr: e.to_string(),
        source: Some(e.into()),
    })
}
