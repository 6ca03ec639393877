//! Bundle signing and verification with `jarsigner`

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::settings::ToolSettings;
use crate::error::ConvertError;
use crate::exec::{run_streaming, ToolCommand};
use crate::progress::Transcript;
use crate::signing::keystore::ResolvedKeystore;
use crate::utils::tools::{self, Tool};

pub const SIGNATURE_ALGORITHM: &str = "SHA256withRSA";
pub const DIGEST_ALGORITHM: &str = "SHA-256";

/// Printed by `jarsigner -verify` for an archive without signatures (exit code 0)
const UNSIGNED_MARKER: &str = "jar is unsigned";

#[derive(Debug, Clone)]
pub struct Signer {
    jarsigner: PathBuf,
    timeout: Duration,
}

impl Signer {
    /// Resolve `jarsigner`, failing with `ToolUnavailable` if it is missing
    pub fn locate(tools: &ToolSettings) -> Result<Self, ConvertError> {
        Ok(Self::new(tools::require(Tool::Jarsigner, tools)?, tools.timeout()))
    }

    pub fn new(jarsigner: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            jarsigner: jarsigner.into(),
            timeout,
        }
    }

    /// Sign `archive` in place with the key named in `keystore`
    pub async fn sign(
        &self,
        archive: &Path,
        keystore: &ResolvedKeystore,
        transcript: &Transcript,
    ) -> Result<(), ConvertError> {
        let cmd = ToolCommand::new(&self.jarsigner)
            .arg("-verbose")
            .arg("-sigalg")
            .arg(SIGNATURE_ALGORITHM)
            .arg("-digestalg")
            .arg(DIGEST_ALGORITHM)
            .arg("-keystore")
            .path_arg(&keystore.path)
            .arg("-storepass")
            .secret_arg(keystore.store_password.as_str())
            .arg("-keypass")
            .secret_arg(keystore.key_password.as_str())
            .path_arg(archive)
            .arg(keystore.key_alias.as_str());

        let result = run_streaming(&cmd, transcript, self.timeout).await?;
        if !result.success {
            return Err(ConvertError::signing_failed(
                format!("jarsigner exited with code {}", result.exit_code),
                result.stderr,
            ));
        }
        Ok(())
    }

    /// Verify the signature of `archive`
    pub async fn verify(
        &self,
        archive: &Path,
        transcript: &Transcript,
    ) -> Result<(), ConvertError> {
        let cmd = ToolCommand::new(&self.jarsigner)
            .arg("-verify")
            .arg("-verbose")
            .path_arg(archive);

        let result = run_streaming(&cmd, transcript, self.timeout).await?;
        if !result.success {
            return Err(ConvertError::verification_failed(
                format!("jarsigner -verify exited with code {}", result.exit_code),
                result.stderr,
            ));
        }
        if result.stdout.contains(UNSIGNED_MARKER) {
            return Err(ConvertError::verification_failed(
                "jarsigner reports the bundle as unsigned",
                result.stderr,
            ));
        }
        Ok(())
    }
}
