//! Keystore provisioning
//!
//! Turns a [`CertificateInfo`] into a keystore file that exists on disk.
//! The built-in identity lives at `~/.android/debug.keystore` (or the
//! `[signing] debug_keystore` setting) and is generated with `keytool` on
//! first use. Generation happens under a [`KeystoreLock`] into a
//! `.partial` file that is renamed into place, so concurrent jobs never
//! observe a half-written keystore.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::settings::{Settings, ToolSettings};
use crate::error::ConvertError;
use crate::exec::{run_streaming, ToolCommand};
use crate::progress::Transcript;
use crate::signing::certificate::{
    CertificateInfo, DEBUG_DNAME, DEBUG_KEY_ALGORITHM, DEBUG_KEY_ALIAS, DEBUG_KEY_PASSWORD,
    DEBUG_KEY_SIZE, DEBUG_STORE_PASSWORD, DEBUG_VALIDITY_DAYS,
};
use crate::signing::lock::KeystoreLock;
use crate::utils::paths;
use crate::utils::tools::{self, Tool};

/// A keystore file plus the credentials needed to sign with it
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedKeystore {
    pub path: PathBuf,
    pub store_password: String,
    pub key_alias: String,
    pub key_password: String,
}

impl std::fmt::Debug for ResolvedKeystore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedKeystore")
            .field("path", &self.path)
            .field("key_alias", &self.key_alias)
            .finish_non_exhaustive()
    }
}

impl ResolvedKeystore {
    fn new(path: PathBuf, cert: &CertificateInfo) -> Self {
        Self {
            path,
            store_password: cert.keystore_password().to_string(),
            key_alias: cert.key_alias().to_string(),
            key_password: cert.key_password().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeystoreProvisioner {
    tools: ToolSettings,
    debug_keystore: Option<PathBuf>,
    lock_timeout: Duration,
}

impl KeystoreProvisioner {
    pub fn new(settings: &Settings) -> Self {
        Self {
            tools: settings.tools.clone(),
            debug_keystore: settings.signing.debug_keystore.clone(),
            lock_timeout: settings.signing.lock_timeout(),
        }
    }

    /// Where the built-in identity's keystore lives
    pub fn debug_keystore_path(&self) -> Result<PathBuf, ConvertError> {
        self.debug_keystore
            .clone()
            .or_else(paths::default_debug_keystore)
            .ok_or_else(|| {
                ConvertError::config_error_with_hint(
                    "Cannot determine the home directory for the debug keystore",
                    None,
                    "Set `debug_keystore` under [signing] in the config file",
                )
            })
    }

    /// Resolve `cert` to an existing keystore, generating the debug one if needed
    pub async fn provision(
        &self,
        cert: &CertificateInfo,
        transcript: &Transcript,
    ) -> Result<ResolvedKeystore, ConvertError> {
        if !cert.is_default() {
            let path = cert.keystore_path();
            if !path.is_file() {
                return Err(ConvertError::not_found("Keystore", path));
            }
            return Ok(ResolvedKeystore::new(path.to_path_buf(), cert));
        }

        let path = self.debug_keystore_path()?;
        if !path.is_file() {
            self.generate_debug_keystore(&path, transcript).await?;
        }
        Ok(ResolvedKeystore::new(path, cert))
    }

    async fn generate_debug_keystore(
        &self,
        path: &Path,
        transcript: &Transcript,
    ) -> Result<(), ConvertError> {
        paths::ensure_parent(path)?;
        let lock = KeystoreLock::acquire(
            &KeystoreLock::path_for(path),
            self.lock_timeout,
            self.lock_timeout,
        )
        .await?;

        // Someone else may have finished while we waited
        if path.is_file() {
            log::debug!("Debug keystore appeared at {} while waiting", path.display());
            return Ok(());
        }

        let keytool = tools::require(Tool::Keytool, &self.tools)?;
        transcript.report("Creating default Android keystore...");

        let partial = partial_path(path);
        if partial.exists() {
            std::fs::remove_file(&partial).map_err(|e| {
                ConvertError::io(format!("Failed to remove {}", partial.display()), e)
            })?;
        }

        let cmd = ToolCommand::new(keytool)
            .arg("-genkey")
            .arg("-v")
            .arg("-keystore")
            .path_arg(&partial)
            .arg("-storepass")
            .secret_arg(DEBUG_STORE_PASSWORD)
            .arg("-alias")
            .arg(DEBUG_KEY_ALIAS)
            .arg("-keypass")
            .secret_arg(DEBUG_KEY_PASSWORD)
            .arg("-keyalg")
            .arg(DEBUG_KEY_ALGORITHM)
            .arg("-keysize")
            .arg(DEBUG_KEY_SIZE.to_string())
            .arg("-validity")
            .arg(DEBUG_VALIDITY_DAYS.to_string())
            .arg("-dname")
            .arg(DEBUG_DNAME);

        let result = run_streaming(&cmd, transcript, self.tools.timeout()).await;
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                let _ = std::fs::remove_file(&partial);
                return Err(e);
            }
        };

        if !result.success || !partial.is_file() {
            let _ = std::fs::remove_file(&partial);
            return Err(ConvertError::signing_failed(
                format!(
                    "keytool could not create the debug keystore (exit code {})",
                    result.exit_code
                ),
                result.stderr,
            ));
        }

        std::fs::rename(&partial, path).map_err(|e| {
            ConvertError::io(
                format!("Failed to move keystore into place at {}", path.display()),
                e,
            )
        })?;
        log::info!("Generated debug keystore at {}", path.display());
        drop(lock);
        Ok(())
    }
}

/// `debug.keystore` -> `debug.keystore.partial`
fn partial_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
