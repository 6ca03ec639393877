//! Signing identities

use std::fmt;
use std::path::{Path, PathBuf};

/// Keystore path placeholder for the built-in identity; never opened as a file
pub const DEFAULT_KEYSTORE_SENTINEL: &str = "testkey";

/// Android's conventional debug identity
pub const DEBUG_STORE_PASSWORD: &str = "android";
pub const DEBUG_KEY_ALIAS: &str = "androiddebugkey";
pub const DEBUG_KEY_PASSWORD: &str = "android";
pub const DEBUG_DNAME: &str = "CN=Android Debug,O=Android,C=US";
pub const DEBUG_KEY_ALGORITHM: &str = "RSA";
pub const DEBUG_KEY_SIZE: u32 = 2048;
pub const DEBUG_VALIDITY_DAYS: u32 = 10000;

const DEFAULT_CERTIFICATE_NAME: &str = "Default Android Certificate (testkey)";

/// A signing identity: where the key lives and how to unlock it
///
/// Immutable once built. Passwords are kept out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    name: String,
    keystore_path: PathBuf,
    keystore_password: String,
    key_alias: String,
    key_password: String,
    is_default: bool,
}

impl CertificateInfo {
    /// The built-in debug identity, resolved by the keystore provisioner
    pub fn default_debug() -> Self {
        Self {
            name: DEFAULT_CERTIFICATE_NAME.to_string(),
            keystore_path: PathBuf::from(DEFAULT_KEYSTORE_SENTINEL),
            keystore_password: DEBUG_STORE_PASSWORD.to_string(),
            key_alias: DEBUG_KEY_ALIAS.to_string(),
            key_password: DEBUG_KEY_PASSWORD.to_string(),
            is_default: true,
        }
    }

    /// A caller-supplied keystore; the file must exist when signing
    pub fn custom(
        name: impl Into<String>,
        keystore_path: impl Into<PathBuf>,
        keystore_password: impl Into<String>,
        key_alias: impl Into<String>,
        key_password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            keystore_path: keystore_path.into(),
            keystore_password: keystore_password.into(),
            key_alias: key_alias.into(),
            key_password: key_password.into(),
            is_default: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keystore_path(&self) -> &Path {
        &self.keystore_path
    }

    pub fn keystore_password(&self) -> &str {
        &self.keystore_password
    }

    pub fn key_alias(&self) -> &str {
        &self.key_alias
    }

    pub fn key_password(&self) -> &str {
        &self.key_password
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

impl Default for CertificateInfo {
    fn default() -> Self {
        Self::default_debug()
    }
}

impl fmt::Debug for CertificateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateInfo")
            .field("name", &self.name)
            .field("keystore_path", &self.keystore_path)
            .field("keystore_password", &"******")
            .field("key_alias", &self.key_alias)
            .field("key_password", &"******")
            .field("is_default", &self.is_default)
            .finish()
    }
}
