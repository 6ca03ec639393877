//! apk2aab settings parsing
//!
//! Settings come from an optional TOML file. Every key is optional; an
//! absent file means all defaults.
//!
//! ```toml
//! [tools]
//! java_home = "/usr/lib/jvm/java-17-openjdk"
//! jarsigner = "/opt/jdk/bin/jarsigner"   # explicit paths win over java_home
//! timeout_secs = 300
//!
//! [extract]
//! method = "auto"            # "auto", "unzip" or "builtin"
//!
//! [package]
//! honor_uncompressed_glob = true
//!
//! [signing]
//! debug_keystore = "/home/me/.android/debug.keystore"
//! lock_timeout_secs = 120
//!
//! [workspace]
//! root = "/var/tmp"
//! ```
//!
//! Lookup order: an explicit path (`--config` or `APK2AAB_CONFIG`), then
//! `config.toml` in the platform config directory, then defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{hints, ConvertError};

/// Default timeout for a single external tool invocation
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 300;

/// Default time to wait for another job generating the debug keystore
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 120;

/// Name of the settings file inside the platform config directory
pub const SETTINGS_FILE: &str = "config.toml";

/// Root settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub tools: ToolSettings,

    #[serde(default)]
    pub extract: ExtractSettings,

    #[serde(default)]
    pub package: PackageSettings,

    #[serde(default)]
    pub signing: SigningSettings,

    #[serde(default)]
    pub workspace: WorkspaceSettings,
}

/// External tool locations and limits
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolSettings {
    /// JDK home used to find jarsigner, keytool and java
    pub java_home: Option<PathBuf>,

    pub jarsigner: Option<PathBuf>,

    pub keytool: Option<PathBuf>,

    pub unzip: Option<PathBuf>,

    /// Per-invocation timeout in seconds
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            java_home: None,
            jarsigner: None,
            keytool: None,
            unzip: None,
            timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

impl ToolSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How the input APK gets unpacked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMethod {
    /// External `unzip` if it resolves, otherwise in-process
    #[default]
    Auto,
    /// Always the external `unzip` tool
    Unzip,
    /// Always in-process with the zip crate
    Builtin,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractSettings {
    #[serde(default)]
    pub method: ExtractMethod,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSettings {
    /// Store entries matching the descriptor's uncompressed globs without compression
    #[serde(default = "default_true")]
    pub honor_uncompressed_glob: bool,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            honor_uncompressed_glob: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningSettings {
    /// Where the default debug identity lives (default `~/.android/debug.keystore`)
    pub debug_keystore: Option<PathBuf>,

    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_secs: u64,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            debug_keystore: None,
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
        }
    }
}

impl SigningSettings {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceSettings {
    /// Parent directory for temporary workspaces (default: system temp dir)
    pub root: Option<PathBuf>,
}

fn default_tool_timeout() -> u64 {
    DEFAULT_TOOL_TIMEOUT_SECS
}

fn default_lock_timeout() -> u64 {
    DEFAULT_LOCK_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Parse settings from TOML text and validate them
    pub fn parse(content: &str) -> Result<Self, ConvertError> {
        let settings: Settings = toml::from_str(content).map_err(|e| {
            ConvertError::config_error_with_hint(
                format!("Failed to parse settings: {}", e.message()),
                Some(e.into()),
                hints::invalid_config(),
            )
        })?;
        super::validation::validate_settings(&settings)?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load_file(path: &Path) -> Result<Self, ConvertError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConvertError::config_error_with_hint(
                format!("Failed to read {}", path.display()),
                Some(e.into()),
                "Check the --config path or the APK2AAB_CONFIG variable",
            )
        })?;
        Self::parse(&content).map_err(|e| match e {
            ConvertError::Config {
                message,
                source,
                hint,
            } => ConvertError::Config {
                message: format!("{}: {}", path.display(), message),
                source,
                hint,
            },
            other => other,
        })
    }

    /// Resolve settings using the standard lookup order
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConvertError> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        match default_settings_path() {
            Some(path) if path.is_file() => {
                log::debug!("Loading settings from {}", path.display());
                Self::load_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Directory temporary workspaces are created under
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace
            .root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Platform config file location (e.g. `~/.config/apk2aab/config.toml`)
pub fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "apk2aab").map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}
