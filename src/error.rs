//! Error types and helpers for user-friendly error messages
//!
//! Every failure a conversion or signing job can hit is one of these
//! variants. The pipeline never lets them escape as panics: the
//! orchestrator folds them into a [`ConversionResult`](crate::converter::ConversionResult).

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Flat classification of [`ConvertError`] for matching and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ExtractionFailed,
    IoFailure,
    PackagingFailed,
    SigningFailed,
    VerificationFailed,
    ToolUnavailable,
    TimedOut,
    Busy,
    Config,
}

/// Errors raised by the conversion and signing pipeline
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input archive or keystore does not exist
    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    /// The extraction step could not unpack the input archive
    #[error("Extraction failed: {message}")]
    ExtractionFailed {
        message: String,
        stderr: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Copy, mkdir or other file-system fault
    #[error("I/O failure: {message}")]
    IoFailure {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The bundle archive could not be written
    #[error("Packaging failed: {message}")]
    PackagingFailed {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The signing tool (or key generation) exited non-zero
    #[error("Signing failed: {message}")]
    SigningFailed { message: String, stderr: String },

    /// Signing reported success but the signature does not verify
    #[error("Signature verification failed: {message}")]
    VerificationFailed { message: String, stderr: String },

    /// Tool/executable not found or misconfigured
    #[error("Missing tool: {tool}")]
    ToolUnavailable {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// An external tool did not finish in time and was killed
    #[error("{tool} timed out after {}s", timeout.as_secs())]
    TimedOut { tool: String, timeout: Duration },

    /// A job is already running on this converter
    #[error("Another conversion is already in progress")]
    Busy,

    /// Settings file errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },
}

impl ConvertError {
    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ExtractionFailed { .. } => ErrorKind::ExtractionFailed,
            Self::IoFailure { .. } => ErrorKind::IoFailure,
            Self::PackagingFailed { .. } => ErrorKind::PackagingFailed,
            Self::SigningFailed { .. } => ErrorKind::SigningFailed,
            Self::VerificationFailed { .. } => ErrorKind::VerificationFailed,
            Self::ToolUnavailable { .. } => ErrorKind::ToolUnavailable,
            Self::TimedOut { .. } => ErrorKind::TimedOut,
            Self::Busy => ErrorKind::Busy,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    pub fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what,
            path: path.into(),
        }
    }

    pub fn extraction_failed(message: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            message: message.into(),
            stderr: stderr.into(),
            source: None,
        }
    }

    /// Create an I/O failure wrapping the underlying error
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoFailure {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn packaging_failed(message: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::PackagingFailed {
            message: message.into(),
            source,
        }
    }

    pub fn signing_failed(message: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::SigningFailed {
            message: message.into(),
            stderr: stderr.into(),
        }
    }

    pub fn verification_failed(message: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::VerificationFailed {
            message: message.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Captured standard-error text, if the failing step produced any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ExtractionFailed { stderr, .. }
            | Self::SigningFailed { stderr, .. }
            | Self::VerificationFailed { stderr, .. } => {
                Some(stderr.as_str()).filter(|s| !s.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Actionable hint for this error, if there is one
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::ToolUnavailable { hint, .. } => Some(hint),
            Self::Config { hint, .. } => hint.as_deref(),
            Self::TimedOut { .. } => Some(hints::timeout()),
            Self::Busy => Some(hints::busy()),
            Self::NotFound { what, .. } if *what == "Keystore" => Some(hints::keystore()),
            _ => None,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        if let Some(stderr) = self.stderr() {
            eprintln!("\n{}", style("TOOL OUTPUT:").cyan().bold());
            for line in stderr.lines() {
                eprintln!("  {}", line);
            }
        }

        if let Self::ToolUnavailable { required_for, .. } = self {
            eprintln!("\n{} {}", style("REQUIRED FOR:").cyan().bold(), required_for);
        }

        if let Some(h) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for a missing JDK tool (jarsigner, keytool, java)
    pub fn jdk() -> &'static str {
        "Install a JDK (17 or later) and either put its bin/ directory on PATH\n\
         or set JAVA_HOME:\n\
         • macOS: brew install openjdk@17\n\
         • Ubuntu: sudo apt install openjdk-17-jdk-headless\n\
         • Windows: winget install Microsoft.OpenJDK.17\n\
         \n\
         Tool paths can also be set under [tools] in the config file."
    }

    /// Get hint for missing unzip
    pub fn unzip() -> &'static str {
        "Install unzip or switch to in-process extraction:\n\
         • Ubuntu: sudo apt install unzip\n\
         • Or set `method = \"builtin\"` under [extract] in the config file"
    }

    /// Get hint for a missing custom keystore
    pub fn keystore() -> &'static str {
        "Check the --keystore path, or omit it to sign with the Android debug identity."
    }

    /// Get hint for a tool timeout
    pub fn timeout() -> &'static str {
        "The tool may be waiting for a password prompt. Check the keystore\n\
         credentials, or raise `timeout_secs` under [tools] in the config file."
    }

    /// Get hint for a rejected concurrent job
    pub fn busy() -> &'static str {
        "Wait for the running conversion to finish before starting another."
    }

    /// Get hint for an invalid settings file
    pub fn invalid_config() -> &'static str {
        "The config file is invalid. Common issues:\n\
         • Invalid TOML syntax (check quotes, brackets, commas)\n\
         • Unknown [extract] method (use \"auto\", \"unzip\" or \"builtin\")\n\
         • timeout_secs set to 0"
    }
}
