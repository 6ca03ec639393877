//! Tool detection and validation with graceful degradation
//!
//! The pipeline shells out to three tools: `unzip` for extraction and the
//! JDK's `jarsigner` and `keytool` for signing. This module finds them and
//! turns a miss into a [`ConvertError::ToolUnavailable`] with an install hint.

use std::path::{Path, PathBuf};
use std::process::Command;

use which::which;

use crate::config::settings::ToolSettings;
use crate::error::{hints, ConvertError};

/// External tools the pipeline knows how to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Jarsigner,
    Keytool,
    Unzip,
    Java,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Jarsigner, Tool::Keytool, Tool::Unzip, Tool::Java];

    /// Executable base name
    pub fn name(self) -> &'static str {
        match self {
            Tool::Jarsigner => "jarsigner",
            Tool::Keytool => "keytool",
            Tool::Unzip => "unzip",
            Tool::Java => "java",
        }
    }

    /// What the tool is used for, shown in errors and `check`
    pub fn purpose(self) -> &'static str {
        match self {
            Tool::Jarsigner => "signing and verifying bundles",
            Tool::Keytool => "generating the debug keystore",
            Tool::Unzip => "extracting APKs (optional, builtin fallback)",
            Tool::Java => "reporting the JDK version (optional)",
        }
    }

    /// Whether the tool ships with the JDK
    pub fn is_jdk_tool(self) -> bool {
        !matches!(self, Tool::Unzip)
    }

    /// Whether `check` treats a miss as an error
    pub fn is_required(self) -> bool {
        matches!(self, Tool::Jarsigner | Tool::Keytool)
    }

    fn hint(self) -> &'static str {
        if self.is_jdk_tool() {
            hints::jdk()
        } else {
            hints::unzip()
        }
    }

    fn configured(self, settings: &ToolSettings) -> Option<&Path> {
        match self {
            Tool::Jarsigner => settings.jarsigner.as_deref(),
            Tool::Keytool => settings.keytool.as_deref(),
            Tool::Unzip => settings.unzip.as_deref(),
            Tool::Java => None,
        }
    }
}

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Path to the tool executable
    pub path: PathBuf,
    /// Tool version string (if available)
    pub version: Option<String>,
}

/// Find a tool without reporting why it is missing
///
/// Order: explicit setting, `<java_home>/bin` (setting, then `JAVA_HOME`)
/// for JDK tools, then `PATH`.
pub fn locate(tool: Tool, settings: &ToolSettings) -> Option<PathBuf> {
    if let Some(path) = tool.configured(settings) {
        // An explicit setting that points nowhere is not silently replaced
        return path.is_file().then(|| path.to_path_buf());
    }

    if tool.is_jdk_tool() {
        let java_home = settings
            .java_home
            .clone()
            .or_else(|| std::env::var_os("JAVA_HOME").map(PathBuf::from));
        if let Some(home) = java_home {
            let candidate = home
                .join("bin")
                .join(format!("{}{}", tool.name(), std::env::consts::EXE_SUFFIX));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    which(tool.name()).ok()
}

/// Require a tool to exist, return error with hint if missing
pub fn require(tool: Tool, settings: &ToolSettings) -> Result<PathBuf, ConvertError> {
    match locate(tool, settings) {
        Some(path) => {
            log::debug!("Using {} at {}", tool.name(), path.display());
            Ok(path)
        }
        None => {
            let name = match tool.configured(settings) {
                Some(path) => path.display().to_string(),
                None => tool.name().to_string(),
            };
            Err(ConvertError::missing_tool(name, tool.purpose(), tool.hint()))
        }
    }
}

/// Check if a tool exists and return its information
pub fn check_tool(tool: Tool, settings: &ToolSettings) -> Option<ToolInfo> {
    let path = locate(tool, settings)?;
    let version = get_tool_version(&path);
    Some(ToolInfo {
        name: tool.name().to_string(),
        path,
        version,
    })
}

/// Get tool version by running `tool -version`, then `tool --version`
///
/// JDK tools print their version on stderr, so both streams are checked.
fn get_tool_version(path: &Path) -> Option<String> {
    for flag in ["-version", "--version", "-v"] {
        if let Ok(output) = Command::new(path).arg(flag).output() {
            if output.status.success() {
                let text = if output.stdout.is_empty() {
                    String::from_utf8_lossy(&output.stderr).into_owned()
                } else {
                    String::from_utf8_lossy(&output.stdout).into_owned()
                };
                let first = text.lines().next().unwrap_or("").trim().to_string();
                if !first.is_empty() {
                    return Some(first);
                }
            }
        }
    }
    None
}

/// Check every known tool
pub fn check_tools(settings: &ToolSettings) -> Vec<(Tool, Option<ToolInfo>)> {
    Tool::ALL
        .iter()
        .map(|&tool| (tool, check_tool(tool, settings)))
        .collect()
}
