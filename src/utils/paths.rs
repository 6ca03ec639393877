//! Path utilities for apk2aab

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::error::ConvertError;

/// Location of Android's conventional debug keystore (`~/.android/debug.keystore`)
pub fn default_debug_keystore() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".android").join("debug.keystore"))
}

/// Default bundle path for an APK: same directory, `.aab` extension
pub fn default_output_path(apk: &Path) -> PathBuf {
    apk.with_extension("aab")
}

/// Whether two paths name the same file
///
/// Paths that both resolve are compared canonically, so `./app.aab` and
/// `app.aab` match. Otherwise they are compared as written.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<(), ConvertError> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| {
            ConvertError::io(format!("Failed to create directory: {}", path.display()), e)
        })?;
    }
    Ok(())
}

/// Ensure the parent directory of a file path exists
pub fn ensure_parent(path: &Path) -> Result<(), ConvertError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
