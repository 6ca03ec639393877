//! Scoped temporary workspace for one conversion job
//!
//! ```text
//! apk2aab-XXXXXX/
//! ├── extracted/      # unpacked APK
//! ├── bundle/         # BundleConfig.pb.json + base/ module
//! └── unsigned.aab    # packaged bundle before it is copied out
//! ```
//!
//! The directory is removed when the [`Workspace`] is dropped, which
//! covers early returns, errors, cancelled futures and panics that unwind.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::ConvertError;

const WORKSPACE_PREFIX: &str = "apk2aab-";
const EXTRACT_DIR: &str = "extracted";
const BUNDLE_DIR: &str = "bundle";
const UNSIGNED_ARCHIVE: &str = "unsigned.aab";

#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a uniquely named workspace under `root`
    pub fn create(root: &Path) -> Result<Self, ConvertError> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)
            .map_err(|e| {
                ConvertError::io(
                    format!("Failed to create workspace under {}", root.display()),
                    e,
                )
            })?;
        log::debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the APK is unpacked (created by the extractor)
    pub fn extract_dir(&self) -> PathBuf {
        self.path().join(EXTRACT_DIR)
    }

    /// Root of the bundle tree that gets packaged
    pub fn bundle_dir(&self) -> PathBuf {
        self.path().join(BUNDLE_DIR)
    }

    pub fn unsigned_archive(&self) -> PathBuf {
        self.path().join(UNSIGNED_ARCHIVE)
    }

    /// Drop the extraction subtree once the module is built
    pub fn discard_extracted(&self) {
        let dir = self.extract_dir();
        if dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                log::warn!("Failed to remove {}: {}", dir.display(), e);
            }
        }
    }

    /// Remove the workspace, logging rather than failing if that goes wrong
    pub fn close(self) {
        let path = self.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => log::debug!("Removed workspace {}", path.display()),
            Err(e) => log::warn!("Failed to remove workspace {}: {}", path.display(), e),
        }
    }
}
