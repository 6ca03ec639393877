//! Base module layout
//!
//! Reorganizes an unpacked APK into the app-bundle base module:
//!
//! ```text
//! base/
//! ├── manifest/AndroidManifest.xml
//! ├── dex/classes*.dex
//! ├── res/...
//! └── root/
//!     ├── lib/<abi>/*.so
//!     ├── assets/...
//!     ├── resources.arsc
//!     └── META-INF/...
//! ```
//!
//! The four top-level directories always exist. Every copy rule is
//! independent: a source item the APK does not have is skipped silently.

use std::fmt;
use std::fs::FileType;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::ConvertError;
use crate::progress::Transcript;

/// Name of the mandatory module
pub const BASE_MODULE: &str = "base";

pub const MANIFEST_DIR: &str = "manifest";
pub const DEX_DIR: &str = "dex";
pub const RES_DIR: &str = "res";
pub const ROOT_DIR: &str = "root";

pub const ANDROID_MANIFEST: &str = "AndroidManifest.xml";
pub const RESOURCE_TABLE: &str = "resources.arsc";
pub const DEX_EXTENSION: &str = "dex";

/// A class of APK content the builder knows how to place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Manifest,
    Dex,
    Resources,
    NativeLibraries,
    Assets,
    ResourceTable,
    Metadata,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::Manifest => "manifest",
            ContentKind::Dex => "dex files",
            ContentKind::Resources => "resources",
            ContentKind::NativeLibraries => "native libraries",
            ContentKind::Assets => "assets",
            ContentKind::ResourceTable => "resource table",
            ContentKind::Metadata => "META-INF",
        };
        f.write_str(name)
    }
}

/// Which content kinds were found and copied
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    pub copied: Vec<ContentKind>,
    pub dex_files: usize,
}

impl ModuleSummary {
    #[cfg(test)]
    pub fn contains(&self, kind: ContentKind) -> bool {
        self.copied.contains(&kind)
    }
}

/// Build `<bundle_dir>/base` from the unpacked APK at `extracted`
///
/// Symbolic links in the unpacked tree are never followed. They are
/// reported and left out of the module.
pub fn build_base_module(
    extracted: &Path,
    bundle_dir: &Path,
    transcript: &Transcript,
) -> Result<ModuleSummary, ConvertError> {
    let base = bundle_dir.join(BASE_MODULE);
    let manifest_dir = base.join(MANIFEST_DIR);
    let dex_dir = base.join(DEX_DIR);
    let res_dir = base.join(RES_DIR);
    let root_dir = base.join(ROOT_DIR);
    for dir in [&manifest_dir, &dex_dir, &res_dir, &root_dir] {
        create_dir(dir)?;
    }

    let mut summary = ModuleSummary::default();

    let manifest = extracted.join(ANDROID_MANIFEST);
    if is_regular_file(&manifest, transcript) {
        copy_file(&manifest, &manifest_dir.join(ANDROID_MANIFEST))?;
        summary.copied.push(ContentKind::Manifest);
        transcript.report("Copied AndroidManifest.xml");
    }

    let dex_count = copy_dex_files(extracted, &dex_dir, transcript)?;
    if dex_count > 0 {
        summary.copied.push(ContentKind::Dex);
        summary.dex_files = dex_count;
        transcript.report(format!("Copied {} dex file(s)", dex_count));
    }

    let res = extracted.join("res");
    if is_real_dir(&res, transcript) {
        copy_dir_all(&res, &res_dir, transcript)?;
        summary.copied.push(ContentKind::Resources);
        transcript.report("Copied resources");
    }

    let lib = extracted.join("lib");
    if is_real_dir(&lib, transcript) {
        copy_dir_all(&lib, &root_dir.join("lib"), transcript)?;
        summary.copied.push(ContentKind::NativeLibraries);
        transcript.report("Copied native libraries");
    }

    let assets = extracted.join("assets");
    if is_real_dir(&assets, transcript) {
        copy_dir_all(&assets, &root_dir.join("assets"), transcript)?;
        summary.copied.push(ContentKind::Assets);
        transcript.report("Copied assets");
    }

    let arsc = extracted.join(RESOURCE_TABLE);
    if is_regular_file(&arsc, transcript) {
        copy_file(&arsc, &root_dir.join(RESOURCE_TABLE))?;
        summary.copied.push(ContentKind::ResourceTable);
        transcript.report("Copied resources.arsc");
    }

    let meta_inf = extracted.join("META-INF");
    if is_real_dir(&meta_inf, transcript) {
        copy_dir_all(&meta_inf, &root_dir.join("META-INF"), transcript)?;
        summary.copied.push(ContentKind::Metadata);
        transcript.report("Copied META-INF");
    }

    Ok(summary)
}

/// File type of `path` without following a final symlink
///
/// Missing paths and symlinks both give `None`; a symlink is also reported.
fn source_type(path: &Path, transcript: &Transcript) -> Option<FileType> {
    let file_type = std::fs::symlink_metadata(path).ok()?.file_type();
    if file_type.is_symlink() {
        skip_symlink(path, transcript);
        return None;
    }
    Some(file_type)
}

fn is_regular_file(path: &Path, transcript: &Transcript) -> bool {
    source_type(path, transcript).is_some_and(|t| t.is_file())
}

fn is_real_dir(path: &Path, transcript: &Transcript) -> bool {
    source_type(path, transcript).is_some_and(|t| t.is_dir())
}

fn skip_symlink(path: &Path, transcript: &Transcript) {
    log::warn!("Skipping symbolic link: {}", path.display());
    transcript.report(format!("Skipped symbolic link: {}", path.display()));
}

/// Copy top-level `*.dex` files (not recursive), returning how many
fn copy_dex_files(
    extracted: &Path,
    dex_dir: &Path,
    transcript: &Transcript,
) -> Result<usize, ConvertError> {
    let entries = std::fs::read_dir(extracted).map_err(|e| {
        ConvertError::io(format!("Failed to read directory: {}", extracted.display()), e)
    })?;

    let mut dex_files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            ConvertError::io(format!("Failed to read directory: {}", extracted.display()), e)
        })?;
        let path = entry.path();
        let is_dex = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DEX_EXTENSION));
        if !is_dex {
            continue;
        }
        let file_type = entry.file_type().map_err(|e| {
            ConvertError::io(format!("Failed to read file type: {}", path.display()), e)
        })?;
        if file_type.is_symlink() {
            skip_symlink(&path, transcript);
        } else if file_type.is_file() {
            dex_files.push(path);
        }
    }
    dex_files.sort();

    for path in &dex_files {
        if let Some(name) = path.file_name() {
            copy_file(path, &dex_dir.join(name))?;
        }
    }
    Ok(dex_files.len())
}

fn create_dir(path: &Path) -> Result<(), ConvertError> {
    std::fs::create_dir_all(path)
        .map_err(|e| ConvertError::io(format!("Failed to create directory: {}", path.display()), e))
}

fn copy_file(src: &Path, dst: &Path) -> Result<(), ConvertError> {
    std::fs::copy(src, dst).map(|_| ()).map_err(|e| {
        ConvertError::io(
            format!("Failed to copy {} to {}", src.display(), dst.display()),
            e,
        )
    })
}

/// Copy a directory recursively, overwriting files that already exist
///
/// Symlinks below `src` are skipped, never followed.
pub fn copy_dir_all(
    src: &Path,
    dst: &Path,
    transcript: &Transcript,
) -> Result<(), ConvertError> {
    create_dir(dst)?;
    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| ConvertError::IoFailure {
            message: format!("Failed to read directory: {}", src.display()),
            source: e.into_io_error(),
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        let dest_path = dst.join(relative);

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            skip_symlink(entry.path(), transcript);
        } else if file_type.is_dir() {
            create_dir(&dest_path)?;
        } else {
            copy_file(entry.path(), &dest_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn recording_transcript() -> (Transcript, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let transcript = Transcript::new(Arc::new(move |msg: &str| {
            seen_clone.lock().unwrap().push(msg.to_string());
        }));
        (transcript, seen)
    }

    #[test]
    fn test_full_layout() {
        let temp = tempfile::tempdir().unwrap();
        let extracted = temp.path().join("extracted");
        let bundle = temp.path().join("bundle");
        write(&extracted, "AndroidManifest.xml", "<manifest/>");
        write(&extracted, "classes.dex", "dex1");
        write(&extracted, "classes2.dex", "dex2");
        write(&extracted, "res/values/strings.xml", "<resources/>");
        write(&extracted, "lib/arm64-v8a/libfoo.so", "elf");
        write(&extracted, "assets/data/config.json", "{}");
        write(&extracted, "resources.arsc", "arsc");
        write(&extracted, "META-INF/MANIFEST.MF", "Manifest-Version: 1.0");

        let (transcript, seen) = recording_transcript();
        let summary = build_base_module(&extracted, &bundle, &transcript).unwrap();

        let base = bundle.join("base");
        assert!(base.join("manifest/AndroidManifest.xml").is_file());
        assert!(base.join("dex/classes.dex").is_file());
        assert!(base.join("dex/classes2.dex").is_file());
        assert!(base.join("res/values/strings.xml").is_file());
        assert!(base.join("root/lib/arm64-v8a/libfoo.so").is_file());
        assert!(base.join("root/assets/data/config.json").is_file());
        assert!(base.join("root/resources.arsc").is_file());
        assert!(base.join("root/META-INF/MANIFEST.MF").is_file());

        assert_eq!(summary.dex_files, 2);
        assert_eq!(summary.copied.len(), 7);
        assert_eq!(seen.lock().unwrap().len(), 7);
    }

    #[test]
    fn test_missing_lib_is_not_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let extracted = temp.path().join("extracted");
        let bundle = temp.path().join("bundle");
        write(&extracted, "AndroidManifest.xml", "<manifest/>");
        write(&extracted, "classes.dex", "dex");

        let (transcript, seen) = recording_transcript();
        let summary = build_base_module(&extracted, &bundle, &transcript).unwrap();

        assert!(!summary.contains(ContentKind::NativeLibraries));
        assert!(!bundle.join("base/root/lib").exists());
        // The four fixed directories exist even when empty
        for dir in ["manifest", "dex", "res", "root"] {
            assert!(bundle.join("base").join(dir).is_dir(), "{} missing", dir);
        }
        // Only copied categories report progress
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Copied AndroidManifest.xml", "Copied 1 dex file(s)"]
        );
    }

    #[test]
    fn test_dex_copy_is_not_recursive() {
        let temp = tempfile::tempdir().unwrap();
        let extracted = temp.path().join("extracted");
        let bundle = temp.path().join("bundle");
        write(&extracted, "classes.dex", "dex");
        write(&extracted, "assets/plugin/extra.dex", "nested dex");

        let summary = build_base_module(&extracted, &bundle, &Transcript::default()).unwrap();

        assert_eq!(summary.dex_files, 1);
        assert!(!bundle.join("base/dex/extra.dex").exists());
        assert!(bundle.join("base/root/assets/plugin/extra.dex").is_file());
    }

    #[test]
    fn test_copy_dir_all_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write(&src, "a/b.txt", "new");
        write(&dst, "a/b.txt", "old");
        write(&dst, "keep.txt", "keep");

        copy_dir_all(&src, &dst, &Transcript::default()).unwrap();

        assert_eq!(std::fs::read_to_string(dst.join("a/b.txt")).unwrap(), "new");
        assert!(dst.join("keep.txt").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_never_followed() {
        use std::os::unix::fs::symlink;

        let temp = tempfile::tempdir().unwrap();
        let host = temp.path().join("host");
        write(&host, "secret.txt", "host data");
        let extracted = temp.path().join("extracted");
        let bundle = temp.path().join("bundle");
        write(&extracted, "classes.dex", "dex");
        write(&extracted, "lib/arm64-v8a/libreal.so", "elf");
        symlink(host.join("secret.txt"), extracted.join("AndroidManifest.xml")).unwrap();
        symlink(host.join("secret.txt"), extracted.join("classes2.dex")).unwrap();
        symlink(host.join("secret.txt"), extracted.join("lib/arm64-v8a/libleak.so")).unwrap();
        symlink(&host, extracted.join("res")).unwrap();

        let (transcript, seen) = recording_transcript();
        let summary = build_base_module(&extracted, &bundle, &transcript).unwrap();

        let base = bundle.join("base");
        assert!(!summary.contains(ContentKind::Manifest));
        assert!(!summary.contains(ContentKind::Resources));
        assert_eq!(summary.dex_files, 1);
        assert!(!base.join("manifest/AndroidManifest.xml").exists());
        assert!(!base.join("dex/classes2.dex").exists());
        assert!(base.join("root/lib/arm64-v8a/libreal.so").is_file());
        assert!(!base.join("root/lib/arm64-v8a/libleak.so").exists());
        assert_eq!(std::fs::read_dir(base.join("res")).unwrap().count(), 0);

        let skipped = seen
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.starts_with("Skipped symbolic link"))
            .count();
        assert_eq!(skipped, 4);
    }
}
