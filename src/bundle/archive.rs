//! Bundle archive creation and inspection
//!
//! The bundle directory is zipped as-is, so archive paths are exactly the
//! paths under it:
//!
//! ```text
//! app.aab
//! ├── BundleConfig.pb.json
//! └── base/
//!     ├── manifest/AndroidManifest.xml
//!     ├── dex/classes.dex
//!     ├── res/...
//!     └── root/...
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;

use glob::Pattern;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ConvertError;

fn packaging_error(message: String, err: impl Into<anyhow::Error>) -> ConvertError {
    ConvertError::packaging_failed(message, Some(err.into()))
}

/// Create a ZIP archive from a directory, overwriting `archive_path`
///
/// Files whose archive path matches one of `stored` are written without
/// compression. Symlinks are left out. Returns the number of file entries
/// written.
pub fn create_archive(
    source_dir: &Path,
    archive_path: &Path,
    stored: &[Pattern],
) -> Result<usize, ConvertError> {
    let file = File::create(archive_path).map_err(|e| {
        packaging_error(
            format!("Failed to create archive: {}", archive_path.display()),
            e,
        )
    })?;

    let mut zip = ZipWriter::new(file);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let uncompressed = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut files = 0;

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| packaging_error("Failed to read directory entry".into(), e))?;
        let path = entry.path();
        let relative_path = path
            .strip_prefix(source_dir)
            .map_err(|e| packaging_error("Failed to get relative path".into(), e))?;

        // Skip the root directory
        if relative_path.as_os_str().is_empty() {
            continue;
        }

        let path_str = relative_path.to_string_lossy().replace('\\', "/");

        if entry.path_is_symlink() {
            log::warn!("Not packaging symbolic link: {}", path_str);
            continue;
        }

        if entry.file_type().is_dir() {
            zip.add_directory(path_str.as_str(), deflated).map_err(|e| {
                packaging_error(format!("Failed to add directory to archive: {}", path_str), e)
            })?;
        } else {
            let options = if stored.iter().any(|p| p.matches(&path_str)) {
                uncompressed
            } else {
                deflated
            };
            zip.start_file(path_str.as_str(), options).map_err(|e| {
                packaging_error(format!("Failed to start file in archive: {}", path_str), e)
            })?;

            let mut input = File::open(path).map_err(|e| {
                packaging_error(format!("Failed to open file: {}", path.display()), e)
            })?;
            io::copy(&mut input, &mut zip).map_err(|e| {
                packaging_error(format!("Failed to write file to archive: {}", path_str), e)
            })?;
            files += 1;
        }
    }

    zip.finish()
        .map_err(|e| packaging_error("Failed to finish ZIP archive".into(), e))?;
    Ok(files)
}

/// Print the tree structure of a ZIP archive
///
/// Example output:
/// ```text
///     Bundle contents:
///     ├── BundleConfig.pb.json (0.41 KB)
///     └── base/
///         ├── dex/
///         │   └── classes.dex (1.20 MB)
///         └── manifest/
///             └── AndroidManifest.xml (2.10 KB)
/// ```
pub fn print_zip_tree(archive_path: &Path, indent: &str) -> Result<(), ConvertError> {
    let file = File::open(archive_path).map_err(|e| {
        ConvertError::io(format!("Failed to open archive: {}", archive_path.display()), e)
    })?;

    let mut zip = ZipArchive::new(file).map_err(|e| {
        packaging_error(
            format!("Failed to read ZIP archive: {}", archive_path.display()),
            e,
        )
    })?;

    // Build directory tree structure
    let mut tree: BTreeMap<String, TreeNode> = BTreeMap::new();

    for i in 0..zip.len() {
        let file = zip
            .by_index(i)
            .map_err(|e| packaging_error(format!("Failed to read entry {}", i), e))?;
        let path = file.name().to_string();

        // Skip directories (entries ending with /)
        if path.ends_with('/') {
            continue;
        }

        let parts: Vec<&str> = path.split('/').collect();
        let mut current = &mut tree;

        for (idx, part) in parts.iter().enumerate() {
            if idx == parts.len() - 1 {
                current.insert(part.to_string(), TreeNode::File { size: file.size() });
            } else {
                current = match current
                    .entry(part.to_string())
                    .or_insert_with(|| TreeNode::Dir(BTreeMap::new()))
                {
                    TreeNode::Dir(children) => children,
                    // A file and a directory with the same name; keep the file
                    TreeNode::File { .. } => break,
                };
            }
        }
    }

    eprintln!("{}Bundle contents:", indent);
    print_tree_level(&tree, indent, "");

    Ok(())
}

/// Tree node type for directory structure
enum TreeNode {
    File { size: u64 },
    Dir(BTreeMap<String, TreeNode>),
}

fn format_size(size: u64) -> String {
    if size >= 1024 * 1024 {
        format!("{:.2} MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.2} KB", size as f64 / 1024.0)
    } else {
        format!("{} B", size)
    }
}

/// Recursively print a level of the tree structure
fn print_tree_level(tree: &BTreeMap<String, TreeNode>, base_indent: &str, prefix: &str) {
    let len = tree.len();

    for (i, (name, node)) in tree.iter().enumerate() {
        let is_last = i == len - 1;
        let connector = if is_last { "└── " } else { "├── " };

        match node {
            TreeNode::File { size } => {
                eprintln!(
                    "{}{}{}{} ({})",
                    base_indent,
                    prefix,
                    connector,
                    name,
                    format_size(*size)
                );
            }
            TreeNode::Dir(children) => {
                eprintln!("{}{}{}{}/", base_indent, prefix, connector, name);

                let new_prefix = if is_last {
                    format!("{}    ", prefix)
                } else {
                    format!("{}│   ", prefix)
                };

                print_tree_level(children, base_indent, &new_prefix);
            }
        }
    }
}
