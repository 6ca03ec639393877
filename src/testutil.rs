//! Fixtures shared by unit tests

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Write a zip archive with the given `(name, content)` entries
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Write a zip archive holding regular entries plus `(name, target)` symlinks
pub fn write_zip_with_symlinks(path: &Path, entries: &[(&str, &str)], links: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    for (name, target) in links {
        zip.add_symlink(*name, *target, options).unwrap();
    }
    zip.finish().unwrap();
}

/// A typical small APK: manifest, one dex, resources and the resource table
pub fn write_sample_apk(path: &Path) {
    write_zip(
        path,
        &[
            ("AndroidManifest.xml", "<manifest package=\"com.example.app\"/>"),
            ("classes.dex", "dex\n035\0classes"),
            ("res/layout/activity_main.xml", "<LinearLayout/>"),
            ("res/drawable-hdpi/icon.png", "\u{89}PNG"),
            ("resources.arsc", "\u{2}\0\u{c}\0arsc"),
        ],
    );
}

/// Names of all entries in a zip archive, in archive order
pub fn archive_entries(path: &Path) -> Vec<String> {
    let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Whether any file entry's content contains `needle`
pub fn archive_contains(path: &Path, needle: &str) -> bool {
    use std::io::Read;

    let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..zip.len()).any(|i| {
        let mut content = Vec::new();
        zip.by_index(i).unwrap().read_to_end(&mut content).unwrap();
        String::from_utf8_lossy(&content).contains(needle)
    })
}

/// Compression method of one entry
pub fn entry_compression(path: &Path, name: &str) -> CompressionMethod {
    let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let entry = zip.by_name(name).unwrap();
    entry.compression()
}

/// Write an executable `/bin/sh` script standing in for an external tool
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Fake `keytool` that writes a placeholder keystore and appends to `counter`
#[cfg(unix)]
pub fn fake_keytool(dir: &Path, counter: &Path, delay_secs: &str) -> PathBuf {
    fake_tool(
        dir,
        "keytool",
        &format!(
            r#"out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-keystore" ]; then shift; out="$1"; fi
  shift
done
sleep {delay}
echo generated >> "{counter}"
printf 'fake-keystore' > "$out"
echo "Generating 2,048 bit RSA key pair"
"#,
            delay = delay_secs,
            counter = counter.display()
        ),
    )
}

/// Fake `jarsigner` with configurable sign and verify exit codes
///
/// Every invocation appends `sign` or `verify` to `calls`.
#[cfg(unix)]
pub fn fake_jarsigner(dir: &Path, calls: &Path, sign_exit: i32, verify_exit: i32) -> PathBuf {
    fake_tool(
        dir,
        "jarsigner",
        &format!(
            r#"for a in "$@"; do
  if [ "$a" = "-verify" ]; then
    echo verify >> "{calls}"
    if [ {verify_exit} -eq 0 ]; then echo "jar verified."; else echo "jarsigner: java.lang.SecurityException: invalid SHA-256 signature file digest" 1>&2; fi
    exit {verify_exit}
  fi
done
echo sign >> "{calls}"
if [ {sign_exit} -eq 0 ]; then echo "jar signed."; else echo "jarsigner error: java.lang.RuntimeException: keystore load: Keystore was tampered with, or password was incorrect" 1>&2; fi
exit {sign_exit}
"#,
            calls = calls.display(),
            sign_exit = sign_exit,
            verify_exit = verify_exit
        ),
    )
}

/// Lines appended to a call/counter file by a fake tool
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(String::from).collect())
        .unwrap_or_default()
}
