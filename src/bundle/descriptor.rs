//! `BundleConfig.pb.json` generation
//!
//! The descriptor is fixed: a bundletool version tag, the standard split
//! dimensions, and a compression policy that keeps native libraries and
//! dex files uncompressed.
//!
//! ```json
//! {
//!   "bundletool": { "version": "1.15.6" },
//!   "optimizations": {
//!     "splitsConfig": { "splitDimension": [{ "value": "ABI", "negate": false }, ...] },
//!     "uncompressNativeLibraries": { "enabled": true }
//!   },
//!   "compression": { "uncompressedGlob": ["**/*.so", "**/*.dex"] }
//! }
//! ```

use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

pub const BUNDLE_CONFIG_FILE: &str = "BundleConfig.pb.json";

/// The bundletool version we declare compatibility with
pub const BUNDLETOOL_VERSION: &str = "1.15.6";

/// Split dimensions, in declaration order
pub const SPLIT_DIMENSIONS: [&str; 3] = ["ABI", "SCREEN_DENSITY", "LANGUAGE"];

/// Entries that must be stored without compression
pub const UNCOMPRESSED_GLOBS: [&str; 2] = ["**/*.so", "**/*.dex"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleConfig {
    pub bundletool: Bundletool,
    pub optimizations: Optimizations,
    pub compression: Compression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundletool {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimizations {
    pub splits_config: SplitsConfig,
    pub uncompress_native_libraries: UncompressNativeLibraries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitsConfig {
    pub split_dimension: Vec<SplitDimension>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDimension {
    pub value: String,
    pub negate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncompressNativeLibraries {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compression {
    pub uncompressed_glob: Vec<String>,
}

impl BundleConfig {
    /// Descriptor for a single universal base module
    pub fn universal() -> Self {
        Self {
            bundletool: Bundletool {
                version: BUNDLETOOL_VERSION.to_string(),
            },
            optimizations: Optimizations {
                splits_config: SplitsConfig {
                    split_dimension: SPLIT_DIMENSIONS
                        .iter()
                        .map(|value| SplitDimension {
                            value: value.to_string(),
                            negate: false,
                        })
                        .collect(),
                },
                uncompress_native_libraries: UncompressNativeLibraries { enabled: true },
            },
            compression: Compression {
                uncompressed_glob: UNCOMPRESSED_GLOBS.iter().map(|g| g.to_string()).collect(),
            },
        }
    }

    /// Compiled `compression.uncompressedGlob` patterns
    pub fn uncompressed_patterns(&self) -> Result<Vec<Pattern>, ConvertError> {
        self.compression
            .uncompressed_glob
            .iter()
            .map(|glob| {
                Pattern::new(glob).map_err(|e| {
                    ConvertError::packaging_failed(
                        format!("Invalid uncompressed glob '{}'", glob),
                        Some(e.into()),
                    )
                })
            })
            .collect()
    }
}

/// Write the descriptor into `bundle_dir`, returning its path
pub fn write_bundle_config(
    bundle_dir: &Path,
    config: &BundleConfig,
) -> Result<PathBuf, ConvertError> {
    let path = bundle_dir.join(BUNDLE_CONFIG_FILE);
    let json = serde_json::to_string_pretty(config).map_err(|e| ConvertError::IoFailure {
        message: format!("Failed to serialize {}: {}", BUNDLE_CONFIG_FILE, e),
        source: None,
    })?;
    std::fs::write(&path, json)
        .map_err(|e| ConvertError::io(format!("Failed to write {}", path.display()), e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_json_shape() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_bundle_config(temp.path(), &BundleConfig::universal()).unwrap();
        assert_eq!(path.file_name().unwrap(), BUNDLE_CONFIG_FILE);

        let json: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["bundletool"]["version"], "1.15.6");

        let dims = json["optimizations"]["splitsConfig"]["splitDimension"]
            .as_array()
            .unwrap();
        let values: Vec<_> = dims.iter().map(|d| d["value"].as_str().unwrap()).collect();
        assert_eq!(values, vec!["ABI", "SCREEN_DENSITY", "LANGUAGE"]);
        assert!(dims.iter().all(|d| d["negate"] == false));

        assert_eq!(
            json["optimizations"]["uncompressNativeLibraries"]["enabled"],
            true
        );
        assert_eq!(
            json["compression"]["uncompressedGlob"],
            serde_json::json!(["**/*.so", "**/*.dex"])
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let pa = write_bundle_config(a.path(), &BundleConfig::universal()).unwrap();
        let pb = write_bundle_config(b.path(), &BundleConfig::universal()).unwrap();
        assert_eq!(std::fs::read(pa).unwrap(), std::fs::read(pb).unwrap());
    }

    #[test]
    fn test_patterns_match_native_and_dex() {
        let patterns = BundleConfig::universal().uncompressed_patterns().unwrap();
        let matches = |p: &str| patterns.iter().any(|pat| pat.matches(p));
        assert!(matches("base/root/lib/arm64-v8a/libfoo.so"));
        assert!(matches("base/dex/classes.dex"));
        assert!(!matches("base/res/layout/main.xml"));
        assert!(!matches("BundleConfig.pb.json"));
    }
}
