//! FHIR NPM package cache access.
//!
//! Reads packages unpacked in a local cache laid out as
//! `{cache}/{name}#{version}/package/`, follows their declared dependencies,
//! and scans their JSON resources for bindings and ValueSet definitions.

pub mod resolver;
pub mod scan;

pub use resolver::{resolve_packages, ResolvedPackage};
pub use scan::{collect_value_sets, extract_bindings, scan_package, PackageScan, ValueSetIndex};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type PackageName = String;
pub type Version = String;

/// A package identity. Matching is exact on both fields; no version range
/// resolution is performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageRef {
    pub name: PackageName,
    pub version: Version,
}

impl PackageRef {
    pub fn new(name: impl Into<PackageName>, version: impl Into<Version>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Directory holding this package's resources inside a package cache.
    pub fn directory_in(&self, cache_root: &Path) -> PathBuf {
        cache_root
            .join(format!("{}#{}", self.name, self.version))
            .join("package")
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.version)
    }
}

/// Dependencies declared in a package manifest (`package/package.json`), in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDependencies(Vec<PackageRef>);

impl PackageDependencies {
    /// Read the `dependencies` object of a manifest.
    ///
    /// Non-object `dependencies` yield no dependencies. Entries whose version
    /// is not a string are skipped.
    pub fn from_manifest(manifest: &Value) -> Self {
        let deps = manifest
            .get("dependencies")
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, version)| {
                        version
                            .as_str()
                            .map(|version| PackageRef::new(name.as_str(), version))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self(deps)
    }

    /// Load dependencies from `package.json` in a package directory.
    pub fn load(package_dir: &Path) -> PackageResult<Self> {
        let manifest_path = package_dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(PackageError::MissingFile(
                manifest_path.to_string_lossy().into(),
            ));
        }
        let manifest = read_json(&manifest_path)?;
        Ok(Self::from_manifest(&manifest))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageRef> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
    #[error("Missing file: {0}")]
    MissingFile(String),
}

pub type PackageResult<T> = Result<T, PackageError>;

/// Read a JSON document from disk, tolerating a UTF-8 byte-order mark and
/// stray control characters.
pub fn read_json(path: &Path) -> PackageResult<Value> {
    let bytes = fs::read(path)?;
    let cleaned = clean_bytes(&bytes)?;
    Ok(serde_json::from_str(&cleaned)?)
}

fn clean_bytes(bytes: &[u8]) -> PackageResult<String> {
    let bytes = if bytes.len() >= 3 && &bytes[..3] == b"\xEF\xBB\xBF" {
        &bytes[3..]
    } else {
        bytes
    };

    let content = String::from_utf8(bytes.to_vec())
        .map_err(|e| PackageError::InvalidStructure(format!("Invalid UTF-8: {}", e)))?;

    Ok(content
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\x7F'))
        .collect::<String>()
        .trim()
        .to_string())
}
