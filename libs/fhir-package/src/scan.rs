//! Conformance resource scanning for one package directory

use crate::{read_json, PackageResult, MANIFEST_FILE};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use vsdiff_models::{Binding, StructureDefinition, ValueSetDefinition};

/// ValueSet definitions keyed by canonical URL. The first definition seen for
/// a URL wins.
#[derive(Debug, Clone, Default)]
pub struct ValueSetIndex {
    by_url: HashMap<String, ValueSetDefinition>,
}

impl ValueSetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the URL is already indexed. Returns whether it was inserted.
    pub fn insert(&mut self, definition: ValueSetDefinition) -> bool {
        if self.by_url.contains_key(&definition.url) {
            return false;
        }
        self.by_url.insert(definition.url.clone(), definition);
        true
    }

    /// Merge another index, keeping existing entries on conflict.
    pub fn merge(&mut self, other: ValueSetIndex) {
        for (_, definition) in other.by_url {
            self.insert(definition);
        }
    }

    pub fn get(&self, url: &str) -> Option<&ValueSetDefinition> {
        self.by_url.get(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueSetDefinition> {
        self.by_url.values()
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

impl FromIterator<ValueSetDefinition> for ValueSetIndex {
    fn from_iter<I: IntoIterator<Item = ValueSetDefinition>>(iter: I) -> Self {
        let mut index = Self::new();
        for definition in iter {
            index.insert(definition);
        }
        index
    }
}

/// Everything one package directory contributes to the comparison.
#[derive(Debug, Clone, Default)]
pub struct PackageScan {
    pub bindings: Vec<Binding>,
    pub value_sets: ValueSetIndex,
}

/// All bindings declared by StructureDefinitions in `package_dir`.
pub fn extract_bindings(package_dir: &Path) -> Vec<Binding> {
    scan_package(package_dir).bindings
}

/// All ValueSet definitions in `package_dir`, keyed by URL.
pub fn collect_value_sets(package_dir: &Path) -> ValueSetIndex {
    scan_package(package_dir).value_sets
}

/// Read every JSON resource in `package_dir` once, collecting bindings and
/// ValueSet definitions.
///
/// Unreadable files and non-object documents are logged and skipped; other
/// resource types are ignored.
pub fn scan_package(package_dir: &Path) -> PackageScan {
    let mut scan = PackageScan::default();

    let files = match list_json_files(package_dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(path = %package_dir.display(), error = %e, "Failed to list package directory");
            return scan;
        }
    };

    for path in files {
        let resource = match read_json(&path) {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read JSON");
                continue;
            }
        };
        if !resource.is_object() {
            tracing::warn!(path = %path.display(), "Skipping JSON document that is not an object");
            continue;
        }

        match resource.get("resourceType").and_then(Value::as_str) {
            Some("StructureDefinition") => match StructureDefinition::from_resource(&resource) {
                Ok(sd) => scan.bindings.extend(sd.bindings()),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping StructureDefinition"),
            },
            Some("ValueSet") => match ValueSetDefinition::from_resource(&resource) {
                Ok(vs) => {
                    scan.value_sets.insert(vs);
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping ValueSet"),
            },
            _ => {}
        }
    }

    tracing::debug!(
        path = %package_dir.display(),
        bindings = scan.bindings.len(),
        value_sets = scan.value_sets.len(),
        "Scanned package"
    );
    scan
}

/// `*.json` files directly inside `dir`, excluding the manifest, in name order.
fn list_json_files(dir: &Path) -> PackageResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || path.extension() != Some("json".as_ref()) {
            continue;
        }
        if path.file_name() == Some(MANIFEST_FILE.as_ref()) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}
