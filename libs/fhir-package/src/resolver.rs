//! Dependency traversal over a local package cache

use crate::{PackageDependencies, PackageRef};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// A package found in the cache, with the directory holding its resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub package: PackageRef,
    pub directory: PathBuf,
}

/// Breadth-first walk from `root` through declared dependencies.
///
/// Each `(name, version)` pair is visited at most once, so cyclic or repeated
/// declarations terminate. Packages missing from the cache are logged and
/// dropped together with their (unreachable) dependencies. An empty result
/// means the root itself is missing.
pub fn resolve_packages(cache_root: &Path, root: PackageRef) -> Vec<ResolvedPackage> {
    let mut visited: HashSet<PackageRef> = HashSet::new();
    let mut queue: VecDeque<PackageRef> = VecDeque::from([root]);
    let mut packages = Vec::new();

    while let Some(package) = queue.pop_front() {
        if !visited.insert(package.clone()) {
            continue;
        }

        let directory = package.directory_in(cache_root);
        if !directory.is_dir() {
            tracing::warn!(
                package = %package,
                path = %directory.display(),
                "Missing package directory"
            );
            continue;
        }

        let dependencies = match PackageDependencies::load(&directory) {
            Ok(deps) => deps,
            Err(e) => {
                tracing::warn!(package = %package, error = %e, "Failed to read package manifest");
                PackageDependencies::default()
            }
        };

        tracing::debug!(
            package = %package,
            dependencies = dependencies.len(),
            "Resolved package"
        );

        queue.extend(
            dependencies
                .iter()
                .filter(|dep| !visited.contains(*dep))
                .cloned(),
        );
        packages.push(ResolvedPackage { package, directory });
    }

    packages
}
