//! End-to-end comparison run

use crate::error::{Error, Result};
use crate::releases::{filter_releases, plan_releases};
use crate::rows::{dedup_bindings, Row, RowBuilder, RowSet};
use crate::trend::classify_row;
use crate::validator::validate_releases;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::Instrument;
use vsdiff_models::ReleaseId;
use vsdiff_package::{resolve_packages, scan_package, PackageRef, ValueSetIndex};
use vsdiff_tx_client::ValueSetExpander;

/// Inputs for one comparison run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root of the local package cache, holding `{name}#{version}/package`
    pub cache_root: PathBuf,
    /// Implementation guide to analyse
    pub root: PackageRef,
    /// Number of monthly releases to consider
    pub months_back: i32,
    /// Reference date for release planning
    pub today: NaiveDate,
    /// Ignore releases dated after this
    pub cutoff: Option<NaiveDate>,
    pub max_concurrent_requests: usize,
}

/// The rows and releases handed to report writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    /// Releases with data, newest first
    pub releases: Vec<ReleaseId>,
    pub rows: Vec<Row>,
}

impl ComparisonReport {
    /// Per-release drop flags for `row` against this report's releases.
    pub fn trend_flags(&self, row: &Row) -> BTreeMap<ReleaseId, bool> {
        classify_row(row, &self.releases)
    }
}

impl From<RowSet> for ComparisonReport {
    fn from(set: RowSet) -> Self {
        Self {
            releases: set.releases,
            rows: set.rows,
        }
    }
}

/// Runs resolution, scanning, release selection and expansion in order.
pub struct ComparisonPipeline<'a> {
    options: PipelineOptions,
    expander: &'a dyn ValueSetExpander,
}

impl<'a> ComparisonPipeline<'a> {
    pub fn new(options: PipelineOptions, expander: &'a dyn ValueSetExpander) -> Self {
        Self { options, expander }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Execute the run.
    ///
    /// Fails only when there is nothing left to compare: the root package is
    /// absent, no package declares a binding, or no release survives
    /// planning, the cutoff and server validation.
    pub async fn run(&self) -> Result<ComparisonReport> {
        let span = tracing::info_span!("compare", package = %self.options.root);
        self.execute().instrument(span).await
    }

    async fn execute(&self) -> Result<ComparisonReport> {
        let options = &self.options;
        let packages = resolve_packages(&options.cache_root, options.root.clone());
        if packages.is_empty() {
            return Err(Error::RootPackageMissing {
                package: options.root.to_string(),
            });
        }
        tracing::info!(packages = packages.len(), "Resolved packages");

        let mut bindings = Vec::new();
        let mut index = ValueSetIndex::new();
        for resolved in &packages {
            let scan = scan_package(&resolved.directory);
            bindings.extend(scan.bindings);
            index.merge(scan.value_sets);
        }
        if bindings.is_empty() {
            return Err(Error::NoBindings {
                package: options.root.to_string(),
            });
        }
        let bindings = dedup_bindings(bindings);
        tracing::info!(
            bindings = bindings.len(),
            value_sets = index.len(),
            "Collected bindings"
        );

        let planned = plan_releases(options.months_back, options.today);
        if planned.is_empty() {
            return Err(Error::NoReleasesAvailable);
        }
        let candidates = filter_releases(&planned, options.today, options.cutoff);
        if candidates.is_empty() {
            let cutoff = options
                .cutoff
                .map(|date| date.format("%Y%m%d").to_string())
                .unwrap_or_else(|| options.today.format("%Y%m%d").to_string());
            return Err(Error::AllReleasesFiltered { cutoff });
        }

        let releases = validate_releases(self.expander, &index, &candidates).await;
        if releases.is_empty() {
            return Err(Error::NoReleasesAvailable);
        }
        tracing::info!(
            releases = %releases.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
            "Comparing releases"
        );

        let set = RowBuilder::new(&index, &releases)
            .with_concurrency(options.max_concurrent_requests)
            .build(&bindings, self.expander)
            .await;
        tracing::info!(
            rows = set.rows.len(),
            releases = set.releases.len(),
            "Comparison complete"
        );

        Ok(set.into())
    }
}
