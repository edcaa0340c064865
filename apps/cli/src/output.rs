//! Report writers

use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use vsdiff_compare::{ComparisonReport, Row};
use vsdiff_models::ReleaseId;

/// Appended to a count that dropped significantly since the previous release.
pub const DROP_MARKER: &str = " ▼";

const FIXED_COLUMNS: [&str; 6] = [
    "valueset_url",
    "valueset_name",
    "ncts",
    "snomed_au",
    "structure_definition_url",
    "structure_definition_name",
];

const STRUCTURE_SEPARATOR: &str = "; ";

/// Write the report as tab-separated values, one column per release.
pub fn write_tsv(path: &Path, report: &ComparisonReport) -> anyhow::Result<()> {
    create_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let header = FIXED_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .chain(report.releases.iter().map(ToString::to_string));
    writer.write_record(header)?;

    for row in &report.rows {
        writer.write_record(tsv_record(row, &report.releases, &report.trend_flags(row)))?;
    }
    writer.flush()?;
    Ok(())
}

fn tsv_record(row: &Row, releases: &[ReleaseId], flags: &BTreeMap<ReleaseId, bool>) -> Vec<String> {
    let mut record = vec![
        row.value_set_url.clone(),
        row.value_set_name.clone(),
        row.ncts.to_string(),
        row.snomed_au.to_string(),
        joined(row.structure_definitions.iter().map(|s| s.url.as_str())),
        joined(row.structure_definitions.iter().map(|s| s.name.as_str())),
    ];
    record.extend(releases.iter().map(|release| match row.count(release) {
        None => String::new(),
        Some(count) if flags.get(release).copied().unwrap_or(false) => {
            format!("{count}{DROP_MARKER}")
        }
        Some(count) => count.to_string(),
    }));
    record
}

fn joined<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(STRUCTURE_SEPARATOR)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    releases: &'a [ReleaseId],
    rows: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    row: &'a Row,
    trends: BTreeMap<ReleaseId, bool>,
}

/// Write the report, including per-release drop flags, as JSON.
pub fn write_json_report(path: &Path, report: &ComparisonReport) -> anyhow::Result<()> {
    create_parent(path)?;
    let document = JsonReport {
        releases: &report.releases,
        rows: report
            .rows
            .iter()
            .map(|row| JsonRow {
                row,
                trends: report.trend_flags(row),
            })
            .collect(),
    };
    let file = fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, &document)?;
    Ok(())
}

/// The JSON report sits next to the TSV with a `.json` extension.
pub fn json_report_path(tsv_path: &Path) -> PathBuf {
    tsv_path.with_extension("json")
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
