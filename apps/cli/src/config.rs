//! Run configuration
//!
//! Values come from built-in defaults, then an optional JSON file, then
//! `VS_DIFFER_*` environment variables (e.g. `VS_DIFFER_VERSIONS_TO_COMPARE=6`).

use anyhow::{bail, Context};
use chrono::NaiveDate;
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vsdiff_models::parse_compact_date;

use crate::logging::LoggingConfig;

pub const ENV_PREFIX: &str = "VS_DIFFER";
pub const LOG_FILE_PREFIX: &str = "vs-differ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// FHIR terminology server base URL
    pub terminology_server: String,
    /// Number of monthly releases to compare
    pub versions_to_compare: i32,
    pub output_filename: String,
    /// Holds the report and `logs/`
    pub data_folder: PathBuf,
    /// Releases dated after this (YYYYMMDD) are ignored
    pub release_cutoff: Option<String>,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub log_level: String,
    pub log_json: bool,
    /// `never`, `daily` or `hourly`
    pub log_rotation: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            terminology_server: "https://tx.ontoserver.csiro.au/fhir".to_string(),
            versions_to_compare: 12,
            output_filename: "vs-diff.tsv".to_string(),
            data_folder: PathBuf::from("~/data/vs-differ"),
            release_cutoff: None,
            request_timeout_secs: 90,
            max_concurrent_requests: 1,
            log_level: "info".to_string(),
            log_json: false,
            log_rotation: "never".to_string(),
        }
    }
}

impl Config {
    /// Load from `path` (if it exists) and the environment.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Json).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        let mut config: Config = settings
            .try_deserialize()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.data_folder = expand_home(&config.data_folder);
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let server = self.terminology_server.trim();
        if server.is_empty() {
            bail!("terminology_server must not be empty");
        }
        if !server.starts_with("http://") && !server.starts_with("https://") {
            bail!("terminology_server must be an http(s) URL, got {server}");
        }
        if self.output_filename.trim().is_empty() {
            bail!("output_filename must not be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }
        if self.max_concurrent_requests == 0 {
            bail!("max_concurrent_requests must be greater than 0");
        }
        if !matches!(self.log_rotation.as_str(), "never" | "daily" | "hourly") {
            bail!(
                "log_rotation must be one of never, daily, hourly; got {}",
                self.log_rotation
            );
        }
        self.cutoff()?;
        Ok(())
    }

    /// `release_cutoff` as a date.
    pub fn cutoff(&self) -> anyhow::Result<Option<NaiveDate>> {
        self.release_cutoff
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                parse_compact_date(value).with_context(|| format!("Invalid release_cutoff {value}"))
            })
            .transpose()
    }

    pub fn output_path(&self) -> PathBuf {
        self.data_folder.join(&self.output_filename)
    }

    pub fn log_directory(&self) -> PathBuf {
        self.data_folder.join("logs")
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            json: self.log_json,
            file_directory: self.log_directory(),
            file_prefix: LOG_FILE_PREFIX.to_string(),
            file_rotation: self.log_rotation.clone(),
        }
    }
}

/// Replace a leading `~` with the home directory. Paths without one, or
/// with no resolvable home, are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
