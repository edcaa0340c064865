use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_CACHE_DIR: &str = "~/.fhir/packages";

/// Traverse FHIR packages to list bound ValueSets and compare SNOMED CT-AU
/// expansions across monthly releases.
#[derive(Debug, Parser)]
#[command(name = "vs-differ", version, about)]
pub struct Args {
    /// FHIR IG package id (e.g. hl7.fhir.au.base)
    pub ig_id: String,

    /// FHIR IG package version (e.g. 4.1.0)
    pub ig_version: String,

    /// Path to config JSON
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// FHIR package cache
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Ignore releases after this date (YYYYMMDD); overrides `release_cutoff`
    #[arg(long, value_name = "YYYYMMDD")]
    pub cutoff: Option<String>,

    /// Also write a JSON report next to the TSV
    #[arg(long)]
    pub json_report: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["vs-differ", "hl7.fhir.au.base", "4.1.0"]);
        assert_eq!(args.ig_id, "hl7.fhir.au.base");
        assert_eq!(args.ig_version, "4.1.0");
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert_eq!(args.cache_dir, PathBuf::from("~/.fhir/packages"));
        assert!(args.cutoff.is_none());
        assert!(!args.json_report);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "vs-differ",
            "hl7.fhir.au.core",
            "1.0.0",
            "--config",
            "/etc/vs-differ.json",
            "--cache-dir",
            "/tmp/packages",
            "--cutoff",
            "20240229",
            "--json-report",
        ]);
        assert_eq!(args.config, PathBuf::from("/etc/vs-differ.json"));
        assert_eq!(args.cache_dir, PathBuf::from("/tmp/packages"));
        assert_eq!(args.cutoff.as_deref(), Some("20240229"));
        assert!(args.json_report);
    }

    #[test]
    fn test_version_is_required() {
        assert!(Args::try_parse_from(["vs-differ", "hl7.fhir.au.base"]).is_err());
    }
}
