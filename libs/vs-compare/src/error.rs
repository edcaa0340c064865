//! Error types for the comparison pipeline

use thiserror::Error;

/// Conditions that leave nothing to compare. Everything else degrades
/// locally and is only logged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No packages found for {package} in the package cache")]
    RootPackageMissing { package: String },

    #[error("No ValueSet bindings found in {package} or its dependencies")]
    NoBindings { package: String },

    #[error("All candidate releases are later than the cutoff {cutoff}")]
    AllReleasesFiltered { cutoff: String },

    #[error("No SNOMED CT-AU release is available on the terminology server")]
    NoReleasesAvailable,
}

pub type Result<T> = std::result::Result<T, Error>;
