//! Error types for FHIR models

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid FHIR resource: {0}")]
    InvalidResource(String),

    #[error("Unexpected resourceType: expected {expected}, found {found}")]
    UnexpectedResourceType { expected: String, found: String },

    #[error("Invalid release identifier: {0}")]
    InvalidRelease(String),
}

pub type Result<T> = std::result::Result<T, Error>;
