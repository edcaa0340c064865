//! Error types for tx-client

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Terminology client errors
///
/// Expansion failures are not errors: they degrade to an
/// [`ExpansionResult`](crate::ExpansionResult) without a count.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid terminology endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
