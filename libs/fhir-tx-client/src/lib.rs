//! FHIR Terminology Client
//!
//! This crate counts how many codes a ValueSet expands to against a specific
//! SNOMED CT-AU release, using a terminology server's `ValueSet/$expand`
//! operation.
//!
//! # Examples
//!
//! ```rust,no_run
//! use vsdiff_tx_client::{TerminologyClient, ValueSetExpander};
//! use vsdiff_models::ReleaseId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TerminologyClient::new("https://tx.ontoserver.csiro.au/fhir")?;
//! let release: ReleaseId = "20240131".parse()?;
//! let result = client
//!     .expand(
//!         "https://healthterminologies.gov.au/fhir/ValueSet/australian-states-territories-2",
//!         release,
//!         None,
//!     )
//!     .await;
//! println!("{:?}", result.count);
//! # Ok(())
//! # }
//! ```
//!
pub mod client;
pub mod error;
pub mod expansion;

pub use client::{TerminologyClient, DEFAULT_TIMEOUT_SECS};
pub use error::{Error, Result};
pub use expansion::{
    expand_url, interpret_expansion, ExpansionIssue, ExpansionResult, ValueSetExpander,
};
