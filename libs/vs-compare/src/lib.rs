//! ValueSet expansion comparison across SNOMED CT-AU releases
//!
//! Resolves an implementation guide and its dependencies from the local
//! package cache, finds the NCTS value sets its profiles bind, counts their
//! expansions against each of the last N monthly releases, and flags
//! releases where a count dropped by more than noise.
//!
//! The pipeline's output is a [`ComparisonReport`]: the newest-first list of
//! releases reported and one [`Row`] per value set.

pub mod error;
pub mod pipeline;
pub mod releases;
pub mod rows;
pub mod trend;
pub mod validator;

pub use error::{Error, Result};
pub use pipeline::{ComparisonPipeline, ComparisonReport, PipelineOptions};
pub use releases::{filter_releases, plan_releases, RELEASE_SAFETY_MARGIN_DAYS};
pub use rows::{dedup_bindings, Row, RowBuilder, RowSet, StructureRef};
pub use trend::{classify_row, significance, Significance};
pub use validator::{select_probe, validate_releases};
