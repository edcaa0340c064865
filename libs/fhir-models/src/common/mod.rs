//! Version-agnostic lite models
//!
//! Types that work across FHIR R4, R4B, and R5

pub mod binding;
pub mod element_definition;
pub mod error;
pub mod expansion;
pub mod release;
pub mod structure_definition;
pub mod terminology;
pub mod value_set;

// Re-export commonly used types
pub use binding::*;
pub use element_definition::*;
pub use error::{Error, Result};
pub use expansion::*;
pub use release::*;
pub use structure_definition::*;
pub use terminology::*;
pub use value_set::*;
