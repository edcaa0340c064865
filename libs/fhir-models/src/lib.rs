//! Lite FHIR data models for value set comparison
//!
//! This crate provides the small slice of FHIR structure the comparison
//! pipeline reads: bindings inside StructureDefinitions, ValueSet compose
//! rules, and `$expand` responses.
//!
//! # Module Organization
//!
//! - `common`: Version-agnostic lite records that work across FHIR R4, R4B, and R5
//!
//! # Design Philosophy
//!
//! - **Lite**: only the fields the pipeline consumes are modelled
//! - **Defensive**: records are read field-by-field from `serde_json::Value`;
//!   a missing field is empty/`None`, a field of the wrong type is ignored
//! - **No upstream validation assumed**: package content is treated as untrusted
//!
//! # Example
//!
//! ```rust
//! use vsdiff_models::common::StructureDefinition;
//! use serde_json::json;
//!
//! let sd_json = json!({
//!     "resourceType": "StructureDefinition",
//!     "url": "http://hl7.org.au/fhir/StructureDefinition/au-patient",
//!     "name": "AUBasePatient",
//!     "differential": {
//!         "element": [
//!             {
//!                 "path": "Patient.gender",
//!                 "binding": {
//!                     "strength": "required",
//!                     "valueSet": "http://hl7.org/fhir/ValueSet/administrative-gender"
//!                 }
//!             }
//!         ]
//!     }
//! });
//!
//! let sd = StructureDefinition::from_resource(&sd_json).unwrap();
//! assert_eq!(sd.name, "AUBasePatient");
//! assert_eq!(sd.bindings().len(), 1);
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
