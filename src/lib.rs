//! Quince - a validator for Office Open XML documents
//!
//! This library checks whether an OOXML package - principally a
//! PowerPoint presentation (.pptx) - will open cleanly in its target
//! application, and reports a structured list of findings classified by
//! category and severity. The detection rules follow the validation
//! surface of the Open XML SDK: OPC package structure, XML content
//! models, and the semantic (Schematron-derived) constraint catalog.
//!
//! # Features
//!
//! - **Package layer**: OPC container decoding - content types,
//!   relationships, part registry, lazy XML materialization
//! - **Schema validation**: particle-based content-model checking with
//!   XSD simple-type facets
//! - **Semantic validation**: a tagged constraint catalog compiled from
//!   an embedded vendor rule inventory, plus presentation-specific rules
//! - **Deterministic reports**: findings in traversal order, stable
//!   across runs, serializable to JSON
//!
//! # Example - validating a presentation
//!
//! ```no_run
//! use quince::{Validator, ValidatorOptions, FileFormat};
//!
//! # fn main() -> Result<(), quince::Error> {
//! let validator = Validator::with_options(ValidatorOptions {
//!     format_version: FileFormat::Office2019,
//!     max_errors: 100,
//!     ..Default::default()
//! });
//!
//! let report = validator.validate("deck.pptx")?;
//! if report.is_valid() {
//!     println!("deck.pptx is valid");
//! } else {
//!     for finding in &report.findings {
//!         println!("{}", finding);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - validating bytes
//!
//! ```no_run
//! use quince::Validator;
//!
//! let data = std::fs::read("deck.pptx").unwrap();
//! let report = Validator::new().validate_bytes(&data);
//! println!("{} findings", report.findings.len());
//! ```

pub mod context;
pub mod error;
pub mod findings;
pub mod namespaces;
pub mod opc;
pub mod pptx;
pub mod schema;
pub mod schematron;
pub mod semantic;
pub mod validator;
pub mod xml;

pub use error::{Error, Result};
pub use findings::{Category, FileFormat, Finding, Severity, ValidationReport};
pub use validator::{Validator, ValidatorOptions};
