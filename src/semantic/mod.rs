/// Semantic rule engine: cross-reference, attribute, and cross-part
/// constraints applied per element during traversal.
pub mod catalog;
pub mod constraint;
pub mod validator;

pub use catalog::ConstraintCatalog;
pub use constraint::{AttrRef, CompareOp, ConstraintKind, ElementRef, SemanticConstraint};
pub use validator::SemanticValidator;
