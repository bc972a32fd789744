/// Particle-based XML content-model checking.
///
/// Enforces element ordering, occurrence counts, attribute presence,
/// and simple-type facets against pre-compiled constraint tables.
pub mod constraints;
pub mod particle;
pub mod types;
pub mod validator;

pub use constraints::{registry, AttributeConstraint, ElementConstraint, SchemaRegistry};
pub use particle::{NsConstraint, Occurs, Particle, ParticleChecker};
pub use types::{TypeViolation, XsdType};
pub use validator::SchemaValidator;
