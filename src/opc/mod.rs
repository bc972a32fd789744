/// Open Packaging Conventions (OPC) decoding.
///
/// This module decodes the ZIP container behind an Open XML document:
/// the content-type dictionary, the relationship graph, and the part
/// registry with lazily materialized XML trees.
pub mod content_types;
pub mod package;
pub mod packuri;
pub mod part;
pub mod rel;

pub use content_types::ContentTypeMap;
pub use package::Package;
pub use packuri::PackUri;
pub use part::Part;
pub use rel::{Relationship, Relationships, ResolvedTarget};
