/// Presentation-specific validation.
///
/// These checks complement the generic passes: they verify the part
/// graph a presentation is expected to carry (masters, layouts, themes)
/// and the root element of each part kind. Everything the schema,
/// semantic, and relationship phases already report is not re-reported
/// here.
pub mod masters;
pub mod presentation;
pub mod slides;
pub mod themes;

pub use masters::MasterValidator;
pub use presentation::PresentationValidator;
pub use slides::SlideValidator;
pub use themes::ThemeValidator;

use crate::namespaces::ns;
use crate::semantic::{
    AttrRef, ConstraintKind, ConstraintCatalog, ElementRef, SemanticConstraint,
};

/// Hand-written constraint registrations that the rule inventory does
/// not carry.
pub fn register_constraints(catalog: &mut ConstraintCatalog) {
    // Animation targets reference shape ids within the slide.
    catalog.register(
        format!("{{{}}}spTgt", ns::PRESENTATIONML),
        SemanticConstraint::new(
            "pml-9201",
            ConstraintKind::ReferenceExist {
                attr: AttrRef::local("spid"),
                target_element: ElementRef::new(ns::PRESENTATIONML, "cNvPr"),
                target_attr: AttrRef::local("id"),
                scope: None,
            },
        ),
    );

    // Slide references inside custom shows must point at slide parts.
    catalog.register(
        format!("{{{}}}sld", ns::PRESENTATIONML),
        SemanticConstraint::new(
            "pml-9202",
            ConstraintKind::RelationshipType {
                attr: AttrRef::qualified(ns::DOC_RELATIONSHIPS, "id"),
                expected: crate::namespaces::relationship_type::SLIDE.to_string(),
            },
        ),
    );
}
