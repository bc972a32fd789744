//! Slide part structural checks.

use crate::context::ValidationContext;
use crate::findings::{codes, Category, Severity};
use crate::namespaces::{ns, relationship_type};
use crate::opc::Part;

/// Validates individual slide parts.
pub struct SlideValidator;

impl SlideValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, part: &Part, ctx: &mut ValidationContext) {
        ctx.set_part(part.uri().as_str());
        let Ok(root) = part.xml() else {
            return;
        };

        if !root.is_named(ns::PRESENTATIONML, "sld") {
            ctx.add_schema_error(
                format!("Root element should be 'p:sld', got '{}'", root.local),
                Some(&root.local),
                codes::UNEXPECTED_ELEMENT,
            );
            return;
        }

        // Every slide resolves its formatting through a layout.
        if part
            .rels()
            .first_of_type(relationship_type::SLIDE_LAYOUT)
            .is_none()
        {
            ctx.add(
                Category::Relationship,
                Severity::Error,
                "Slide has no slideLayout relationship",
                None,
                "pml-9002",
            );
        }
    }
}

impl Default for SlideValidator {
    fn default() -> Self {
        Self::new()
    }
}
