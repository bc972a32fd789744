//! Slide master and slide layout structural checks.

use crate::context::ValidationContext;
use crate::findings::{codes, Category, Severity};
use crate::namespaces::{ns, relationship_type};
use crate::opc::Part;

/// Validates slide master and slide layout parts.
pub struct MasterValidator;

impl MasterValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_master(&self, part: &Part, ctx: &mut ValidationContext) {
        ctx.set_part(part.uri().as_str());
        let Ok(root) = part.xml() else {
            return;
        };

        if !root.is_named(ns::PRESENTATIONML, "sldMaster") {
            ctx.add_schema_error(
                format!("Root element should be 'p:sldMaster', got '{}'", root.local),
                Some(&root.local),
                codes::UNEXPECTED_ELEMENT,
            );
            return;
        }

        // The master is the root of the formatting chain and must bind
        // a theme.
        if part
            .rels()
            .first_of_type(relationship_type::THEME)
            .is_none()
        {
            ctx.add(
                Category::Relationship,
                Severity::Error,
                "Slide master has no theme relationship",
                None,
                "pml-9003",
            );
        }
    }

    pub fn validate_layout(&self, part: &Part, ctx: &mut ValidationContext) {
        ctx.set_part(part.uri().as_str());
        let Ok(root) = part.xml() else {
            return;
        };

        if !root.is_named(ns::PRESENTATIONML, "sldLayout") {
            ctx.add_schema_error(
                format!("Root element should be 'p:sldLayout', got '{}'", root.local),
                Some(&root.local),
                codes::UNEXPECTED_ELEMENT,
            );
            return;
        }

        if part
            .rels()
            .first_of_type(relationship_type::SLIDE_MASTER)
            .is_none()
        {
            ctx.add(
                Category::Relationship,
                Severity::Error,
                "Slide layout has no slideMaster relationship",
                None,
                "pml-9004",
            );
        }
    }
}

impl Default for MasterValidator {
    fn default() -> Self {
        Self::new()
    }
}
