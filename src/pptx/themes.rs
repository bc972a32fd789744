//! Theme part structural checks.

use crate::context::ValidationContext;
use crate::findings::{codes, Category, Severity};
use crate::namespaces::ns;
use crate::opc::Part;

/// Validates theme parts.
pub struct ThemeValidator;

impl ThemeValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, part: &Part, ctx: &mut ValidationContext) {
        ctx.set_part(part.uri().as_str());
        let Ok(root) = part.xml() else {
            return;
        };

        if !root.is_named(ns::DRAWINGML, "theme") {
            ctx.add_schema_error(
                format!("Root element should be 'a:theme', got '{}'", root.local),
                Some(&root.local),
                codes::UNEXPECTED_ELEMENT,
            );
            return;
        }

        if root.attr_local("name").map_or(true, str::is_empty) {
            ctx.add(
                Category::Semantic,
                Severity::Warning,
                "Theme has no name",
                Some("name"),
                "dml-9005",
            );
        }
    }
}

impl Default for ThemeValidator {
    fn default() -> Self {
        Self::new()
    }
}
