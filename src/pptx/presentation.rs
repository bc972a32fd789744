//! presentation.xml structural checks.

use crate::context::ValidationContext;
use crate::findings::{codes, Category, Severity};
use crate::namespaces::ns;
use crate::opc::Part;

/// Validates the main presentation part structure.
pub struct PresentationValidator;

impl PresentationValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, part: &Part, ctx: &mut ValidationContext) {
        ctx.set_part(part.uri().as_str());
        let Ok(root) = part.xml() else {
            // The schema pass reported the parse failure.
            return;
        };

        if !root.is_named(ns::PRESENTATIONML, "presentation") {
            ctx.add_schema_error(
                format!(
                    "Root element should be 'p:presentation', got '{}'",
                    root.local
                ),
                Some(&root.local),
                codes::UNEXPECTED_ELEMENT,
            );
            return;
        }

        // A presentation that cannot resolve a slide master will not
        // open; the id list must exist and be non-empty.
        let master_list = root.find_child(ns::PRESENTATIONML, "sldMasterIdLst");
        let master_count = master_list
            .map(|l| l.children_named(ns::PRESENTATIONML, "sldMasterId").count())
            .unwrap_or(0);
        if master_count == 0 {
            ctx.add(
                Category::Semantic,
                Severity::Error,
                "Presentation declares no slide master",
                Some("sldMasterIdLst"),
                "pml-9001",
            );
        }
    }
}

impl Default for PresentationValidator {
    fn default() -> Self {
        Self::new()
    }
}
