//! Constraint catalog: element tag -> ordered constraint list.

use crate::semantic::constraint::SemanticConstraint;
use std::collections::HashMap;

/// Maps Clark-notation element tags to the constraints registered for
/// them. Insertion order per tag is the firing order.
#[derive(Debug, Default)]
pub struct ConstraintCatalog {
    by_tag: HashMap<String, Vec<SemanticConstraint>>,
}

impl ConstraintCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, element_tag: impl Into<String>, constraint: SemanticConstraint) {
        self.by_tag
            .entry(element_tag.into())
            .or_default()
            .push(constraint);
    }

    pub fn get(&self, element_tag: &str) -> &[SemanticConstraint] {
        self.by_tag
            .get(element_tag)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of registered constraints.
    pub fn len(&self) -> usize {
        self.by_tag.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::constraint::{AttrRef, ConstraintKind};

    #[test]
    fn test_firing_order_is_insertion_order() {
        let mut catalog = ConstraintCatalog::new();
        for id in ["first", "second", "third"] {
            catalog.register(
                "{urn:t}el",
                SemanticConstraint::new(
                    id,
                    ConstraintKind::Presence {
                        attrs: vec![AttrRef::local("a")],
                    },
                ),
            );
        }
        let ids: Vec<&str> = catalog
            .get("{urn:t}el")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, ["first", "second", "third"]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get("{urn:t}other").is_empty());
    }
}
