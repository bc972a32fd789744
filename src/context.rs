//! Traversal cursor shared by the schema and semantic passes.
//!
//! The context tracks the current part, the element path (with 1-based
//! sibling indices), and owns the bounded finding accumulator. The cap
//! is enforced at append time: once reached, further findings are
//! dropped and a single info finding records the truncation.

use crate::findings::{codes, Category, Finding, Severity};
use crate::namespaces;

#[derive(Debug)]
struct PathSegment {
    /// Full rendered path up to and including this segment.
    rendered: String,
}

/// Mutable cursor passed through validation.
pub struct ValidationContext {
    part_uri: String,
    stack: Vec<PathSegment>,
    max_findings: usize,
    findings: Vec<Finding>,
    truncated: bool,
}

impl ValidationContext {
    /// `max_findings` of 0 means unbounded.
    pub fn new(max_findings: usize) -> Self {
        Self {
            part_uri: String::new(),
            stack: Vec::new(),
            max_findings,
            findings: Vec::new(),
            truncated: false,
        }
    }

    /// Switch to a new part; the element stack is reset.
    pub fn set_part(&mut self, part_uri: &str) {
        self.part_uri = part_uri.to_string();
        self.stack.clear();
    }

    pub fn part_uri(&self) -> &str {
        &self.part_uri
    }

    /// Enter an element. `index` is 1-based among same-named siblings.
    ///
    /// The rendered segment prefers the canonical prefix for the
    /// element's namespace, then the document's own prefix.
    pub fn push_element(
        &mut self,
        ns: Option<&str>,
        doc_prefix: Option<&str>,
        local: &str,
        index: u32,
    ) {
        let prefix = ns
            .and_then(namespaces::prefix_for)
            .or(doc_prefix);
        let segment = match prefix {
            Some(p) => format!("/{}:{}[{}]", p, local, index),
            None => format!("/{}[{}]", local, index),
        };
        let rendered = match self.stack.last() {
            Some(parent) => format!("{}{}", parent.rendered, segment),
            None => segment,
        };
        self.stack.push(PathSegment { rendered });
    }

    /// Leave the current element.
    pub fn pop_element(&mut self) {
        self.stack.pop();
    }

    /// The rendered path of the current element, or "" at part level.
    pub fn current_path(&self) -> &str {
        self.stack
            .last()
            .map(|s| s.rendered.as_str())
            .unwrap_or("")
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Append a finding, honoring the cap.
    pub fn add_finding(&mut self, finding: Finding) {
        if self.max_findings > 0 && self.findings.len() >= self.max_findings {
            if !self.truncated {
                self.truncated = true;
                self.findings.push(
                    Finding::new(
                        Category::Package,
                        Severity::Info,
                        format!(
                            "Finding limit of {} reached; further findings suppressed",
                            self.max_findings
                        ),
                    )
                    .with_part(self.part_uri.clone())
                    .with_rule(codes::TRUNCATED),
                );
            }
            return;
        }
        self.findings.push(finding);
    }

    /// Append a finding at the current part and element path.
    pub fn add(
        &mut self,
        category: Category,
        severity: Severity,
        description: impl Into<String>,
        node: Option<&str>,
        rule: &str,
    ) {
        let finding = Finding {
            category,
            severity,
            description: description.into(),
            part: self.part_uri.clone(),
            path: self.current_path().to_string(),
            node: node.unwrap_or("").to_string(),
            related_node: String::new(),
            rule: rule.to_string(),
        };
        self.add_finding(finding);
    }

    pub fn add_schema_error(&mut self, description: impl Into<String>, node: Option<&str>, rule: &str) {
        self.add(Category::Schema, Severity::Error, description, node, rule);
    }

    pub fn add_semantic_error(
        &mut self,
        description: impl Into<String>,
        node: Option<&str>,
        rule: &str,
    ) {
        self.add(Category::Semantic, Severity::Error, description, node, rule);
    }

    /// Whether traversal should stop at the next element boundary.
    pub fn should_stop(&self) -> bool {
        self.truncated
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_findings(self) -> (Vec<Finding>, bool) {
        (self.findings, self.truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::ns;

    #[test]
    fn test_path_rendering() {
        let mut ctx = ValidationContext::new(0);
        ctx.set_part("/ppt/presentation.xml");
        ctx.push_element(Some(ns::PRESENTATIONML), Some("p"), "presentation", 1);
        ctx.push_element(Some(ns::PRESENTATIONML), Some("p"), "sldIdLst", 1);
        ctx.push_element(Some(ns::PRESENTATIONML), Some("p"), "sldId", 2);
        assert_eq!(
            ctx.current_path(),
            "/p:presentation[1]/p:sldIdLst[1]/p:sldId[2]"
        );
        ctx.pop_element();
        assert_eq!(ctx.current_path(), "/p:presentation[1]/p:sldIdLst[1]");
    }

    #[test]
    fn test_unknown_namespace_uses_document_prefix() {
        let mut ctx = ValidationContext::new(0);
        ctx.push_element(Some("urn:custom"), Some("cust"), "thing", 1);
        assert_eq!(ctx.current_path(), "/cust:thing[1]");
    }

    #[test]
    fn test_cap_with_truncation_marker() {
        let mut ctx = ValidationContext::new(2);
        ctx.set_part("/ppt/slides/slide1.xml");
        for i in 0..5 {
            ctx.add_schema_error(format!("finding {}", i), None, "schema.test");
        }
        let (findings, truncated) = ctx.into_findings();
        assert!(truncated);
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].description, "finding 0");
        assert_eq!(findings[1].description, "finding 1");
        assert_eq!(findings[2].severity, Severity::Info);
        assert_eq!(findings[2].rule, codes::TRUNCATED);
    }

    #[test]
    fn test_unbounded() {
        let mut ctx = ValidationContext::new(0);
        for i in 0..100 {
            ctx.add_schema_error(format!("finding {}", i), None, "schema.test");
        }
        assert_eq!(ctx.findings().len(), 100);
        assert!(!ctx.truncated());
    }
}
