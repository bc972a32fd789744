//! Schema traversal: drives a pre-order walk of a part's element tree
//! against the constraint registry.

use crate::context::ValidationContext;
use crate::findings::{codes, FileFormat};
use crate::namespaces::ns;
use crate::opc::Part;
use crate::schema::constraints::{registry, AttributeConstraint, ElementConstraint, SchemaRegistry};
use crate::schema::particle::ParticleChecker;
use crate::xml::XmlElement;
use std::collections::{HashMap, HashSet};

/// Validates XML parts against the element constraint tables.
pub struct SchemaValidator {
    registry: &'static SchemaRegistry,
    format: FileFormat,
}

impl SchemaValidator {
    pub fn new(format: FileFormat) -> Self {
        Self {
            registry: registry(),
            format,
        }
    }

    /// Validate one part. A parse failure produces a single
    /// `schema.malformed-xml` finding and ends the part's traversal.
    pub fn validate_part(&self, part: &Part, ctx: &mut ValidationContext) {
        ctx.set_part(part.uri().as_str());
        let root = match part.xml() {
            Ok(root) => root,
            Err(msg) => {
                ctx.add_schema_error(
                    format!("Cannot parse XML content: {}", msg),
                    None,
                    codes::MALFORMED_XML,
                );
                return;
            }
        };
        self.walk(root, ctx, 1);
    }

    fn lookup(&self, elem: &XmlElement) -> Option<&ElementConstraint> {
        let constraint = self.lookup_any_version(elem)?;
        if constraint.since > self.format {
            // Not part of the schema for the active format version.
            return None;
        }
        Some(constraint)
    }

    fn lookup_any_version(&self, elem: &XmlElement) -> Option<&ElementConstraint> {
        let elem_ns = elem.ns.as_deref()?;
        self.registry.get(elem_ns, &elem.local)
    }

    fn walk(&self, elem: &XmlElement, ctx: &mut ValidationContext, index: u32) {
        if ctx.should_stop() {
            return;
        }
        ctx.push_element(elem.ns.as_deref(), elem.prefix.as_deref(), &elem.local, index);

        if let Some(constraint) = self.lookup(elem) {
            self.check_attributes(elem, constraint, ctx);

            let children = normalized_children(elem);
            if let Some(content) = &constraint.content {
                let checker = ParticleChecker::new(self.registry.groups(), constraint.ns);
                let mut modeled: Vec<&XmlElement> = Vec::new();
                let mut reported: HashSet<String> = HashSet::new();
                for &child in &children {
                    if let Some(gated) = self.lookup_any_version(child) {
                        if gated.since > self.format {
                            if reported.insert(child.clark()) {
                                ctx.add_schema_error(
                                    format!(
                                        "Element '{}' is not available in {}",
                                        child.local, self.format
                                    ),
                                    Some(&child.local),
                                    codes::UNEXPECTED_ELEMENT,
                                );
                            }
                        } else {
                            modeled.push(child);
                        }
                    } else if checker.mentions(content, child) {
                        modeled.push(child);
                    } else if checker.admits_wildcard(content, child) {
                        // Wildcard content is opaque to the schema pass.
                    } else if reported.insert(child.clark()) {
                        ctx.add_schema_error(
                            format!("Element '{}' is not declared here", child.local),
                            Some(&child.local),
                            codes::UNEXPECTED_ELEMENT,
                        );
                    }
                }
                checker.check(content, &modeled, ctx);
            }

            // Recurse into declared children only; everything else is
            // either wildcard content or was reported above.
            let mut occurrences: HashMap<String, u32> = HashMap::new();
            for child in children {
                let n = occurrences.entry(child.clark()).or_insert(0);
                *n += 1;
                if self.lookup(child).is_some() {
                    self.walk(child, ctx, *n);
                }
            }
        }

        ctx.pop_element();
    }

    fn check_attributes(
        &self,
        elem: &XmlElement,
        constraint: &ElementConstraint,
        ctx: &mut ValidationContext,
    ) {
        for ac in &constraint.attrs {
            match elem.attr(ac.ns, ac.local) {
                None => {
                    if ac.required && ac.since <= self.format {
                        ctx.add_schema_error(
                            format!("Required attribute '{}' is missing", ac.local),
                            Some(ac.local),
                            codes::MISSING_REQUIRED_ATTRIBUTE,
                        );
                    }
                }
                Some(value) => {
                    if ac.since > self.format {
                        ctx.add_schema_error(
                            format!(
                                "Attribute '{}' is not available in {}",
                                ac.local, self.format
                            ),
                            Some(ac.local),
                            codes::UNEXPECTED_ATTRIBUTE,
                        );
                    } else if let Err(violation) = ac.ty.check(value) {
                        ctx.add_schema_error(
                            format!(
                                "Invalid value for attribute '{}': {}",
                                ac.local, violation.message
                            ),
                            Some(ac.local),
                            violation.rule,
                        );
                    }
                }
            }
        }

        for attr in &elem.attrs {
            if !self.attribute_is_closed(attr.ns.as_deref()) {
                continue;
            }
            let declared = constraint.attrs.iter().any(|ac: &AttributeConstraint| {
                ac.local == attr.local
                    && ac.ns == attr.ns.as_deref()
                    && ac.since <= self.format
            });
            if !declared {
                ctx.add_schema_error(
                    format!("Attribute '{}' is not declared", attr.local),
                    Some(&attr.local),
                    codes::UNEXPECTED_ATTRIBUTE,
                );
            }
        }
    }

    /// Namespaces whose attributes must be declared on the element.
    /// Foreign extension namespaces and the mc/xml built-ins stay open.
    fn attribute_is_closed(&self, attr_ns: Option<&str>) -> bool {
        match attr_ns {
            None => true,
            Some(uri) => {
                uri == ns::PRESENTATIONML
                    || uri == ns::DRAWINGML
                    || uri == ns::DOC_RELATIONSHIPS
            }
        }
    }
}

/// Child list with mc:AlternateContent resolved: the Fallback branch is
/// preferred, else the first Choice, matching what a down-level consumer
/// of the markup would read.
fn normalized_children(elem: &XmlElement) -> Vec<&XmlElement> {
    let mut children: Vec<&XmlElement> = Vec::with_capacity(elem.children.len());
    for child in &elem.children {
        if child.is_named(ns::MARKUP_COMPATIBILITY, "AlternateContent") {
            let branch = child
                .find_child(ns::MARKUP_COMPATIBILITY, "Fallback")
                .or_else(|| child.find_child(ns::MARKUP_COMPATIBILITY, "Choice"));
            if let Some(branch) = branch {
                children.extend(branch.children.iter());
            }
        } else {
            children.push(child);
        }
    }
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::PackUri;

    fn validate_xml(xml: &str) -> Vec<crate::findings::Finding> {
        validate_xml_as(xml, FileFormat::Office2019)
    }

    fn validate_xml_as(xml: &str, format: FileFormat) -> Vec<crate::findings::Finding> {
        let part = Part::new(
            PackUri::new("/ppt/presentation.xml").unwrap(),
            Some("application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml".into()),
            xml.as_bytes().to_vec(),
            None,
        );
        let validator = SchemaValidator::new(format);
        let mut ctx = ValidationContext::new(0);
        validator.validate_part(&part, &mut ctx);
        ctx.into_findings().0
    }

    const VALID_PRESENTATION: &str = r#"<p:presentation
            xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
        <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
        <p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst>
        <p:sldSz cx="9144000" cy="6858000"/>
        <p:notesSz cx="6858000" cy="9144000"/>
    </p:presentation>"#;

    #[test]
    fn test_valid_presentation() {
        assert!(validate_xml(VALID_PRESENTATION).is_empty());
    }

    #[test]
    fn test_malformed_part() {
        let findings = validate_xml("<p:presentation xmlns:p=\"x\"><broken");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, codes::MALFORMED_XML);
    }

    #[test]
    fn test_missing_required_attribute() {
        let xml = r#"<p:sldId xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" id="256"/>"#;
        let findings = validate_xml(xml);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, codes::MISSING_REQUIRED_ATTRIBUTE);
        assert_eq!(findings[0].node, "id");
    }

    #[test]
    fn test_value_out_of_range_reports_bound() {
        let xml = r#"<p:sldSz xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
            cx="99999999" cy="6858000"/>"#;
        let findings = validate_xml(xml);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, codes::VALUE_OUT_OF_RANGE);
        assert!(findings[0].description.contains("51206400"));
    }

    #[test]
    fn test_wrong_element_order() {
        let xml = r#"<p:presentation
            xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
            <p:notesSz cx="6858000" cy="9144000"/>
            <p:sldSz cx="9144000" cy="6858000"/>
        </p:presentation>"#;
        let findings = validate_xml(xml);
        assert!(findings
            .iter()
            .any(|f| f.rule == codes::WRONG_ELEMENT_ORDER));
    }

    #[test]
    fn test_unexpected_element_once_per_name() {
        let xml = r#"<p:presentation
            xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
            <p:bogus/>
            <p:bogus/>
            <p:notesSz cx="6858000" cy="9144000"/>
        </p:presentation>"#;
        let findings = validate_xml(xml);
        let unexpected: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == codes::UNEXPECTED_ELEMENT)
            .collect();
        assert_eq!(unexpected.len(), 1);
        assert_eq!(unexpected[0].node, "bogus");
    }

    #[test]
    fn test_foreign_namespace_admitted_by_wildcard() {
        let xml = r#"<p:presentation
            xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
            xmlns:ext="urn:vendor:extension">
            <p:notesSz cx="6858000" cy="9144000"/>
            <ext:custom/>
        </p:presentation>"#;
        assert!(validate_xml(xml).is_empty());
    }

    #[test]
    fn test_unexpected_attribute() {
        let xml = r#"<p:sldSz xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
            cx="9144000" cy="6858000" autoCompress="1"/>"#;
        let findings = validate_xml(xml);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, codes::UNEXPECTED_ATTRIBUTE);
        assert_eq!(findings[0].node, "autoCompress");
    }

    #[test]
    fn test_version_gated_attribute() {
        let xml = r#"<p:cNvPr xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
            id="1" name="Shape" title="only since 2010"/>"#;
        let findings_2007 = validate_xml_as(xml, FileFormat::Office2007);
        assert_eq!(findings_2007.len(), 1);
        assert_eq!(findings_2007[0].rule, codes::UNEXPECTED_ATTRIBUTE);
        assert!(validate_xml_as(xml, FileFormat::Office2019).is_empty());
    }

    #[test]
    fn test_invalid_boolean() {
        let xml = r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
            show="maybe"><p:cSld><p:spTree>
            <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
            <p:grpSpPr/>
        </p:spTree></p:cSld></p:sld>"#;
        let findings = validate_xml(xml);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, codes::INVALID_BOOLEAN);
    }

    #[test]
    fn test_alternate_content_resolved() {
        let xml = r#"<p:presentation
            xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
            xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006">
            <mc:AlternateContent>
                <mc:Choice Requires="p14"><p:notesSz cx="1" cy="1"/></mc:Choice>
                <mc:Fallback><p:notesSz cx="6858000" cy="9144000"/></mc:Fallback>
            </mc:AlternateContent>
        </p:presentation>"#;
        assert!(validate_xml(xml).is_empty());
    }

    #[test]
    fn test_finding_paths_have_indices() {
        let xml = r#"<p:sldIdLst xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"
            xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
            <p:sldId id="256" r:id="rId1"/>
            <p:sldId id="bad" r:id="rId2"/>
        </p:sldIdLst>"#;
        let findings = validate_xml(xml);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "/p:sldIdLst[1]/p:sldId[2]");
    }
}
