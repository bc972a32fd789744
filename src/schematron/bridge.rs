//! Bridge from classified rules to semantic constraints.
//!
//! Each variant tag has a builder that produces a concrete constraint.
//! Unclassifiable or unbuildable rules are counted and logged once at
//! load; they never fail the load.

use crate::namespaces;
use crate::schematron::loader::{classify, ParsedRule, RuleKind};
use crate::schematron::rules::RULES;
use crate::semantic::catalog::ConstraintCatalog;
use crate::semantic::constraint::{
    AttrRef, CompareOp, ConstraintKind, ElementRef, SemanticConstraint,
};
use regex::Regex;

/// Load statistics for one catalog build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Rules considered after application filtering.
    pub total: usize,
    /// Rules the classifier assigned a non-Unknown tag.
    pub classified: usize,
    /// Rules converted into constraints and registered.
    pub built: usize,
    /// Rules skipped: Unknown, unresolvable context, or an unbuildable
    /// parameter set.
    pub skipped: usize,
}

/// Build the constraint catalog for an application scope ("All",
/// "PowerPoint", "Word", "Excel").
pub fn load_catalog(app_filter: &str) -> (ConstraintCatalog, LoadStats) {
    let mut catalog = ConstraintCatalog::new();
    let mut stats = LoadStats::default();

    for raw in RULES {
        if app_filter != "All" && raw.app != "All" && raw.app != app_filter {
            continue;
        }
        stats.total += 1;

        let rule = classify(raw.id, raw.context, raw.test, raw.app);
        if rule.kind != RuleKind::Unknown {
            stats.classified += 1;
        }

        match register(&rule, &mut catalog) {
            true => stats.built += 1,
            false => stats.skipped += 1,
        }
    }

    if stats.skipped > 0 {
        tracing::warn!(
            skipped = stats.skipped,
            total = stats.total,
            "rule inventory: {} of {} rules not convertible to constraints",
            stats.skipped,
            stats.total
        );
    }

    (catalog, stats)
}

/// Classification coverage over the whole embedded inventory.
pub fn classification_stats() -> LoadStats {
    let mut stats = LoadStats::default();
    for raw in RULES {
        stats.total += 1;
        let rule = classify(raw.id, raw.context, raw.test, raw.app);
        if rule.kind != RuleKind::Unknown {
            stats.classified += 1;
        }
    }
    stats
}

fn register(rule: &ParsedRule, catalog: &mut ConstraintCatalog) -> bool {
    // Uniqueness rules attach to the element carrying the attribute;
    // the rule context is the scope.
    if rule.kind == RuleKind::UniqueAttribute {
        let (Some(element), Some(attr)) = (&rule.unique_element, &rule.attribute) else {
            return false;
        };
        let Some(element_tag) = context_to_clark(element) else {
            return false;
        };
        let Some(scope) = context_to_element_ref(&rule.context) else {
            return false;
        };
        catalog.register(
            element_tag,
            SemanticConstraint::new(
                rule.id.clone(),
                ConstraintKind::Unique {
                    attr: split_attr(attr),
                    scope: Some(scope),
                },
            ),
        );
        return true;
    }

    let Some(element_tag) = context_to_clark(&rule.context) else {
        return false;
    };
    let Some(kind) = build_kind(rule) else {
        return false;
    };
    catalog.register(element_tag, SemanticConstraint::new(rule.id.clone(), kind));
    true
}

fn build_kind(rule: &ParsedRule) -> Option<ConstraintKind> {
    match rule.kind {
        RuleKind::AttributeValueRange => Some(ConstraintKind::Range {
            attr: split_attr(rule.attribute.as_ref()?),
            min: rule.min_value,
            max: rule.max_value,
        }),

        RuleKind::AttributeValueLength => Some(ConstraintKind::Length {
            attr: split_attr(rule.attribute.as_ref()?),
            min: rule.min_length,
            max: rule.max_length,
        }),

        RuleKind::AttributeValuePattern => {
            let pattern = convert_xpath_pattern(rule.pattern.as_ref()?)?;
            Some(ConstraintKind::Pattern {
                attr: split_attr(rule.attribute.as_ref()?),
                regex: pattern,
            })
        }

        RuleKind::RelationshipType => Some(ConstraintKind::RelationshipType {
            attr: split_attr(rule.attribute.as_ref()?),
            expected: rule.relationship_type.clone()?,
        }),

        RuleKind::AttributeNotEqual => Some(ConstraintKind::NotEqual {
            attr: split_attr(rule.attribute.as_ref()?),
            value: rule.forbidden_value.clone()?,
        }),

        RuleKind::AttributeEqual => Some(ConstraintKind::Equals {
            attr: split_attr(rule.attribute.as_ref()?),
            value: rule.expected_value.clone()?,
        }),

        RuleKind::AttributesPresent => {
            if rule.required_attributes.is_empty() {
                return None;
            }
            Some(ConstraintKind::Presence {
                attrs: rule
                    .required_attributes
                    .iter()
                    .map(|a| split_attr(a))
                    .collect(),
            })
        }

        RuleKind::AttributeCompare => Some(ConstraintKind::AttributeCompare {
            attr: split_attr(rule.attribute.as_ref()?),
            other: split_attr(rule.other_attribute.as_ref()?),
            op: CompareOp::parse(rule.operator.as_ref()?)?,
        }),

        RuleKind::OrCondition => {
            let subs = build_subs(rule);
            if subs.is_empty() {
                return None;
            }
            Some(ConstraintKind::Or(subs))
        }

        RuleKind::AndCondition => {
            let subs = build_subs(rule);
            if subs.is_empty() {
                return None;
            }
            Some(ConstraintKind::And(subs))
        }

        RuleKind::ConditionalValue => {
            let trigger = split_attr(rule.attribute.as_ref()?);
            let sub = rule.sub_rules.first()?;
            let body_kind = build_kind(sub)?;
            Some(ConstraintKind::Conditional {
                trigger,
                body: Box::new(SemanticConstraint::new(
                    format!("{}.body", rule.id),
                    body_kind,
                )),
            })
        }

        RuleKind::CrossPartCount => {
            let xpath = rule.element_xpath.as_ref()?;
            let element_path: Option<Vec<ElementRef>> = xpath
                .trim_start_matches('/')
                .split('/')
                .map(context_to_element_ref)
                .collect();
            Some(ConstraintKind::CrossPartCount {
                attr: split_attr(rule.attribute.as_ref()?),
                part_role: rule.part_path.clone()?,
                element_path: element_path?,
                offset: rule.count_offset,
                op: CompareOp::Lt,
            })
        }

        // Reference rules need relationship-graph context the rule
        // string does not carry; they stay unimplemented.
        RuleKind::ElementReference => None,
        RuleKind::UniqueAttribute => None,
        RuleKind::Unknown => None,
    }
}

fn build_subs(rule: &ParsedRule) -> Vec<SemanticConstraint> {
    rule.sub_rules
        .iter()
        .enumerate()
        .filter_map(|(i, sub)| {
            build_kind(sub)
                .map(|kind| SemanticConstraint::new(format!("{}.{}", rule.id, i + 1), kind))
        })
        .collect()
}

/// Resolve a prefixed context name like "p:sldId" to Clark notation.
fn context_to_clark(context: &str) -> Option<String> {
    let (prefix, local) = context.split_once(':')?;
    let uri = namespaces::uri_for(prefix)?;
    Some(format!("{{{}}}{}", uri, local))
}

fn context_to_element_ref(context: &str) -> Option<ElementRef> {
    let (prefix, local) = context.split_once(':')?;
    let uri = namespaces::uri_for(prefix)?;
    Some(ElementRef::new(uri, local))
}

/// Split an attribute reference like "r:id" or "id" into an AttrRef,
/// resolving the prefix through the canonical table. An unresolvable
/// prefix degrades to an unqualified reference.
fn split_attr(attr: &str) -> AttrRef {
    match attr.split_once(':') {
        Some((prefix, local)) => match namespaces::uri_for(prefix) {
            Some(uri) => AttrRef::qualified(uri, local),
            None => AttrRef::local(local),
        },
        None => AttrRef::local(attr),
    }
}

/// Convert an XPath regex to the local dialect (best effort): XML name
/// classes are approximated; Unicode property classes pass through.
fn convert_xpath_pattern(pattern: &str) -> Option<Regex> {
    let converted = pattern
        .replace("\\i", "[a-zA-Z_:]")
        .replace("\\c", "[a-zA-Z0-9_:.-]");
    Regex::new(&format!("^(?:{})$", converted)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::ns;

    #[test]
    fn test_classification_coverage_at_least_85_percent() {
        let stats = classification_stats();
        assert!(stats.total > 40, "inventory too small: {}", stats.total);
        let ratio = stats.classified as f64 / stats.total as f64;
        assert!(
            ratio >= 0.85,
            "classification coverage {:.1}% below 85%",
            ratio * 100.0
        );
    }

    #[test]
    fn test_load_catalog_counts() {
        let (catalog, stats) = load_catalog("All");
        assert_eq!(stats.built + stats.skipped, stats.total);
        assert!(stats.built > 0);
        assert_eq!(catalog.len(), stats.built);
        // Unknown rules never crash the load, they are just skipped.
        assert!(stats.skipped >= stats.total - stats.classified);
    }

    #[test]
    fn test_app_filter() {
        let (_, all) = load_catalog("All");
        let (_, ppt) = load_catalog("PowerPoint");
        assert!(ppt.total < all.total);
    }

    #[test]
    fn test_slide_size_rule_registered() {
        let (catalog, _) = load_catalog("PowerPoint");
        let tag = format!("{{{}}}sldSz", ns::PRESENTATIONML);
        let rules: Vec<&str> = catalog.get(&tag).iter().map(|c| c.id.as_str()).collect();
        assert!(rules.contains(&"pml-0101"));
        assert!(rules.contains(&"pml-0102"));
    }

    #[test]
    fn test_unique_rule_attached_to_carrier_element() {
        let (catalog, _) = load_catalog("PowerPoint");
        // pml-0133 is scoped to p:cSld but fires on p:cNvPr.
        let tag = format!("{{{}}}cNvPr", ns::PRESENTATIONML);
        let constraint = catalog
            .get(&tag)
            .iter()
            .find(|c| c.id == "pml-0133")
            .expect("unique shape-id rule");
        match &constraint.kind {
            ConstraintKind::Unique { attr, scope } => {
                assert_eq!(attr.local, "id");
                assert_eq!(scope.as_ref().unwrap().local, "cSld");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_relationship_attr_resolved_to_r_namespace() {
        let (catalog, _) = load_catalog("PowerPoint");
        let tag = format!("{{{}}}sldMasterId", ns::PRESENTATIONML);
        let constraint = catalog
            .get(&tag)
            .iter()
            .find(|c| c.id == "pml-0141")
            .expect("slideMaster type rule");
        match &constraint.kind {
            ConstraintKind::RelationshipType { attr, expected } => {
                assert_eq!(attr.ns.as_deref(), Some(ns::DOC_RELATIONSHIPS));
                assert!(expected.ends_with("slideMaster"));
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_cross_part_rule_built() {
        let (catalog, _) = load_catalog("Excel");
        let tag = format!("{{{}}}c", ns::SPREADSHEETML);
        let constraint = catalog
            .get(&tag)
            .iter()
            .find(|c| c.id == "sml-0395")
            .expect("cell metadata count rule");
        match &constraint.kind {
            ConstraintKind::CrossPartCount {
                part_role,
                element_path,
                offset,
                ..
            } => {
                assert_eq!(part_role, "/WorkbookPart/CellMetadataPart");
                assert_eq!(element_path.len(), 2);
                assert_eq!(*offset, 1);
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }
}
