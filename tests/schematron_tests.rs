//! Rule inventory loading and end-to-end semantic rule behavior.

mod common;

use common::{PptxBuilder, PRESENTATION};
use quince::schematron::{classification_stats, classify, load_catalog, RuleKind, RULES};
use quince::{Category, Validator, ValidatorOptions};

#[test]
fn test_classifier_coverage_meets_target() {
    let stats = classification_stats();
    let ratio = stats.classified as f64 / stats.total as f64;
    assert!(
        ratio >= 0.85,
        "classifier covers {:.1}% of the inventory ({} of {})",
        ratio * 100.0,
        stats.classified,
        stats.total
    );
}

#[test]
fn test_unknown_rules_never_crash_the_load() {
    let (catalog, stats) = load_catalog("All");
    assert!(stats.skipped > 0, "inventory should contain residual rules");
    assert_eq!(stats.built + stats.skipped, stats.total);
    assert_eq!(catalog.len(), stats.built);
}

#[test]
fn test_every_rule_classifies_without_panicking() {
    for rule in RULES {
        let parsed = classify(rule.id, rule.context, rule.test, rule.app);
        // Every classified rule keeps its identity.
        assert_eq!(parsed.id, rule.id);
        if parsed.kind == RuleKind::Unknown {
            assert!(parsed.sub_rules.is_empty());
        }
    }
}

#[test]
fn test_app_filtered_catalogs_are_subsets() {
    let (_, all) = load_catalog("All");
    for app in ["PowerPoint", "Word", "Excel"] {
        let (_, filtered) = load_catalog(app);
        assert!(filtered.total <= all.total, "{} filter grew the set", app);
        assert!(filtered.built > 0, "{} catalog is empty", app);
    }
}

#[test]
fn test_slide_size_rule_fires_end_to_end() {
    // Disable schema validation so only the semantic rule reports the
    // undersized slide.
    let presentation = PRESENTATION.replace(
        r#"<p:sldSz cx="9144000" cy="6858000"/>"#,
        r#"<p:sldSz cx="100" cy="6858000"/>"#,
    );
    let data = PptxBuilder::minimal()
        .replace("ppt/presentation.xml", &presentation)
        .build();

    let report = Validator::with_options(ValidatorOptions {
        schema_validation: false,
        ..Default::default()
    })
    .validate_bytes(&data);

    assert_eq!(report.findings.len(), 1, "{:#?}", report.findings);
    let finding = &report.findings[0];
    assert_eq!(finding.category, Category::Semantic);
    assert_eq!(finding.rule, "pml-0101");
    assert!(finding.description.contains("914400"));
}

#[test]
fn test_schema_and_semantic_rules_are_isolated() {
    // With both passes on, the same defect yields one finding from each
    // engine; removing one engine removes exactly its finding.
    let presentation = PRESENTATION.replace(
        r#"<p:sldSz cx="9144000" cy="6858000"/>"#,
        r#"<p:sldSz cx="100" cy="6858000"/>"#,
    );
    let data = PptxBuilder::minimal()
        .replace("ppt/presentation.xml", &presentation)
        .build();

    let both = Validator::new().validate_bytes(&data);
    assert_eq!(both.findings.len(), 2, "{:#?}", both.findings);

    let schema_only = Validator::with_options(ValidatorOptions {
        semantic_validation: false,
        ..Default::default()
    })
    .validate_bytes(&data);
    assert_eq!(schema_only.findings.len(), 1);
    assert_eq!(schema_only.findings[0].category, Category::Schema);
    assert_eq!(schema_only.findings[0], both.findings[0]);
}

#[test]
fn test_relationship_type_rule_fires_end_to_end() {
    // Swap the two targets so each relationship carries the wrong type.
    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slides/slide1.xml"/>
</Relationships>"#;
    let data = PptxBuilder::minimal()
        .replace("ppt/_rels/presentation.xml.rels", rels)
        .build();

    let report = Validator::new().validate_bytes(&data);
    let type_findings: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.rule == "pml-0141" || f.rule == "pml-0142")
        .collect();
    assert_eq!(type_findings.len(), 2, "{:#?}", report.findings);
}
