//! Validation finding records and the enumerations that classify them.
//!
//! A finding is a single validation result: what went wrong, where in the
//! package it was observed, and how severe it is. Findings serialize to
//! JSON with nullable strings written as empty strings so that reports
//! round-trip losslessly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Office file format versions a document can be validated against.
///
/// Ordering follows release order, so version gates can be expressed as
/// `since <= format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "office2007")]
    Office2007,
    #[serde(rename = "office2010")]
    Office2010,
    #[serde(rename = "office2013")]
    Office2013,
    #[serde(rename = "office2016")]
    Office2016,
    #[serde(rename = "office2019")]
    Office2019,
    #[serde(rename = "office2021")]
    Office2021,
    #[serde(rename = "microsoft365")]
    Microsoft365,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Office2007 => "office2007",
            FileFormat::Office2010 => "office2010",
            FileFormat::Office2013 => "office2013",
            FileFormat::Office2016 => "office2016",
            FileFormat::Office2019 => "office2019",
            FileFormat::Office2021 => "office2021",
            FileFormat::Microsoft365 => "microsoft365",
        }
    }
}

impl Default for FileFormat {
    fn default() -> Self {
        FileFormat::Office2019
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "office2007" => Ok(FileFormat::Office2007),
            "office2010" => Ok(FileFormat::Office2010),
            "office2013" => Ok(FileFormat::Office2013),
            "office2016" => Ok(FileFormat::Office2016),
            "office2019" => Ok(FileFormat::Office2019),
            "office2021" => Ok(FileFormat::Office2021),
            "microsoft365" => Ok(FileFormat::Microsoft365),
            other => Err(format!("unknown file format '{}'", other)),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "package")]
    Package,
    #[serde(rename = "schema")]
    Schema,
    #[serde(rename = "semantic")]
    Semantic,
    #[serde(rename = "relationship")]
    Relationship,
    #[serde(rename = "markup-compatibility")]
    MarkupCompatibility,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Package => "package",
            Category::Schema => "schema",
            Category::Semantic => "semantic",
            Category::Relationship => "relationship",
            Category::MarkupCompatibility => "markup-compatibility",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The document will not open, or will open degraded.
    #[serde(rename = "error")]
    Error,
    /// Unexpected but tolerated.
    #[serde(rename = "warning")]
    Warning,
    /// Diagnostic.
    #[serde(rename = "info")]
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding.
///
/// `path` is the element path within the part, rendered as
/// `/p:presentation[1]/p:sldIdLst[1]/p:sldId[2]` with 1-based indices
/// among same-named siblings. Optional fields (`node`, `related_node`,
/// `rule`) are empty strings when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub severity: Severity,
    pub description: String,
    /// Part URI, e.g. "/ppt/slides/slide1.xml".
    pub part: String,
    #[serde(default)]
    pub path: String,
    /// Element or attribute name the finding is about.
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub related_node: String,
    /// Stable rule identifier, e.g. "package.not-a-container" or the id
    /// of the semantic constraint that fired.
    #[serde(default)]
    pub rule: String,
}

impl Finding {
    pub fn new(category: Category, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            part: String::new(),
            path: String::new(),
            node: String::new(),
            related_node: String::new(),
            rule: String::new(),
        }
    }

    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.part = part.into();
        self
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} ({}{})",
            self.severity, self.category, self.description, self.part, self.path
        )
    }
}

/// Result of validating one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
    pub file_format: FileFormat,
    /// True when the finding cap was reached and later findings were dropped.
    pub truncated: bool,
}

impl ValidationReport {
    pub fn new(findings: Vec<Finding>, file_format: FileFormat, truncated: bool) -> Self {
        Self {
            findings,
            file_format,
            truncated,
        }
    }

    /// A document is valid when no error-severity finding was recorded.
    pub fn is_valid(&self) -> bool {
        !self
            .findings
            .iter()
            .any(|f| f.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }
}

/// Stable rule identifiers for findings emitted by the crate itself.
///
/// Semantic constraints carry their own per-rule ids instead.
pub mod codes {
    pub const NOT_A_CONTAINER: &str = "package.not-a-container";
    pub const DIRECTORY_TRAVERSAL: &str = "package.directory-traversal";
    pub const MISSING_REQUIRED_PART: &str = "package.missing-required-part";
    pub const PACKAGE_MALFORMED_XML: &str = "package.malformed-xml";
    pub const UNKNOWN_CONTENT_TYPE: &str = "package.unknown-content-type";

    pub const MALFORMED_XML: &str = "schema.malformed-xml";
    pub const UNEXPECTED_ELEMENT: &str = "schema.unexpected-element";
    pub const UNEXPECTED_ATTRIBUTE: &str = "schema.unexpected-attribute";
    pub const MISSING_REQUIRED_ATTRIBUTE: &str = "schema.missing-required-attribute";
    pub const MIN_OCCURS_VIOLATION: &str = "schema.min-occurs-violation";
    pub const MAX_OCCURS_VIOLATION: &str = "schema.max-occurs-violation";
    pub const WRONG_ELEMENT_ORDER: &str = "schema.wrong-element-order";
    pub const MISSING_CHOICE: &str = "schema.missing-choice";
    pub const VALUE_OUT_OF_RANGE: &str = "schema.value-out-of-range";
    pub const INVALID_BOOLEAN: &str = "schema.invalid-boolean";
    pub const INVALID_INTEGER: &str = "schema.invalid-integer";
    pub const INVALID_DECIMAL: &str = "schema.invalid-decimal";
    pub const PATTERN_MISMATCH: &str = "schema.pattern-mismatch";
    pub const ENUMERATION_VIOLATION: &str = "schema.enumeration-violation";

    pub const DANGLING_RELATIONSHIP: &str = "relationship.dangling";
    pub const RELATIONSHIP_ESCAPE: &str = "relationship.escape";
    pub const DUPLICATE_RELATIONSHIP_ID: &str = "relationship.duplicate-id";
    pub const MISSING_MAIN_DOCUMENT: &str = "relationship.missing-main-document";

    pub const UNIQUE_VIOLATION: &str = "semantic.unique-violation";
    pub const DANGLING_REL_REFERENCE: &str = "semantic.dangling-rel-reference";

    pub const MC_EMPTY_IGNORABLE: &str = "mc.empty-ignorable";
    pub const MC_UNDECLARED_PREFIX: &str = "mc.undeclared-prefix";

    pub const TRUNCATED: &str = "validation.truncated";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_ordering() {
        assert!(FileFormat::Office2007 < FileFormat::Office2010);
        assert!(FileFormat::Office2019 < FileFormat::Microsoft365);
        assert_eq!(FileFormat::default(), FileFormat::Office2019);
    }

    #[test]
    fn test_file_format_round_trip() {
        for fmt in [
            FileFormat::Office2007,
            FileFormat::Office2013,
            FileFormat::Microsoft365,
        ] {
            assert_eq!(fmt.as_str().parse::<FileFormat>().unwrap(), fmt);
        }
        assert!("office1997".parse::<FileFormat>().is_err());
    }

    #[test]
    fn test_finding_display() {
        let finding = Finding::new(Category::Schema, Severity::Error, "bad value")
            .with_part("/ppt/slides/slide1.xml");
        assert_eq!(
            finding.to_string(),
            "error [schema] bad value (/ppt/slides/slide1.xml)"
        );
    }

    #[test]
    fn test_finding_json_round_trip() {
        let finding = Finding {
            category: Category::Semantic,
            severity: Severity::Warning,
            description: "duplicate id".to_string(),
            part: "/ppt/slides/slide1.xml".to_string(),
            path: "/p:sld[1]/p:cSld[1]".to_string(),
            node: "id".to_string(),
            related_node: String::new(),
            rule: "pml-9101".to_string(),
        };
        let json = serde_json::to_string(&finding).unwrap();
        let back: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, finding);
    }

    #[test]
    fn test_report_counts() {
        let report = ValidationReport::new(
            vec![
                Finding::new(Category::Package, Severity::Error, "a"),
                Finding::new(Category::Schema, Severity::Warning, "b"),
                Finding::new(Category::Schema, Severity::Info, "c"),
            ],
            FileFormat::Office2019,
            false,
        );
        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
    }
}
