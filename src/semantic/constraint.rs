//! Semantic constraint variants.
//!
//! Each constraint is a tagged value carrying only its own data; the
//! semantic validator evaluates them with a single match, so there is
//! no dynamic dispatch on the traversal hot path.

use crate::xml::XmlElement;
use regex::Regex;

/// Reference to an attribute, with an optional namespace URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrRef {
    pub ns: Option<String>,
    pub local: String,
}

impl AttrRef {
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            ns: None,
            local: local.into(),
        }
    }

    pub fn qualified(ns: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            ns: Some(ns.into()),
            local: local.into(),
        }
    }

    /// The attribute's value on an element, if present.
    pub fn get<'a>(&self, elem: &'a XmlElement) -> Option<&'a str> {
        elem.attr(self.ns.as_deref(), &self.local)
    }
}

/// Reference to an element by namespace URI and local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub ns: String,
    pub local: String,
}

impl ElementRef {
    pub fn new(ns: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            ns: ns.into(),
            local: local.into(),
        }
    }

    pub fn matches(&self, elem: &XmlElement) -> bool {
        elem.is_named(&self.ns, &self.local)
    }

    pub fn clark(&self) -> String {
        format!("{{{}}}{}", self.ns, self.local)
    }
}

/// Comparison operator for attribute and count comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
}

impl CompareOp {
    pub fn eval(&self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Eq => a == b,
            CompareOp::Ge => a >= b,
            CompareOp::Gt => a > b,
            CompareOp::Ne => a != b,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "=",
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
            CompareOp::Ne => "!=",
        }
    }

    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            "=" => Some(CompareOp::Eq),
            ">=" => Some(CompareOp::Ge),
            ">" => Some(CompareOp::Gt),
            "!=" => Some(CompareOp::Ne),
            _ => None,
        }
    }
}

/// One semantic constraint with its stable rule id.
#[derive(Debug, Clone)]
pub struct SemanticConstraint {
    pub id: String,
    pub kind: ConstraintKind,
}

impl SemanticConstraint {
    pub fn new(id: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// The exhaustive set of constraint variants.
#[derive(Debug, Clone)]
pub enum ConstraintKind {
    /// min <= @attr <= max; either bound may be absent.
    Range {
        attr: AttrRef,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// min <= codepoint-length(@attr) <= max.
    Length {
        attr: AttrRef,
        min: Option<usize>,
        max: Option<usize>,
    },
    /// Anchored regex must fully match @attr.
    Pattern { attr: AttrRef, regex: Regex },
    /// @attr = value.
    Equals { attr: AttrRef, value: String },
    /// @attr != value.
    NotEqual { attr: AttrRef, value: String },
    /// @attr is unique among occurrences of the carrying element within
    /// the subtree rooted at the named ancestor (the whole part when
    /// `scope` is None).
    Unique {
        attr: AttrRef,
        scope: Option<ElementRef>,
    },
    /// @attr equals the value of `target_attr` on some `target_element`
    /// inside the scope.
    ReferenceExist {
        attr: AttrRef,
        target_element: ElementRef,
        target_attr: AttrRef,
        scope: Option<ElementRef>,
    },
    /// 0 <= @attr < count(elements matching `count_path`), shifted by
    /// one when `zero_based` is false.
    IndexReference {
        attr: AttrRef,
        count_path: Vec<ElementRef>,
        zero_based: bool,
    },
    /// @attr names a relationship id in the owning part's collection.
    RelationshipExist { attr: AttrRef },
    /// The relationship referenced by @attr has the given type URI.
    RelationshipType { attr: AttrRef, expected: String },
    /// At most one of the attributes is present.
    MutualExclusive { attrs: Vec<AttrRef> },
    /// When `trigger` equals `trigger_value`, @attr must be present.
    RequiredCondition {
        attr: AttrRef,
        trigger: AttrRef,
        trigger_value: String,
    },
    /// When any of the attributes is present, all must be present.
    Presence { attrs: Vec<AttrRef> },
    /// @attr OP @other over numeric values.
    AttributeCompare {
        attr: AttrRef,
        other: AttrRef,
        op: CompareOp,
    },
    /// At least one sub-constraint passes.
    Or(Vec<SemanticConstraint>),
    /// All sub-constraints pass.
    And(Vec<SemanticConstraint>),
    /// When `trigger` is present, evaluate `body`.
    Conditional {
        trigger: AttrRef,
        body: Box<SemanticConstraint>,
    },
    /// Compare @attr against the count of elements matching
    /// `element_path` under the part named by `part_role`.
    CrossPartCount {
        attr: AttrRef,
        part_role: String,
        element_path: Vec<ElementRef>,
        offset: i64,
        op: CompareOp,
    },
}
