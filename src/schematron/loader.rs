//! Rule classifier: assigns each raw test expression a variant tag and
//! extracts its parameters.
//!
//! The grammar is closed: a fixed set of regex shapes over the test
//! string. Anything outside it is tagged Unknown and skipped at load.
//! Comparison values are taken verbatim from the test string, so the
//! per-rule case behavior of the vendor corpus is preserved.

use once_cell::sync::Lazy;
use regex::Regex;

/// Variant tags the classifier can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    AttributeValueRange,
    AttributeValueLength,
    AttributeValuePattern,
    UniqueAttribute,
    ElementReference,
    RelationshipType,
    AttributeNotEqual,
    AttributeEqual,
    AttributesPresent,
    AttributeCompare,
    AndCondition,
    OrCondition,
    ConditionalValue,
    CrossPartCount,
    Unknown,
}

/// A classified rule with its extracted parameters.
#[derive(Debug, Clone)]
pub struct ParsedRule {
    pub id: String,
    pub context: String,
    pub test: String,
    pub app: String,
    pub kind: RuleKind,

    pub attribute: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub relationship_type: Option<String>,
    pub expected_value: Option<String>,
    pub forbidden_value: Option<String>,
    pub other_attribute: Option<String>,
    pub operator: Option<String>,
    pub required_attributes: Vec<String>,
    /// For uniqueness rules: the prefixed name of the element carrying
    /// the attribute (the rule context is the uniqueness scope).
    pub unique_element: Option<String>,
    pub part_path: Option<String>,
    pub element_xpath: Option<String>,
    pub count_offset: i64,
    pub sub_rules: Vec<ParsedRule>,
}

impl ParsedRule {
    fn new(id: &str, context: &str, test: &str, app: &str) -> Self {
        Self {
            id: id.to_string(),
            context: context.to_string(),
            test: test.to_string(),
            app: app.to_string(),
            kind: RuleKind::Unknown,
            attribute: None,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            pattern: None,
            relationship_type: None,
            expected_value: None,
            forbidden_value: None,
            other_attribute: None,
            operator: None,
            required_attributes: Vec::new(),
            unique_element: None,
            part_path: None,
            element_xpath: None,
            count_offset: 0,
            sub_rules: Vec::new(),
        }
    }
}

// Attribute tokens may carry a namespace prefix and hyphens.
const ATTR: &str = r"[\w:][\w:.-]*";
// Signed integers, decimals, scientific notation, optional float suffix.
const NUM: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?f?";

macro_rules! rule_regex {
    ($name:ident, $pattern:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new(&$pattern).expect("rule grammar"));
    };
}

rule_regex!(
    RANGE_RE,
    format!(r"^@({ATTR})\s*>=?\s*({NUM})\s+and\s+@({ATTR})\s*<=?\s*({NUM})$")
);
rule_regex!(UPPER_RE, format!(r"^@({ATTR})\s*<=?\s*({NUM})$"));
rule_regex!(LOWER_RE, format!(r"^@({ATTR})\s*>=?\s*({NUM})$"));
rule_regex!(
    STRLEN_RANGE_RE,
    format!(
        r"^string-length\(@({ATTR})\)\s*>=?\s*(\d+)\s+and\s+string-length\(@({ATTR})\)\s*<=?\s*(\d+)$"
    )
);
rule_regex!(
    STRLEN_MAX_RE,
    format!(r"^string-length\(@({ATTR})\)\s*<=?\s*(\d+)$")
);
rule_regex!(
    STRLEN_MIN_RE,
    format!(r"^string-length\(@({ATTR})\)\s*>=?\s*(\d+)$")
);
rule_regex!(
    PATTERN_RE,
    format!(r#"^matches\(@({ATTR}),\s*['"](.+)['"]\)$"#)
);
rule_regex!(
    UNIQUE_RE,
    format!(r"distinct-values\((?:\.//)?(?:[\w:]+/)*([\w:]+)/@({ATTR})\)")
);
rule_regex!(
    REL_TYPE_RE,
    String::from(r#"@Type\s*=\s*['"]([^'"]+)['"]"#)
);
rule_regex!(
    REL_ATTR_RE,
    format!(r"@Id\s*=\s*current\(\)/@({ATTR})")
);
rule_regex!(NOT_EQUAL_RE, format!(r"^@({ATTR})\s*!=\s*(.*)$"));
rule_regex!(EQUAL_RE, format!(r"^@({ATTR})\s*=\s*([^=<>].*)$"));
rule_regex!(
    COMPARE_RE,
    format!(r"^@({ATTR})\s*(<=?|>=?)\s*@({ATTR})$")
);
rule_regex!(SINGLE_ATTR_RE, format!(r"^@({ATTR})$"));
rule_regex!(
    ATTRS_PRESENT_RE,
    format!(r"^@{ATTR}(\s+and\s+@{ATTR})+$")
);
rule_regex!(ATTR_TOKEN_RE, format!(r"@({ATTR})"));
rule_regex!(NOT_EQUAL_HEAD_RE, format!(r"^@{ATTR}\s*!="));
rule_regex!(CONDITIONAL_RE, format!(r"^@({ATTR})\s+and\s+(.+)$"));
rule_regex!(
    CROSS_PART_RE,
    format!(
        r#"^@({ATTR})\s*<\s*count\(document\(['"]Part:([^'"]+)['"]\)//([^)]+)\)\s*\+\s*(\d+)$"#
    )
);

fn parse_num(raw: &str) -> Option<f64> {
    raw.trim_end_matches('f').parse::<f64>().ok()
}

fn strip_quotes(raw: &str) -> &str {
    let raw = raw.trim();
    if raw.len() >= 2 {
        let bytes = raw.as_bytes();
        if (bytes[0] == b'\'' && bytes[raw.len() - 1] == b'\'')
            || (bytes[0] == b'"' && bytes[raw.len() - 1] == b'"')
        {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

/// Strip one level of balanced outer parentheses, repeatedly.
fn strip_outer_parens(test: &str) -> &str {
    let mut current = test.trim();
    loop {
        if !(current.starts_with('(') && current.ends_with(')')) {
            return current;
        }
        let mut depth = 0i32;
        let mut wraps = true;
        for (i, ch) in current.char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 && i + 1 != current.len() {
                        wraps = false;
                        break;
                    }
                }
                _ => {}
            }
        }
        if !wraps {
            return current;
        }
        current = current[1..current.len() - 1].trim();
    }
}

/// Split on a top-level connector (" or " / " and "), respecting
/// parenthesis depth.
fn split_top_level<'a>(test: &'a str, connector: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    let bytes = test.as_bytes();
    let conn = connector.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {
                if depth == 0
                    && bytes[i..].starts_with(conn)
                {
                    parts.push(test[start..i].trim());
                    i += conn.len();
                    start = i;
                    continue;
                }
            }
        }
        i += 1;
    }
    let tail = test[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

fn has_top_level(test: &str, connector: &str) -> bool {
    split_top_level(test, connector).len() > 1
}

/// Classify one raw rule.
pub fn classify(id: &str, context: &str, test: &str, app: &str) -> ParsedRule {
    let mut rule = ParsedRule::new(id, context, test, app);
    classify_into(&mut rule);
    rule
}

fn classify_into(rule: &mut ParsedRule) {
    let test = strip_outer_parens(&rule.test).to_string();

    if let Some(caps) = RANGE_RE.captures(&test) {
        if caps[1] == caps[3] {
            rule.kind = RuleKind::AttributeValueRange;
            rule.attribute = Some(caps[1].to_string());
            rule.min_value = parse_num(&caps[2]);
            rule.max_value = parse_num(&caps[4]);
            return;
        }
    }
    if let Some(caps) = UPPER_RE.captures(&test) {
        rule.kind = RuleKind::AttributeValueRange;
        rule.attribute = Some(caps[1].to_string());
        rule.max_value = parse_num(&caps[2]);
        return;
    }
    if let Some(caps) = LOWER_RE.captures(&test) {
        rule.kind = RuleKind::AttributeValueRange;
        rule.attribute = Some(caps[1].to_string());
        rule.min_value = parse_num(&caps[2]);
        return;
    }

    if let Some(caps) = STRLEN_RANGE_RE.captures(&test) {
        if caps[1] == caps[3] {
            rule.kind = RuleKind::AttributeValueLength;
            rule.attribute = Some(caps[1].to_string());
            rule.min_length = caps[2].parse().ok();
            rule.max_length = caps[4].parse().ok();
            return;
        }
    }
    if let Some(caps) = STRLEN_MAX_RE.captures(&test) {
        rule.kind = RuleKind::AttributeValueLength;
        rule.attribute = Some(caps[1].to_string());
        rule.max_length = caps[2].parse().ok();
        return;
    }
    if let Some(caps) = STRLEN_MIN_RE.captures(&test) {
        rule.kind = RuleKind::AttributeValueLength;
        rule.attribute = Some(caps[1].to_string());
        rule.min_length = caps[2].parse().ok();
        return;
    }

    if let Some(caps) = PATTERN_RE.captures(&test) {
        rule.kind = RuleKind::AttributeValuePattern;
        rule.attribute = Some(caps[1].to_string());
        rule.pattern = Some(caps[2].to_string());
        return;
    }

    if test.contains("count(distinct-values(") && test.contains("= count(") {
        rule.kind = RuleKind::UniqueAttribute;
        if let Some(caps) = UNIQUE_RE.captures(&test) {
            rule.unique_element = Some(caps[1].to_string());
            rule.attribute = Some(caps[2].to_string());
        }
        return;
    }

    if test.contains("document(rels)") && test.contains("r:Relationship") {
        rule.kind = RuleKind::RelationshipType;
        if let Some(caps) = REL_TYPE_RE.captures(&test) {
            rule.relationship_type = Some(caps[1].to_string());
        }
        if let Some(caps) = REL_ATTR_RE.captures(&test) {
            rule.attribute = Some(caps[1].to_string());
        }
        return;
    }

    if test.to_lowercase().contains("index-of(document(") {
        rule.kind = RuleKind::ElementReference;
        return;
    }

    if !has_top_level(&test, " and ") && !has_top_level(&test, " or ") {
        if let Some(caps) = NOT_EQUAL_RE.captures(&test) {
            rule.kind = RuleKind::AttributeNotEqual;
            rule.attribute = Some(caps[1].to_string());
            rule.forbidden_value = Some(strip_quotes(&caps[2]).to_string());
            return;
        }
        if let Some(caps) = EQUAL_RE.captures(&test) {
            rule.kind = RuleKind::AttributeEqual;
            rule.attribute = Some(caps[1].to_string());
            rule.expected_value = Some(strip_quotes(&caps[2]).to_string());
            return;
        }
        if let Some(caps) = COMPARE_RE.captures(&test) {
            rule.kind = RuleKind::AttributeCompare;
            rule.attribute = Some(caps[1].to_string());
            rule.operator = Some(caps[2].to_string());
            rule.other_attribute = Some(caps[3].to_string());
            return;
        }
    }

    if has_top_level(&test, " or ") {
        rule.kind = RuleKind::OrCondition;
        for branch in split_top_level(&test, " or ") {
            let mut sub = ParsedRule::new(&rule.id, &rule.context, branch, &rule.app);
            classify_into(&mut sub);
            rule.sub_rules.push(sub);
        }
        return;
    }

    if has_top_level(&test, " and ") && test.contains("!=") {
        let parts = split_top_level(&test, " and ");
        if parts.len() >= 2 && parts.iter().all(|p| NOT_EQUAL_HEAD_RE.is_match(p)) {
            rule.kind = RuleKind::AndCondition;
            for part in parts {
                let mut sub = ParsedRule::new(&rule.id, &rule.context, part, &rule.app);
                classify_into(&mut sub);
                rule.sub_rules.push(sub);
            }
            return;
        }
    }

    if SINGLE_ATTR_RE.is_match(&test) {
        rule.kind = RuleKind::AttributesPresent;
        rule.required_attributes = vec![test[1..].to_string()];
        return;
    }
    if ATTRS_PRESENT_RE.is_match(&test) {
        rule.kind = RuleKind::AttributesPresent;
        rule.required_attributes = ATTR_TOKEN_RE
            .captures_iter(&test)
            .map(|caps| caps[1].to_string())
            .collect();
        return;
    }

    if let Some(caps) = CROSS_PART_RE.captures(&test) {
        rule.kind = RuleKind::CrossPartCount;
        rule.attribute = Some(caps[1].to_string());
        rule.part_path = Some(caps[2].to_string());
        rule.element_xpath = Some(caps[3].to_string());
        rule.count_offset = caps[4].parse().unwrap_or(0);
        return;
    }

    if let Some(caps) = CONDITIONAL_RE.captures(&test) {
        rule.kind = RuleKind::ConditionalValue;
        rule.attribute = Some(caps[1].to_string());
        let mut sub = ParsedRule::new(&rule.id, &rule.context, caps[2].trim(), &rule.app);
        classify_into(&mut sub);
        rule.sub_rules.push(sub);
        return;
    }

    rule.kind = RuleKind::Unknown;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_test(test: &str) -> ParsedRule {
        classify("t-0001", "p:el", test, "All")
    }

    #[test]
    fn test_range_with_both_bounds() {
        let rule = classify_test("@cx >= 914400 and @cx <= 51206400");
        assert_eq!(rule.kind, RuleKind::AttributeValueRange);
        assert_eq!(rule.attribute.as_deref(), Some("cx"));
        assert_eq!(rule.min_value, Some(914400.0));
        assert_eq!(rule.max_value, Some(51206400.0));
    }

    #[test]
    fn test_range_mismatched_attrs_is_not_a_range() {
        let rule = classify_test("@cx >= 0 and @cy <= 10");
        assert_ne!(rule.kind, RuleKind::AttributeValueRange);
    }

    #[test]
    fn test_range_scientific_and_float_suffix() {
        let rule = classify_test("@val >= -1.7E308 and @val <= 1.7E308");
        assert_eq!(rule.kind, RuleKind::AttributeValueRange);
        assert_eq!(rule.min_value, Some(-1.7e308));

        let rule = classify_test("@fontScale >= 1000f and @fontScale <= 100000f");
        assert_eq!(rule.kind, RuleKind::AttributeValueRange);
        assert_eq!(rule.max_value, Some(100000.0));
    }

    #[test]
    fn test_prefixed_attribute() {
        let rule = classify_test("@w:percent >= 10 and @w:percent <= 500");
        assert_eq!(rule.kind, RuleKind::AttributeValueRange);
        assert_eq!(rule.attribute.as_deref(), Some("w:percent"));
    }

    #[test]
    fn test_hyphenated_attribute() {
        let rule = classify_test("@emma:disjunction-type = 'recognition'");
        assert_eq!(rule.kind, RuleKind::AttributeEqual);
        assert_eq!(rule.attribute.as_deref(), Some("emma:disjunction-type"));
        assert_eq!(rule.expected_value.as_deref(), Some("recognition"));
    }

    #[test]
    fn test_string_length_forms() {
        let rule = classify_test("string-length(@name) <= 255");
        assert_eq!(rule.kind, RuleKind::AttributeValueLength);
        assert_eq!(rule.max_length, Some(255));

        let rule = classify_test("string-length(@name) >= 1 and string-length(@name) <= 31");
        assert_eq!(rule.min_length, Some(1));
        assert_eq!(rule.max_length, Some(31));
    }

    #[test]
    fn test_pattern() {
        let rule = classify_test("matches(@val, '[0-9A-Fa-f]{6}')");
        assert_eq!(rule.kind, RuleKind::AttributeValuePattern);
        assert_eq!(rule.pattern.as_deref(), Some("[0-9A-Fa-f]{6}"));
    }

    #[test]
    fn test_unique() {
        let rule = classify_test("count(distinct-values(p:sldId/@id)) = count(p:sldId/@id)");
        assert_eq!(rule.kind, RuleKind::UniqueAttribute);
        assert_eq!(rule.unique_element.as_deref(), Some("p:sldId"));
        assert_eq!(rule.attribute.as_deref(), Some("id"));

        let rule =
            classify_test("count(distinct-values(.//p:cNvPr/@id)) = count(.//p:cNvPr/@id)");
        assert_eq!(rule.unique_element.as_deref(), Some("p:cNvPr"));
    }

    #[test]
    fn test_relationship_type() {
        let rule = classify_test(
            "document(rels)//r:Relationship[@Id = current()/@r:id and @Type = 'urn:slideMaster']",
        );
        assert_eq!(rule.kind, RuleKind::RelationshipType);
        assert_eq!(rule.attribute.as_deref(), Some("r:id"));
        assert_eq!(rule.relationship_type.as_deref(), Some("urn:slideMaster"));
    }

    #[test]
    fn test_not_equal_with_empty_value() {
        let rule = classify_test("@w:name != ''");
        assert_eq!(rule.kind, RuleKind::AttributeNotEqual);
        assert_eq!(rule.forbidden_value.as_deref(), Some(""));
    }

    #[test]
    fn test_or_respects_parenthesis_depth() {
        let rule = classify_test("(@operator and @type = 'cells') or @type != 'cells'");
        assert_eq!(rule.kind, RuleKind::OrCondition);
        assert_eq!(rule.sub_rules.len(), 2);
        assert_eq!(rule.sub_rules[0].kind, RuleKind::ConditionalValue);
        assert_eq!(rule.sub_rules[1].kind, RuleKind::AttributeNotEqual);
    }

    #[test]
    fn test_parenthesized_presence_branches() {
        let rule = classify_test("(@r:embed) or (@r:link)");
        assert_eq!(rule.kind, RuleKind::OrCondition);
        assert_eq!(rule.sub_rules.len(), 2);
        assert_eq!(rule.sub_rules[0].kind, RuleKind::AttributesPresent);
        assert_eq!(rule.sub_rules[0].required_attributes, vec!["r:embed"]);
    }

    #[test]
    fn test_and_of_not_equals() {
        let rule = classify_test("@val != 'NaN' and @val != 'INF' and @val != '-INF'");
        assert_eq!(rule.kind, RuleKind::AndCondition);
        assert_eq!(rule.sub_rules.len(), 3);
        assert!(rule
            .sub_rules
            .iter()
            .all(|s| s.kind == RuleKind::AttributeNotEqual));
    }

    #[test]
    fn test_conditional() {
        let rule = classify_test("@connectionId and @type = 'external'");
        assert_eq!(rule.kind, RuleKind::ConditionalValue);
        assert_eq!(rule.attribute.as_deref(), Some("connectionId"));
        assert_eq!(rule.sub_rules[0].kind, RuleKind::AttributeEqual);
    }

    #[test]
    fn test_attributes_present() {
        let rule = classify_test("@x and @y");
        assert_eq!(rule.kind, RuleKind::AttributesPresent);
        assert_eq!(rule.required_attributes, vec!["x", "y"]);
    }

    #[test]
    fn test_cross_part_count() {
        let rule = classify_test(
            "@cm < count(document('Part:/WorkbookPart/CellMetadataPart')//x:cellMetadata/x:bk) + 1",
        );
        assert_eq!(rule.kind, RuleKind::CrossPartCount);
        assert_eq!(rule.attribute.as_deref(), Some("cm"));
        assert_eq!(
            rule.part_path.as_deref(),
            Some("/WorkbookPart/CellMetadataPart")
        );
        assert_eq!(rule.element_xpath.as_deref(), Some("x:cellMetadata/x:bk"));
        assert_eq!(rule.count_offset, 1);
    }

    #[test]
    fn test_attribute_compare() {
        let rule = classify_test("@min <= @max");
        assert_eq!(rule.kind, RuleKind::AttributeCompare);
        assert_eq!(rule.operator.as_deref(), Some("<="));
    }

    #[test]
    fn test_unknown() {
        for test in [
            "count(w:tr) > 0",
            "sum(../a:gs/@pos) >= 0",
            "not(contains(@t, 'shared'))",
            "preceding-sibling::c:ser/@idx < @idx",
        ] {
            assert_eq!(classify_test(test).kind, RuleKind::Unknown, "{}", test);
        }
    }
}
