//! Semantic traversal: fires registered constraints per element and
//! applies the built-in relationship-reference and markup-compatibility
//! checks.

use crate::context::ValidationContext;
use crate::findings::{codes, Category, Severity};
use crate::namespaces::ns;
use crate::opc::{Package, Part};
use crate::semantic::catalog::ConstraintCatalog;
use crate::semantic::constraint::{ConstraintKind, ElementRef, SemanticConstraint};
use crate::xml::{NsDecl, XmlElement};
use std::collections::{HashMap, HashSet};

/// Outcome of evaluating one constraint against one element.
enum Outcome {
    Pass,
    /// A collaborator was absent; the constraint does not apply.
    Skip,
    Fail {
        message: String,
        node: Option<String>,
    },
}

/// Per-part evaluation state: uniqueness trackers and count caches.
#[derive(Default)]
struct RunState {
    unique_seen: HashMap<(String, String), HashSet<String>>,
    cross_count_cache: HashMap<String, Option<i64>>,
}

struct EvalEnv<'e, 'a> {
    part: &'e Part,
    package: &'e Package,
    root: &'a XmlElement,
    /// Ancestors of the current element, outermost first, with their
    /// rendered paths.
    ancestors: &'e [(&'a XmlElement, String)],
}

/// Validates parts against the constraint catalog.
pub struct SemanticValidator {
    catalog: ConstraintCatalog,
}

impl SemanticValidator {
    pub fn new(catalog: ConstraintCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ConstraintCatalog {
        &self.catalog
    }

    /// Validate one part. Unparseable parts are skipped; the schema
    /// pass already reported them.
    pub fn validate_part(&self, part: &Part, package: &Package, ctx: &mut ValidationContext) {
        ctx.set_part(part.uri().as_str());
        let root = match part.xml() {
            Ok(root) => root,
            Err(_) => return,
        };
        let mut state = RunState::default();
        let mut ancestors: Vec<(&XmlElement, String)> = Vec::new();
        let mut ns_scope: Vec<&[NsDecl]> = Vec::new();
        self.walk(
            root, 1, part, package, root, &mut ancestors, &mut ns_scope, &mut state, ctx,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn walk<'a>(
        &self,
        elem: &'a XmlElement,
        index: u32,
        part: &Part,
        package: &Package,
        root: &'a XmlElement,
        ancestors: &mut Vec<(&'a XmlElement, String)>,
        ns_scope: &mut Vec<&'a [NsDecl]>,
        state: &mut RunState,
        ctx: &mut ValidationContext,
    ) {
        if ctx.should_stop() {
            return;
        }
        ctx.push_element(elem.ns.as_deref(), elem.prefix.as_deref(), &elem.local, index);
        ns_scope.push(&elem.ns_decls);

        self.check_relationship_references(elem, part, ctx);
        self.check_mc_ignorable(elem, ns_scope, ctx);

        let tag = elem.clark();
        for constraint in self.catalog.get(&tag) {
            let env = EvalEnv {
                part,
                package,
                root,
                ancestors: ancestors.as_slice(),
            };
            match self.eval(constraint, elem, &env, state, ctx.current_path()) {
                Ok(Outcome::Fail { message, node }) => {
                    ctx.add(
                        Category::Semantic,
                        Severity::Error,
                        message,
                        node.as_deref(),
                        &constraint.id,
                    );
                }
                Ok(_) => {}
                Err(reason) => {
                    tracing::warn!(
                        rule = constraint.id.as_str(),
                        part = part.uri().as_str(),
                        "skipping constraint that failed to evaluate: {}",
                        reason
                    );
                }
            }
        }

        ancestors.push((elem, ctx.current_path().to_string()));
        let mut occurrences: HashMap<String, u32> = HashMap::new();
        for child in &elem.children {
            let n = occurrences.entry(child.clark()).or_insert(0);
            *n += 1;
            self.walk(
                child, *n, part, package, root, ancestors, ns_scope, state, ctx,
            );
        }
        ancestors.pop();

        ns_scope.pop();
        ctx.pop_element();
    }

    /// Every r-namespace attribute must reference an existing
    /// relationship in the owning part's collection.
    fn check_relationship_references(
        &self,
        elem: &XmlElement,
        part: &Part,
        ctx: &mut ValidationContext,
    ) {
        for attr in &elem.attrs {
            if attr.ns.as_deref() != Some(ns::DOC_RELATIONSHIPS) || attr.value.is_empty() {
                continue;
            }
            if part.rels().get(&attr.value).is_none() {
                ctx.add_semantic_error(
                    format!(
                        "Relationship '{}' referenced by '{}' does not exist",
                        attr.value, attr.local
                    ),
                    Some(&attr.local),
                    codes::DANGLING_REL_REFERENCE,
                );
            }
        }
    }

    /// mc:Ignorable must be non-empty and name only prefixes that are
    /// bound in scope.
    fn check_mc_ignorable(
        &self,
        elem: &XmlElement,
        ns_scope: &[&[NsDecl]],
        ctx: &mut ValidationContext,
    ) {
        let Some(ignorable) = elem.attr(Some(ns::MARKUP_COMPATIBILITY), "Ignorable") else {
            return;
        };
        let prefixes: Vec<&str> = ignorable.split_whitespace().collect();
        if prefixes.is_empty() {
            ctx.add(
                Category::MarkupCompatibility,
                Severity::Error,
                "Ignorable attribute is empty",
                Some("Ignorable"),
                codes::MC_EMPTY_IGNORABLE,
            );
            return;
        }
        for prefix in prefixes {
            let bound = ns_scope.iter().any(|frame| {
                frame
                    .iter()
                    .any(|decl| decl.prefix.as_deref() == Some(prefix) && !decl.uri.is_empty())
            });
            if !bound {
                ctx.add(
                    Category::MarkupCompatibility,
                    Severity::Error,
                    format!("Ignorable attribute names undeclared prefix '{}'", prefix),
                    Some("Ignorable"),
                    codes::MC_UNDECLARED_PREFIX,
                );
            }
        }
    }

    fn eval(
        &self,
        constraint: &SemanticConstraint,
        elem: &XmlElement,
        env: &EvalEnv<'_, '_>,
        state: &mut RunState,
        current_path: &str,
    ) -> Result<Outcome, String> {
        match &constraint.kind {
            ConstraintKind::Range { attr, min, max } => {
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                let Ok(value) = raw.parse::<f64>() else {
                    return Ok(fail(
                        format!("Attribute '{}' must be numeric, got '{}'", attr.local, raw),
                        &attr.local,
                    ));
                };
                if let Some(min) = min {
                    if value < *min {
                        return Ok(fail(
                            format!(
                                "Attribute '{}' value {} is less than minimum {}",
                                attr.local, raw, min
                            ),
                            &attr.local,
                        ));
                    }
                }
                if let Some(max) = max {
                    if value > *max {
                        return Ok(fail(
                            format!(
                                "Attribute '{}' value {} exceeds maximum {}",
                                attr.local, raw, max
                            ),
                            &attr.local,
                        ));
                    }
                }
                Ok(Outcome::Pass)
            }

            ConstraintKind::Length { attr, min, max } => {
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                let length = raw.chars().count();
                if let Some(min) = min {
                    if length < *min {
                        return Ok(fail(
                            format!(
                                "Attribute '{}' length {} is less than minimum {}",
                                attr.local, length, min
                            ),
                            &attr.local,
                        ));
                    }
                }
                if let Some(max) = max {
                    if length > *max {
                        return Ok(fail(
                            format!(
                                "Attribute '{}' length {} exceeds maximum {}",
                                attr.local, length, max
                            ),
                            &attr.local,
                        ));
                    }
                }
                Ok(Outcome::Pass)
            }

            ConstraintKind::Pattern { attr, regex } => {
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                if regex.is_match(raw) {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!(
                            "Attribute '{}' value '{}' does not match the required pattern",
                            attr.local, raw
                        ),
                        &attr.local,
                    ))
                }
            }

            ConstraintKind::Equals { attr, value } => {
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                if raw == value {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!(
                            "Attribute '{}' must equal '{}', got '{}'",
                            attr.local, value, raw
                        ),
                        &attr.local,
                    ))
                }
            }

            ConstraintKind::NotEqual { attr, value } => {
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                if raw != value {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!("Attribute '{}' must not equal '{}'", attr.local, value),
                        &attr.local,
                    ))
                }
            }

            ConstraintKind::Unique { attr, scope } => {
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                let scope_key = match scope {
                    None => env.part.uri().as_str().to_string(),
                    Some(scope_ref) => {
                        match env
                            .ancestors
                            .iter()
                            .rev()
                            .find(|(ancestor, _)| scope_ref.matches(ancestor))
                        {
                            Some((_, path)) => path.clone(),
                            None => return Ok(Outcome::Skip),
                        }
                    }
                };
                let seen = state
                    .unique_seen
                    .entry((constraint.id.clone(), scope_key))
                    .or_default();
                if seen.insert(raw.to_string()) {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!(
                            "Attribute '{}' value '{}' duplicates an earlier occurrence",
                            attr.local, raw
                        ),
                        &attr.local,
                    ))
                }
            }

            ConstraintKind::ReferenceExist {
                attr,
                target_element,
                target_attr,
                scope,
            } => {
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                let scope_root = match scope {
                    None => env.root,
                    Some(scope_ref) => match env
                        .ancestors
                        .iter()
                        .rev()
                        .find(|(ancestor, _)| scope_ref.matches(ancestor))
                    {
                        Some((ancestor, _)) => *ancestor,
                        None => env.root,
                    },
                };
                let mut found_any = false;
                let mut matched = false;
                for candidate in scope_root.descendants() {
                    if target_element.matches(candidate) {
                        if let Some(value) = target_attr.get(candidate) {
                            found_any = true;
                            if value == raw {
                                matched = true;
                                break;
                            }
                        }
                    }
                }
                if !found_any {
                    return Ok(Outcome::Skip);
                }
                if matched {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!(
                            "Attribute '{}' value '{}' does not reference any '{}/@{}'",
                            attr.local, raw, target_element.local, target_attr.local
                        ),
                        &attr.local,
                    ))
                }
            }

            ConstraintKind::IndexReference {
                attr,
                count_path,
                zero_based,
            } => {
                if count_path.is_empty() {
                    return Err("index reference without a count path".to_string());
                }
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                let Ok(value) = raw.parse::<i64>() else {
                    return Ok(fail(
                        format!("Index attribute '{}' must be an integer", attr.local),
                        &attr.local,
                    ));
                };
                let count = count_descendant_path(env.root, count_path) as i64;
                if count == 0 {
                    return Ok(Outcome::Skip);
                }
                let (lo, hi) = if *zero_based {
                    (0, count - 1)
                } else {
                    (1, count)
                };
                if value < lo || value > hi {
                    Ok(fail(
                        format!(
                            "Index '{}' value {} is outside the valid range {}..{}",
                            attr.local, value, lo, hi
                        ),
                        &attr.local,
                    ))
                } else {
                    Ok(Outcome::Pass)
                }
            }

            ConstraintKind::RelationshipExist { attr } => {
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                if env.part.rels().get(raw).is_some() {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!(
                            "Relationship '{}' referenced by '{}' does not exist",
                            raw, attr.local
                        ),
                        &attr.local,
                    ))
                }
            }

            ConstraintKind::RelationshipType { attr, expected } => {
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                // A missing relationship is someone else's finding.
                let Some(rel) = env.part.rels().get(raw) else {
                    return Ok(Outcome::Skip);
                };
                if &rel.reltype == expected {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!(
                            "Relationship '{}' should be of type '{}' but is '{}'",
                            raw, expected, rel.reltype
                        ),
                        &attr.local,
                    ))
                }
            }

            ConstraintKind::MutualExclusive { attrs } => {
                let present: Vec<&str> = attrs
                    .iter()
                    .filter(|a| a.get(elem).is_some())
                    .map(|a| a.local.as_str())
                    .collect();
                if present.len() > 1 {
                    Ok(fail(
                        format!(
                            "Attributes {} are mutually exclusive; only one may be present",
                            present.join(", ")
                        ),
                        present[0],
                    ))
                } else {
                    Ok(Outcome::Pass)
                }
            }

            ConstraintKind::RequiredCondition {
                attr,
                trigger,
                trigger_value,
            } => {
                let Some(trigger_raw) = trigger.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                if trigger_raw != trigger_value {
                    return Ok(Outcome::Pass);
                }
                if attr.get(elem).is_some() {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!(
                            "Attribute '{}' is required when '{}' is '{}'",
                            attr.local, trigger.local, trigger_value
                        ),
                        &attr.local,
                    ))
                }
            }

            ConstraintKind::Presence { attrs } => {
                let mut present: Vec<&str> = Vec::new();
                let mut missing: Vec<&str> = Vec::new();
                for a in attrs {
                    if a.get(elem).is_some() {
                        present.push(&a.local);
                    } else {
                        missing.push(&a.local);
                    }
                }
                if !present.is_empty() && !missing.is_empty() {
                    Ok(fail(
                        format!(
                            "Attributes {} are required when {} are present",
                            missing.join(", "),
                            present.join(", ")
                        ),
                        missing[0],
                    ))
                } else {
                    Ok(Outcome::Pass)
                }
            }

            ConstraintKind::AttributeCompare { attr, other, op } => {
                let (Some(a_raw), Some(b_raw)) = (attr.get(elem), other.get(elem)) else {
                    return Ok(Outcome::Skip);
                };
                let (Ok(a), Ok(b)) = (a_raw.parse::<f64>(), b_raw.parse::<f64>()) else {
                    return Ok(Outcome::Skip);
                };
                if op.eval(a, b) {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!(
                            "Attribute '{}' ({}) must be {} '{}' ({})",
                            attr.local,
                            a_raw,
                            op.symbol(),
                            other.local,
                            b_raw
                        ),
                        &attr.local,
                    ))
                }
            }

            ConstraintKind::Or(subs) => {
                let mut all_skipped = true;
                for sub in subs {
                    match self.eval(sub, elem, env, state, current_path)? {
                        Outcome::Pass => return Ok(Outcome::Pass),
                        Outcome::Fail { .. } => all_skipped = false,
                        Outcome::Skip => {}
                    }
                }
                if all_skipped {
                    Ok(Outcome::Skip)
                } else {
                    Ok(Outcome::Fail {
                        message: "None of the alternative conditions are satisfied".to_string(),
                        node: None,
                    })
                }
            }

            ConstraintKind::And(subs) => {
                let mut failures: Vec<String> = Vec::new();
                let mut node = None;
                for sub in subs {
                    if let Outcome::Fail {
                        message,
                        node: sub_node,
                    } = self.eval(sub, elem, env, state, current_path)?
                    {
                        if node.is_none() {
                            node = sub_node;
                        }
                        failures.push(message);
                    }
                }
                if failures.is_empty() {
                    Ok(Outcome::Pass)
                } else {
                    Ok(Outcome::Fail {
                        message: failures.join("; "),
                        node,
                    })
                }
            }

            ConstraintKind::Conditional { trigger, body } => {
                if trigger.get(elem).is_none() {
                    return Ok(Outcome::Pass);
                }
                self.eval(body, elem, env, state, current_path)
            }

            ConstraintKind::CrossPartCount {
                attr,
                part_role,
                element_path,
                offset,
                op,
            } => {
                if element_path.is_empty() {
                    return Err("cross-part count without an element path".to_string());
                }
                let Some(raw) = attr.get(elem) else {
                    return Ok(Outcome::Skip);
                };
                let Ok(value) = raw.parse::<f64>() else {
                    return Ok(fail(
                        format!("Attribute '{}' must be numeric", attr.local),
                        &attr.local,
                    ));
                };
                let count = self.cross_part_count(part_role, element_path, env, state);
                let Some(count) = count else {
                    return Ok(Outcome::Skip);
                };
                let limit = (count + offset) as f64;
                if op.eval(value, limit) {
                    Ok(Outcome::Pass)
                } else {
                    Ok(fail(
                        format!(
                            "Attribute '{}' value {} must be {} {} (count {} from part '{}')",
                            attr.local,
                            raw,
                            op.symbol(),
                            limit,
                            count,
                            part_role
                        ),
                        &attr.local,
                    ))
                }
            }
        }
    }

    fn cross_part_count(
        &self,
        part_role: &str,
        element_path: &[ElementRef],
        env: &EvalEnv<'_, '_>,
        state: &mut RunState,
    ) -> Option<i64> {
        let cache_key = format!(
            "{}|{}",
            part_role,
            element_path
                .iter()
                .map(ElementRef::clark)
                .collect::<Vec<_>>()
                .join("/")
        );
        if let Some(cached) = state.cross_count_cache.get(&cache_key) {
            return *cached;
        }

        let uris = resolve_part_role(part_role, env);
        let result = if uris.is_empty() {
            // No resolvable role: scan every part and skip when nothing
            // anywhere matches.
            let mut total = 0i64;
            let mut found = false;
            for part in env.package.parts() {
                if let Ok(root) = part.xml() {
                    let n = count_descendant_path(root, element_path) as i64;
                    if n > 0 {
                        found = true;
                        total += n;
                    }
                }
            }
            if found {
                Some(total)
            } else {
                None
            }
        } else {
            let mut total = 0i64;
            for uri in &uris {
                if let Some(part) = env.package.part(uri) {
                    if let Ok(root) = part.xml() {
                        total += count_descendant_path(root, element_path) as i64;
                    }
                }
            }
            Some(total)
        };

        state.cross_count_cache.insert(cache_key, result);
        result
    }
}

fn fail(message: String, node: &str) -> Outcome {
    Outcome::Fail {
        message,
        node: Some(node.to_string()),
    }
}

/// Count elements matching a descendant path: the first segment matches
/// anywhere in the tree, the remaining segments walk child axes.
fn count_descendant_path(root: &XmlElement, path: &[ElementRef]) -> usize {
    fn count_tail(elem: &XmlElement, rest: &[ElementRef]) -> usize {
        match rest.split_first() {
            None => 1,
            Some((head, tail)) => elem
                .children
                .iter()
                .filter(|c| head.matches(c))
                .map(|c| count_tail(c, tail))
                .sum(),
        }
    }

    let Some((head, tail)) = path.split_first() else {
        return 0;
    };
    root.descendants()
        .filter(|e| head.matches(e))
        .map(|e| count_tail(e, tail))
        .sum()
}

/// Main-part aliases that resolve through the officeDocument role.
const MAIN_PART_ALIASES: &[&str] = &["WorkbookPart", "MainDocumentPart", "PresentationPart"];

/// Resolve a symbolic part role (e.g. "/WorkbookPart/CellMetadataPart")
/// to part URIs. Unresolvable roles yield an empty list.
fn resolve_part_role(role: &str, env: &EvalEnv<'_, '_>) -> Vec<String> {
    if role == "." {
        return vec![env.part.uri().as_str().to_string()];
    }
    if role.starts_with('/') && env.package.has_part(role) {
        return vec![role.to_string()];
    }
    let slashed = format!("/{}", role.trim_start_matches('/'));
    if env.package.has_part(&slashed) {
        return vec![slashed];
    }

    let normalized = role.trim_start_matches('/');
    if MAIN_PART_ALIASES.contains(&normalized) {
        return env
            .package
            .main_part()
            .map(|uri| vec![uri.as_str().to_string()])
            .unwrap_or_default();
    }

    let last_segment = normalized.rsplit('/').next().unwrap_or("");
    let keywords = role_keywords(last_segment);
    if keywords.is_empty() {
        return Vec::new();
    }
    let matches: Vec<String> = env
        .package
        .parts()
        .iter()
        .map(|p| p.uri().as_str().to_string())
        .filter(|uri| {
            let lower = uri.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
        .collect();
    if matches.len() == 1 {
        matches
    } else {
        Vec::new()
    }
}

/// Keyword candidates from a CamelCase part name: the last token, and
/// all tokens joined.
fn role_keywords(part_name: &str) -> Vec<String> {
    let name = part_name.strip_suffix("Part").unwrap_or(part_name);
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && !current.is_empty() {
            tokens.push(current.clone());
            current.clear();
        }
        current.push(ch.to_ascii_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    let Some(last) = tokens.last() else {
        return Vec::new();
    };
    let mut keywords = vec![last.clone()];
    let joined = tokens.concat();
    if joined != keywords[0] {
        keywords.push(joined);
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::ns;
    use crate::opc::PackUri;
    use crate::semantic::constraint::{AttrRef, CompareOp};

    const PML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

    fn slide_part(xml: &str, rels: Option<&str>) -> Part {
        Part::new(
            PackUri::new("/ppt/slides/slide1.xml").unwrap(),
            Some("application/vnd.openxmlformats-officedocument.presentationml.slide+xml".into()),
            xml.as_bytes().to_vec(),
            rels.map(|r| r.as_bytes().to_vec()),
        )
    }

    fn empty_package() -> Package {
        use std::io::{Cursor, Write};
        use zip::write::SimpleFileOptions;
        use zip::ZipWriter;

        let mut data = Vec::new();
        {
            let cursor = Cursor::new(&mut data);
            let mut writer = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();
            writer.start_file("[Content_Types].xml", options).unwrap();
            writer.write_all(br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/></Types>"#).unwrap();
            writer.start_file("_rels/.rels", options).unwrap();
            writer.write_all(br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#).unwrap();
            writer.start_file("ppt/presentation.xml", options).unwrap();
            writer.write_all(b"<p/>").unwrap();
            writer.finish().unwrap();
        }
        Package::from_bytes(&data).unwrap()
    }

    fn run(catalog: ConstraintCatalog, xml: &str, rels: Option<&str>) -> Vec<crate::findings::Finding> {
        let part = slide_part(xml, rels);
        let package = empty_package();
        let validator = SemanticValidator::new(catalog);
        let mut ctx = ValidationContext::new(0);
        validator.validate_part(&part, &package, &mut ctx);
        ctx.into_findings().0
    }

    #[test]
    fn test_unique_flags_second_occurrence() {
        let mut catalog = ConstraintCatalog::new();
        catalog.register(
            format!("{{{}}}cNvPr", PML),
            SemanticConstraint::new(
                "pml-9101",
                ConstraintKind::Unique {
                    attr: AttrRef::local("id"),
                    scope: Some(ElementRef::new(PML, "cSld")),
                },
            ),
        );
        let xml = format!(
            r#"<p:sld xmlns:p="{pml}"><p:cSld><p:spTree>
                <p:sp><p:nvSpPr><p:cNvPr id="2" name="a"/></p:nvSpPr></p:sp>
                <p:sp><p:nvSpPr><p:cNvPr id="2" name="b"/></p:nvSpPr></p:sp>
            </p:spTree></p:cSld></p:sld>"#,
            pml = PML
        );
        let findings = run(catalog, &xml, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, "pml-9101");
        // The second occurrence is the one flagged.
        assert!(findings[0].path.contains("p:sp[2]"));
    }

    #[test]
    fn test_range_and_skip_when_absent() {
        let mut catalog = ConstraintCatalog::new();
        catalog.register(
            format!("{{{}}}sldSz", PML),
            SemanticConstraint::new(
                "pml-0001",
                ConstraintKind::Range {
                    attr: AttrRef::local("cx"),
                    min: Some(914400.0),
                    max: Some(51206400.0),
                },
            ),
        );
        let bad = format!(r#"<p:sldSz xmlns:p="{}" cx="100"/>"#, PML);
        let findings = run(catalog, &bad, None);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("914400"));

        let mut catalog = ConstraintCatalog::new();
        catalog.register(
            format!("{{{}}}sldSz", PML),
            SemanticConstraint::new(
                "pml-0001",
                ConstraintKind::Range {
                    attr: AttrRef::local("cx"),
                    min: Some(914400.0),
                    max: None,
                },
            ),
        );
        let absent = format!(r#"<p:sldSz xmlns:p="{}"/>"#, PML);
        assert!(run(catalog, &absent, None).is_empty());
    }

    #[test]
    fn test_relationship_reference_checked_everywhere() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="t" Target="x.xml"/>
        </Relationships>"#;
        let xml = format!(
            r#"<p:sld xmlns:p="{pml}" xmlns:r="{r}">
                <p:cSld r:id="rId1"/>
                <p:clrMapOvr r:id="rId9"/>
            </p:sld>"#,
            pml = PML,
            r = ns::DOC_RELATIONSHIPS
        );
        let findings = run(ConstraintCatalog::new(), &xml, Some(rels));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, codes::DANGLING_REL_REFERENCE);
        assert!(findings[0].description.contains("rId9"));
    }

    #[test]
    fn test_mc_ignorable_undeclared_prefix() {
        let xml = format!(
            r#"<p:sld xmlns:p="{pml}" xmlns:mc="{mc}" xmlns:p14="urn:p14" mc:Ignorable="p14 x15"/>"#,
            pml = PML,
            mc = ns::MARKUP_COMPATIBILITY
        );
        let findings = run(ConstraintCatalog::new(), &xml, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, codes::MC_UNDECLARED_PREFIX);
        assert!(findings[0].description.contains("x15"));
    }

    #[test]
    fn test_or_passes_when_any_branch_holds() {
        let mut catalog = ConstraintCatalog::new();
        catalog.register(
            format!("{{{}}}blip", ns::DRAWINGML),
            SemanticConstraint::new(
                "dml-0001",
                ConstraintKind::Or(vec![
                    SemanticConstraint::new(
                        "dml-0001a",
                        ConstraintKind::Presence {
                            attrs: vec![AttrRef::qualified(ns::DOC_RELATIONSHIPS, "embed")],
                        },
                    ),
                    SemanticConstraint::new(
                        "dml-0001b",
                        ConstraintKind::Presence {
                            attrs: vec![AttrRef::qualified(ns::DOC_RELATIONSHIPS, "link")],
                        },
                    ),
                ]),
            ),
        );
        // Presence with no attrs present passes each branch, so this is
        // a pass; the Or only fails when some branch actively fails.
        let xml = format!(r#"<a:blip xmlns:a="{}"/>"#, ns::DRAWINGML);
        assert!(run(catalog, &xml, None).is_empty());
    }

    #[test]
    fn test_attribute_compare() {
        let mut catalog = ConstraintCatalog::new();
        catalog.register(
            "{urn:x}col".to_string(),
            SemanticConstraint::new(
                "sml-0001",
                ConstraintKind::AttributeCompare {
                    attr: AttrRef::local("min"),
                    other: AttrRef::local("max"),
                    op: CompareOp::Le,
                },
            ),
        );
        let findings = run(catalog, r#"<col xmlns="urn:x" min="5" max="3"/>"#, None);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("<="));
    }

    #[test]
    fn test_conditional_only_fires_with_trigger() {
        let mut catalog = ConstraintCatalog::new();
        let make = || {
            SemanticConstraint::new(
                "sml-0002",
                ConstraintKind::Conditional {
                    trigger: AttrRef::local("sourceRef"),
                    body: Box::new(SemanticConstraint::new(
                        "sml-0002b",
                        ConstraintKind::NotEqual {
                            attr: AttrRef::local("sourceType"),
                            value: "range".to_string(),
                        },
                    )),
                },
            )
        };
        catalog.register("{urn:x}src".to_string(), make());
        let findings = run(
            catalog,
            r#"<src xmlns="urn:x" sourceRef="a" sourceType="range"/>"#,
            None,
        );
        assert_eq!(findings.len(), 1);

        let mut catalog = ConstraintCatalog::new();
        catalog.register("{urn:x}src".to_string(), make());
        assert!(run(catalog, r#"<src xmlns="urn:x" sourceType="range"/>"#, None).is_empty());
    }

    #[test]
    fn test_reference_exist() {
        let mut catalog = ConstraintCatalog::new();
        catalog.register(
            format!("{{{}}}spTgt", PML),
            SemanticConstraint::new(
                "pml-9201",
                ConstraintKind::ReferenceExist {
                    attr: AttrRef::local("spid"),
                    target_element: ElementRef::new(PML, "cNvPr"),
                    target_attr: AttrRef::local("id"),
                    scope: None,
                },
            ),
        );
        let xml = format!(
            r#"<p:sld xmlns:p="{pml}">
                <p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="4" name=""/></p:nvSpPr></p:sp></p:spTree></p:cSld>
                <p:timing><p:spTgt spid="9"/></p:timing>
            </p:sld>"#,
            pml = PML
        );
        let findings = run(catalog, &xml, None);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].description.contains("'9'"));
    }

    #[test]
    fn test_role_keywords() {
        assert_eq!(
            role_keywords("CellMetadataPart"),
            vec!["metadata".to_string(), "cellmetadata".to_string()]
        );
        assert_eq!(role_keywords("ThemePart"), vec!["theme".to_string()]);
    }
}
