//! Particle expressions and the content-model checker.
//!
//! A particle describes how an element's children may be composed. The
//! checker runs a single greedy pass over the ordered child list with a
//! tagged automaton per particle variant.

use crate::context::ValidationContext;
use crate::findings::codes;
use crate::xml::XmlElement;
use std::collections::HashMap;

/// Upper occurrence bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    Bounded(u32),
    Unbounded,
}

impl Occurs {
    fn allows_another(&self, count: u32) -> bool {
        match self {
            Occurs::Bounded(max) => count < *max,
            Occurs::Unbounded => true,
        }
    }
}

/// Namespace constraint of a wildcard particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NsConstraint {
    /// ##any
    Any,
    /// ##other: a namespace other than the schema's target namespace.
    Other,
    /// ##local: no namespace.
    Local,
    /// A specific namespace URI.
    Uri(&'static str),
}

/// A content-model particle.
#[derive(Debug, Clone)]
pub enum Particle {
    Element {
        ns: &'static str,
        local: &'static str,
        min: u32,
        max: Occurs,
    },
    Sequence {
        items: Vec<Particle>,
        min: u32,
        max: Occurs,
    },
    Choice {
        items: Vec<Particle>,
        min: u32,
        max: Occurs,
    },
    All {
        items: Vec<Particle>,
    },
    Group {
        name: &'static str,
        min: u32,
        max: Occurs,
    },
    Any {
        ns: NsConstraint,
        min: u32,
        max: Occurs,
    },
}

fn occurs_of(p: &Particle) -> (u32, Occurs) {
    match p {
        Particle::Element { min, max, .. }
        | Particle::Sequence { min, max, .. }
        | Particle::Choice { min, max, .. }
        | Particle::Group { min, max, .. }
        | Particle::Any { min, max, .. } => (*min, *max),
        Particle::All { .. } => (1, Occurs::Bounded(1)),
    }
}

/// Checks ordered child lists against particle expressions.
pub struct ParticleChecker<'a> {
    groups: &'a HashMap<&'static str, Particle>,
    target_ns: &'a str,
}

impl<'a> ParticleChecker<'a> {
    pub fn new(groups: &'a HashMap<&'static str, Particle>, target_ns: &'a str) -> Self {
        Self { groups, target_ns }
    }

    /// Validate `children` against the element's content model.
    pub fn check(
        &self,
        content: &Particle,
        children: &[&XmlElement],
        ctx: &mut ValidationContext,
    ) {
        match content {
            Particle::All { items } => self.check_all(items, children, ctx),
            _ => self.check_sequence(std::slice::from_ref(content), children, ctx),
        }
    }

    /// Whether the content model names the element explicitly.
    pub fn mentions(&self, content: &Particle, el: &XmlElement) -> bool {
        match content {
            Particle::Element { ns, local, .. } => el.is_named(ns, local),
            Particle::Sequence { items, .. }
            | Particle::Choice { items, .. }
            | Particle::All { items } => items.iter().any(|p| self.mentions(p, el)),
            Particle::Group { name, .. } => self
                .groups
                .get(name)
                .map(|p| self.mentions(p, el))
                .unwrap_or(false),
            Particle::Any { .. } => false,
        }
    }

    /// Whether any wildcard arm of the content model admits the element.
    pub fn admits_wildcard(&self, content: &Particle, el: &XmlElement) -> bool {
        match content {
            Particle::Any { ns, .. } => self.ns_matches(*ns, el),
            Particle::Sequence { items, .. }
            | Particle::Choice { items, .. }
            | Particle::All { items } => items.iter().any(|p| self.admits_wildcard(p, el)),
            Particle::Group { name, .. } => self
                .groups
                .get(name)
                .map(|p| self.admits_wildcard(p, el))
                .unwrap_or(false),
            Particle::Element { .. } => false,
        }
    }

    fn ns_matches(&self, constraint: NsConstraint, el: &XmlElement) -> bool {
        match constraint {
            NsConstraint::Any => true,
            NsConstraint::Other => matches!(&el.ns, Some(ns) if ns != self.target_ns),
            NsConstraint::Local => el.ns.is_none(),
            NsConstraint::Uri(uri) => el.ns.as_deref() == Some(uri),
        }
    }

    /// How many children one occurrence of `p` consumes starting at
    /// `pos`, or None when it does not match there. Greedy, no
    /// backtracking; the registry's models are written for this.
    fn match_len(&self, p: &Particle, children: &[&XmlElement], pos: usize) -> Option<usize> {
        match p {
            Particle::Element { ns, local, .. } => {
                let el = children.get(pos)?;
                if el.is_named(ns, local) {
                    Some(1)
                } else {
                    None
                }
            }
            Particle::Any { ns, .. } => {
                let el = children.get(pos)?;
                if self.ns_matches(*ns, el) {
                    Some(1)
                } else {
                    None
                }
            }
            Particle::Choice { items, .. } => items
                .iter()
                .find_map(|alt| self.match_len(alt, children, pos)),
            Particle::Sequence { items, .. } => {
                let mut at = pos;
                for item in items {
                    let (min, max) = occurs_of(item);
                    let mut count = 0u32;
                    while max.allows_another(count) {
                        match self.match_len(item, children, at) {
                            Some(len) if len > 0 => {
                                at += len;
                                count += 1;
                            }
                            _ => break,
                        }
                    }
                    if count < min {
                        return None;
                    }
                }
                Some(at - pos)
            }
            Particle::Group { name, .. } => {
                let resolved = self.groups.get(name)?;
                self.match_len(resolved, children, pos)
            }
            Particle::All { .. } => None,
        }
    }

    fn check_sequence(
        &self,
        items: &[Particle],
        children: &[&XmlElement],
        ctx: &mut ValidationContext,
    ) {
        let mut pos = 0usize;
        for item in items {
            if let Particle::All { items: all_items } = item {
                self.check_all(all_items, &children[pos..], ctx);
                pos = children.len();
                continue;
            }
            let (min, max) = occurs_of(item);
            let mut count = 0u32;
            while max.allows_another(count) {
                match self.match_len(item, children, pos) {
                    Some(len) if len > 0 => {
                        pos += len;
                        count += 1;
                    }
                    _ => break,
                }
            }
            if !max.allows_another(count) {
                // At the cap: further matches of the same particle are
                // occurrence violations, flagged where they appear.
                while let Some(len) = self.match_len(item, children, pos) {
                    if len == 0 {
                        break;
                    }
                    let name = children[pos].local.clone();
                    let limit = match max {
                        Occurs::Bounded(m) => m,
                        Occurs::Unbounded => unreachable!(),
                    };
                    ctx.add_schema_error(
                        format!(
                            "Element '{}' appears more often than the allowed {} occurrence(s)",
                            name, limit
                        ),
                        Some(&name),
                        codes::MAX_OCCURS_VIOLATION,
                    );
                    pos += len;
                }
            }
            if count < min {
                self.report_missing(item, min, count, ctx);
            }
        }
        if pos < children.len() {
            let unexpected = children[pos];
            let expected = self.first_names(items);
            ctx.add_schema_error(
                format!(
                    "Element '{}' is not valid at this position; expected one of: {}",
                    unexpected.local,
                    expected.join(", ")
                ),
                Some(&unexpected.local),
                codes::WRONG_ELEMENT_ORDER,
            );
        }
    }

    /// `xs:all`: each member appears between its bounds, order free.
    fn check_all(
        &self,
        items: &[Particle],
        children: &[&XmlElement],
        ctx: &mut ValidationContext,
    ) {
        let mut counts = vec![0u32; items.len()];
        for child in children {
            let matched = items
                .iter()
                .position(|item| self.match_len(item, std::slice::from_ref(child), 0).is_some());
            match matched {
                Some(i) => {
                    counts[i] += 1;
                    let (_, max) = occurs_of(&items[i]);
                    if !max.allows_another(counts[i] - 1) {
                        ctx.add_schema_error(
                            format!("Element '{}' is not allowed to repeat here", child.local),
                            Some(&child.local),
                            codes::MAX_OCCURS_VIOLATION,
                        );
                    }
                }
                None => {
                    let expected = self.first_names(items);
                    ctx.add_schema_error(
                        format!(
                            "Element '{}' is not valid here; expected one of: {}",
                            child.local,
                            expected.join(", ")
                        ),
                        Some(&child.local),
                        codes::WRONG_ELEMENT_ORDER,
                    );
                }
            }
        }
        for (i, item) in items.iter().enumerate() {
            let (min, _) = occurs_of(item);
            if counts[i] < min {
                self.report_missing(item, min, counts[i], ctx);
            }
        }
    }

    fn report_missing(
        &self,
        item: &Particle,
        min: u32,
        count: u32,
        ctx: &mut ValidationContext,
    ) {
        match item {
            Particle::Element { local, .. } => {
                ctx.add_schema_error(
                    format!(
                        "Required element '{}' is missing (minOccurs={}, found={})",
                        local, min, count
                    ),
                    Some(local),
                    codes::MIN_OCCURS_VIOLATION,
                );
            }
            Particle::Choice { .. } => {
                let expected = self.first_names(std::slice::from_ref(item));
                ctx.add_schema_error(
                    format!(
                        "Required choice is missing; expected one of: {}",
                        expected.join(", ")
                    ),
                    None,
                    codes::MISSING_CHOICE,
                );
            }
            _ => {
                let expected = self.first_names(std::slice::from_ref(item));
                ctx.add_schema_error(
                    format!(
                        "Required content is missing; expected: {}",
                        expected.join(", ")
                    ),
                    None,
                    codes::MIN_OCCURS_VIOLATION,
                );
            }
        }
    }

    /// Element names a particle set can begin with, for diagnostics.
    fn first_names(&self, items: &[Particle]) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names(items, &mut names);
        names.dedup();
        names
    }

    fn collect_names(&self, items: &[Particle], out: &mut Vec<String>) {
        for item in items {
            match item {
                Particle::Element { local, .. } => {
                    if !out.iter().any(|n| n == local) {
                        out.push(local.to_string());
                    }
                }
                Particle::Sequence { items, .. }
                | Particle::Choice { items, .. }
                | Particle::All { items } => self.collect_names(items, out),
                Particle::Group { name, .. } => {
                    if let Some(resolved) = self.groups.get(name) {
                        self.collect_names(std::slice::from_ref(resolved), out);
                    }
                }
                Particle::Any { .. } => {
                    if !out.iter().any(|n| n == "(any)") {
                        out.push("(any)".to_string());
                    }
                }
            }
        }
    }
}
