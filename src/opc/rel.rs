//! Relationship records and per-source relationship collections.

use crate::namespaces::target_mode;
use crate::opc::packuri::PackUri;
use quick_xml::events::Event;
use quick_xml::Reader;
use smallvec::SmallVec;
use std::collections::HashMap;

/// A single relationship from a source (part or package root) to a
/// target part or external resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub reltype: String,
    pub target: String,
    pub is_external: bool,
}

/// Outcome of resolving a relationship target against its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// Internal target, canonicalized to an absolute part path.
    Part(PackUri),
    /// External target, returned verbatim.
    External(String),
    /// Internal target whose reference climbs above the package root.
    Escaped(String),
}

impl Relationship {
    /// Resolve the target against the directory of the source part
    /// (use "/" for package-level relationships).
    pub fn resolve(&self, source_base_uri: &str) -> ResolvedTarget {
        if self.is_external {
            return ResolvedTarget::External(self.target.clone());
        }
        match PackUri::from_rel_ref(source_base_uri, &self.target) {
            Ok(uri) => ResolvedTarget::Part(uri),
            Err(_) => ResolvedTarget::Escaped(self.target.clone()),
        }
    }
}

/// Ordered, id-indexed collection of relationships from one source.
///
/// Document order is preserved so findings fire deterministically;
/// duplicate ids are kept for the integrity phase to report.
#[derive(Debug, Default)]
pub struct Relationships {
    source_uri: String,
    items: SmallVec<[Relationship; 8]>,
    by_id: HashMap<String, usize>,
}

impl Relationships {
    pub fn new(source_uri: impl Into<String>) -> Self {
        Self {
            source_uri: source_uri.into(),
            items: SmallVec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Parse a .rels file.
    pub fn from_xml(xml: &[u8], source_uri: impl Into<String>) -> Result<Self, String> {
        let mut rels = Self::new(source_uri);
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut reltype = None;
                        let mut target = None;
                        let mut mode = target_mode::INTERNAL.to_string();

                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| e.to_string())?;
                            let value = attr
                                .unescape_value()
                                .map_err(|e| e.to_string())?
                                .to_string();
                            match attr.key.as_ref() {
                                b"Id" => id = Some(value),
                                b"Type" => reltype = Some(value),
                                b"Target" => target = Some(value),
                                b"TargetMode" => mode = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(reltype), Some(target)) = (id, reltype, target) {
                            rels.add(Relationship {
                                id,
                                reltype,
                                target,
                                is_external: mode == target_mode::EXTERNAL,
                            });
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(format!("rels parse error: {}", e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    pub fn add(&mut self, rel: Relationship) {
        let index = self.items.len();
        self.by_id.entry(rel.id.clone()).or_insert(index);
        self.items.push(rel);
    }

    /// Get a relationship by id; the first occurrence wins when the
    /// source file carried duplicates.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    /// First relationship of the given type in document order.
    pub fn first_of_type(&self, reltype: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.reltype == reltype)
    }

    /// All relationships of the given type in document order.
    pub fn of_type<'a>(&'a self, reltype: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.items.iter().filter(move |r| r.reltype == reltype)
    }

    /// Ids that appear more than once, in first-occurrence order.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for rel in &self.items {
            *counts.entry(rel.id.as_str()).or_insert(0) += 1;
        }
        let mut seen: Vec<&str> = Vec::new();
        for rel in &self.items {
            if counts[rel.id.as_str()] > 1 && !seen.contains(&rel.id.as_str()) {
                seen.push(&rel.id);
            }
        }
        seen
    }

    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &[u8] = br#"<?xml version="1.0"?>
        <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://example.com/master" Target="slideMasters/slideMaster1.xml"/>
            <Relationship Id="rId2" Type="http://example.com/slide" Target="slides/slide1.xml"/>
            <Relationship Id="rId3" Type="http://example.com/link" Target="https://example.com/" TargetMode="External"/>
        </Relationships>"#;

    #[test]
    fn test_parse_preserves_order() {
        let rels = Relationships::from_xml(RELS, "/ppt/presentation.xml").unwrap();
        assert_eq!(rels.len(), 3);
        let ids: Vec<&str> = rels.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["rId1", "rId2", "rId3"]);
    }

    #[test]
    fn test_lookup_and_type_filter() {
        let rels = Relationships::from_xml(RELS, "/ppt/presentation.xml").unwrap();
        assert_eq!(rels.get("rId2").unwrap().target, "slides/slide1.xml");
        assert!(rels.get("rId9").is_none());
        assert_eq!(
            rels.first_of_type("http://example.com/master").unwrap().id,
            "rId1"
        );
    }

    #[test]
    fn test_resolve_internal_and_external() {
        let rels = Relationships::from_xml(RELS, "/ppt/presentation.xml").unwrap();
        match rels.get("rId2").unwrap().resolve("/ppt") {
            ResolvedTarget::Part(uri) => assert_eq!(uri.as_str(), "/ppt/slides/slide1.xml"),
            other => panic!("unexpected resolution: {:?}", other),
        }
        match rels.get("rId3").unwrap().resolve("/ppt") {
            ResolvedTarget::External(url) => assert_eq!(url, "https://example.com/"),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_escape() {
        let rel = Relationship {
            id: "rId1".to_string(),
            reltype: "t".to_string(),
            target: "../../evil.xml".to_string(),
            is_external: false,
        };
        assert!(matches!(rel.resolve("/ppt"), ResolvedTarget::Escaped(_)));
    }

    #[test]
    fn test_duplicate_ids() {
        let mut rels = Relationships::new("/");
        for target in ["a.xml", "b.xml"] {
            rels.add(Relationship {
                id: "rId1".to_string(),
                reltype: "t".to_string(),
                target: target.to_string(),
                is_external: false,
            });
        }
        assert_eq!(rels.duplicate_ids(), ["rId1"]);
        // First occurrence wins on lookup.
        assert_eq!(rels.get("rId1").unwrap().target, "a.xml");
    }
}
