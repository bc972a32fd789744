//! Parts: individually addressable payloads inside an OPC package.
//!
//! The XML tree and the relationships collection are materialized on
//! first access and cached for the lifetime of the part. Re-running a
//! validation over the same bytes always reproduces the same tree.

use crate::opc::packuri::PackUri;
use crate::opc::rel::Relationships;
use crate::xml::{self, XmlElement};
use once_cell::unsync::OnceCell;

/// A named XML or binary item inside the archive.
pub struct Part {
    uri: PackUri,
    content_type: Option<String>,
    blob: Vec<u8>,
    rels_blob: Option<Vec<u8>>,
    xml: OnceCell<Result<XmlElement, String>>,
    rels: OnceCell<(Relationships, Option<String>)>,
}

impl Part {
    pub fn new(
        uri: PackUri,
        content_type: Option<String>,
        blob: Vec<u8>,
        rels_blob: Option<Vec<u8>>,
    ) -> Self {
        Self {
            uri,
            content_type,
            blob,
            rels_blob,
            xml: OnceCell::new(),
            rels: OnceCell::new(),
        }
    }

    pub fn uri(&self) -> &PackUri {
        &self.uri
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Whether the declared content type marks this part as XML.
    pub fn is_xml(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.ends_with("+xml") || ct.ends_with("/xml"))
            .unwrap_or(false)
    }

    /// The parsed XML root, materialized on first access.
    ///
    /// The error message is cached too, so repeated calls report the
    /// same parse failure without re-parsing.
    pub fn xml(&self) -> Result<&XmlElement, &str> {
        match self.xml.get_or_init(|| xml::parse_document(&self.blob)) {
            Ok(root) => Ok(root),
            Err(msg) => Err(msg.as_str()),
        }
    }

    /// The part's relationships, loaded from `{dir}/_rels/{name}.rels`.
    /// A missing file means an empty collection.
    pub fn rels(&self) -> &Relationships {
        &self.load_rels().0
    }

    /// Parse error from the part's .rels file, if it had one.
    pub fn rels_error(&self) -> Option<&str> {
        self.load_rels().1.as_deref()
    }

    fn load_rels(&self) -> &(Relationships, Option<String>) {
        self.rels.get_or_init(|| match &self.rels_blob {
            Some(blob) => match Relationships::from_xml(blob, self.uri.as_str()) {
                Ok(rels) => (rels, None),
                Err(msg) => (Relationships::new(self.uri.as_str()), Some(msg)),
            },
            None => (Relationships::new(self.uri.as_str()), None),
        })
    }
}
