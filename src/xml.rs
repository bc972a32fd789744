//! Owned XML tree for validation traversal.
//!
//! Parts are parsed once into an element tree that preserves namespace
//! bindings, attribute order, and child order. Parsing uses quick-xml
//! streaming events; prefix resolution is done with a binding stack so
//! the tree carries resolved namespace URIs on every name.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A namespace declaration carried on an element (`xmlns="…"` or
/// `xmlns:p="…"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    /// None for the default namespace declaration.
    pub prefix: Option<String>,
    pub uri: String,
}

/// An attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttr {
    pub ns: Option<String>,
    pub prefix: Option<String>,
    pub local: String,
    pub value: String,
}

/// One element of a parsed part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub ns: Option<String>,
    pub prefix: Option<String>,
    pub local: String,
    pub attrs: Vec<XmlAttr>,
    pub children: Vec<XmlElement>,
    pub text: String,
    /// Namespace declarations made on this element itself.
    pub ns_decls: Vec<NsDecl>,
}

impl XmlElement {
    /// Clark-notation qualified name, `{namespace}local`.
    pub fn clark(&self) -> String {
        match &self.ns {
            Some(ns) => format!("{{{}}}{}", ns, self.local),
            None => self.local.clone(),
        }
    }

    /// Whether the element has the given namespace and local name.
    pub fn is_named(&self, ns: &str, local: &str) -> bool {
        self.local == local && self.ns.as_deref() == Some(ns)
    }

    /// Look up an attribute value by namespace and local name.
    pub fn attr(&self, ns: Option<&str>, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.local == local && a.ns.as_deref() == ns)
            .map(|a| a.value.as_str())
    }

    /// Look up an un-namespaced attribute value by local name.
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attr(None, local)
    }

    /// First child with the given namespace and local name.
    pub fn find_child(&self, ns: &str, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is_named(ns, local))
    }

    /// All children with the given namespace and local name.
    pub fn children_named<'a>(
        &'a self,
        ns: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.is_named(ns, local))
    }

    /// Pre-order iterator over the element and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order descendant iterator, including the start element itself.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        // Push in reverse so children come out in document order.
        for child in next.children.iter().rev() {
            self.stack.push(child);
        }
        Some(next)
    }
}

/// Namespace binding stack used while parsing.
struct Bindings {
    frames: Vec<Vec<NsDecl>>,
}

impl Bindings {
    fn new() -> Self {
        Self {
            frames: vec![vec![NsDecl {
                prefix: Some("xml".to_string()),
                uri: crate::namespaces::ns::XML.to_string(),
            }]],
        }
    }

    fn push(&mut self, decls: Vec<NsDecl>) {
        self.frames.push(decls);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn resolve(&self, prefix: Option<&str>) -> Option<String> {
        for frame in self.frames.iter().rev() {
            for decl in frame {
                if decl.prefix.as_deref() == prefix {
                    if decl.uri.is_empty() {
                        // xmlns="" un-declares the default namespace.
                        return None;
                    }
                    return Some(decl.uri.clone());
                }
            }
        }
        None
    }
}

fn split_name(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, raw),
    }
}

fn build_element(
    start: &BytesStart<'_>,
    bindings: &mut Bindings,
) -> Result<XmlElement, String> {
    let raw_name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| format!("element name is not UTF-8: {}", e))?
        .to_string();

    // First pass: separate namespace declarations from ordinary attributes.
    let mut decls: Vec<NsDecl> = Vec::new();
    let mut raw_attrs: Vec<(String, String)> = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute: {}", e))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| format!("attribute name is not UTF-8: {}", e))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad attribute value: {}", e))?
            .to_string();

        if key == "xmlns" {
            decls.push(NsDecl {
                prefix: None,
                uri: value,
            });
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            decls.push(NsDecl {
                prefix: Some(prefix.to_string()),
                uri: value,
            });
        } else {
            raw_attrs.push((key, value));
        }
    }

    bindings.push(decls.clone());

    let (elem_prefix, elem_local) = split_name(&raw_name);
    let elem_ns = bindings.resolve(elem_prefix);

    let mut attrs = Vec::with_capacity(raw_attrs.len());
    for (key, value) in raw_attrs {
        let (prefix, local) = split_name(&key);
        // Per the XML namespaces spec, unprefixed attributes carry no
        // namespace (the default namespace does not apply).
        let ns = match prefix {
            Some(p) => bindings.resolve(Some(p)),
            None => None,
        };
        attrs.push(XmlAttr {
            ns,
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
            value,
        });
    }

    Ok(XmlElement {
        ns: elem_ns,
        prefix: elem_prefix.map(str::to_string),
        local: elem_local.to_string(),
        attrs,
        children: Vec::new(),
        text: String::new(),
        ns_decls: decls,
    })
}

/// Parse a document into its root element.
///
/// Returns a human-readable message on malformed input; callers map it
/// to a `schema.malformed-xml` or `package.malformed-xml` finding.
pub fn parse_document(xml: &[u8]) -> Result<XmlElement, String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut bindings = Bindings::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if root.is_some() && stack.is_empty() {
                    return Err("content after document root".to_string());
                }
                let elem = build_element(e, &mut bindings)?;
                stack.push(elem);
            }
            Ok(Event::Empty(ref e)) => {
                if root.is_some() && stack.is_empty() {
                    return Err("content after document root".to_string());
                }
                let elem = build_element(e, &mut bindings)?;
                bindings.pop();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => root = Some(elem),
                }
            }
            Ok(Event::End(_)) => {
                bindings.pop();
                let elem = stack
                    .pop()
                    .ok_or_else(|| "unbalanced end tag".to_string())?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => root = Some(elem),
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| format!("bad character data: {}", e))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = std::str::from_utf8(t)
                        .map_err(|e| format!("CDATA is not UTF-8: {}", e))?;
                    top.text.push_str(text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("XML parse error: {}", e)),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err("unexpected end of document".to_string());
    }
    root.ok_or_else(|| "document has no root element".to_string())
}
