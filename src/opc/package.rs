//! The OPC package: archive decoding, mandatory-entry checks, and the
//! part registry.

use crate::error::{Error, Result};
use crate::findings::{codes, Category, Finding, Severity};
use crate::namespaces::relationship_type;
use crate::opc::content_types::ContentTypeMap;
use crate::opc::packuri::{PackUri, CONTENT_TYPES_URI, PACKAGE_URI};
use crate::opc::part::Part;
use crate::opc::rel::{Relationships, ResolvedTarget};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

const PACKAGE_RELS_ENTRY: &str = "_rels/.rels";

/// One document archive: content-type table, package relationships, and
/// the registry of user-visible parts in archive order.
///
/// Structural problems found while opening (missing mandatory entries,
/// malformed auxiliary XML, hostile entry names) are collected as
/// findings rather than hard errors, so validation can report them.
pub struct Package {
    parts: Vec<Part>,
    index: HashMap<String, usize>,
    content_types: ContentTypeMap,
    rels: Relationships,
    main_part: Option<PackUri>,
    findings: Vec<Finding>,
}

impl Package {
    /// Open a package from a file on disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::PackageNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Open a package from a byte buffer.
    ///
    /// Returns `Err` when the bytes are not a ZIP archive at all; the
    /// caller reports that as a `package.not-a-container` finding.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::NotAContainer(e.to_string()))?;
        let mut findings: Vec<Finding> = Vec::new();

        // Decode every entry up front, in archive order.
        let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(archive.len());
        let mut entry_index: HashMap<String, usize> = HashMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            if !is_safe_entry_name(&name) {
                findings.push(
                    Finding::new(
                        Category::Package,
                        Severity::Error,
                        format!("Archive entry '{}' escapes the package root", name),
                    )
                    .with_part(format!("/{}", name))
                    .with_rule(codes::DIRECTORY_TRAVERSAL),
                );
                continue;
            }
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            entry_index.insert(name.clone(), entries.len());
            entries.push((name, blob));
        }

        let content_types = match entry_index.get(CONTENT_TYPES_URI.trim_start_matches('/')) {
            Some(&i) => match ContentTypeMap::from_xml(&entries[i].1) {
                Ok(map) => map,
                Err(msg) => {
                    findings.push(
                        Finding::new(
                            Category::Package,
                            Severity::Error,
                            format!("Error parsing [Content_Types].xml: {}", msg),
                        )
                        .with_part(CONTENT_TYPES_URI)
                        .with_rule(codes::PACKAGE_MALFORMED_XML),
                    );
                    ContentTypeMap::new()
                }
            },
            None => {
                findings.push(
                    Finding::new(
                        Category::Package,
                        Severity::Error,
                        "Missing [Content_Types].xml",
                    )
                    .with_part(CONTENT_TYPES_URI)
                    .with_rule(codes::MISSING_REQUIRED_PART),
                );
                ContentTypeMap::new()
            }
        };

        let mut have_pkg_rels = false;
        let rels = match entry_index.get(PACKAGE_RELS_ENTRY) {
            Some(&i) => match Relationships::from_xml(&entries[i].1, PACKAGE_URI) {
                Ok(rels) => {
                    have_pkg_rels = true;
                    rels
                }
                Err(msg) => {
                    findings.push(
                        Finding::new(
                            Category::Package,
                            Severity::Error,
                            format!("Error parsing _rels/.rels: {}", msg),
                        )
                        .with_part("/_rels/.rels")
                        .with_rule(codes::PACKAGE_MALFORMED_XML),
                    );
                    Relationships::new(PACKAGE_URI)
                }
            },
            None => {
                findings.push(
                    Finding::new(Category::Package, Severity::Error, "Missing _rels/.rels")
                        .with_part("/_rels/.rels")
                        .with_rule(codes::MISSING_REQUIRED_PART),
                );
                Relationships::new(PACKAGE_URI)
            }
        };

        // Build the part registry: every entry except the content-type
        // dictionary and relationship auxiliaries.
        let mut parts: Vec<Part> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (name, blob) in &entries {
            if name == CONTENT_TYPES_URI.trim_start_matches('/') || is_rels_entry(name) {
                continue;
            }
            let uri = match PackUri::new(format!("/{}", name)) {
                Ok(uri) => uri,
                Err(_) => continue,
            };
            let content_type = content_types.get(&uri).map(str::to_string);
            if content_type.is_none() {
                findings.push(
                    Finding::new(
                        Category::Package,
                        Severity::Error,
                        format!("No content type declared for part '{}'", uri),
                    )
                    .with_part(uri.as_str())
                    .with_rule(codes::UNKNOWN_CONTENT_TYPE),
                );
            }
            let rels_blob = entry_index
                .get(uri.rels_uri().membername())
                .map(|&i| entries[i].1.clone());
            index.insert(uri.as_str().to_string(), parts.len());
            parts.push(Part::new(uri, content_type, blob.clone(), rels_blob));
        }

        // The main-document role must be declared and its target present.
        let mut main_part = None;
        if have_pkg_rels {
            let main_rel = rels
                .first_of_type(relationship_type::OFFICE_DOCUMENT)
                .or_else(|| rels.first_of_type(relationship_type::OFFICE_DOCUMENT_STRICT));
            match main_rel {
                None => {
                    findings.push(
                        Finding::new(
                            Category::Relationship,
                            Severity::Error,
                            "Missing main document relationship (officeDocument)",
                        )
                        .with_part("/_rels/.rels")
                        .with_rule(codes::MISSING_MAIN_DOCUMENT),
                    );
                }
                Some(rel) => match rel.resolve(PACKAGE_URI) {
                    ResolvedTarget::Part(uri) => {
                        if index.contains_key(uri.as_str()) {
                            main_part = Some(uri);
                        } else {
                            findings.push(
                                Finding::new(
                                    Category::Package,
                                    Severity::Error,
                                    format!("Main document part not found: {}", uri),
                                )
                                .with_part(uri.as_str())
                                .with_rule(codes::MISSING_REQUIRED_PART),
                            );
                        }
                    }
                    ResolvedTarget::Escaped(target) => {
                        findings.push(
                            Finding::new(
                                Category::Relationship,
                                Severity::Error,
                                format!(
                                    "Main document target '{}' escapes the package root",
                                    target
                                ),
                            )
                            .with_part("/_rels/.rels")
                            .with_node(rel.id.clone())
                            .with_rule(codes::RELATIONSHIP_ESCAPE),
                        );
                    }
                    ResolvedTarget::External(_) => {
                        findings.push(
                            Finding::new(
                                Category::Relationship,
                                Severity::Error,
                                "Main document relationship must be internal",
                            )
                            .with_part("/_rels/.rels")
                            .with_node(rel.id.clone())
                            .with_rule(codes::MISSING_MAIN_DOCUMENT),
                        );
                    }
                },
            }
        }

        Ok(Self {
            parts,
            index,
            content_types,
            rels,
            main_part,
            findings,
        })
    }

    /// Findings collected while opening the package (phase 1).
    pub fn structure_findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Whether a later validation phase can do anything useful: mandatory
    /// entries were present, parseable, and the main document exists.
    pub fn is_traversable(&self) -> bool {
        self.main_part.is_some()
            && !self.findings.iter().any(|f| {
                f.rule == codes::MISSING_REQUIRED_PART || f.rule == codes::PACKAGE_MALFORMED_XML
            })
    }

    /// User-visible parts, in archive order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, uri: &str) -> Option<&Part> {
        self.index.get(uri).map(|&i| &self.parts[i])
    }

    pub fn has_part(&self, uri: &str) -> bool {
        self.index.contains_key(uri)
    }

    /// The main-document part URI (presentation.xml, document.xml, or
    /// workbook.xml), when resolvable.
    pub fn main_part(&self) -> Option<&PackUri> {
        self.main_part.as_ref()
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    pub fn content_types(&self) -> &ContentTypeMap {
        &self.content_types
    }
}

/// Reject archive entry names that could escape the extraction root.
fn is_safe_entry_name(name: &str) -> bool {
    if name.starts_with('/') || name.contains('\\') || name.contains(':') {
        return false;
    }
    !name.split('/').any(|segment| segment == "..")
}

/// Relationship auxiliaries live in `_rels/` directories and are not
/// user-visible parts.
fn is_rels_entry(name: &str) -> bool {
    name.split('/').any(|segment| segment == "_rels")
}
