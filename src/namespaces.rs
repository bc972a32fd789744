//! Constant values for Open XML namespaces, content types, and
//! relationship types.
//!
//! The canonical prefix tables are used when rendering element paths in
//! findings and when resolving prefixed names in the embedded rule
//! inventory.

use phf::phf_map;

/// XML namespace URIs used in OPC packages and OOXML markup.
pub mod ns {
    /// OPC content types namespace ([Content_Types].xml)
    pub const CONTENT_TYPES: &str =
        "http://schemas.openxmlformats.org/package/2006/content-types";

    /// OPC relationships namespace (.rels files)
    pub const PKG_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";

    /// Office document relationships namespace (r:id attributes)
    pub const DOC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// PresentationML main namespace
    pub const PRESENTATIONML: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML main namespace
    pub const DRAWINGML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// DrawingML chart namespace
    pub const DRAWINGML_CHART: &str =
        "http://schemas.openxmlformats.org/drawingml/2006/chart";

    /// DrawingML picture namespace
    pub const DRAWINGML_PICTURE: &str =
        "http://schemas.openxmlformats.org/drawingml/2006/picture";

    /// WordprocessingML main namespace
    pub const WORDPROCESSINGML: &str =
        "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    /// SpreadsheetML main namespace
    pub const SPREADSHEETML: &str =
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

    /// Markup Compatibility namespace
    pub const MARKUP_COMPATIBILITY: &str =
        "http://schemas.openxmlformats.org/markup-compatibility/2006";

    /// The reserved xml: namespace
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Content type URIs (like MIME-types) that specify a part's format.
pub mod content_type {
    pub const OPC_RELATIONSHIPS: &str =
        "application/vnd.openxmlformats-package.relationships+xml";

    pub const PML_PRESENTATION_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const PML_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const PML_SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const PML_SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
    pub const PML_NOTES_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml";
    pub const PML_NOTES_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";

    pub const WML_DOCUMENT_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const SML_SHEET_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

    pub const OFC_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

    pub const XML: &str = "application/xml";
}

/// Relationship type URIs.
pub mod relationship_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// ISO strict variant of the main-document role.
    pub const OFFICE_DOCUMENT_STRICT: &str =
        "http://purl.oclc.org/ooxml/officeDocument/relationships/officeDocument";

    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const NOTES_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster";
    pub const HANDOUT_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/handoutMaster";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const FONT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/font";
}

/// Open XML relationship target modes.
pub mod target_mode {
    pub const INTERNAL: &str = "Internal";
    pub const EXTERNAL: &str = "External";
}

/// Canonical prefix -> namespace URI table.
///
/// `r` is the officeDocument relationships namespace because that is
/// what `r:id` attributes and rule contexts mean in document markup.
static PREFIX_TO_URI: phf::Map<&'static str, &'static str> = phf_map! {
    "ct" => "http://schemas.openxmlformats.org/package/2006/content-types",
    "rels" => "http://schemas.openxmlformats.org/package/2006/relationships",
    "r" => "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    "p" => "http://schemas.openxmlformats.org/presentationml/2006/main",
    "a" => "http://schemas.openxmlformats.org/drawingml/2006/main",
    "pic" => "http://schemas.openxmlformats.org/drawingml/2006/picture",
    "c" => "http://schemas.openxmlformats.org/drawingml/2006/chart",
    "w" => "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
    "x" => "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
    "mc" => "http://schemas.openxmlformats.org/markup-compatibility/2006",
    "xml" => "http://www.w3.org/XML/1998/namespace",
};

/// Reverse table: namespace URI -> canonical prefix.
static URI_TO_PREFIX: phf::Map<&'static str, &'static str> = phf_map! {
    "http://schemas.openxmlformats.org/package/2006/content-types" => "ct",
    "http://schemas.openxmlformats.org/package/2006/relationships" => "rels",
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships" => "r",
    "http://schemas.openxmlformats.org/presentationml/2006/main" => "p",
    "http://schemas.openxmlformats.org/drawingml/2006/main" => "a",
    "http://schemas.openxmlformats.org/drawingml/2006/picture" => "pic",
    "http://schemas.openxmlformats.org/drawingml/2006/chart" => "c",
    "http://schemas.openxmlformats.org/wordprocessingml/2006/main" => "w",
    "http://schemas.openxmlformats.org/spreadsheetml/2006/main" => "x",
    "http://schemas.openxmlformats.org/markup-compatibility/2006" => "mc",
    "http://www.w3.org/XML/1998/namespace" => "xml",
};

/// Look up the namespace URI for a canonical prefix.
pub fn uri_for(prefix: &str) -> Option<&'static str> {
    PREFIX_TO_URI.get(prefix).copied()
}

/// Look up the canonical prefix for a namespace URI.
pub fn prefix_for(uri: &str) -> Option<&'static str> {
    URI_TO_PREFIX.get(uri).copied()
}

/// Build a Clark-notation qualified name, `{namespace}local`.
pub fn clark(namespace: &str, local: &str) -> String {
    format!("{{{}}}{}", namespace, local)
}
