//! Element constraint tables for the PresentationML/DrawingML core.
//!
//! The registry is built once and shared by reference across
//! validations. Models cover the parts a presentation package carries:
//! presentation.xml, slides, layouts, masters, and themes. Elements
//! outside the table are simply not schema-checked.

use crate::findings::FileFormat;
use crate::namespaces::ns;
use crate::schema::particle::{NsConstraint, Occurs, Particle};
use crate::schema::types::XsdType;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Descriptor for one attribute of an element.
#[derive(Debug, Clone)]
pub struct AttributeConstraint {
    pub ns: Option<&'static str>,
    pub local: &'static str,
    pub ty: XsdType,
    pub required: bool,
    /// First format version the attribute exists in.
    pub since: FileFormat,
}

/// Descriptor for one element: attributes, content model, availability.
#[derive(Debug, Clone)]
pub struct ElementConstraint {
    pub ns: &'static str,
    pub local: &'static str,
    pub attrs: Vec<AttributeConstraint>,
    /// None means the element's children are not modeled (open content).
    pub content: Option<Particle>,
    pub since: FileFormat,
}

/// Element and group tables, built once.
pub struct SchemaRegistry {
    elements: HashMap<String, ElementConstraint>,
    groups: HashMap<&'static str, Particle>,
}

impl SchemaRegistry {
    pub fn get(&self, ns: &str, local: &str) -> Option<&ElementConstraint> {
        self.elements.get(&format!("{{{}}}{}", ns, local))
    }

    pub fn groups(&self) -> &HashMap<&'static str, Particle> {
        &self.groups
    }

    fn register(&mut self, constraint: ElementConstraint) {
        let key = format!("{{{}}}{}", constraint.ns, constraint.local);
        self.elements.insert(key, constraint);
    }
}

/// The shared registry.
pub fn registry() -> &'static SchemaRegistry {
    static REGISTRY: Lazy<SchemaRegistry> = Lazy::new(build_registry);
    &REGISTRY
}

// ST_Coordinate and friends, in EMU.
const COORD_MIN: i64 = -27273042329600;
const COORD_MAX: i64 = 27273042316900;
const SLIDE_SIZE_MIN: i64 = 914400;
const SLIDE_SIZE_MAX: i64 = 51206400;

const SLIDE_SIZE_TYPES: &[&str] = &[
    "screen4x3", "letter", "A4", "35mm", "overhead", "banner", "custom", "ledger", "A3",
    "B4ISO", "B5ISO", "B4JIS", "B5JIS", "hagakiCard", "screen16x9", "screen16x10",
];

const COLOR_SCHEME_SLOTS: &[&str] = &[
    "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5",
    "accent6", "hlink", "folHlink",
];

fn opt(local: &'static str, ty: XsdType) -> AttributeConstraint {
    AttributeConstraint {
        ns: None,
        local,
        ty,
        required: false,
        since: FileFormat::Office2007,
    }
}

fn req(local: &'static str, ty: XsdType) -> AttributeConstraint {
    AttributeConstraint {
        required: true,
        ..opt(local, ty)
    }
}

fn req_rid() -> AttributeConstraint {
    AttributeConstraint {
        ns: Some(ns::DOC_RELATIONSHIPS),
        local: "id",
        ty: XsdType::string(),
        required: true,
        since: FileFormat::Office2007,
    }
}

fn since(version: FileFormat, attr: AttributeConstraint) -> AttributeConstraint {
    AttributeConstraint {
        since: version,
        ..attr
    }
}

fn el(ns: &'static str, local: &'static str, min: u32, max: Occurs) -> Particle {
    Particle::Element {
        ns,
        local,
        min,
        max,
    }
}

fn one(ns: &'static str, local: &'static str) -> Particle {
    el(ns, local, 1, Occurs::Bounded(1))
}

fn optional(ns: &'static str, local: &'static str) -> Particle {
    el(ns, local, 0, Occurs::Bounded(1))
}

fn many(ns: &'static str, local: &'static str) -> Particle {
    el(ns, local, 0, Occurs::Unbounded)
}

fn seq(items: Vec<Particle>) -> Particle {
    Particle::Sequence {
        items,
        min: 1,
        max: Occurs::Bounded(1),
    }
}

fn any_other() -> Particle {
    Particle::Any {
        ns: NsConstraint::Other,
        min: 0,
        max: Occurs::Unbounded,
    }
}

fn any_ns() -> Particle {
    Particle::Any {
        ns: NsConstraint::Any,
        min: 0,
        max: Occurs::Unbounded,
    }
}

fn simple(ns: &'static str, local: &'static str, attrs: Vec<AttributeConstraint>) -> ElementConstraint {
    ElementConstraint {
        ns,
        local,
        attrs,
        content: None,
        since: FileFormat::Office2007,
    }
}

fn with_content(
    ns: &'static str,
    local: &'static str,
    attrs: Vec<AttributeConstraint>,
    content: Particle,
) -> ElementConstraint {
    ElementConstraint {
        ns,
        local,
        attrs,
        content: Some(content),
        since: FileFormat::Office2007,
    }
}

fn build_registry() -> SchemaRegistry {
    let p = ns::PRESENTATIONML;
    let a = ns::DRAWINGML;

    let mut groups: HashMap<&'static str, Particle> = HashMap::new();
    groups.insert(
        "EG_ShapeChoice",
        Particle::Choice {
            items: vec![
                one(p, "sp"),
                one(p, "grpSp"),
                one(p, "graphicFrame"),
                one(p, "cxnSp"),
                one(p, "pic"),
                one(p, "contentPart"),
            ],
            min: 1,
            max: Occurs::Bounded(1),
        },
    );
    groups.insert(
        "EG_ColorChoice",
        Particle::Choice {
            items: vec![
                one(a, "scrgbClr"),
                one(a, "srgbClr"),
                one(a, "hslClr"),
                one(a, "sysClr"),
                one(a, "schemeClr"),
                one(a, "prstClr"),
            ],
            min: 1,
            max: Occurs::Bounded(1),
        },
    );

    let mut registry = SchemaRegistry {
        elements: HashMap::new(),
        groups,
    };

    // --- presentation.xml -------------------------------------------------

    registry.register(with_content(
        p,
        "presentation",
        vec![
            opt("serverZoom", XsdType::string()),
            opt("firstSlideNum", XsdType::int()),
            opt("showSpecialPlsOnTitleSld", XsdType::Boolean),
            opt("rtl", XsdType::Boolean),
            opt("removePersonalInfoOnSave", XsdType::Boolean),
            opt("compatMode", XsdType::Boolean),
            opt("strictFirstAndLastChars", XsdType::Boolean),
            opt("embedTrueTypeFonts", XsdType::Boolean),
            opt("saveSubsetFonts", XsdType::Boolean),
            opt("autoCompressPictures", XsdType::Boolean),
            opt("bookmarkIdSeed", XsdType::integer(Some(1), Some(2147483647))),
            since(
                FileFormat::Office2010,
                opt("conformance", XsdType::enumeration(&["strict", "transitional"])),
            ),
        ],
        seq(vec![
            optional(p, "sldMasterIdLst"),
            optional(p, "notesMasterIdLst"),
            optional(p, "handoutMasterIdLst"),
            optional(p, "sldIdLst"),
            optional(p, "sldSz"),
            one(p, "notesSz"),
            optional(p, "smartTags"),
            optional(p, "embeddedFontLst"),
            optional(p, "custShowLst"),
            optional(p, "photoAlbum"),
            optional(p, "custDataLst"),
            optional(p, "kinsoku"),
            optional(p, "defaultTextStyle"),
            optional(p, "modifyVerifier"),
            optional(p, "extLst"),
            any_other(),
        ]),
    ));

    registry.register(with_content(
        p,
        "sldMasterIdLst",
        vec![],
        seq(vec![many(p, "sldMasterId")]),
    ));
    registry.register(simple(
        p,
        "sldMasterId",
        vec![
            opt("id", XsdType::integer(Some(2147483648), Some(4294967295))),
            req_rid(),
        ],
    ));

    registry.register(with_content(
        p,
        "notesMasterIdLst",
        vec![],
        seq(vec![optional(p, "notesMasterId")]),
    ));
    registry.register(simple(p, "notesMasterId", vec![req_rid()]));

    registry.register(with_content(
        p,
        "handoutMasterIdLst",
        vec![],
        seq(vec![optional(p, "handoutMasterId")]),
    ));
    registry.register(simple(p, "handoutMasterId", vec![req_rid()]));

    registry.register(with_content(
        p,
        "sldIdLst",
        vec![],
        seq(vec![many(p, "sldId")]),
    ));
    registry.register(simple(
        p,
        "sldId",
        vec![
            req("id", XsdType::integer(Some(256), Some(2147483647))),
            req_rid(),
        ],
    ));

    registry.register(simple(
        p,
        "sldSz",
        vec![
            req("cx", XsdType::integer(Some(SLIDE_SIZE_MIN), Some(SLIDE_SIZE_MAX))),
            req("cy", XsdType::integer(Some(SLIDE_SIZE_MIN), Some(SLIDE_SIZE_MAX))),
            opt("type", XsdType::enumeration(SLIDE_SIZE_TYPES)),
        ],
    ));
    registry.register(simple(
        p,
        "notesSz",
        vec![
            req("cx", XsdType::integer(Some(1), Some(COORD_MAX))),
            req("cy", XsdType::integer(Some(1), Some(COORD_MAX))),
        ],
    ));

    // --- slide / layout / master shells -----------------------------------

    registry.register(with_content(
        p,
        "sld",
        vec![
            opt("showMasterSp", XsdType::Boolean),
            opt("showMasterPhAnim", XsdType::Boolean),
            opt("show", XsdType::Boolean),
        ],
        seq(vec![
            one(p, "cSld"),
            optional(p, "clrMapOvr"),
            optional(p, "transition"),
            optional(p, "timing"),
            optional(p, "extLst"),
            any_other(),
        ]),
    ));

    registry.register(with_content(
        p,
        "sldLayout",
        vec![
            opt("matchingName", XsdType::string()),
            opt("type", XsdType::string()),
            opt("preserve", XsdType::Boolean),
            opt("userDrawn", XsdType::Boolean),
            opt("showMasterSp", XsdType::Boolean),
            opt("showMasterPhAnim", XsdType::Boolean),
        ],
        seq(vec![
            one(p, "cSld"),
            optional(p, "clrMapOvr"),
            optional(p, "transition"),
            optional(p, "timing"),
            optional(p, "hf"),
            optional(p, "extLst"),
            any_other(),
        ]),
    ));

    registry.register(with_content(
        p,
        "sldMaster",
        vec![opt("preserve", XsdType::Boolean)],
        seq(vec![
            one(p, "cSld"),
            one(p, "clrMap"),
            optional(p, "sldLayoutIdLst"),
            optional(p, "transition"),
            optional(p, "timing"),
            optional(p, "hf"),
            optional(p, "txStyles"),
            optional(p, "extLst"),
            any_other(),
        ]),
    ));

    registry.register(with_content(
        p,
        "sldLayoutIdLst",
        vec![],
        seq(vec![many(p, "sldLayoutId")]),
    ));
    registry.register(simple(
        p,
        "sldLayoutId",
        vec![
            opt("id", XsdType::integer(Some(2147483648), Some(4294967295))),
            req_rid(),
        ],
    ));

    let clr_map_attrs: Vec<AttributeConstraint> = COLOR_SCHEME_SLOTS
        .iter()
        .map(|&slot| req(slot, XsdType::enumeration(COLOR_SCHEME_SLOTS)))
        .collect();
    registry.register(simple(p, "clrMap", clr_map_attrs.clone()));

    registry.register(with_content(
        p,
        "clrMapOvr",
        vec![],
        seq(vec![Particle::Choice {
            items: vec![one(a, "masterClrMapping"), one(a, "overrideClrMapping")],
            min: 1,
            max: Occurs::Bounded(1),
        }]),
    ));
    registry.register(simple(a, "masterClrMapping", vec![]));
    registry.register(simple(a, "overrideClrMapping", clr_map_attrs));

    // --- common slide data and the shape tree ------------------------------

    registry.register(with_content(
        p,
        "cSld",
        vec![opt("name", XsdType::string_max_len(255))],
        seq(vec![
            optional(p, "bg"),
            one(p, "spTree"),
            optional(p, "custDataLst"),
            optional(p, "controls"),
            optional(p, "extLst"),
            any_other(),
        ]),
    ));

    registry.register(with_content(
        p,
        "spTree",
        vec![],
        seq(vec![
            one(p, "nvGrpSpPr"),
            one(p, "grpSpPr"),
            Particle::Group {
                name: "EG_ShapeChoice",
                min: 0,
                max: Occurs::Unbounded,
            },
            optional(p, "extLst"),
            any_other(),
        ]),
    ));

    registry.register(with_content(
        p,
        "sp",
        vec![opt("useBgFill", XsdType::Boolean)],
        seq(vec![
            one(p, "nvSpPr"),
            one(p, "spPr"),
            optional(p, "style"),
            optional(p, "txBody"),
            optional(p, "extLst"),
            any_other(),
        ]),
    ));

    registry.register(with_content(
        p,
        "nvSpPr",
        vec![],
        seq(vec![one(p, "cNvPr"), one(p, "cNvSpPr"), one(p, "nvPr")]),
    ));
    registry.register(with_content(
        p,
        "nvGrpSpPr",
        vec![],
        seq(vec![one(p, "cNvPr"), one(p, "cNvGrpSpPr"), one(p, "nvPr")]),
    ));
    registry.register(with_content(
        p,
        "nvPicPr",
        vec![],
        seq(vec![one(p, "cNvPr"), one(p, "cNvPicPr"), one(p, "nvPr")]),
    ));

    registry.register(simple(
        p,
        "cNvPr",
        vec![
            req("id", XsdType::unsigned_int()),
            req("name", XsdType::string()),
            opt("descr", XsdType::string()),
            opt("hidden", XsdType::Boolean),
            since(FileFormat::Office2010, opt("title", XsdType::string())),
        ],
    ));
    registry.register(simple(p, "cNvSpPr", vec![opt("txBox", XsdType::Boolean)]));
    registry.register(simple(
        p,
        "cNvGrpSpPr",
        vec![],
    ));
    registry.register(simple(
        p,
        "cNvPicPr",
        vec![opt("preferRelativeResize", XsdType::Boolean)],
    ));

    // spPr/grpSpPr carry DrawingML content; only the transform is modeled.
    registry.register(with_content(
        p,
        "spPr",
        vec![opt("bwMode", XsdType::string())],
        seq(vec![optional(a, "xfrm"), any_ns()]),
    ));
    registry.register(with_content(
        p,
        "grpSpPr",
        vec![opt("bwMode", XsdType::string())],
        seq(vec![optional(a, "xfrm"), any_ns()]),
    ));

    registry.register(with_content(
        a,
        "xfrm",
        vec![
            opt("rot", XsdType::int()),
            opt("flipH", XsdType::Boolean),
            opt("flipV", XsdType::Boolean),
        ],
        seq(vec![
            optional(a, "off"),
            optional(a, "ext"),
            optional(a, "chOff"),
            optional(a, "chExt"),
        ]),
    ));
    registry.register(simple(
        a,
        "off",
        vec![
            req("x", XsdType::integer(Some(COORD_MIN), Some(COORD_MAX))),
            req("y", XsdType::integer(Some(COORD_MIN), Some(COORD_MAX))),
        ],
    ));
    registry.register(simple(
        a,
        "ext",
        vec![
            req("cx", XsdType::integer(Some(0), Some(COORD_MAX))),
            req("cy", XsdType::integer(Some(0), Some(COORD_MAX))),
        ],
    ));
    registry.register(simple(
        a,
        "chOff",
        vec![
            req("x", XsdType::integer(Some(COORD_MIN), Some(COORD_MAX))),
            req("y", XsdType::integer(Some(COORD_MIN), Some(COORD_MAX))),
        ],
    ));
    registry.register(simple(
        a,
        "chExt",
        vec![
            req("cx", XsdType::integer(Some(0), Some(COORD_MAX))),
            req("cy", XsdType::integer(Some(0), Some(COORD_MAX))),
        ],
    ));

    // --- theme --------------------------------------------------------------

    registry.register(with_content(
        a,
        "theme",
        vec![opt("name", XsdType::string())],
        seq(vec![
            one(a, "themeElements"),
            optional(a, "objectDefaults"),
            optional(a, "extraClrSchemeLst"),
            optional(a, "custClrLst"),
            optional(a, "extLst"),
        ]),
    ));
    registry.register(with_content(
        a,
        "themeElements",
        vec![],
        seq(vec![
            one(a, "clrScheme"),
            one(a, "fontScheme"),
            one(a, "fmtScheme"),
            optional(a, "extLst"),
        ]),
    ));

    let clr_scheme_content = seq(COLOR_SCHEME_SLOTS
        .iter()
        .map(|&slot| one(a, slot))
        .collect());
    registry.register(with_content(
        a,
        "clrScheme",
        vec![req("name", XsdType::string())],
        clr_scheme_content,
    ));
    for &slot in COLOR_SCHEME_SLOTS {
        registry.register(with_content(
            a,
            slot,
            vec![],
            seq(vec![Particle::Group {
                name: "EG_ColorChoice",
                min: 1,
                max: Occurs::Bounded(1),
            }]),
        ));
    }
    registry.register(simple(
        a,
        "srgbClr",
        vec![req("val", XsdType::pattern("[0-9A-Fa-f]{6}"))],
    ));
    registry.register(simple(
        a,
        "sysClr",
        vec![
            req("val", XsdType::string()),
            opt("lastClr", XsdType::pattern("[0-9A-Fa-f]{6}")),
        ],
    ));
    registry.register(simple(
        a,
        "schemeClr",
        vec![req("val", XsdType::string())],
    ));

    registry.register(with_content(
        a,
        "fontScheme",
        vec![req("name", XsdType::string())],
        seq(vec![
            one(a, "majorFont"),
            one(a, "minorFont"),
            optional(a, "extLst"),
        ]),
    ));
    for font in ["majorFont", "minorFont"] {
        registry.register(with_content(
            a,
            font,
            vec![],
            seq(vec![
                one(a, "latin"),
                one(a, "ea"),
                one(a, "cs"),
                many(a, "font"),
                optional(a, "extLst"),
            ]),
        ));
    }
    for face in ["latin", "ea", "cs"] {
        registry.register(simple(
            a,
            face,
            vec![
                req("typeface", XsdType::string()),
                opt("panose", XsdType::pattern("[0-9A-Fa-f]{20}")),
                opt("pitchFamily", XsdType::integer(Some(-128), Some(127))),
                opt("charset", XsdType::integer(Some(-128), Some(127))),
            ],
        ));
    }

    registry.register(with_content(
        a,
        "fmtScheme",
        vec![opt("name", XsdType::string())],
        seq(vec![
            one(a, "fillStyleLst"),
            one(a, "lnStyleLst"),
            one(a, "effectStyleLst"),
            one(a, "bgFillStyleLst"),
        ]),
    ));
    for lst in ["fillStyleLst", "lnStyleLst", "effectStyleLst", "bgFillStyleLst"] {
        registry.register(with_content(a, lst, vec![], seq(vec![any_ns()])));
    }

    // 2010+ extension surface, version-gated.
    registry.register(ElementConstraint {
        ns: p,
        local: "contentPart",
        attrs: vec![AttributeConstraint {
            ns: Some(ns::DOC_RELATIONSHIPS),
            local: "id",
            ty: XsdType::string(),
            required: true,
            since: FileFormat::Office2010,
        }],
        content: None,
        since: FileFormat::Office2010,
    });

    registry
}
