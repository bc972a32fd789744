//! Embedded semantic rule inventory.
//!
//! A compact dump of the vendor Schematron rule set, produced at
//! packaging time. Each record carries the context element the rule
//! attaches to, the raw test expression, the application scope, and a
//! stable rule id. The loader classifies the test strings at runtime;
//! expressions outside the recognized grammar stay in the inventory and
//! are counted as unclassified.

/// One raw rule from the vendor dump.
#[derive(Debug, Clone, Copy)]
pub struct RawRule {
    pub id: &'static str,
    pub context: &'static str,
    pub test: &'static str,
    pub app: &'static str,
}

pub const RULES: &[RawRule] = &[
    // --- attribute value ranges ------------------------------------------
    RawRule { id: "pml-0101", context: "p:sldSz", test: "@cx >= 914400 and @cx <= 51206400", app: "PowerPoint" },
    RawRule { id: "pml-0102", context: "p:sldSz", test: "@cy >= 914400 and @cy <= 51206400", app: "PowerPoint" },
    RawRule { id: "pml-0103", context: "p:notesSz", test: "@cx >= 1 and @cx <= 27273042316900", app: "PowerPoint" },
    RawRule { id: "pml-0104", context: "p:notesSz", test: "@cy >= 1 and @cy <= 27273042316900", app: "PowerPoint" },
    RawRule { id: "pml-0105", context: "p:sldId", test: "@id >= 256 and @id <= 2147483647", app: "PowerPoint" },
    RawRule { id: "pml-0106", context: "p:bldP", test: "@grpId >= 0", app: "PowerPoint" },
    RawRule { id: "pml-0107", context: "p:sldMasterId", test: "@id >= 2147483648", app: "PowerPoint" },
    RawRule { id: "dml-0201", context: "a:spcPct", test: "@val >= 0 and @val <= 1000000", app: "All" },
    RawRule { id: "dml-0202", context: "a:normAutofit", test: "@fontScale >= 1000f and @fontScale <= 100000f", app: "All" },
    RawRule { id: "dml-0203", context: "a:alpha", test: "@val >= 0 and @val <= 100000", app: "All" },
    RawRule { id: "sml-0301", context: "x:sheetView", test: "@zoomScale >= 10 and @zoomScale <= 400", app: "Excel" },
    RawRule { id: "sml-0302", context: "x:col", test: "@min >= 1 and @min <= 16384", app: "Excel" },
    RawRule { id: "sml-0303", context: "x:pane", test: "@xSplit >= 0", app: "Excel" },
    RawRule { id: "sml-0304", context: "x:workbookView", test: "@activeTab <= 32767", app: "Excel" },
    RawRule { id: "wml-0401", context: "w:zoom", test: "@w:percent >= 10 and @w:percent <= 500", app: "Word" },
    RawRule { id: "c-0501", context: "c:max", test: "@val >= -1.7E308 and @val <= 1.7E308", app: "All" },
    RawRule { id: "c-0502", context: "c:min", test: "@val >= -1.7E308 and @val <= 1.7E308", app: "All" },
    RawRule { id: "c-0581", context: "c:lblOffset", test: "@val >= 0 and @val <= 1000", app: "All" },

    // --- attribute value lengths ------------------------------------------
    RawRule { id: "pml-0111", context: "p:cSld", test: "string-length(@name) <= 255", app: "PowerPoint" },
    RawRule { id: "pml-0112", context: "p:custShow", test: "string-length(@name) >= 1", app: "PowerPoint" },
    RawRule { id: "dml-0211", context: "a:latin", test: "string-length(@typeface) <= 255", app: "All" },
    RawRule { id: "sml-0311", context: "x:definedName", test: "string-length(@name) >= 1 and string-length(@name) <= 255", app: "Excel" },
    RawRule { id: "wml-0411", context: "w:bookmarkStart", test: "string-length(@w:name) <= 40", app: "Word" },

    // --- attribute value patterns -----------------------------------------
    RawRule { id: "dml-0221", context: "a:srgbClr", test: "matches(@val, '[0-9A-Fa-f]{6}')", app: "All" },
    RawRule { id: "dml-0222", context: "a:sysClr", test: "matches(@lastClr, '[0-9A-Fa-f]{6}')", app: "All" },
    RawRule { id: "wml-0421", context: "w:embedRegular", test: "matches(@w:fontKey, '\\{[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\\}')", app: "Word" },
    RawRule { id: "sml-0321", context: "x:color", test: "matches(@rgb, '[0-9A-Fa-f]{8}')", app: "Excel" },

    // --- uniqueness --------------------------------------------------------
    RawRule { id: "pml-0131", context: "p:sldIdLst", test: "count(distinct-values(p:sldId/@id)) = count(p:sldId/@id)", app: "PowerPoint" },
    RawRule { id: "pml-0132", context: "p:sldMasterIdLst", test: "count(distinct-values(p:sldMasterId/@id)) = count(p:sldMasterId/@id)", app: "PowerPoint" },
    RawRule { id: "pml-0133", context: "p:cSld", test: "count(distinct-values(.//p:cNvPr/@id)) = count(.//p:cNvPr/@id)", app: "PowerPoint" },
    RawRule { id: "pml-0134", context: "p:sldLayoutIdLst", test: "count(distinct-values(p:sldLayoutId/@id)) = count(p:sldLayoutId/@id)", app: "PowerPoint" },
    RawRule { id: "sml-0331", context: "x:sheets", test: "count(distinct-values(x:sheet/@sheetId)) = count(x:sheet/@sheetId)", app: "Excel" },

    // --- relationship id and type checks -----------------------------------
    RawRule { id: "pml-0141", context: "p:sldMasterId", test: "document(rels)//r:Relationship[@Id = current()/@r:id and @Type = 'http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster']", app: "PowerPoint" },
    RawRule { id: "pml-0142", context: "p:sldId", test: "document(rels)//r:Relationship[@Id = current()/@r:id and @Type = 'http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide']", app: "PowerPoint" },
    RawRule { id: "pml-0143", context: "p:notesMasterId", test: "document(rels)//r:Relationship[@Id = current()/@r:id and @Type = 'http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster']", app: "PowerPoint" },
    RawRule { id: "pml-0144", context: "p:handoutMasterId", test: "document(rels)//r:Relationship[@Id = current()/@r:id and @Type = 'http://schemas.openxmlformats.org/officeDocument/2006/relationships/handoutMaster']", app: "PowerPoint" },
    RawRule { id: "pml-0145", context: "p:sldLayoutId", test: "document(rels)//r:Relationship[@Id = current()/@r:id and @Type = 'http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout']", app: "PowerPoint" },
    RawRule { id: "dml-0241", context: "a:blip", test: "document(rels)//r:Relationship[@Id = current()/@r:embed and @Type = 'http://schemas.openxmlformats.org/officeDocument/2006/relationships/image']", app: "All" },
    RawRule { id: "wml-0441", context: "w:embedRegular", test: "document(rels)//r:Relationship[@Id = current()/@r:id and @Type = 'http://schemas.openxmlformats.org/officeDocument/2006/relationships/font']", app: "Word" },

    // --- equality / inequality ---------------------------------------------
    RawRule { id: "sml-0351", context: "x:pivotArea", test: "@axis != 'axisValues'", app: "Excel" },
    RawRule { id: "sml-0352", context: "x:tableExtension", test: "@guid != '{00000000-0000-0000-0000-000000000000}'", app: "Excel" },
    RawRule { id: "sml-0361", context: "x:oleItem", test: "@advise = true", app: "Excel" },
    RawRule { id: "wml-0451", context: "w:lsdException", test: "@w:name != ''", app: "Word" },

    // --- attributes present -------------------------------------------------
    RawRule { id: "dml-0271", context: "a:off", test: "@x and @y", app: "All" },
    RawRule { id: "dml-0272", context: "a:ext", test: "@cx and @cy", app: "All" },
    RawRule { id: "dml-0273", context: "a:chOff", test: "@x and @y", app: "All" },
    RawRule { id: "dml-0274", context: "a:chExt", test: "@cx and @cy", app: "All" },
    RawRule { id: "sml-0371", context: "x:autoFilter", test: "@ref", app: "Excel" },

    // --- attribute comparisons ----------------------------------------------
    RawRule { id: "sml-0381", context: "x:col", test: "@min <= @max", app: "Excel" },

    // --- compound conditions -------------------------------------------------
    RawRule { id: "dml-0291", context: "a:blip", test: "(@r:embed) or (@r:link)", app: "All" },
    RawRule { id: "sml-0391", context: "x:conditionalFormatting", test: "(@sqref) or (@pivot = 1)", app: "Excel" },
    RawRule { id: "sml-0392", context: "x:filterColumn", test: "(@operator and @type = 'cells') or @type != 'cells'", app: "Excel" },
    RawRule { id: "c-0591", context: "c:max", test: "@val != 'NaN' and @val != 'INF' and @val != '-INF'", app: "All" },
    RawRule { id: "c-0592", context: "c:min", test: "@val != 'NaN' and @val != 'INF' and @val != '-INF'", app: "All" },
    RawRule { id: "sml-0394", context: "x:cacheSource", test: "@connectionId and @type = 'external'", app: "Excel" },
    RawRule { id: "pml-0191", context: "p:cTn", test: "@repeatDur and @repeatCount != 'indefinite'", app: "PowerPoint" },

    // --- cross-part counts ----------------------------------------------------
    RawRule { id: "sml-0395", context: "x:c", test: "@cm < count(document('Part:/WorkbookPart/CellMetadataPart')//x:cellMetadata/x:bk) + 1", app: "Excel" },
    RawRule { id: "sml-0396", context: "x:c", test: "@vm < count(document('Part:/WorkbookPart/CellMetadataPart')//x:valueMetadata/x:bk) + 1", app: "Excel" },

    // --- reference checks ------------------------------------------------------
    RawRule { id: "pml-0198", context: "p:spTgt", test: "Index-of(document('.')//p:cNvPr/@id, @spid) > 0", app: "PowerPoint" },

    // --- outside the recognized grammar ----------------------------------------
    RawRule { id: "pml-0901", context: "p:timing", test: "count(p:tnLst) = count(.//p:par)", app: "PowerPoint" },
    RawRule { id: "sml-0901", context: "x:f", test: "not(contains(@t, 'shared'))", app: "Excel" },
    RawRule { id: "dml-0901", context: "a:gs", test: "sum(../a:gs/@pos) >= 0", app: "All" },
    RawRule { id: "wml-0901", context: "w:tbl", test: "count(w:tr) > 0", app: "Word" },
    RawRule { id: "c-0901", context: "c:ser", test: "preceding-sibling::c:ser/@idx < @idx", app: "All" },
    RawRule { id: "sml-0902", context: "x:sheet", test: "string-length(normalize-space(@name)) > 0", app: "Excel" },
];
