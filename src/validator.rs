//! Top-level validator: sequences the validation phases and aggregates
//! findings.

use crate::context::ValidationContext;
use crate::error::Result;
use crate::findings::{codes, Category, FileFormat, Finding, Severity, ValidationReport};
use crate::namespaces::relationship_type;
use crate::opc::{Package, Part, Relationships, ResolvedTarget};
use crate::pptx::{MasterValidator, PresentationValidator, SlideValidator, ThemeValidator};
use crate::schema::SchemaValidator;
use crate::schematron::load_catalog;
use crate::semantic::SemanticValidator;
use std::path::Path;

/// Validator configuration.
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    /// Office version whose element and attribute tables apply.
    pub format_version: FileFormat,
    /// Finding cap, enforced at append time. 0 means unbounded.
    pub max_errors: usize,
    /// Toggle the schema (content model) phase.
    pub schema_validation: bool,
    /// Toggle the semantic (rule) phase.
    pub semantic_validation: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            format_version: FileFormat::default(),
            max_errors: 1000,
            schema_validation: true,
            semantic_validation: true,
        }
    }
}

/// Supported Open XML document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Presentation,
    Word,
    Spreadsheet,
    Unknown,
}

/// Validates Office Open XML documents.
///
/// Construction builds the constraint catalogs once; one validator can
/// then be used for any number of documents. Validations are
/// independent: each run owns its own package, context, and finding
/// accumulator.
///
/// # Examples
///
/// ```no_run
/// use quince::Validator;
///
/// let validator = Validator::new();
/// let report = validator.validate("deck.pptx")?;
/// for finding in &report.findings {
///     println!("{}", finding);
/// }
/// # Ok::<(), quince::Error>(())
/// ```
pub struct Validator {
    options: ValidatorOptions,
    schema: Option<SchemaValidator>,
    semantic_pptx: Option<SemanticValidator>,
    semantic_word: Option<SemanticValidator>,
    semantic_sheet: Option<SemanticValidator>,
    presentation: PresentationValidator,
    slide: SlideValidator,
    master: MasterValidator,
    theme: ThemeValidator,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_options(ValidatorOptions::default())
    }

    pub fn with_options(options: ValidatorOptions) -> Self {
        let schema = options
            .schema_validation
            .then(|| SchemaValidator::new(options.format_version));

        let build = |app: &str, with_pptx: bool| {
            let (mut catalog, _) = load_catalog(app);
            if with_pptx {
                crate::pptx::register_constraints(&mut catalog);
            }
            SemanticValidator::new(catalog)
        };
        let semantic_pptx = options
            .semantic_validation
            .then(|| build("PowerPoint", true));
        let semantic_word = options.semantic_validation.then(|| build("Word", false));
        let semantic_sheet = options.semantic_validation.then(|| build("Excel", false));

        Self {
            options,
            schema,
            semantic_pptx,
            semantic_word,
            semantic_sheet,
            presentation: PresentationValidator::new(),
            slide: SlideValidator::new(),
            master: MasterValidator::new(),
            theme: ThemeValidator::new(),
        }
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Validate a document on disk.
    ///
    /// `Err` is returned only for invocation-level problems (the file
    /// cannot be read); everything content-related is a finding.
    pub fn validate<P: AsRef<Path>>(&self, path: P) -> Result<ValidationReport> {
        let data = std::fs::read(path.as_ref())?;
        Ok(self.validate_bytes(&data))
    }

    /// Validate a document held in memory.
    pub fn validate_bytes(&self, data: &[u8]) -> ValidationReport {
        let package = match Package::from_bytes(data) {
            Ok(package) => package,
            Err(_) => {
                let finding = Finding::new(
                    Category::Package,
                    Severity::Error,
                    "Input is not an OPC container (not a valid ZIP archive)",
                )
                .with_part("/")
                .with_rule(codes::NOT_A_CONTAINER);
                return ValidationReport::new(
                    vec![finding],
                    self.options.format_version,
                    false,
                );
            }
        };

        let mut ctx = ValidationContext::new(self.options.max_errors);

        // Phase 1: package structure.
        for finding in package.structure_findings() {
            ctx.add_finding(finding.clone());
        }
        if !package.is_traversable() {
            let (findings, truncated) = ctx.into_findings();
            return ValidationReport::new(findings, self.options.format_version, truncated);
        }

        let kind = detect_kind(&package);

        // Phase 2: schema validation, in package part order.
        if let Some(schema) = &self.schema {
            for part in package.parts() {
                if ctx.should_stop() {
                    break;
                }
                if part.is_xml() {
                    schema.validate_part(part, &mut ctx);
                }
            }
        }

        // Phase 3: semantic validation with the package reference set.
        let semantic = match kind {
            DocumentKind::Presentation => self.semantic_pptx.as_ref(),
            DocumentKind::Word => self.semantic_word.as_ref(),
            DocumentKind::Spreadsheet => self.semantic_sheet.as_ref(),
            DocumentKind::Unknown => None,
        };
        if let Some(semantic) = semantic {
            for part in package.parts() {
                if ctx.should_stop() {
                    break;
                }
                if part.is_xml() {
                    semantic.validate_part(part, &package, &mut ctx);
                }
            }
        }

        // Phase 4: relationship integrity across all collections.
        self.check_relationships(&package, &mut ctx);

        // Phase 5: format-specific checks.
        if kind == DocumentKind::Presentation && !ctx.should_stop() {
            self.validate_presentation_graph(&package, &mut ctx);
        }

        let (findings, truncated) = ctx.into_findings();
        ValidationReport::new(findings, self.options.format_version, truncated)
    }

    /// Quick validity check.
    pub fn is_valid<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        Ok(self.validate(path)?.is_valid())
    }

    fn check_relationships(&self, package: &Package, ctx: &mut ValidationContext) {
        ctx.set_part("/_rels/.rels");
        check_collection(package.rels(), "/", package, ctx);

        for part in package.parts() {
            if ctx.should_stop() {
                break;
            }
            if let Some(msg) = part.rels_error() {
                ctx.add_finding(
                    Finding::new(
                        Category::Package,
                        Severity::Error,
                        format!("Error parsing relationships: {}", msg),
                    )
                    .with_part(part.uri().rels_uri().as_str())
                    .with_rule(codes::PACKAGE_MALFORMED_XML),
                );
                continue;
            }
            ctx.set_part(part.uri().as_str());
            check_collection(part.rels(), part.uri().base_uri(), package, ctx);
        }
    }

    fn validate_presentation_graph(&self, package: &Package, ctx: &mut ValidationContext) {
        let Some(main_uri) = package.main_part() else {
            return;
        };
        let Some(pres) = package.part(main_uri.as_str()) else {
            return;
        };

        self.presentation.validate(pres, ctx);

        for rel in pres.rels().of_type(relationship_type::SLIDE) {
            if ctx.should_stop() {
                return;
            }
            if let Some(slide) = resolve_part(package, pres, rel.id.as_str()) {
                self.slide.validate(slide, ctx);
            }
        }

        for rel in pres.rels().of_type(relationship_type::SLIDE_MASTER) {
            if ctx.should_stop() {
                return;
            }
            let Some(master) = resolve_part(package, pres, rel.id.as_str()) else {
                continue;
            };
            self.master.validate_master(master, ctx);

            for layout_rel in master.rels().of_type(relationship_type::SLIDE_LAYOUT) {
                if let Some(layout) = resolve_part(package, master, layout_rel.id.as_str()) {
                    self.master.validate_layout(layout, ctx);
                }
            }
            for theme_rel in master.rels().of_type(relationship_type::THEME) {
                if let Some(theme) = resolve_part(package, master, theme_rel.id.as_str()) {
                    self.theme.validate(theme, ctx);
                }
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_kind(package: &Package) -> DocumentKind {
    let Some(main_uri) = package.main_part() else {
        return DocumentKind::Unknown;
    };
    let content_type = package
        .part(main_uri.as_str())
        .and_then(Part::content_type)
        .unwrap_or("");
    let uri = main_uri.as_str().to_lowercase();
    if content_type.contains("presentationml") || uri.starts_with("/ppt/") {
        DocumentKind::Presentation
    } else if content_type.contains("wordprocessingml") || uri.starts_with("/word/") {
        DocumentKind::Word
    } else if content_type.contains("spreadsheetml") || uri.starts_with("/xl/") {
        DocumentKind::Spreadsheet
    } else {
        DocumentKind::Unknown
    }
}

/// Resolve an internal relationship of `source` to a registered part.
/// Dangling and escaped targets are phase-4 findings, not ours.
fn resolve_part<'a>(package: &'a Package, source: &Part, rel_id: &str) -> Option<&'a Part> {
    let rel = source.rels().get(rel_id)?;
    match rel.resolve(source.uri().base_uri()) {
        ResolvedTarget::Part(uri) => package.part(uri.as_str()),
        _ => None,
    }
}

fn check_collection(
    rels: &Relationships,
    base_uri: &str,
    package: &Package,
    ctx: &mut ValidationContext,
) {
    for id in rels.duplicate_ids() {
        let id = id.to_string();
        ctx.add(
            Category::Relationship,
            Severity::Error,
            format!("Duplicate relationship id '{}'", id),
            Some(&id),
            codes::DUPLICATE_RELATIONSHIP_ID,
        );
    }
    for rel in rels.iter() {
        match rel.resolve(base_uri) {
            ResolvedTarget::Part(uri) => {
                if !package.has_part(uri.as_str()) {
                    ctx.add(
                        Category::Relationship,
                        Severity::Error,
                        format!(
                            "Relationship '{}' target not found: '{}'",
                            rel.id,
                            uri.as_str()
                        ),
                        Some(&rel.id),
                        codes::DANGLING_RELATIONSHIP,
                    );
                }
            }
            ResolvedTarget::Escaped(target) => {
                ctx.add(
                    Category::Relationship,
                    Severity::Error,
                    format!(
                        "Relationship '{}' target '{}' escapes the package root",
                        rel.id, target
                    ),
                    Some(&rel.id),
                    codes::RELATIONSHIP_ESCAPE,
                );
            }
            ResolvedTarget::External(_) => {}
        }
    }
}
