//! Assembles an OpenAPI document from extracted registries.
//!
//! [`DocumentBuilder`] exposes one method per build step. Every step takes the
//! builder by value and hands it back in a `Result`, so an out-of-order call
//! surfaces as a [`BuildError`] at the point it happens. [`Pipeline`] chains
//! steps and reports the first one that failed.
//!
//! Steps must run in this order: register error responses, optionally
//! restrict them, extract schemas and enums, extract paths, then register
//! tags, servers and security schemes.

use crate::constants::{
    response_description, schema_ref, DEFAULT_DESCRIPTION, DEFAULT_FILE_NAME, DEFAULT_TITLE,
    DEFAULT_VERSION, ERROR_DESCRIPTIONS, OPEN_API_VERSION,
};
use crate::document::{
    Components, ExternalDocs, Info, MediaType, OpenApiDocument, PathRegistry, Response,
    Responses, SchemaRegistry, SecurityScheme, Server, Tag,
};
use crate::error::{BuildError, StepFailure};
use crate::extractor::paths::extract_paths;
use crate::extractor::schemas::extract_schemas;
use crate::extractor::{ExtractionOptions, Registry};
use crate::grammar::DeclarationKind;
use crate::path_assembler::PathContext;
use crate::serializer::{self, OutputFormat};
use crate::swagger_ui::{self, SwaggerUiConfig};
use crate::validator::{validate_raw, ValidationFinding};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Names each builder step so a failed [`Pipeline`] can say where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    AddErrorResponses,
    AddDefaultErrors,
    RestrictErrorResponses,
    ParseSchemas,
    ParseEnums,
    AddSchemas,
    ParsePaths,
    AddPaths,
    AddTag,
    ParseTags,
    AddServers,
    AddSecuritySchemes,
    ExportSwaggerUi,
    Generate,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStep::AddErrorResponses => "add error responses",
            BuildStep::AddDefaultErrors => "add default errors",
            BuildStep::RestrictErrorResponses => "restrict error responses",
            BuildStep::ParseSchemas => "parse schemas",
            BuildStep::ParseEnums => "parse enums",
            BuildStep::AddSchemas => "add schemas",
            BuildStep::ParsePaths => "parse paths",
            BuildStep::AddPaths => "add paths",
            BuildStep::AddTag => "add tag",
            BuildStep::ParseTags => "parse tags",
            BuildStep::AddServers => "add servers",
            BuildStep::AddSecuritySchemes => "add security schemes",
            BuildStep::ExportSwaggerUi => "export swagger ui",
            BuildStep::Generate => "generate",
        };
        f.write_str(name)
    }
}

/// A configured error response. Both fields are optional: the description
/// falls back to the standard one for the status code, the reference to the
/// default reference passed alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "$ref", alias = "ref")]
    pub reference: Option<String>,
}

/// Error responses for the standard codes, or for `codes` when given.
pub fn standard_error_responses(codes: &[u16]) -> BTreeMap<String, ErrorResponse> {
    ERROR_DESCRIPTIONS
        .iter()
        .filter(|(code, _)| {
            codes.is_empty() || codes.iter().any(|wanted| wanted.to_string() == *code)
        })
        .map(|(code, _)| (code.to_string(), ErrorResponse::default()))
        .collect()
}

/// Security schemes grouped by kind, flattened into one registry when added.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySchemeSet {
    #[serde(default)]
    pub api_key: BTreeMap<String, SecurityScheme>,
    #[serde(default)]
    pub http: BTreeMap<String, SecurityScheme>,
    #[serde(default)]
    pub oauth2: BTreeMap<String, SecurityScheme>,
    #[serde(default)]
    pub open_id_connect: BTreeMap<String, SecurityScheme>,
}

impl SecuritySchemeSet {
    /// One registry keyed by scheme name. A name reused across kinds keeps
    /// the last kind in `apiKey, http, oauth2, openIdConnect` order.
    pub fn flatten(self) -> BTreeMap<String, SecurityScheme> {
        let mut flat = BTreeMap::new();
        for group in [self.api_key, self.http, self.oauth2, self.open_id_connect] {
            flat.extend(group);
        }
        flat
    }
}

/// What a successful [`DocumentBuilder::generate`] produced.
#[derive(Debug, Clone)]
pub struct Generated {
    /// The serialized document exactly as written.
    pub content: String,
    /// Validation findings over `content`; empty for a clean document.
    pub findings: Vec<ValidationFinding>,
    /// Where the document was written.
    pub path: PathBuf,
}

/// Builds an OpenAPI document step by step.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    document: OpenApiDocument,
    error_responses: Responses,
    paths_parsed: bool,
    options: ExtractionOptions,
    file_name: String,
    format: OutputFormat,
    strict: bool,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    /// Creates a builder with default document metadata.
    pub fn new() -> Self {
        Self {
            document: OpenApiDocument {
                openapi: OPEN_API_VERSION.to_string(),
                info: Info {
                    title: DEFAULT_TITLE.to_string(),
                    version: DEFAULT_VERSION.to_string(),
                    description: Some(DEFAULT_DESCRIPTION.to_string()),
                    terms_of_service: None,
                    contact: None,
                    license: None,
                },
                external_docs: None,
                servers: Vec::new(),
                tags: Vec::new(),
                paths: PathRegistry::new(),
                components: Components::default(),
            },
            error_responses: Responses::new(),
            paths_parsed: false,
            options: ExtractionOptions::default(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            format: OutputFormat::Yaml,
            strict: false,
        }
    }

    pub fn with_info(mut self, info: Info) -> Self {
        self.document.info = info;
        self
    }

    pub fn with_external_docs(mut self, docs: ExternalDocs) -> Self {
        self.document.external_docs = Some(docs);
        self
    }

    pub fn with_options(mut self, options: ExtractionOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the output file name; an empty name keeps the current one.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        if !file_name.is_empty() {
            self.file_name = file_name;
        }
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Makes [`generate`](Self::generate) fail when validation finds problems.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }

    pub fn error_responses(&self) -> &Responses {
        &self.error_responses
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Registers error responses overlaid on every operation.
    ///
    /// A response's own reference wins over `default_ref`; with neither the
    /// response has no content. Codes already registered are replaced.
    pub fn add_error_responses(
        mut self,
        responses: BTreeMap<String, ErrorResponse>,
        default_ref: Option<&str>,
    ) -> Result<Self, BuildError> {
        if self.paths_parsed {
            return Err(BuildError::ErrorResponsesAfterPaths);
        }

        let default_ref = default_ref.filter(|name| !name.is_empty());
        for (code, response) in responses {
            let reference = response
                .reference
                .as_deref()
                .filter(|name| !name.is_empty())
                .or(default_ref)
                .map(schema_ref);
            let description = response
                .description
                .unwrap_or_else(|| response_description(&code).to_string());
            debug!("Registering error response {} ({:?})", code, reference);
            self.error_responses.insert(
                code,
                Response {
                    description,
                    content: reference.as_deref().map(MediaType::content_for),
                },
            );
        }

        info!("Registered {} error responses", self.error_responses.len());
        Ok(self)
    }

    /// Registers the standard error responses, described but without content.
    ///
    /// When `codes` names at least one standard code only those are kept;
    /// otherwise every standard code is registered.
    pub fn add_default_errors(mut self, codes: &[u16]) -> Result<Self, BuildError> {
        if self.paths_parsed {
            return Err(BuildError::ErrorResponsesAfterPaths);
        }
        if !self.error_responses.is_empty() {
            return Err(BuildError::DefaultErrorsAfterCustom);
        }

        let mut selected = standard_error_responses(codes);
        if selected.is_empty() {
            selected = standard_error_responses(&[]);
        }
        self.error_responses = selected
            .into_keys()
            .map(|code| {
                let description = response_description(&code).to_string();
                (
                    code,
                    Response {
                        description,
                        content: None,
                    },
                )
            })
            .collect();

        info!("Registered {} default error responses", self.error_responses.len());
        Ok(self)
    }

    /// Keeps only the registered error responses whose code is in `codes`.
    /// An empty list leaves the set unchanged.
    pub fn restrict_error_responses(mut self, codes: &[u16]) -> Result<Self, BuildError> {
        if self.paths_parsed {
            return Err(BuildError::ErrorResponsesAfterPaths);
        }
        if codes.is_empty() {
            return Ok(self);
        }

        self.error_responses
            .retain(|code, _| codes.iter().any(|wanted| wanted.to_string() == *code));
        debug!("Error responses restricted to {:?}", codes);
        Ok(self)
    }

    /// Extracts `@apiDefine` object schemas from every directory under `root`.
    pub fn parse_schemas(self, root: &Path) -> Result<Self, BuildError> {
        self.parse_declarations(root, DeclarationKind::Schema)
    }

    /// Extracts `@apiEnum` enumerations from every directory under `root`.
    pub fn parse_enums(self, root: &Path) -> Result<Self, BuildError> {
        self.parse_declarations(root, DeclarationKind::Enum)
    }

    fn parse_declarations(self, root: &Path, kind: DeclarationKind) -> Result<Self, BuildError> {
        if self.paths_parsed {
            return Err(BuildError::SchemasAfterPaths);
        }

        info!("Parsing {} declarations under {}", kind.keyword(), root.display());
        let extracted = extract_schemas(root, kind, self.options.clone())?;
        info!(
            "Found {} {} declarations in {} directories",
            extracted.registry.len(),
            kind.keyword(),
            extracted.directories
        );
        self.add_schemas(extracted.registry)
    }

    /// Merges `schemas` into the component registry, replacing equal names.
    pub fn add_schemas(mut self, schemas: SchemaRegistry) -> Result<Self, BuildError> {
        if self.paths_parsed {
            return Err(BuildError::SchemasAfterPaths);
        }

        for name in Registry::merge(&mut self.document.components.schemas, schemas) {
            warn!("Schema {} registered more than once, keeping the last", name);
        }
        Ok(self)
    }

    /// Extracts documented operations from every directory under `root`.
    ///
    /// Needs the schema registry populated first: parameter sets are
    /// resolved against it.
    pub fn parse_paths(self, root: &Path) -> Result<Self, BuildError> {
        if self.document.components.schemas.is_empty() {
            return Err(BuildError::SchemasMissing);
        }

        info!("Parsing paths under {}", root.display());
        let context = Arc::new(PathContext {
            schemas: self.document.components.schemas.clone(),
            error_responses: self.error_responses.clone(),
        });
        let extracted = extract_paths(root, context, self.options.clone())?;
        info!(
            "Found {} paths in {} directories",
            extracted.registry.len(),
            extracted.directories
        );
        self.add_paths(extracted.registry)
    }

    /// Merges `paths` into the document. Operations merge per method.
    pub fn add_paths(mut self, paths: PathRegistry) -> Result<Self, BuildError> {
        for route in Registry::merge(&mut self.document.paths, paths) {
            warn!("Operation {} registered more than once, keeping the last", route);
        }
        self.paths_parsed = true;
        Ok(self)
    }

    /// Appends a tag; a tag with the same name is replaced in place.
    pub fn add_tag(mut self, tag: Tag) -> Result<Self, BuildError> {
        match self.document.tags.iter_mut().find(|known| known.name == tag.name) {
            Some(known) => *known = tag,
            None => self.document.tags.push(tag),
        }
        Ok(self)
    }

    /// Replaces the tag list with the names of the immediate subdirectories
    /// of `dir`, minus `ignored`.
    pub fn parse_tags(mut self, dir: &Path, ignored: &[String]) -> Result<Self, BuildError> {
        if dir.as_os_str().is_empty() {
            return Err(BuildError::TagsPathNotSet);
        }

        let entries = fs::read_dir(dir).map_err(|source| BuildError::TagsDirectory {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| BuildError::TagsDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_ok_and(|kind| kind.is_dir()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || ignored.contains(&name) {
                continue;
            }
            names.push(name);
        }

        if names.is_empty() {
            return Err(BuildError::NoTagsFound {
                path: dir.to_path_buf(),
            });
        }

        names.sort();
        info!("Parsed {} tags from {}", names.len(), dir.display());
        self.document.tags = names.into_iter().map(Tag::new).collect();
        Ok(self)
    }

    pub fn add_servers(mut self, servers: Vec<Server>) -> Result<Self, BuildError> {
        self.document.servers.extend(servers);
        Ok(self)
    }

    /// Replaces the registered security schemes with the flattened `set`.
    pub fn add_security_schemes(mut self, set: SecuritySchemeSet) -> Result<Self, BuildError> {
        self.document.components.security_schemes = set.flatten();
        debug!(
            "Registered {} security schemes",
            self.document.components.security_schemes.len()
        );
        Ok(self)
    }

    /// Writes the Swagger UI viewer pointing at this document's file name.
    pub fn export_swagger_ui(self, config: &SwaggerUiConfig) -> Result<Self, BuildError> {
        swagger_ui::export(config, &self.file_name)?;
        Ok(self)
    }

    /// Consumes the builder and returns the assembled document.
    pub fn build(self) -> OpenApiDocument {
        self.document
    }

    /// Serializes the document, validates the output and writes it to
    /// `dest_dir/<file name>`.
    ///
    /// Findings are returned with the outcome. In strict mode any finding is
    /// an error, reported after the file has been written.
    pub fn generate(&self, dest_dir: &Path) -> Result<Generated, BuildError> {
        let content = serializer::serialize(&self.document, self.format)?;

        let findings = validate_raw(&content);
        for finding in &findings {
            warn!("Validation: {}", finding);
        }

        let path = dest_dir.join(&self.file_name);
        serializer::write_to_file(&content, &path)?;
        info!("OpenAPI document written to {}", path.display());

        if self.strict && !findings.is_empty() {
            return Err(BuildError::Validation { findings });
        }

        Ok(Generated {
            content,
            findings,
            path,
        })
    }
}

/// Chains builder steps, stopping at the first failure.
///
/// ```no_run
/// use openapi_from_comments::openapi_builder::{BuildStep, DocumentBuilder, Pipeline};
/// use std::path::Path;
///
/// let generated = Pipeline::start(DocumentBuilder::new())
///     .then(BuildStep::AddDefaultErrors, |b| b.add_default_errors(&[404, 500]))
///     .then(BuildStep::ParseSchemas, |b| b.parse_schemas(Path::new("src/models")))
///     .then(BuildStep::ParsePaths, |b| b.parse_paths(Path::new("src/handlers")))
///     .generate(Path::new("docs"))
///     .unwrap();
/// println!("{}", generated.path.display());
/// ```
#[derive(Debug)]
pub struct Pipeline {
    state: Result<DocumentBuilder, StepFailure>,
}

impl Pipeline {
    pub fn start(builder: DocumentBuilder) -> Self {
        Self { state: Ok(builder) }
    }

    /// Runs `f` unless an earlier step already failed.
    pub fn then<F>(self, step: BuildStep, f: F) -> Self
    where
        F: FnOnce(DocumentBuilder) -> Result<DocumentBuilder, BuildError>,
    {
        let state = match self.state {
            Ok(builder) => f(builder).map_err(|source| StepFailure { step, source }),
            Err(failure) => Err(failure),
        };
        Self { state }
    }

    /// Runs `f` only when `condition` holds.
    pub fn then_if<F>(self, condition: bool, step: BuildStep, f: F) -> Self
    where
        F: FnOnce(DocumentBuilder) -> Result<DocumentBuilder, BuildError>,
    {
        if condition {
            self.then(step, f)
        } else {
            self
        }
    }

    pub fn finish(self) -> Result<DocumentBuilder, StepFailure> {
        self.state
    }

    /// Finishes the pipeline and generates the document into `dest_dir`.
    pub fn generate(self, dest_dir: &Path) -> Result<Generated, StepFailure> {
        self.state?
            .generate(dest_dir)
            .map_err(|source| StepFailure {
                step: BuildStep::Generate,
                source,
            })
    }
}
