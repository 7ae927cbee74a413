use crate::config::GeneratorConfig;
use crate::document::Tag;
use crate::openapi_builder::{
    standard_error_responses, BuildStep, DocumentBuilder, Generated, Pipeline,
};
use crate::serializer::OutputFormat;
use crate::swagger_ui::SwaggerUiConfig;
use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// OpenAPI generator - builds an OpenAPI document from `@api` doc-comment directives
#[derive(Parser, Debug)]
#[command(name = "openapi-from-comments")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Directory scanned for @apiDefine and @apiEnum declarations (defaults to the project path)
    #[arg(long = "schemas", value_name = "DIR")]
    pub schemas: Option<PathBuf>,

    /// Directory scanned for @apiPath directives (defaults to the project path)
    #[arg(long = "paths", value_name = "DIR")]
    pub paths: Option<PathBuf>,

    /// Output file path (defaults to openapi.yaml in the project directory)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Output format (yaml or json); inferred from the output file name when omitted
    #[arg(short = 'f', long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Additional directory names to skip (comma separated)
    #[arg(long = "ignore", value_name = "DIR", value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Schema referenced by every error response without its own reference
    #[arg(long = "error-ref", value_name = "SCHEMA")]
    pub error_ref: Option<String>,

    /// Register the standard error responses, optionally only these codes
    #[arg(long = "default-errors", value_name = "CODES", value_delimiter = ',', num_args = 0..)]
    pub default_errors: Option<Vec<u16>>,

    /// Use the subdirectory names of this directory as tags
    #[arg(long = "tags-from", value_name = "DIR")]
    pub tags_from: Option<PathBuf>,

    /// Export a Swagger UI page into this directory
    #[arg(long = "export-ui", value_name = "DIR")]
    pub export_ui: Option<PathBuf>,

    /// Fail when the generated document does not validate
    #[arg(long = "strict")]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    if let Some(ref config) = args.config {
        info!("Config file: {}", config.display());
    }
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    }

    Ok(args)
}

/// Everything `run` needs once flags and the config file are merged.
#[derive(Debug)]
struct Settings {
    config: GeneratorConfig,
    schemas_root: PathBuf,
    paths_root: PathBuf,
    output_dir: PathBuf,
    file_name: String,
    format: OutputFormat,
    error_ref: Option<String>,
}

fn resolve(project: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project.join(path)
    }
}

/// Flags win over the config file, which wins over built-in defaults.
fn settings(args: &CliArgs) -> Result<Settings> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    config.ignored_directories.extend(args.ignore.iter().cloned());
    if args.default_errors.is_some() {
        config.default_errors = args.default_errors.clone();
    }
    if args.tags_from.is_some() {
        config.tags_from = args.tags_from.clone();
    }
    if let Some(export_path) = &args.export_ui {
        let mut export = config.export_ui.take().unwrap_or_default();
        export.export_path = export_path.clone();
        config.export_ui = Some(export);
    }
    config.strict |= args.strict;

    let project = &args.project_path;
    let schemas_root = args
        .schemas
        .clone()
        .or_else(|| config.schemas.clone())
        .map_or_else(|| project.clone(), |dir| resolve(project, &dir));
    let paths_root = args
        .paths
        .clone()
        .or_else(|| config.paths.clone())
        .map_or_else(|| project.clone(), |dir| resolve(project, &dir));

    let (output_dir, file_name) = match &args.output_path {
        Some(output) => {
            let file_name = output
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    anyhow::anyhow!("Output path has no file name: {}", output.display())
                })?;
            let dir = output
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (dir, file_name)
        }
        None => (
            project.clone(),
            config
                .file_name
                .clone()
                .unwrap_or_else(|| crate::constants::DEFAULT_FILE_NAME.to_string()),
        ),
    };

    let format = args
        .output_format
        .or(config.format)
        .unwrap_or_else(|| OutputFormat::from_file_name(&file_name));
    let error_ref = args.error_ref.clone().or_else(|| config.default_error_ref.clone());

    Ok(Settings {
        config,
        schemas_root,
        paths_root,
        output_dir,
        file_name,
        format,
        error_ref,
    })
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<Generated> {
    info!("Starting OpenAPI document generation...");
    let Settings {
        config,
        schemas_root,
        paths_root,
        output_dir,
        file_name,
        format,
        error_ref,
    } = settings(&args)?;

    info!("Schemas: {}", schemas_root.display());
    info!("Paths: {}", paths_root.display());
    info!("Output format: {:?}", format);

    let mut builder = DocumentBuilder::new()
        .with_options(config.extraction_options())
        .with_file_name(file_name)
        .with_format(format)
        .strict(config.strict);
    if let Some(info) = config.info.clone() {
        builder = builder.with_info(info);
    }
    if let Some(docs) = config.external_docs.clone() {
        builder = builder.with_external_docs(docs);
    }

    let error_ref = error_ref.as_deref();
    let default_errors = config.default_errors.clone();
    let custom_errors = config.error_responses.clone();
    let standard_only = default_errors.is_none() && custom_errors.is_empty();
    let tags = config.tags.clone();
    let ignored_tags = config.extraction_options().ignored_directories;

    let pipeline = Pipeline::start(builder)
        .then_if(default_errors.is_some(), BuildStep::AddDefaultErrors, |b| {
            let codes = default_errors.unwrap_or_default();
            match error_ref {
                Some(_) => {
                    let mut responses = standard_error_responses(&codes);
                    if responses.is_empty() {
                        responses = standard_error_responses(&[]);
                    }
                    b.add_error_responses(responses, error_ref)
                }
                None => b.add_default_errors(&codes),
            }
        })
        .then_if(!custom_errors.is_empty(), BuildStep::AddErrorResponses, |b| {
            b.add_error_responses(custom_errors, error_ref)
        })
        .then_if(
            standard_only && error_ref.is_some(),
            BuildStep::AddErrorResponses,
            |b| b.add_error_responses(standard_error_responses(&[]), error_ref),
        )
        .then(BuildStep::RestrictErrorResponses, |b| {
            b.restrict_error_responses(&config.restrict_errors)
        })
        .then(BuildStep::ParseSchemas, |b| b.parse_schemas(&schemas_root))
        .then(BuildStep::ParseEnums, |b| b.parse_enums(&schemas_root))
        .then(BuildStep::ParsePaths, |b| b.parse_paths(&paths_root))
        .then_if(config.tags_from.is_some(), BuildStep::ParseTags, |b| {
            let dir = config
                .tags_from
                .as_deref()
                .map(|dir| resolve(&args.project_path, dir))
                .unwrap_or_default();
            b.parse_tags(&dir, &ignored_tags)
        })
        .then(BuildStep::AddTag, |b| {
            tags.into_iter().try_fold(b, |b, tag: Tag| b.add_tag(tag))
        })
        .then(BuildStep::AddServers, |b| b.add_servers(config.servers.clone()))
        .then(BuildStep::AddSecuritySchemes, |b| {
            b.add_security_schemes(config.security_schemes.clone())
        })
        .then_if(config.export_ui.is_some(), BuildStep::ExportSwaggerUi, |b| {
            let export = config.export_ui.clone().unwrap_or_default();
            let export = SwaggerUiConfig {
                export_path: resolve(&args.project_path, &export.export_path),
                ..export
            };
            b.export_swagger_ui(&export)
        });

    let generated = pipeline.generate(&output_dir)?;

    if !generated.findings.is_empty() {
        warn!(
            "Generated document has {} validation finding(s)",
            generated.findings.len()
        );
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Output: {}", generated.path.display());
    info!("  - Bytes written: {}", generated.content.len());
    info!("  - Validation findings: {}", generated.findings.len());

    Ok(generated)
}
