use crate::openapi_builder::BuildStep;
use crate::validator::ValidationFinding;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single source file contributed nothing to an extraction.
///
/// These never leave the directory unit that produced them: the file is
/// skipped and the error is logged at debug level.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse Rust syntax in file {}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },
    #[error("{}: there are no doc comments (@api declarations) in the file", path.display())]
    NoComments { path: PathBuf },
    #[error("{}: there are no {keyword} declarations in the file", path.display())]
    NoDirectives {
        path: PathBuf,
        keyword: &'static str,
    },
}

/// Fatal failure of a concurrent directory extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to enumerate directories under {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("{missing} of {dispatched} extraction units exited without reporting")]
    UnitsLost { missing: usize, dispatched: usize },
}

/// A document build step was invoked out of order or could not complete.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("paths already parsed, register error responses before parsing paths")]
    ErrorResponsesAfterPaths,
    #[error("custom error responses already registered, enable default error responses before adding your own")]
    DefaultErrorsAfterCustom,
    #[error("paths already parsed, register schemas before parsing paths")]
    SchemasAfterPaths,
    #[error("parse your schemas first")]
    SchemasMissing,
    #[error("path is not set to parse tags from subdirectories")]
    TagsPathNotSet,
    #[error("no tags found in {}", path.display())]
    NoTagsFound { path: PathBuf },
    #[error("failed to read tag directory {}: {source}", path.display())]
    TagsDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Output(#[from] anyhow::Error),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("document written but validation found {} problem(s)", findings.len())]
    Validation { findings: Vec<ValidationFinding> },
}

/// The first failing step of a [`crate::openapi_builder::Pipeline`].
#[derive(Debug, Error)]
#[error("build step `{step}` failed: {source}")]
pub struct StepFailure {
    pub step: BuildStep,
    #[source]
    pub source: BuildError,
}

/// Failure while exporting the Swagger UI viewer.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to prepare directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: ureq::Error,
    },
}
