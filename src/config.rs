//! YAML configuration file for the generator.
//!
//! Every key is optional. Command-line flags override what the file sets.
//!
//! ```yaml
//! file_name: openapi.yaml
//! format: yaml
//! schemas: src/models
//! paths: src/handlers
//! ignored_directories: [generated]
//! info:
//!   title: Pet Store
//!   version: 2.0.0
//! default_error_ref: Error
//! default_errors: [404, 500]
//! security_schemes:
//!   http:
//!     bearer: { type: http, scheme: bearer, bearerFormat: JWT }
//! ```

use crate::document::{ExternalDocs, Info, Server, Tag};
use crate::extractor::ExtractionOptions;
use crate::openapi_builder::{ErrorResponse, SecuritySchemeSet};
use crate::serializer::OutputFormat;
use crate::swagger_ui::SwaggerUiConfig;
use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub file_name: Option<String>,
    pub format: Option<OutputFormat>,
    /// Root scanned for schema and enum declarations.
    pub schemas: Option<PathBuf>,
    /// Root scanned for path directives.
    pub paths: Option<PathBuf>,
    /// Added to the built-in ignored directory names.
    pub ignored_directories: Vec<String>,
    /// Added to the built-in ignored file name fragments.
    pub ignored_files: Vec<String>,
    pub max_workers: Option<usize>,
    pub info: Option<Info>,
    pub external_docs: Option<ExternalDocs>,
    pub servers: Vec<Server>,
    pub tags: Vec<Tag>,
    /// Directory whose subdirectory names become the tag list.
    pub tags_from: Option<PathBuf>,
    pub security_schemes: SecuritySchemeSet,
    pub error_responses: BTreeMap<String, ErrorResponse>,
    pub default_error_ref: Option<String>,
    /// Standard error codes to register; an empty list registers all of them.
    pub default_errors: Option<Vec<u16>>,
    /// Keeps only these error codes after registration.
    pub restrict_errors: Vec<u16>,
    pub strict: bool,
    pub export_ui: Option<SwaggerUiConfig>,
}

impl GeneratorConfig {
    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Built-in ignore lists extended with the configured ones.
    pub fn extraction_options(&self) -> ExtractionOptions {
        let mut options = ExtractionOptions::default();
        for name in &self.ignored_directories {
            if !options.ignored_directories.contains(name) {
                options.ignored_directories.push(name.clone());
            }
        }
        for fragment in &self.ignored_files {
            if !options.ignored_files.contains(fragment) {
                options.ignored_files.push(fragment.clone());
            }
        }
        options.max_workers = self.max_workers.filter(|count| *count > 0);
        options
    }
}
