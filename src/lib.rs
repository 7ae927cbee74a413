//! OpenAPI generator driven by doc-comment directives.
//!
//! Handlers and models document themselves with `@api` directives in their doc
//! comments; struct fields carry extra detail in `#[openapi("...")]` attributes.
//! This library scans a source tree for both and assembles an OpenAPI 3.0
//! document from them.
//!
//! ```text
//! /// @apiDefine: User
//! pub struct User {
//!     #[openapi("required;example:42")]
//!     pub id: u64,
//! }
//!
//! /// @apiPath: /users/{id}
//! /// @apiMethod: GET
//! /// @apiResponseRef: User
//! /// @apiErrorStatusCodes: 404, 500
//! pub async fn get_user() {}
//! ```
//!
//! # Architecture
//!
//! 1. [`parser`] - Parses Rust source files and collects their doc blocks
//! 2. [`grammar`] - Splits doc blocks into `@api` directives
//! 3. [`tag_parser`] and [`type_mapper`] - Read field annotations and map Rust types
//! 4. [`declaration_scanner`] and [`schema_generator`] - Build schemas from documented types
//! 5. [`path_assembler`] - Builds operations from path directives
//! 6. [`scanner`] and [`extractor`] - Walk directories and extract them concurrently
//! 7. [`openapi_builder`] - Orders the build steps into a document
//! 8. [`serializer`] and [`validator`] - Write the document and check the output
//! 9. [`swagger_ui`] - Exports a viewer page
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_comments::openapi_builder::{BuildStep, DocumentBuilder, Pipeline};
//! use std::path::Path;
//!
//! let generated = Pipeline::start(DocumentBuilder::new())
//!     .then(BuildStep::AddDefaultErrors, |b| b.add_default_errors(&[]))
//!     .then(BuildStep::ParseSchemas, |b| b.parse_schemas(Path::new("src/models")))
//!     .then(BuildStep::ParseEnums, |b| b.parse_enums(Path::new("src/models")))
//!     .then(BuildStep::ParsePaths, |b| b.parse_paths(Path::new("src/handlers")))
//!     .generate(Path::new("docs"))
//!     .unwrap();
//!
//! for finding in &generated.findings {
//!     eprintln!("{}", finding);
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod config;
pub mod constants;
pub mod declaration_scanner;
pub mod document;
pub mod error;
pub mod extractor;
pub mod grammar;
pub mod openapi_builder;
pub mod parser;
pub mod path_assembler;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod swagger_ui;
pub mod tag_parser;
pub mod type_mapper;
pub mod validator;
