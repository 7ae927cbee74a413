//! OpenAPI generator - command-line tool for building OpenAPI documents from doc comments.
//!
//! Scans a Rust project for `@api` doc-comment directives and `#[openapi("...")]`
//! field annotations and writes an OpenAPI 3.0 document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-comments [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation next to the sources:
//! ```bash
//! openapi-from-comments ./my-api --schemas src/models --paths src/handlers
//! ```
//!
//! Generate JSON with the standard 404 and 500 error responses:
//! ```bash
//! openapi-from-comments ./my-api -o docs/openapi.json --error-ref Error --default-errors 404,500
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-comments ./my-api -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_comments::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
