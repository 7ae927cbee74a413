use crate::error::FileError;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use syn::visit::{self, Visit};
use syn::{AttrStyle, Attribute, Expr, ImplItemFn, Item, Lit, Meta, TraitItemFn};

/// Parser for Rust source files.
///
/// Reads a file, parses it with `syn` and collects its doc-comment blocks so
/// later stages can look for `@api` directives without walking the tree
/// again.
///
/// # Example
///
/// ```no_run
/// use openapi_from_comments::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/handlers.rs")).unwrap();
/// println!("{} doc blocks", parsed.doc_blocks.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
    /// Doc-comment blocks in source order, one per documented item plus the
    /// file's own `//!` block.
    pub doc_blocks: Vec<String>,
}

impl AstParser {
    /// Parses a single Rust source file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    /// - The file has no doc comments at all
    pub fn parse_file(path: &Path) -> Result<ParsedFile, FileError> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_source(path, &content)
    }

    /// Parses already loaded source text attributed to `path`.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile, FileError> {
        let syntax_tree = syn::parse_file(content).map_err(|e| FileError::Syntax {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let doc_blocks = collect_doc_blocks(&syntax_tree);
        if doc_blocks.is_empty() {
            return Err(FileError::NoComments {
                path: path.to_path_buf(),
            });
        }

        debug!(
            "Parsed {} with {} doc blocks",
            path.display(),
            doc_blocks.len()
        );

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
            doc_blocks,
        })
    }

    /// Parses multiple files, continuing past failures.
    ///
    /// Failures are only logged at debug level: a file that cannot contribute
    /// is skipped by every caller.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile, FileError>> {
        let results: Vec<_> = paths
            .iter()
            .map(|path| {
                let result = Self::parse_file(path);
                if let Err(e) = &result {
                    debug!("Skipping {}: {}", path.display(), e);
                }
                result
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} skipped",
            success_count,
            results.len() - success_count
        );

        results
    }
}

/// Text of the `#[doc]` attributes of one style, joined with newlines.
pub fn doc_text(attrs: &[Attribute], style: AttrStyle) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.style == style && attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(text) => Some(text.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn collect_doc_blocks(file: &syn::File) -> Vec<String> {
    let mut collector = DocBlockCollector::default();
    collector.visit_file(file);
    collector.blocks
}

#[derive(Default)]
struct DocBlockCollector {
    blocks: Vec<String>,
}

impl DocBlockCollector {
    fn record(&mut self, attrs: &[Attribute]) {
        for style in [AttrStyle::Inner(Default::default()), AttrStyle::Outer] {
            if let Some(block) = doc_text(attrs, style) {
                if !block.trim().is_empty() {
                    self.blocks.push(block);
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for DocBlockCollector {
    fn visit_file(&mut self, file: &'ast syn::File) {
        self.record(&file.attrs);
        visit::visit_file(self, file);
    }

    fn visit_item(&mut self, item: &'ast Item) {
        let attrs = match item {
            Item::Const(i) => &i.attrs,
            Item::Enum(i) => &i.attrs,
            Item::Fn(i) => &i.attrs,
            Item::Impl(i) => &i.attrs,
            Item::Macro(i) => &i.attrs,
            Item::Mod(i) => &i.attrs,
            Item::Static(i) => &i.attrs,
            Item::Struct(i) => &i.attrs,
            Item::Trait(i) => &i.attrs,
            Item::Type(i) => &i.attrs,
            Item::Union(i) => &i.attrs,
            Item::Use(i) => &i.attrs,
            _ => {
                visit::visit_item(self, item);
                return;
            }
        };
        self.record(attrs);
        visit::visit_item(self, item);
    }

    fn visit_impl_item_fn(&mut self, item: &'ast ImplItemFn) {
        self.record(&item.attrs);
        visit::visit_impl_item_fn(self, item);
    }

    fn visit_trait_item_fn(&mut self, item: &'ast TraitItemFn) {
        self.record(&item.attrs);
        visit::visit_trait_item_fn(self, item);
    }
}
