use super::{ExtractionGroup, ExtractionOptions, Extracted, FileExtractor, Registry};
use crate::document::{PathItem, PathRegistry};
use crate::error::{ExtractError, FileError};
use crate::parser::ParsedFile;
use crate::path_assembler::{PathAssembler, PathContext};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

impl Registry for PathRegistry {
    /// Merges per method: an incoming operation replaces only the slot it
    /// occupies, and each replaced slot is reported as `"GET /path"`.
    fn merge(&mut self, incoming: Self) -> Vec<String> {
        let mut collisions = Vec::new();
        for (path, item) in incoming {
            if item.is_empty() {
                continue;
            }
            let overwritten = self
                .entry(path.clone())
                .or_insert_with(PathItem::default)
                .absorb(item);
            collisions.extend(
                overwritten
                    .into_iter()
                    .map(|method| format!("{} {}", method, path)),
            );
        }
        collisions
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

/// Path extraction unit; every worker shares one read-only context.
pub struct PathExtractor {
    context: Arc<PathContext>,
}

impl PathExtractor {
    pub fn new(context: Arc<PathContext>) -> Self {
        Self { context }
    }
}

impl FileExtractor for PathExtractor {
    type Output = PathRegistry;

    fn extract(&self, parsed: &ParsedFile) -> Result<PathRegistry, FileError> {
        PathAssembler::new(&self.context).generate(parsed)
    }
}

/// Extracts every documented operation under `root`.
pub fn extract_paths(
    root: &Path,
    context: Arc<PathContext>,
    options: ExtractionOptions,
) -> Result<Extracted<PathRegistry>, ExtractError> {
    ExtractionGroup::new(PathExtractor::new(context), options).run(root)
}
