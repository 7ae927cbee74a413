use super::{ExtractionGroup, ExtractionOptions, Extracted, FileExtractor, Registry};
use crate::document::SchemaRegistry;
use crate::error::{ExtractError, FileError};
use crate::grammar::DeclarationKind;
use crate::parser::ParsedFile;
use crate::schema_generator::SchemaGenerator;
use std::collections::BTreeMap;
use std::path::Path;

impl Registry for SchemaRegistry {
    fn merge(&mut self, incoming: Self) -> Vec<String> {
        incoming
            .into_iter()
            .filter_map(|(name, schema)| self.insert(name.clone(), schema).map(|_| name))
            .collect()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

impl FileExtractor for SchemaGenerator {
    type Output = SchemaRegistry;

    fn extract(&self, parsed: &ParsedFile) -> Result<SchemaRegistry, FileError> {
        self.generate(parsed)
    }
}

/// Extracts every `@apiDefine` or `@apiEnum` schema under `root`.
pub fn extract_schemas(
    root: &Path,
    kind: DeclarationKind,
    options: ExtractionOptions,
) -> Result<Extracted<SchemaRegistry>, ExtractError> {
    ExtractionGroup::new(SchemaGenerator::new(kind), options).run(root)
}
