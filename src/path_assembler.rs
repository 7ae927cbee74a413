//! Turns parsed path directive records into operations.

use crate::constants::{response_description, schema_ref};
use crate::document::{
    HttpMethod, MediaType, Operation, Parameter, ParameterSchema, PathItem, PathRegistry,
    RequestBody, Response, Responses, SchemaRegistry, SecurityRequirement,
};
use crate::error::FileError;
use crate::grammar::{parse_directive_record, DirectiveRecord};
use crate::parser::{AstParser, ParsedFile};
use log::{debug, warn};
use std::path::Path;

/// Read-only inputs shared by every path extraction unit.
#[derive(Debug, Clone, Default)]
pub struct PathContext {
    /// Schemas already extracted; parameter sets are resolved against them.
    pub schemas: SchemaRegistry,
    /// Error responses overlaid on every operation, keyed by status code.
    pub error_responses: Responses,
}

/// Builds per-path operations from directive records.
pub struct PathAssembler<'a> {
    context: &'a PathContext,
}

impl<'a> PathAssembler<'a> {
    pub fn new(context: &'a PathContext) -> Self {
        Self { context }
    }

    /// Parses `path` and assembles every documented operation in it.
    pub fn generate_file(&self, path: &Path) -> Result<PathRegistry, FileError> {
        let parsed = AstParser::parse_file(path)?;
        self.generate(&parsed)
    }

    pub fn generate(&self, parsed: &ParsedFile) -> Result<PathRegistry, FileError> {
        let records: Vec<DirectiveRecord> = parsed
            .doc_blocks
            .iter()
            .filter_map(|block| parse_directive_record(block))
            .collect();

        if records.is_empty() {
            return Err(FileError::NoDirectives {
                path: parsed.path.clone(),
                keyword: "@apiPath",
            });
        }

        Ok(self.assemble(&records))
    }

    /// Assembles records in order. Later records for the same path and
    /// method replace earlier ones; other methods on the path are kept.
    pub fn assemble(&self, records: &[DirectiveRecord]) -> PathRegistry {
        let mut paths = PathRegistry::new();

        for record in records {
            let api_path = normalize_path(&record.path);
            if api_path.is_empty() {
                continue;
            }

            let method = match record.method.parse::<HttpMethod>() {
                Ok(method) => method,
                Err(e) => {
                    warn!("Skipping {}: {}", api_path, e);
                    continue;
                }
            };

            let operation = self.operation_for(record, method, &api_path);
            let replaced = paths
                .entry(api_path.clone())
                .or_insert_with(PathItem::default)
                .set_operation(method, operation);
            if replaced.is_some() {
                debug!("{} {} declared twice, keeping the later one", method, api_path);
            }
        }

        paths
    }

    /// Builds the operation for one record bound to `method` at `api_path`.
    pub fn operation_for(
        &self,
        record: &DirectiveRecord,
        method: HttpMethod,
        api_path: &str,
    ) -> Operation {
        let mut responses = Responses::new();
        let status_code = if record.status_code.is_empty() {
            "200"
        } else {
            record.status_code.as_str()
        };
        responses.insert(
            status_code.to_string(),
            Response {
                description: response_description(status_code).to_string(),
                content: non_empty(&record.response_ref)
                    .map(|name| MediaType::content_for(&schema_ref(&name))),
            },
        );

        for (code, response) in &self.context.error_responses {
            if record.error_status_codes.is_empty() || record.error_status_codes.contains(code) {
                responses.insert(code.clone(), response.clone());
            }
        }

        for (code, response) in responses.iter_mut() {
            let custom_ref = record.custom_error_refs.get(code);
            let custom_description = record.custom_error_descriptions.get(code);
            if custom_ref.is_none() && custom_description.is_none() {
                continue;
            }
            response.description = custom_description
                .cloned()
                .unwrap_or_else(|| response_description(code).to_string());
            if let Some(name) = custom_ref {
                response.set_reference(&schema_ref(name));
            }
        }

        let security = record
            .security
            .iter()
            .map(|(scheme, scopes)| {
                let mut requirement = SecurityRequirement::new();
                requirement.insert(scheme.clone(), scopes.clone());
                requirement
            })
            .collect();

        Operation {
            tags: non_empty(&record.tag).into_iter().collect(),
            summary: non_empty(&record.summary),
            description: non_empty(&record.description),
            operation_id: Some(operation_id(api_path, method)),
            parameters: self.parameters_for(&record.parameters_ref),
            request_body: non_empty(&record.request_ref).map(|name| RequestBody {
                description: None,
                required: true,
                content: MediaType::content_for(&schema_ref(&name)),
            }),
            responses,
            security,
            deprecated: record.deprecated,
        }
    }

    /// One parameter per property of the named schema, in property order.
    fn parameters_for(&self, schema_name: &str) -> Vec<Parameter> {
        if schema_name.is_empty() {
            return Vec::new();
        }
        let Some(schema) = self.context.schemas.get(schema_name) else {
            debug!("Parameter schema {} is not registered", schema_name);
            return Vec::new();
        };

        schema
            .properties
            .iter()
            .map(|(name, property)| {
                let location = if property.location.is_empty() {
                    "query".to_string()
                } else {
                    property.location.clone()
                };
                Parameter {
                    name: name.clone(),
                    required: location == "path",
                    location,
                    description: None,
                    schema: ParameterSchema {
                        schema_type: property.property_type.clone(),
                        format: property.format.clone(),
                        reference: property.reference.clone(),
                        items: property.items.clone(),
                    },
                    example: property.example.clone(),
                }
            })
            .collect()
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Prefixes a non-empty path with `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// `UpperFirst(first path segment)` followed by the method's action.
pub fn operation_id(api_path: &str, method: HttpMethod) -> String {
    let segment = api_path
        .split('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or_default();

    let mut chars = segment.chars();
    let upper_first = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{}{}", upper_first, method.action())
}
