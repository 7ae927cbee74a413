//! Structural checks over a serialized document.
//!
//! The document is re-read from its YAML or JSON text rather than taken from
//! the in-memory model, so mapping keys that appear twice in the text are seen
//! twice here.

use crate::constants::SCHEMA_REF_PREFIX;
use crate::document::HttpMethod;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

/// One structural problem found in a written document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFinding {
    #[error("reference {reference} does not resolve to a schema")]
    UnresolvedRef { reference: String },
    #[error("operationId {id} is used by more than one operation")]
    DuplicateOperationId { id: String },
    #[error("schema {schema} declares property {property} more than once")]
    DuplicatePropertyName { schema: String, property: String },
    #[error("path {path} does not start with '/'")]
    PathMissingLeadingSlash { path: String },
    #[error("GET {path} declares parameter {name} more than once")]
    DuplicateGetParameter { path: String, name: String },
    #[error("{method} {path} is declared more than once")]
    DuplicateMethodPath { method: String, path: String },
    #[error("document could not be parsed: {0}")]
    Unparseable(String),
}

/// Ordered mapping that keeps every entry, duplicates included.
#[derive(Debug)]
struct Entries<T>(Vec<(String, T)>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Entries(Vec::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(Entries::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    entries.push((key, map.next_value()?));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    paths: Entries<RawPathItem>,
    #[serde(default)]
    components: RawComponents,
}

/// The operations of one path, in text order; other path item keys are
/// skipped.
#[derive(Debug, Default)]
struct RawPathItem(Vec<(String, RawOperation)>);

impl<'de> Deserialize<'de> for RawPathItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathItemVisitor;

        impl<'de> Visitor<'de> for PathItemVisitor {
            type Value = RawPathItem;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a path item mapping")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(RawPathItem::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut operations = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    if key.parse::<HttpMethod>().is_ok() {
                        operations.push((key.to_ascii_uppercase(), map.next_value()?));
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(RawPathItem(operations))
            }
        }

        deserializer.deserialize_map(PathItemVisitor)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawOperation {
    #[serde(rename = "operationId")]
    operation_id: Option<String>,
    #[serde(default)]
    parameters: Vec<RawParameter>,
    #[serde(rename = "requestBody")]
    request_body: Option<RawContent>,
    #[serde(default)]
    responses: Entries<RawContent>,
}

#[derive(Debug, Default, Deserialize)]
struct RawParameter {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    #[serde(default)]
    content: Entries<RawMedia>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMedia {
    schema: Option<RawRef>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRef {
    #[serde(rename = "$ref")]
    reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawComponents {
    #[serde(default)]
    schemas: Entries<RawSchema>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSchema {
    #[serde(default)]
    properties: Entries<RawProperty>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperty {
    #[serde(rename = "$ref")]
    reference: Option<String>,
    items: Option<RawRef>,
}

/// Validates YAML or JSON document text, returning every finding.
pub fn validate_raw(text: &str) -> Vec<ValidationFinding> {
    let document: RawDocument = match serde_yaml::from_str(text) {
        Ok(document) => document,
        Err(e) => return vec![ValidationFinding::Unparseable(e.to_string())],
    };

    let mut findings = Vec::new();
    findings.extend(check_refs(&document));
    findings.extend(check_operation_ids(&document));
    findings.extend(check_property_names(&document));
    findings.extend(check_leading_slash(&document));
    findings.extend(check_duplicate_routes(&document));
    findings
}

fn operations(document: &RawDocument) -> impl Iterator<Item = (&str, &str, &RawOperation)> {
    document.paths.0.iter().flat_map(|(path, item)| {
        item.0
            .iter()
            .map(move |(method, operation)| (path.as_str(), method.as_str(), operation))
    })
}

fn check_refs(document: &RawDocument) -> Vec<ValidationFinding> {
    let schema_names: HashSet<&str> = document
        .components
        .schemas
        .0
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();

    let mut references: Vec<&str> = Vec::new();
    for (_, _, operation) in operations(document) {
        let bodies = operation
            .request_body
            .iter()
            .chain(operation.responses.0.iter().map(|(_, response)| response));
        for body in bodies {
            references.extend(
                body.content
                    .0
                    .iter()
                    .filter_map(|(_, media)| media.schema.as_ref()?.reference.as_deref()),
            );
        }
    }
    for (_, schema) in &document.components.schemas.0 {
        for (_, property) in &schema.properties.0 {
            references.extend(property.reference.as_deref());
            references.extend(
                property
                    .items
                    .as_ref()
                    .and_then(|items| items.reference.as_deref()),
            );
        }
    }

    let mut reported = HashSet::new();
    references
        .into_iter()
        .filter(|reference| {
            let resolved = reference
                .strip_prefix(SCHEMA_REF_PREFIX)
                .is_some_and(|name| schema_names.contains(name));
            !resolved && reported.insert(*reference)
        })
        .map(|reference| ValidationFinding::UnresolvedRef {
            reference: reference.to_string(),
        })
        .collect()
}

/// Names that occur more than once, each reported once in first-seen order.
fn repeated<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for name in names {
        let count = counts.entry(name).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(name);
        }
    }
    order
}

fn check_operation_ids(document: &RawDocument) -> Vec<ValidationFinding> {
    let ids = operations(document).filter_map(|(_, _, operation)| operation.operation_id.as_deref());
    repeated(ids)
        .into_iter()
        .map(|id| ValidationFinding::DuplicateOperationId { id: id.to_string() })
        .collect()
}

fn check_property_names(document: &RawDocument) -> Vec<ValidationFinding> {
    document
        .components
        .schemas
        .0
        .iter()
        .flat_map(|(schema, definition)| {
            let names = definition.properties.0.iter().map(|(name, _)| name.as_str());
            repeated(names)
                .into_iter()
                .map(move |property| ValidationFinding::DuplicatePropertyName {
                    schema: schema.clone(),
                    property: property.to_string(),
                })
        })
        .collect()
}

fn check_leading_slash(document: &RawDocument) -> Vec<ValidationFinding> {
    document
        .paths
        .0
        .iter()
        .filter(|(path, _)| !path.starts_with('/'))
        .map(|(path, _)| ValidationFinding::PathMissingLeadingSlash { path: path.clone() })
        .collect()
}

fn check_duplicate_routes(document: &RawDocument) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();

    for (path, method, operation) in operations(document) {
        if method != "GET" {
            continue;
        }
        let names = operation.parameters.iter().filter_map(|p| p.name.as_deref());
        findings.extend(repeated(names).into_iter().map(|name| {
            ValidationFinding::DuplicateGetParameter {
                path: path.to_string(),
                name: name.to_string(),
            }
        }));
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for (path, method, _) in operations(document) {
        if !seen.insert((method, path)) && reported.insert((method, path)) {
            findings.push(ValidationFinding::DuplicateMethodPath {
                method: method.to_string(),
                path: path.to_string(),
            });
        }
    }

    findings
}
