use crate::constants::schema_ref;
use crate::declaration_scanner::{scan_declarations, ScannedDeclaration, ScannedField};
use crate::document::{Property, PropertyItems, Schema, SchemaRegistry};
use crate::error::FileError;
use crate::grammar::DeclarationKind;
use crate::parser::{AstParser, ParsedFile};
use crate::tag_parser::{numeric, FieldAttributes};
use crate::type_mapper::{open_api_format, open_api_type, FieldType};
use indexmap::IndexMap;
use log::debug;
use std::path::Path;

/// Schema generator - converts documented declarations into named schemas.
///
/// One generator runs one flow: object schemas for `@apiDefine`, string
/// enumerations for `@apiEnum`.
#[derive(Debug, Clone, Copy)]
pub struct SchemaGenerator {
    kind: DeclarationKind,
}

impl SchemaGenerator {
    pub fn new(kind: DeclarationKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    /// Parses `path` and generates every documented schema it declares.
    pub fn generate_file(&self, path: &Path) -> Result<SchemaRegistry, FileError> {
        let parsed = AstParser::parse_file(path)?;
        self.generate(&parsed)
    }

    /// Generates every documented schema declared in an already parsed file.
    pub fn generate(&self, parsed: &ParsedFile) -> Result<SchemaRegistry, FileError> {
        let declarations = scan_declarations(parsed, self.kind)?;

        Ok(declarations
            .iter()
            .map(|declaration| {
                let schema = match self.kind {
                    DeclarationKind::Schema => object_schema(declaration),
                    DeclarationKind::Enum => enum_schema(declaration),
                };
                (declaration.name.clone(), schema)
            })
            .collect())
    }
}

/// `{type: object, properties, required}` for a documented struct.
pub fn object_schema(declaration: &ScannedDeclaration) -> Schema {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();

    for field in &declaration.fields {
        let Some(property) = property_for(field) else {
            continue;
        };
        if field.attributes.required {
            required.push(field.name.clone());
        }
        properties.insert(field.name.clone(), property);
    }

    debug!(
        "Generated schema {} with {} properties",
        declaration.name,
        properties.len()
    );
    Schema::object(properties, required)
}

/// `{type: string, enum}` for a documented enum or struct.
///
/// Annotated entries contribute their `enumValue`, blank or not; entries
/// without any annotation contribute their output name.
pub fn enum_schema(declaration: &ScannedDeclaration) -> Schema {
    let values = declaration
        .fields
        .iter()
        .filter(|field| !field.attributes.ignored)
        .map(|field| {
            if field.annotated {
                field.attributes.enum_value.clone()
            } else {
                field.name.clone()
            }
        })
        .collect();

    Schema::enumeration(values)
}

/// Builds the property descriptor for one field, or `None` when the field is
/// ignored or its type cannot be described.
pub fn property_for(field: &ScannedField) -> Option<Property> {
    let attrs = &field.attributes;
    if attrs.ignored {
        return None;
    }

    let Some(field_type) = &field.field_type else {
        debug!("Skipping field {}: unsupported type without $ref", field.name);
        return None;
    };

    let location = attrs.location_or_default().to_string();
    let property = match field_type {
        FieldType::Reference(name) => Property {
            location,
            reference: Some(schema_ref(name)),
            ..Property::default()
        },
        FieldType::ArrayOfReference(name) => Property {
            location,
            property_type: Some("array".to_string()),
            items: Some(PropertyItems {
                reference: schema_ref(name),
            }),
            ..constrained(attrs)
        },
        FieldType::Primitive(name) => Property {
            location,
            property_type: Some(open_api_type(name).to_string()),
            format: Some(open_api_format(name).to_string()),
            ..constrained(attrs)
        },
    };

    Some(property)
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Example, nullability and constraints of a non-reference property.
fn constrained(attrs: &FieldAttributes) -> Property {
    Property {
        example: non_empty(&attrs.example),
        pattern: non_empty(&attrs.pattern),
        nullable: attrs.nullable,
        max_length: numeric(&attrs.max_length),
        min_length: numeric(&attrs.min_length),
        maximum: numeric(&attrs.maximum),
        minimum: numeric(&attrs.minimum),
        ..Property::default()
    }
}
