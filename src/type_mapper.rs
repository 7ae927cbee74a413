//! Mapping of declared Rust field types to OpenAPI `(type, format)` pairs.

use syn::{GenericArgument, PathArguments, Type};

/// Outcome of classifying one field's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A table-known scalar, free-form object or `Vec` of one. The name is
    /// the lookup key for [`open_api_type`] and [`open_api_format`].
    Primitive(String),
    /// A single value of another documented schema.
    Reference(String),
    /// A sequence of another documented schema.
    ArrayOfReference(String),
}

const TRANSPARENT_WRAPPERS: &[&str] = &["Option", "Box", "Rc", "Arc"];
const SEQUENCES: &[&str] = &["Vec", "VecDeque", "HashSet", "BTreeSet"];

/// Output type for a primitive name. Unknown names are objects.
pub fn open_api_type(name: &str) -> &'static str {
    if sequence_element(name).is_some() {
        return "array";
    }
    match name {
        "String" | "str" | "char" => "string",
        "bool" => "boolean",
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" => "integer",
        "f32" | "f64" => "number",
        "DateTime" | "NaiveDateTime" | "NaiveDate" | "Uuid" => "string",
        _ => "object",
    }
}

/// Output format for a primitive name. Sequences take their element's
/// format; unknown names are strings.
pub fn open_api_format(name: &str) -> &'static str {
    if let Some(element) = sequence_element(name) {
        return open_api_format(element);
    }
    match name {
        "String" | "str" | "char" => "string",
        "bool" => "boolean",
        "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => "int32",
        "i64" | "i128" | "isize" | "u64" | "u128" | "usize" => "int64",
        "f32" => "float",
        "f64" => "double",
        "DateTime" | "NaiveDateTime" => "date-time",
        "NaiveDate" => "date",
        "Uuid" => "uuid",
        "Value" | "HashMap" | "BTreeMap" => "object",
        _ => "string",
    }
}

fn sequence_element(name: &str) -> Option<&str> {
    name.strip_prefix("Vec<").and_then(|rest| rest.strip_suffix('>'))
}

fn is_known_primitive(name: &str) -> bool {
    open_api_type(name) != "object" || matches!(name, "Value" | "HashMap" | "BTreeMap")
}

/// Classifies a field in a single pass.
///
/// `explicit_ref` is the `$ref` annotation value, empty when absent. Returns
/// `None` for shapes that cannot be described without an explicit reference.
pub fn classify(ty: &Type, explicit_ref: &str) -> Option<FieldType> {
    let ty = unwrap_transparent(ty);

    if !explicit_ref.is_empty() {
        return Some(if sequence_inner(ty).is_some() {
            FieldType::ArrayOfReference(explicit_ref.to_string())
        } else {
            FieldType::Reference(explicit_ref.to_string())
        });
    }

    if let Some(inner) = sequence_inner(ty) {
        return match classify(inner, "")? {
            FieldType::Primitive(name) if sequence_element(&name).is_none() => {
                Some(FieldType::Primitive(format!("Vec<{}>", name)))
            }
            FieldType::Reference(name) => Some(FieldType::ArrayOfReference(name)),
            _ => None,
        };
    }

    let (ident, has_arguments) = last_segment(ty)?;
    if is_known_primitive(&ident) {
        Some(FieldType::Primitive(ident))
    } else if !has_arguments {
        Some(FieldType::Reference(ident))
    } else {
        None
    }
}

/// Strips `Option`, `Box`, `Rc`, `Arc` and references.
fn unwrap_transparent(ty: &Type) -> &Type {
    match ty {
        Type::Reference(reference) => unwrap_transparent(&reference.elem),
        Type::Paren(paren) => unwrap_transparent(&paren.elem),
        Type::Path(_) => match single_generic(ty, TRANSPARENT_WRAPPERS) {
            Some(inner) => unwrap_transparent(inner),
            None => ty,
        },
        _ => ty,
    }
}

/// Element type of a `Vec`-like, slice or array shape.
fn sequence_inner(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Slice(slice) => Some(slice.elem.as_ref()),
        Type::Array(array) => Some(array.elem.as_ref()),
        Type::Path(_) => single_generic(ty, SEQUENCES).map(unwrap_transparent),
        _ => None,
    }
}

/// The only type argument of a path type whose last segment is one of `names`.
fn single_generic<'a>(ty: &'a Type, names: &[&str]) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if !names.contains(&segment.ident.to_string().as_str()) {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

fn last_segment(ty: &Type) -> Option<(String, bool)> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => {
            let segment = type_path.path.segments.last()?;
            Some((
                segment.ident.to_string(),
                !matches!(segment.arguments, PathArguments::None),
            ))
        }
        _ => None,
    }
}
