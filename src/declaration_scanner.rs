//! Walks one parsed file's type declarations and collects the fields of every
//! declaration the file's doc blocks mark as documented.

use crate::constants::ANNOTATION_ATTRIBUTE;
use crate::error::FileError;
use crate::grammar::{documented_names, DeclarationKind};
use crate::parser::ParsedFile;
use crate::tag_parser::FieldAttributes;
use crate::type_mapper::{classify, FieldType};
use log::debug;
use std::collections::HashSet;
use syn::meta::ParseNestedMeta;
use syn::token::Paren;
use syn::{Attribute, Expr, Fields, Item, Lit, LitStr, Meta, Token};

/// One field of a documented struct, or one variant of a documented enum.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedField {
    /// Output name, after `#[serde(rename)]`.
    pub name: String,
    pub attributes: FieldAttributes,
    /// Whether the field carried an `openapi` attribute at all.
    pub annotated: bool,
    /// Classified type; always `None` for enum variants.
    pub field_type: Option<FieldType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannedDeclaration {
    pub name: String,
    pub fields: Vec<ScannedField>,
}

/// Scans `parsed` for declarations documented with `kind`'s keyword.
///
/// Fails with [`FileError::NoDirectives`] when the file documents nothing for
/// this flow. A documented name without a matching declaration yields nothing.
pub fn scan_declarations(
    parsed: &ParsedFile,
    kind: DeclarationKind,
) -> Result<Vec<ScannedDeclaration>, FileError> {
    let documented = documented_names(&parsed.doc_blocks, kind);
    if documented.is_empty() {
        return Err(FileError::NoDirectives {
            path: parsed.path.clone(),
            keyword: kind.keyword(),
        });
    }

    let mut declarations = Vec::new();
    scan_items(&parsed.syntax_tree.items, kind, &documented, &mut declarations);

    debug!(
        "{}: {} of {} documented declarations found",
        parsed.path.display(),
        declarations.len(),
        documented.len()
    );
    Ok(declarations)
}

fn scan_items(
    items: &[Item],
    kind: DeclarationKind,
    documented: &HashSet<String>,
    out: &mut Vec<ScannedDeclaration>,
) {
    for item in items {
        match item {
            Item::Struct(item_struct) if documented.contains(&item_struct.ident.to_string()) => {
                if let Fields::Named(named) = &item_struct.fields {
                    let fields = named.named.iter().filter_map(scan_field).collect();
                    out.push(ScannedDeclaration {
                        name: item_struct.ident.to_string(),
                        fields,
                    });
                }
            }
            Item::Enum(item_enum)
                if kind == DeclarationKind::Enum
                    && documented.contains(&item_enum.ident.to_string()) =>
            {
                let fields = item_enum
                    .variants
                    .iter()
                    .filter(|variant| !serde_attribute(&variant.attrs).skip)
                    .map(|variant| {
                        let (attributes, annotated) = annotation(&variant.attrs);
                        ScannedField {
                            name: serde_attribute(&variant.attrs)
                                .rename
                                .unwrap_or_else(|| variant.ident.to_string()),
                            attributes,
                            annotated,
                            field_type: None,
                        }
                    })
                    .collect();
                out.push(ScannedDeclaration {
                    name: item_enum.ident.to_string(),
                    fields,
                });
            }
            Item::Mod(module) => {
                if let Some((_, nested)) = &module.content {
                    scan_items(nested, kind, documented, out);
                }
            }
            _ => {}
        }
    }
}

fn scan_field(field: &syn::Field) -> Option<ScannedField> {
    let ident = field.ident.as_ref()?;
    let serde = serde_attribute(&field.attrs);
    if serde.skip {
        return None;
    }

    let (attributes, annotated) = annotation(&field.attrs);
    let field_type = classify(&field.ty, &attributes.reference);
    Some(ScannedField {
        name: serde.rename.unwrap_or_else(|| ident.to_string()),
        attributes,
        annotated,
        field_type,
    })
}

/// Reads `#[openapi("...")]`, `#[openapi = "..."]` or a bare `#[openapi]`.
fn annotation(attrs: &[Attribute]) -> (FieldAttributes, bool) {
    let Some(attr) = attrs
        .iter()
        .find(|attr| attr.path().is_ident(ANNOTATION_ATTRIBUTE))
    else {
        return (FieldAttributes::default(), false);
    };

    let text = match &attr.meta {
        Meta::List(_) => attr
            .parse_args::<LitStr>()
            .map(|lit| lit.value())
            .unwrap_or_else(|e| {
                debug!("Unreadable openapi attribute: {}", e);
                String::new()
            }),
        Meta::NameValue(name_value) => match &name_value.value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(lit) => lit.value(),
                _ => String::new(),
            },
            _ => String::new(),
        },
        Meta::Path(_) => String::new(),
    };

    (FieldAttributes::parse(&text), true)
}

#[derive(Debug, Default)]
struct SerdeAttribute {
    rename: Option<String>,
    skip: bool,
}

fn serde_attribute(attrs: &[Attribute]) -> SerdeAttribute {
    let mut found = SerdeAttribute::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                found.skip = true;
            } else if meta.path.is_ident("rename") {
                found.rename = rename_value(&meta)?.or(found.rename.take());
            } else {
                skip_meta(&meta)?;
            }
            Ok(())
        });
        if let Err(e) = parsed {
            debug!("Unreadable serde attribute: {}", e);
        }
    }
    found
}

/// `rename = "x"`, or the `serialize` name of `rename(serialize = "x", ...)`.
fn rename_value(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse::<LitStr>()?.value()));
    }

    let mut serialized = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            serialized = Some(inner.value()?.parse::<LitStr>()?.value());
        } else {
            skip_meta(&inner)?;
        }
        Ok(())
    })?;
    Ok(serialized)
}

/// Consumes whatever follows a serde key we do not read.
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}
