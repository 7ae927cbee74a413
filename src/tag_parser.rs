//! Parsing of `#[openapi("...")]` field annotation strings.
//!
//! An annotation is a `;` separated list of clauses. A clause is either a bare
//! flag (`required`, `nullable`, `ignored`) or a `key:value` pair split at the
//! first `:`, so values such as patterns may themselves contain colons.
//!
//! ```
//! use openapi_from_comments::tag_parser::FieldAttributes;
//!
//! let attrs = FieldAttributes::parse("in:path;required;example:42;pattern:^[0-9]+$");
//! assert_eq!(attrs.location, "path");
//! assert!(attrs.required);
//! assert_eq!(attrs.pattern, "^[0-9]+$");
//! ```

use log::debug;

/// One parsed field annotation.
///
/// Constraints are kept as the text found in the annotation and converted
/// with [`numeric`] where they are used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAttributes {
    /// `query`, `path`, `header` or `body`. Empty means `query`.
    pub location: String,
    pub example: String,
    /// Bare schema name the field refers to.
    pub reference: String,
    pub required: bool,
    pub nullable: bool,
    pub ignored: bool,
    pub max_length: String,
    pub min_length: String,
    pub minimum: String,
    pub maximum: String,
    pub pattern: String,
    pub enum_value: String,
}

impl FieldAttributes {
    /// Parses an annotation string. Unknown keys and malformed clauses are
    /// dropped; an `ignored` flag anywhere discards everything else.
    pub fn parse(annotation: &str) -> Self {
        let mut attrs = FieldAttributes::default();

        for clause in annotation.split(';') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }

            match clause.split_once(':') {
                None => match clause {
                    "required" => attrs.required = true,
                    "nullable" => attrs.nullable = true,
                    "ignored" => attrs.ignored = true,
                    other => debug!("Dropping unknown annotation flag `{}`", other),
                },
                Some((key, value)) => {
                    let value = value.trim().to_string();
                    match key.trim() {
                        "in" => attrs.location = value,
                        "example" => attrs.example = value,
                        "$ref" => attrs.reference = value,
                        "maxLength" => attrs.max_length = value,
                        "minLength" => attrs.min_length = value,
                        "minimum" => attrs.minimum = value,
                        "maximum" => attrs.maximum = value,
                        "pattern" => attrs.pattern = value,
                        "enumValue" => attrs.enum_value = value,
                        other => debug!("Dropping unknown annotation key `{}`", other),
                    }
                }
            }
        }

        if attrs.ignored {
            return FieldAttributes {
                ignored: true,
                ..FieldAttributes::default()
            };
        }

        attrs
    }

    /// Request location, defaulting to `query`.
    pub fn location_or_default(&self) -> &str {
        if self.location.is_empty() {
            "query"
        } else {
            &self.location
        }
    }
}

/// Integer value of a constraint; anything non-numeric is zero.
pub fn numeric(text: &str) -> i64 {
    text.trim().parse::<i64>().unwrap_or(0)
}
