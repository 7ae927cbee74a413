//! Directive grammar for doc-comment blocks.
//!
//! A block is normalized to a single line, then split into `@api<Name>:`
//! keys, each owning the trimmed text up to the next key:
//!
//! ```text
//! /// @apiPath: /users/{id}
//! /// @apiMethod: GET
//! /// @apiResponseRef: User
//! /// @apiCustomErrorRef404: NotFoundError
//! ```

use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Which kind of declaration a doc block can mark as documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `@apiDefine: Name`, an object schema.
    Schema,
    /// `@apiEnum: Name`, a string enumeration.
    Enum,
}

impl DeclarationKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclarationKind::Schema => "@apiDefine",
            DeclarationKind::Enum => "@apiEnum",
        }
    }

    fn directive_name(&self) -> &'static str {
        match self {
            DeclarationKind::Schema => "Define",
            DeclarationKind::Enum => "Enum",
        }
    }
}

/// One parsed path documentation block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveRecord {
    pub path: String,
    pub method: String,
    pub description: String,
    pub summary: String,
    pub request_ref: String,
    pub response_ref: String,
    pub status_code: String,
    pub tag: String,
    pub parameters_ref: String,
    pub deprecated: bool,
    pub error_status_codes: Vec<String>,
    pub custom_error_refs: BTreeMap<String, String>,
    pub custom_error_descriptions: BTreeMap<String, String>,
    /// Security scheme name -> scopes, in declaration order.
    pub security: IndexMap<String, Vec<String>>,
}

/// A directive found in a block: key name without the `@api` prefix, the
/// numeric suffix of parametrized keys (possibly empty) and the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub code: String,
    pub value: String,
}

fn directive_key() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| Regex::new(r"@api([A-Za-z]+?)(\d*)\s*:").expect("Invalid regex"))
}

/// Joins a multi-line block into one line.
pub fn normalize(block: &str) -> String {
    block
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// Splits a block into its directives, in order of appearance.
pub fn directives(block: &str) -> Vec<Directive> {
    let text = normalize(block);
    let key_re = directive_key();
    let keys: Vec<_> = key_re.captures_iter(&text).collect();

    keys.iter()
        .enumerate()
        .filter_map(|(index, caps)| {
            let whole = caps.get(0)?;
            let value_end = keys
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map(|next| next.start())
                .unwrap_or(text.len());
            Some(Directive {
                name: caps.get(1)?.as_str().to_string(),
                code: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                value: text[whole.end()..value_end].trim().to_string(),
            })
        })
        .collect()
}

/// Comma separated list with blanks removed.
fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a path documentation block.
///
/// Returns `None` when the block carries no recognized path directive.
pub fn parse_directive_record(block: &str) -> Option<DirectiveRecord> {
    let mut record = DirectiveRecord::default();
    let mut recognized = false;

    for directive in directives(block) {
        let value = directive.value;
        let known = match (directive.name.as_str(), directive.code.is_empty()) {
            ("Path", true) => {
                record.path = first_token(&value);
                true
            }
            ("Method", true) => {
                record.method = first_token(&value);
                true
            }
            ("Description", true) => {
                record.description = value;
                true
            }
            ("Summary", true) => {
                record.summary = value;
                true
            }
            ("RequestRef", true) => {
                record.request_ref = first_token(&value);
                true
            }
            ("ResponseRef", true) => {
                record.response_ref = first_token(&value);
                true
            }
            ("StatusCode", true) => {
                record.status_code = first_token(&value);
                true
            }
            ("Tag", true) => {
                record.tag = value;
                true
            }
            ("ParametersRef", true) => {
                record.parameters_ref = first_token(&value);
                true
            }
            ("Deprecated", true) => {
                record.deprecated = first_token(&value).eq_ignore_ascii_case("true");
                true
            }
            ("ErrorStatusCodes", true) => {
                record
                    .error_status_codes
                    .extend(comma_list(&value).iter().map(String::as_str).map(first_token));
                true
            }
            ("Security", true) => {
                let mut parts = comma_list(&value).into_iter();
                if let Some(scheme) = parts.next() {
                    record.security.insert(scheme, parts.collect());
                }
                true
            }
            ("CustomErrorRef", false) => {
                record.custom_error_refs.insert(directive.code.clone(), value);
                true
            }
            ("CustomErrorDescription", false) => {
                record.custom_error_descriptions.insert(directive.code.clone(), value);
                true
            }
            _ => false,
        };

        if known {
            recognized = true;
        } else {
            debug!("Ignoring directive @api{}{}", directive.name, directive.code);
        }
    }

    recognized.then_some(record)
}

/// Single-value directives end at the first whitespace; prose after them
/// on a continuation line is not part of the value.
fn first_token(value: &str) -> String {
    value.split_whitespace().next().unwrap_or_default().to_string()
}

/// Names declared documented by `kind` across the given blocks.
pub fn documented_names<S: AsRef<str>>(blocks: &[S], kind: DeclarationKind) -> HashSet<String> {
    blocks
        .iter()
        .flat_map(|block| directives(block.as_ref()))
        .filter(|directive| directive.name == kind.directive_name() && directive.code.is_empty())
        .filter_map(|directive| directive.value.split_whitespace().next().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_joins_lines() {
        assert_eq!(normalize(" a\nb\r\nc\r"), "a b c");
    }

    #[test]
    fn test_directives_split_on_keys() {
        let found = directives("@apiPath: /users\n@apiMethod:GET   @apiDescription: List all users");
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].name, "Path");
        assert_eq!(found[0].value, "/users");
        assert_eq!(found[1].value, "GET");
        assert_eq!(found[2].value, "List all users");
    }

    #[test]
    fn test_parametrized_keys_carry_code() {
        let found = directives("@apiCustomErrorRef404: Missing @apiCustomErrorDescription500: Boom");
        assert_eq!(found[0].name, "CustomErrorRef");
        assert_eq!(found[0].code, "404");
        assert_eq!(found[1].name, "CustomErrorDescription");
        assert_eq!(found[1].code, "500");
        assert_eq!(found[1].value, "Boom");
    }

    #[test]
    fn test_parse_full_record() {
        let block = "Fetches one user.\n\
                     @apiPath: /users/{id}\n\
                     @apiMethod: get\n\
                     @apiSummary: Get user\n\
                     @apiParametersRef: UserParams\n\
                     @apiResponseRef: User\n\
                     @apiStatusCode: 200\n\
                     @apiTag: users\n\
                     @apiDeprecated: true\n\
                     @apiErrorStatusCodes: 404, 500\n\
                     @apiSecurity: oauth, read:users, write:users\n\
                     @apiSecurity: apiKey\n\
                     @apiCustomErrorRef404: NotFound\n\
                     @apiCustomErrorDescription404: No such user";

        let record = parse_directive_record(block).unwrap();

        assert_eq!(record.path, "/users/{id}");
        assert_eq!(record.method, "get");
        assert_eq!(record.summary, "Get user");
        assert_eq!(record.parameters_ref, "UserParams");
        assert_eq!(record.response_ref, "User");
        assert_eq!(record.status_code, "200");
        assert_eq!(record.tag, "users");
        assert!(record.deprecated);
        assert_eq!(record.error_status_codes, vec!["404", "500"]);
        assert_eq!(
            record.security.get("oauth"),
            Some(&vec!["read:users".to_string(), "write:users".to_string()])
        );
        assert_eq!(record.security.get("apiKey"), Some(&Vec::new()));
        assert_eq!(record.custom_error_refs.get("404").map(String::as_str), Some("NotFound"));
        assert_eq!(
            record.custom_error_descriptions.get("404").map(String::as_str),
            Some("No such user")
        );
    }

    #[test]
    fn test_trailing_prose_not_part_of_value() {
        let block = "@apiPath: /users\n\
                     @apiMethod: GET\n\
                     Returns every user.";

        let record = parse_directive_record(block).unwrap();

        assert_eq!(record.path, "/users");
        assert_eq!(record.method, "GET");

        let block = "@apiPath: /users @apiErrorStatusCodes: 404, 500 when missing";
        let record = parse_directive_record(block).unwrap();
        assert_eq!(record.error_status_codes, vec!["404", "500"]);
    }

    #[test]
    fn test_unknown_coded_directive_beside_known_ones() {
        let block = "@apiPath: /orders\n\
                     @apiOther404: ignored\n\
                     @apiCustomErrorRef409: Conflict\n\
                     @apiCustomErrorDescription409: Already placed";

        let record = parse_directive_record(block).unwrap();

        assert_eq!(record.path, "/orders");
        assert_eq!(record.custom_error_refs.get("409").map(String::as_str), Some("Conflict"));
        assert_eq!(
            record.custom_error_descriptions.get("409").map(String::as_str),
            Some("Already placed")
        );
        assert!(!record.custom_error_refs.contains_key("404"));
    }

    #[test]
    fn test_block_without_path_directives() {
        assert!(parse_directive_record("Just a normal doc comment.").is_none());
        assert!(parse_directive_record("@apiDefine: User").is_none());
        assert!(parse_directive_record("@apiUnknown: value").is_none());
    }

    #[test]
    fn test_documented_names() {
        let blocks = vec![
            "@apiDefine: User".to_string(),
            "@apiDefine: Order extra words".to_string(),
            "@apiEnum: Status".to_string(),
            "no directives".to_string(),
        ];

        let schemas = documented_names(&blocks, DeclarationKind::Schema);
        assert_eq!(schemas.len(), 2);
        assert!(schemas.contains("User"));
        assert!(schemas.contains("Order"));

        let enums = documented_names(&blocks, DeclarationKind::Enum);
        assert_eq!(enums.len(), 1);
        assert!(enums.contains("Status"));
    }
}
