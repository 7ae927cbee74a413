//! Static default tables: document metadata, content encodings, ignore lists
//! and the standard HTTP response descriptions.

pub const OPEN_API_VERSION: &str = "3.0.0";

/// Prefix every schema `$ref` is built from.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

pub const DEFAULT_FILE_NAME: &str = "openapi.yaml";

pub const DEFAULT_TITLE: &str = "Generated API";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_DESCRIPTION: &str = "API documentation generated from Rust doc comments";

/// Name of the field attribute carrying annotation strings.
pub const ANNOTATION_ATTRIBUTE: &str = "openapi";

/// Content encodings populated on every request body and response.
pub const CONTENT_TYPES: [&str; 3] = [
    "application/json",
    "application/x-www-form-urlencoded",
    "multipart/form-data",
];

/// Directory names skipped by every extraction, in addition to hidden ones.
pub const DEFAULT_IGNORED_DIRECTORIES: &[&str] = &["target", "node_modules"];

/// File name fragments skipped by every extraction.
pub const DEFAULT_IGNORED_FILES: &[&str] = &["build.rs"];

const SUCCESS_DESCRIPTIONS: &[(&str, &str)] = &[
    ("200", "OK"),
    ("201", "Created"),
    ("202", "Accepted"),
    ("203", "Non-Authoritative Information"),
    ("204", "No Content"),
    ("205", "Reset Content"),
    ("206", "Partial Content"),
    ("301", "Moved Permanently"),
    ("302", "Found"),
    ("304", "Not Modified"),
    ("307", "Temporary Redirect"),
    ("308", "Permanent Redirect"),
];

/// Standard error responses, in the order they are offered by default.
pub const ERROR_DESCRIPTIONS: &[(&str, &str)] = &[
    ("400", "Bad Request"),
    ("401", "Unauthorized"),
    ("403", "Forbidden"),
    ("404", "Not Found"),
    ("405", "Method Not Allowed"),
    ("406", "Not Acceptable"),
    ("408", "Request Timeout"),
    ("409", "Conflict"),
    ("410", "Gone"),
    ("415", "Unsupported Media Type"),
    ("422", "Unprocessable Entity"),
    ("423", "Locked"),
    ("424", "Failed Dependency"),
    ("426", "Upgrade Required"),
    ("428", "Precondition Required"),
    ("429", "Too Many Requests"),
    ("431", "Request Header Fields Too Large"),
    ("451", "Unavailable For Legal Reasons"),
    ("500", "Internal Server Error"),
    ("501", "Not Implemented"),
    ("502", "Bad Gateway"),
    ("503", "Service Unavailable"),
    ("504", "Gateway Timeout"),
    ("505", "HTTP Version Not Supported"),
    ("507", "Insufficient Storage"),
    ("511", "Network Authentication Required"),
];

/// Looks up the standard description for a status code.
pub fn response_description(status_code: &str) -> &'static str {
    SUCCESS_DESCRIPTIONS
        .iter()
        .chain(ERROR_DESCRIPTIONS.iter())
        .find(|(code, _)| *code == status_code)
        .map(|(_, description)| *description)
        .unwrap_or("Unknown response code")
}

/// Builds a schema reference from a bare schema name.
pub fn schema_ref(name: &str) -> String {
    format!("{}{}", SCHEMA_REF_PREFIX, name)
}
