use openapi_from_comments::{
    cli::{self, CliArgs},
    constants::ERROR_DESCRIPTIONS,
    document::{HttpMethod, OpenApiDocument},
    error::BuildError,
    openapi_builder::{standard_error_responses, BuildStep, DocumentBuilder, Pipeline},
    serializer::OutputFormat,
    validator::{validate_raw, ValidationFinding},
};
use clap::Parser;
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

const USER_MODELS: &str = include_str!("fixtures/project/src/models/user.rs");
const ERROR_MODELS: &str = include_str!("fixtures/project/src/models/error.rs");
const USER_HANDLERS: &str = include_str!("fixtures/project/src/handlers/users/mod.rs");
const HEALTH_HANDLERS: &str = include_str!("fixtures/project/src/handlers/health/mod.rs");
const CONFIG: &str = include_str!("fixtures/openapi.config.yaml");

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn user_service() -> TempDir {
    create_test_project(vec![
        ("src/models/user.rs", USER_MODELS),
        ("src/models/error.rs", ERROR_MODELS),
        ("src/handlers/users/mod.rs", USER_HANDLERS),
        ("src/handlers/health/mod.rs", HEALTH_HANDLERS),
        ("openapi.config.yaml", CONFIG),
    ])
}

fn build(root: &Path) -> DocumentBuilder {
    Pipeline::start(DocumentBuilder::new())
        .then(BuildStep::AddErrorResponses, |b| {
            b.add_error_responses(standard_error_responses(&[]), Some("Error"))
        })
        .then(BuildStep::RestrictErrorResponses, |b| {
            b.restrict_error_responses(&[400, 404, 500, 503])
        })
        .then(BuildStep::ParseSchemas, |b| b.parse_schemas(&root.join("src/models")))
        .then(BuildStep::ParseEnums, |b| b.parse_enums(&root.join("src/models")))
        .then(BuildStep::ParsePaths, |b| b.parse_paths(&root.join("src/handlers")))
        .finish()
        .expect("Pipeline should succeed")
}

#[test]
fn test_schemas_from_fixture_project() {
    let temp_dir = user_service();
    let document = build(temp_dir.path()).build();
    let schemas = &document.components.schemas;

    let mut names: Vec<&str> = schemas.keys().map(String::as_str).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["CreateUser", "Error", "Pagination", "Role", "User", "UserList", "UserPath"]
    );

    let user = &schemas["User"];
    let properties: Vec<&str> = user.properties.keys().map(String::as_str).collect();
    assert_eq!(properties, vec!["id", "name", "email", "role", "createdAt"]);
    assert_eq!(user.required, vec!["id".to_string(), "name".to_string()]);
    assert_eq!(user.properties["name"].max_length, 64);
    assert_eq!(
        user.properties["role"].reference.as_deref(),
        Some("#/components/schemas/Role")
    );
    assert!(user.properties["role"].property_type.is_none());

    let users = &schemas["UserList"].properties["users"];
    assert_eq!(users.property_type.as_deref(), Some("array"));
    assert!(users.reference.is_none());
    assert_eq!(
        users.items.as_ref().map(|items| items.reference.as_str()),
        Some("#/components/schemas/User")
    );

    assert!(!schemas["CreateUser"].properties.contains_key("internal_note"));
    assert_eq!(
        schemas["Role"].enum_values,
        Some(vec!["admin".to_string(), "member".to_string(), "guest".to_string()])
    );
}

#[test]
fn test_operations_from_fixture_project() {
    let temp_dir = user_service();
    let document = build(temp_dir.path()).build();

    let mut paths: Vec<&str> = document.paths.keys().map(String::as_str).collect();
    paths.sort();
    assert_eq!(paths, vec!["/health", "/users", "/users/{id}"]);

    let list = document.paths["/users"].operation(HttpMethod::Get).unwrap();
    assert_eq!(list.operation_id.as_deref(), Some("UsersGet"));
    assert_eq!(
        list.responses["200"].reference(),
        Some("#/components/schemas/UserList")
    );
    let codes: Vec<&str> = list.responses.keys().map(String::as_str).collect();
    assert_eq!(codes, vec!["200", "404", "500"]);
    let parameters: Vec<(&str, &str)> = list
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.location.as_str()))
        .collect();
    assert_eq!(parameters, vec![("page", "query"), ("limit", "query")]);

    let create = document.paths["/users"].operation(HttpMethod::Post).unwrap();
    assert_eq!(create.operation_id.as_deref(), Some("UsersCreate"));
    assert!(create.responses.contains_key("201"));
    assert_eq!(create.responses["400"].description, "The user payload is invalid");
    assert_eq!(create.request_body.as_ref().unwrap().content.len(), 3);
    assert_eq!(create.security.len(), 1);

    let delete = document.paths["/users/{id}"]
        .operation(HttpMethod::Delete)
        .unwrap();
    assert!(delete.deprecated);
    assert!(delete.responses["204"].content.is_none());
    assert_eq!(delete.parameters[0].name, "id");
    assert!(delete.parameters[0].required);
    assert_eq!(
        delete.security[0].get("oauth"),
        Some(&vec!["users:write".to_string()])
    );
}

#[test]
fn test_round_trip_has_no_findings() {
    let temp_dir = user_service();
    let builder = build(temp_dir.path());

    let yaml = builder.clone().with_format(OutputFormat::Yaml);
    let generated = yaml.generate(&temp_dir.path().join("docs")).unwrap();
    assert_eq!(generated.findings, Vec::<ValidationFinding>::new());

    let parsed: OpenApiDocument = serde_yaml::from_str(&generated.content).unwrap();
    let built = builder.clone().build();
    assert_eq!(parsed.paths.len(), built.paths.len());
    assert_eq!(parsed.components.schemas.len(), built.components.schemas.len());

    let json = builder.with_format(OutputFormat::Json).with_file_name("openapi.json");
    let generated = json.generate(&temp_dir.path().join("docs")).unwrap();
    assert!(generated.findings.is_empty());
    assert!(generated.path.ends_with("docs/openapi.json"));
}

#[test]
fn test_extraction_is_idempotent() {
    let temp_dir = user_service();

    let first = build(temp_dir.path()).build();
    let second = build(temp_dir.path()).build();

    assert_eq!(first, second);
}

#[test]
fn test_missing_enum_pass_leaves_unresolved_ref() {
    let temp_dir = user_service();
    let root = temp_dir.path();

    let document = DocumentBuilder::new()
        .parse_schemas(&root.join("src/models"))
        .and_then(|b| b.parse_paths(&root.join("src/handlers")))
        .unwrap()
        .build();
    let yaml = serde_yaml::to_string(&document).unwrap();

    assert_eq!(
        validate_raw(&yaml),
        vec![ValidationFinding::UnresolvedRef {
            reference: "#/components/schemas/Role".to_string()
        }]
    );
}

#[test]
fn test_default_errors_follow_standard_table() {
    let temp_dir = user_service();
    let root = temp_dir.path();

    let document = DocumentBuilder::new()
        .add_default_errors(&[])
        .and_then(|b| b.parse_schemas(&root.join("src/models")))
        .and_then(|b| b.parse_enums(&root.join("src/models")))
        .and_then(|b| b.parse_paths(&root.join("src/handlers")))
        .unwrap()
        .build();

    let health = document.paths["/health"].operation(HttpMethod::Get).unwrap();
    assert_eq!(health.responses["503"].description, "Service Unavailable");
    assert!(health.responses["503"].content.is_none());
    assert!(ERROR_DESCRIPTIONS.iter().any(|(code, _)| *code == "503"));
}

#[test]
fn test_schemas_after_paths_rejected_by_pipeline() {
    let temp_dir = user_service();
    let root = temp_dir.path();

    let failure = Pipeline::start(DocumentBuilder::new())
        .then(BuildStep::ParseSchemas, |b| b.parse_schemas(&root.join("src/models")))
        .then(BuildStep::ParsePaths, |b| b.parse_paths(&root.join("src/handlers")))
        .then(BuildStep::ParseEnums, |b| b.parse_enums(&root.join("src/models")))
        .finish()
        .unwrap_err();

    assert_eq!(failure.step, BuildStep::ParseEnums);
    assert!(matches!(failure.source, BuildError::SchemasAfterPaths));
}

#[test]
fn test_cli_with_config_file() {
    let temp_dir = user_service();
    let config = temp_dir.path().join("openapi.config.yaml");
    let args = CliArgs::try_parse_from([
        "openapi-from-comments",
        temp_dir.path().to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--strict",
    ])
    .unwrap();

    let generated = cli::run(args).unwrap();
    let document: OpenApiDocument = serde_yaml::from_str(&generated.content).unwrap();

    assert_eq!(document.info.title, "User Service");
    assert_eq!(document.servers[0].url, "https://api.example.com/v2");
    let tags: Vec<&str> = document.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tags, vec!["health", "users"]);
    let schemes: Vec<&str> = document
        .components
        .security_schemes
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(schemes, vec!["bearer", "oauth"]);

    let health = document.paths["/health"].get.as_ref().unwrap();
    assert_eq!(
        health.responses["503"].reference(),
        Some("#/components/schemas/Error")
    );
    assert!(generated.findings.is_empty());
}
