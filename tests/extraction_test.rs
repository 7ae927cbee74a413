use openapi_from_comments::{
    document::HttpMethod,
    extractor::{paths::extract_paths, schemas::extract_schemas, ExtractionOptions},
    grammar::DeclarationKind,
    openapi_builder::DocumentBuilder,
    path_assembler::PathContext,
    validator::ValidationFinding,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

const PING: &str = include_str!("fixtures/ping.rs");

fn create_test_project(files: &[(&str, &str)]) -> TempDir {
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

#[test]
fn test_duplicate_route_across_directories() {
    let temp_dir = create_test_project(&[
        ("models/status.rs", "/// @apiDefine: Status\npub struct Status { pub ok: bool }"),
        ("api/v1/ping.rs", PING),
        ("api/v2/ping.rs", PING),
    ]);
    let root = temp_dir.path();

    let extracted = extract_paths(
        &root.join("api"),
        Arc::new(PathContext::default()),
        ExtractionOptions::default(),
    )
    .unwrap();
    assert_eq!(extracted.collisions, vec!["GET /ping".to_string()]);
    assert_eq!(extracted.directories, 3);

    let generated = DocumentBuilder::new()
        .parse_schemas(&root.join("models"))
        .and_then(|b| b.parse_paths(&root.join("api")))
        .unwrap()
        .generate(root)
        .unwrap();

    assert_eq!(generated.findings, Vec::<ValidationFinding>::new());
    let document = generated.content;
    assert_eq!(document.matches("operationId: PingGet").count(), 1);
}

#[test]
fn test_ignored_directories_and_files() {
    let temp_dir = create_test_project(&[
        ("src/models.rs", "/// @apiDefine: Kept\npub struct Kept { pub id: u32 }"),
        ("target/debug/models.rs", "/// @apiDefine: Built\npub struct Built { pub id: u32 }"),
        (".cache/models.rs", "/// @apiDefine: Hidden\npub struct Hidden { pub id: u32 }"),
        ("src/generated/models.rs", "/// @apiDefine: Generated\npub struct Generated { pub id: u32 }"),
        ("src/models_mock.rs", "/// @apiDefine: Mock\npub struct Mock { pub id: u32 }"),
    ]);

    let mut options = ExtractionOptions::default();
    options.ignored_directories.push("generated".to_string());
    options.ignored_files.push("_mock".to_string());
    options.max_workers = Some(2);

    let extracted = extract_schemas(temp_dir.path(), DeclarationKind::Schema, options).unwrap();
    let names: Vec<&str> = extracted.registry.keys().map(String::as_str).collect();

    assert_eq!(names, vec!["Kept"]);
}

#[test]
fn test_broken_files_are_skipped() {
    let temp_dir = create_test_project(&[
        ("models/good.rs", "/// @apiDefine: Good\npub struct Good { pub id: u32 }"),
        ("models/broken.rs", "/// @apiDefine: Broken\npub struct Broken { pub id: "),
        ("models/plain.rs", "pub struct Plain { pub id: u32 }"),
    ]);

    let extracted = extract_schemas(
        temp_dir.path(),
        DeclarationKind::Schema,
        ExtractionOptions::default(),
    )
    .unwrap();

    assert_eq!(extracted.registry.len(), 1);
    assert!(extracted.registry.contains_key("Good"));
}

#[test]
fn test_many_directories_single_worker() {
    let files: Vec<(String, String)> = (0..24)
        .map(|i| {
            (
                format!("handlers/h{:02}/mod.rs", i),
                format!(
                    "/// @apiPath: /resource{0}\n/// @apiMethod: GET\npub fn get{0}() {{}}\n\n\
                     /// @apiPath: /resource{0}\n/// @apiMethod: DELETE\npub fn delete{0}() {{}}",
                    i
                ),
            )
        })
        .collect();
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(path, content)| (path.as_str(), content.as_str()))
        .collect();
    let temp_dir = create_test_project(&borrowed);

    let mut single = ExtractionOptions::default();
    single.max_workers = Some(1);
    let sequential = extract_paths(temp_dir.path(), Arc::new(PathContext::default()), single)
        .unwrap();
    let parallel = extract_paths(
        temp_dir.path(),
        Arc::new(PathContext::default()),
        ExtractionOptions::default(),
    )
    .unwrap();

    assert_eq!(sequential.registry.len(), 24);
    assert_eq!(sequential.registry, parallel.registry);
    assert!(sequential.collisions.is_empty());
    let methods: Vec<HttpMethod> = sequential.registry["/resource7"]
        .operations()
        .map(|(method, _)| method)
        .collect();
    assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Delete]);
}

#[test]
fn test_error_ref_scenario() {
    let temp_dir = create_test_project(&[
        ("models/error.rs", "/// @apiDefine: Error\npub struct Error { pub message: String }"),
        (
            "handlers/users.rs",
            "/// @apiPath: /users\n/// @apiMethod: GET\n/// @apiErrorStatusCodes: 404,500\npub fn list() {}",
        ),
    ]);
    let root = temp_dir.path();

    let mut responses = BTreeMap::new();
    for code in ["400", "404", "500"] {
        responses.insert(code.to_string(), Default::default());
    }

    let document = DocumentBuilder::new()
        .add_error_responses(responses, Some("Error"))
        .and_then(|b| b.parse_schemas(&root.join("models")))
        .and_then(|b| b.parse_paths(&root.join("handlers")))
        .unwrap()
        .build();

    let operation = document.paths["/users"].operation(HttpMethod::Get).unwrap();
    let errors: Vec<(&str, Option<&str>)> = operation
        .responses
        .iter()
        .filter(|(code, _)| code.as_str() != "200")
        .map(|(code, response)| (code.as_str(), response.reference()))
        .collect();

    assert_eq!(
        errors,
        vec![
            ("404", Some("#/components/schemas/Error")),
            ("500", Some("#/components/schemas/Error")),
        ]
    );
}
