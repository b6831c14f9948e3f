use dto_swagger::error::Error;
use dto_swagger::generator::{DocumentationGenerator, GeneratorConfig};
use dto_swagger::manifest::{Manifest, ManifestParser};
use dto_swagger::route_collector::HttpMethod;
use dto_swagger::scanner::ManifestScanner;
use dto_swagger::serializer::{serialize_json, serialize_yaml, write_to_file};
use dto_swagger::swagger_builder::SwaggerDocument;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn load(name: &str) -> Manifest {
    let scan = ManifestScanner::new(fixture(name)).scan().unwrap();
    ManifestParser::load_all(&scan.manifest_files).unwrap()
}

fn config(seed: u64) -> GeneratorConfig {
    GeneratorConfig {
        host: "api.example.com".to_string(),
        seed: Some(seed),
        ..GeneratorConfig::default()
    }
}

fn generate(manifest: &Manifest, seed: u64) -> SwaggerDocument {
    let types = manifest.type_registry().unwrap();
    DocumentationGenerator::new(config(seed), &types)
        .generate(&manifest.routes, &manifest.handler_docs())
        .unwrap()
}

fn document_json(seed: u64) -> Value {
    let manifest = load("api_manifest.yaml");
    let json = serialize_json(&generate(&manifest, seed)).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_documented_paths() {
    let doc = document_json(7);
    let paths: Vec<&String> = doc["paths"].as_object().unwrap().keys().collect();

    assert_eq!(
        paths,
        vec![
            "/api/v2/companies/{id}/tags",
            "/api/v2/tree",
            "/api/v2/users",
            "/api/v2/users/{id}",
        ]
    );

    let users = &doc["paths"]["/api/v2/users"];
    assert!(users.get("get").is_some());
    assert!(users.get("post").is_some());
    assert!(users.get("head").is_none());

    let user = &doc["paths"]["/api/v2/users/{id}"];
    assert!(user.get("get").is_some());
    assert!(user.get("delete").is_some());
}

#[test]
fn test_document_header() {
    let doc = document_json(7);

    assert_eq!(doc["swagger"], "2.0");
    assert_eq!(doc["host"], "api.example.com");
    assert_eq!(doc["schemes"], serde_json::json!(["https"]));
    assert_eq!(doc["produces"], serde_json::json!(["application/json"]));
    assert_eq!(doc["info"]["version"], "v2");
    assert_eq!(doc["info"]["title"], "API Documentation");
}

#[test]
fn test_tags_follow_route_order() {
    let doc = document_json(7);

    let tags: Vec<&str> = doc["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["companies", "tree", "users"]);

    assert_eq!(doc["x-tagGroups"][0]["name"], "API Endpoints");
    assert_eq!(
        doc["x-tagGroups"][0]["tags"],
        serde_json::json!(["companies", "tree", "users"])
    );
    assert_eq!(doc["paths"]["/api/v2/users/{id}"]["delete"]["tags"], serde_json::json!(["users"]));
}

#[test]
fn test_operation_text() {
    let doc = document_json(7);

    let index = &doc["paths"]["/api/v2/users"]["get"];
    assert_eq!(index["summary"], "/api/v2/users");
    assert_eq!(index["description"], "List users\n\nResults are paginated.");

    let show = &doc["paths"]["/api/v2/users/{id}"]["get"];
    assert_eq!(show["description"], "Show one user");
}

#[test]
fn test_each_definition_emitted_once() {
    let doc = document_json(7);
    let definitions: Vec<&String> = doc["definitions"].as_object().unwrap().keys().collect();

    // UserDto is referenced by three handlers; nested types are inlined
    assert_eq!(definitions, vec!["App_Dto_UserDto", "Tests_TestDto"]);

    let user = &doc["definitions"]["App_Dto_UserDto"]["properties"];
    assert_eq!(user["id"]["type"], "integer");
    assert_eq!(user["id"]["required"], true);
    assert_eq!(user["id"]["description"], "int|required");
    assert_eq!(user["score"]["type"], "number");
    assert_eq!(user["score"]["required"], false);
    assert_eq!(user["address"]["type"], "object");
    assert_eq!(user["address"]["properties"]["city"]["type"], "string");
    assert_eq!(user["companies"]["type"], "array");
    assert_eq!(user["companies"]["items"]["properties"]["id"]["type"], "integer");
}

#[test]
fn test_structured_input_and_output_reference_definition() {
    let doc = document_json(7);
    let store = &doc["paths"]["/api/v2/users"]["post"];

    let body = &store["parameters"][0];
    assert_eq!(body["name"], "body");
    assert_eq!(body["in"], "body");
    assert_eq!(body["description"], "DTO App -> Dto -> UserDto");
    assert_eq!(body["schema"]["$ref"], "#/definitions/App_Dto_UserDto");

    let response = &store["responses"]["200"];
    assert_eq!(response["description"], "DTO App -> Dto -> UserDto");
    assert_eq!(response["schema"]["$ref"], "#/definitions/App_Dto_UserDto");
}

#[test]
fn test_scalar_inputs_are_form_data() {
    let doc = document_json(7);
    let params = doc["paths"]["/api/v2/users"]["get"]["parameters"].as_array().unwrap();

    assert_eq!(params.len(), 2);

    let page = &params[0];
    assert_eq!(page["name"], "page");
    assert_eq!(page["in"], "formData");
    assert_eq!(page["type"], "integer");
    assert_eq!(page["required"], true);
    let example = page["x-example"].as_i64().unwrap();
    assert!((0..=100).contains(&example));

    let ratio = &params[1];
    assert_eq!(ratio["type"], "float");
    let example = ratio["x-example"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&example));
}

#[test]
fn test_array_input_items_guessed_from_name() {
    let doc = document_json(7);
    let param = &doc["paths"]["/api/v2/companies/{id}/tags"]["put"]["parameters"][0];

    assert_eq!(param["name"], "tag_ids");
    assert_eq!(param["type"], "array");
    assert_eq!(param["items"]["title"], "tag_id");
    assert_eq!(param["items"]["type"], "integer");
}

#[test]
fn test_scalar_outputs_have_typed_examples() {
    let doc = document_json(7);

    let destroy = &doc["paths"]["/api/v2/users/{id}"]["delete"]["responses"]["200"];
    assert_eq!(destroy["schema"]["title"], "deleted");
    assert_eq!(destroy["schema"]["type"], "boolean");
    assert_eq!(destroy["examples"]["application/json"]["data"]["deleted"], true);

    let tags = &doc["paths"]["/api/v2/companies/{id}/tags"]["put"]["responses"]["200"];
    assert_eq!(tags["schema"]["type"], "string");
    assert_eq!(tags["examples"]["application/json"]["data"]["status"], "string");
}

#[test]
fn test_recursive_type_uses_reference() {
    let doc = document_json(7);
    let tree = &doc["definitions"]["Tests_TestDto"];

    assert_eq!(tree["type"], "object");
    assert_eq!(tree["properties"]["myKey"]["type"], "string");
    assert_eq!(tree["properties"]["subType"]["$ref"], "#/definitions/Tests_TestDto");
    assert_eq!(tree["properties"]["subTypeArray"]["type"], "array");
    assert_eq!(
        tree["properties"]["subTypeArray"]["items"]["$ref"],
        "#/definitions/Tests_TestDto"
    );
}

#[test]
fn test_seeded_builds_are_byte_identical() {
    let manifest = load("api_manifest.yaml");

    let first = serialize_json(&generate(&manifest, 42)).unwrap();
    let second = serialize_json(&generate(&manifest, 42)).unwrap();
    assert_eq!(first, second);

    let first = serialize_yaml(&generate(&manifest, 42)).unwrap();
    let second = serialize_yaml(&generate(&manifest, 42)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_directive_fails_whole_build() {
    let manifest = load("malformed.yaml");
    let types = manifest.type_registry().unwrap();

    let err = DocumentationGenerator::new(config(1), &types)
        .generate(&manifest.routes, &manifest.handler_docs())
        .unwrap_err();

    match err {
        Error::MalformedDirective { line, directive, .. } => {
            assert_eq!(line, 3);
            assert!(directive.starts_with("@input"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unregistered_output_type_fails_build() {
    let mut manifest = load("api_manifest.yaml");
    manifest.types.retain(|t| !t.name.ends_with("TestDto"));
    let types = manifest.type_registry().unwrap();

    let err = DocumentationGenerator::new(config(1), &types)
        .generate(&manifest.routes, &manifest.handler_docs())
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvableStructuredType { .. }));
}

#[test]
fn test_directory_of_manifests_is_merged() {
    let manifest = load("split");

    assert_eq!(manifest.routes.len(), 1);
    assert_eq!(manifest.types.len(), 1);

    let doc = generate(&manifest, 3);
    assert_eq!(
        doc.paths["/api/v2/jobs"]
            .operation(HttpMethod::Get)
            .unwrap()
            .responses["200"]
            .schema
            .as_ref()
            .unwrap()
            .reference
            .as_deref(),
        Some("#/definitions/App_Dto_JobDto")
    );
    assert!(doc.definitions.contains_key("App_Dto_JobDto"));
}

#[test]
fn test_write_generated_document() {
    let manifest = load("api_manifest.yaml");
    let doc = generate(&manifest, 5);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("public/swagger.yaml");
    write_to_file(&serialize_yaml(&doc).unwrap(), &path).unwrap();

    let written: SwaggerDocument =
        serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, doc);
}
