//! Serialization of Swagger documents to YAML or JSON, to a string or a file.

use crate::swagger_builder::SwaggerDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a Swagger document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &SwaggerDocument) -> Result<String> {
    debug!("Serializing Swagger document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize Swagger document to YAML")
}

/// Serializes a Swagger document to pretty-printed JSON.
///
/// # Example
///
/// ```
/// use dto_swagger::serializer::serialize_json;
/// use dto_swagger::swagger_builder::SwaggerBuilder;
/// use std::collections::BTreeMap;
///
/// let doc = SwaggerBuilder::new("api.example.com").build(BTreeMap::new());
/// let json = serialize_json(&doc).unwrap();
/// assert!(json.contains("\"swagger\": \"2.0\""));
/// ```
pub fn serialize_json(doc: &SwaggerDocument) -> Result<String> {
    debug!("Serializing Swagger document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize Swagger document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
