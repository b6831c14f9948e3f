//! Manifest files: the route table, handler doc comments and DTO
//! declarations of a build, in YAML or JSON.

use crate::error::{Error, Result};
use crate::generator::HandlerDocs;
use crate::route_collector::RouteRecord;
use crate::type_registry::{canonical_name, DtoDefinition, TypeRegistry};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs of a documentation build, as read from YAML or JSON.
///
/// ```yaml
/// routes:
///   - uri: api/v2/users/{id}
///     methods: [GET, HEAD]
///     action: App\Http\Controllers\UserController@show
/// handlers:
///   App\Http\Controllers\UserController@show: |
///     /**
///      * Show a user.
///      * @output \App\Dto\UserDto
///      */
/// types:
///   - name: \App\Dto\UserDto
///     fields:
///       - { name: id, rule: "int|required" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
    /// `Controller@action` -> doc comment
    #[serde(default)]
    pub handlers: BTreeMap<String, String>,
    #[serde(default)]
    pub types: Vec<DtoDefinition>,
}

/// Manifest file syntax, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Some(ManifestFormat::Yaml),
            Some("json") => Some(ManifestFormat::Json),
            _ => None,
        }
    }
}

/// Reads manifest files.
pub struct ManifestParser;

impl ManifestParser {
    /// Parse one manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension
    /// or does not match the manifest format.
    pub fn parse_file(path: &Path) -> Result<Manifest> {
        debug!("Parsing manifest: {}", path.display());

        let format = ManifestFormat::from_path(path).ok_or_else(|| Error::InvalidManifest {
            file: path.to_path_buf(),
            message: "expected a .yaml, .yml or .json file".to_string(),
        })?;

        let content = fs::read_to_string(path)?;
        let manifest = Self::parse_str(&content, format, path)?;

        debug!(
            "Manifest {}: {} routes, {} handlers, {} types",
            path.display(),
            manifest.routes.len(),
            manifest.handlers.len(),
            manifest.types.len()
        );
        Ok(manifest)
    }

    /// Parse manifest text; `path` is only used in error messages.
    pub fn parse_str(content: &str, format: ManifestFormat, path: &Path) -> Result<Manifest> {
        let invalid = |message: String| Error::InvalidManifest {
            file: path.to_path_buf(),
            message,
        };

        if content.trim().is_empty() {
            return Ok(Manifest::default());
        }

        match format {
            ManifestFormat::Yaml => serde_yaml::from_str(content).map_err(|e| invalid(e.to_string())),
            ManifestFormat::Json => serde_json::from_str(content).map_err(|e| invalid(e.to_string())),
        }
    }

    /// Parse and merge several manifests, in the given order.
    ///
    /// Routes are concatenated. A handler doc comment declared twice keeps the
    /// later one; the leading namespace separator of the handler key is not
    /// significant. A structured type declared twice is an error.
    pub fn load_all(paths: &[PathBuf]) -> Result<Manifest> {
        debug!("Loading {} manifest files", paths.len());

        let mut merged = Manifest::default();
        let mut type_origin: HashMap<String, PathBuf> = HashMap::new();

        for path in paths {
            let manifest = Self::parse_file(path)?;

            merged.routes.extend(manifest.routes);

            for (handler, doc) in manifest.handlers {
                let handler = canonical_name(handler.trim()).to_string();
                if merged.handlers.insert(handler.clone(), doc).is_some() {
                    warn!("Handler {} documented twice, using {}", handler, path.display());
                }
            }

            for dto in manifest.types {
                let key = canonical_name(&dto.name).to_string();
                if let Some(first) = type_origin.get(&key) {
                    return Err(Error::InvalidManifest {
                        file: path.clone(),
                        message: format!(
                            "type {} already declared in {}",
                            dto.name,
                            first.display()
                        ),
                    });
                }
                type_origin.insert(key, path.clone());
                merged.types.push(dto);
            }
        }

        Ok(merged)
    }
}

impl Manifest {
    /// Registration table of the declared types, checked for dangling
    /// subtypes.
    pub fn type_registry(&self) -> Result<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        for dto in &self.types {
            registry.register(dto.clone());
        }
        registry.validate()?;
        Ok(registry)
    }

    pub fn handler_docs(&self) -> HandlerDocs {
        let mut docs = HandlerDocs::new();
        for (handler, doc) in &self.handlers {
            docs.insert(handler, doc);
        }
        docs
    }
}
