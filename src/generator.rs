//! One documentation build: routes in, Swagger document out.
//!
//! A build is all-or-nothing. The first malformed directive or unresolvable
//! structured type aborts it and no partial document is returned.

use crate::annotation::AnnotationParser;
use crate::definition_registry::DefinitionRegistry;
use crate::error::Result;
use crate::io_parameter::{ExampleGenerator, IoParameterResolver};
use crate::route_collector::{RouteCollector, RouteDescriptor, RouteRecord};
use crate::swagger_builder::{Info, Operation, SwaggerBuilder, SwaggerDocument};
use crate::type_registry::{canonical_name, TypeRegistry};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provides the doc comment attached to a controller handler.
pub trait DocCommentSource {
    fn doc_comment(&self, controller: &str, action: &str) -> Option<&str>;
}

/// Doc comments keyed by `Controller@action`.
///
/// The leading namespace separator of the controller is not significant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerDocs(BTreeMap<String, String>);

impl HandlerDocs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a doc comment under a `Controller@action` key, returning the
    /// one it replaces.
    pub fn insert(&mut self, handler: &str, doc_comment: &str) -> Option<String> {
        self.0.insert(handler_key(handler), doc_comment.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl DocCommentSource for HandlerDocs {
    fn doc_comment(&self, controller: &str, action: &str) -> Option<&str> {
        self.0
            .get(&handler_key(&format!("{}@{}", controller, action)))
            .map(String::as_str)
    }
}

fn handler_key(handler: &str) -> String {
    canonical_name(handler.trim()).to_string()
}

/// Settings of a documentation build
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Literal URI prefix of documented routes
    pub prefix: String,
    /// URI prefix of the documentation endpoint, never documented itself.
    ///
    /// `None` means `<prefix>documentation`; an empty string documents
    /// every route under the prefix.
    pub docs_prefix: Option<String>,
    /// Externally visible host name, without scheme
    pub host: String,
    pub info: Info,
    /// Seed for example values; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            prefix: "api/v2/".to_string(),
            docs_prefix: None,
            host: "localhost".to_string(),
            info: Info::default(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Prefix of the excluded documentation endpoint, if any
    pub fn documentation_prefix(&self) -> Option<String> {
        let docs_prefix = match &self.docs_prefix {
            Some(docs_prefix) => docs_prefix.clone(),
            None => format!("{}documentation", self.prefix),
        };
        Some(docs_prefix).filter(|p| !p.is_empty())
    }
}

/// Builds Swagger documents against a fixed set of structured types.
///
/// Every call to [`DocumentationGenerator::generate`] uses fresh definition
/// and example state.
pub struct DocumentationGenerator<'a> {
    config: GeneratorConfig,
    types: &'a TypeRegistry,
}

impl<'a> DocumentationGenerator<'a> {
    pub fn new(config: GeneratorConfig, types: &'a TypeRegistry) -> Self {
        Self { config, types }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the document for `routes`, reading handler doc comments from
    /// `docs`.
    pub fn generate(
        &self,
        routes: &[RouteRecord],
        docs: &dyn DocCommentSource,
    ) -> Result<SwaggerDocument> {
        let descriptors = RouteCollector::new(self.config.prefix.clone())
            .with_docs_prefix(self.config.documentation_prefix())
            .collect(routes);
        info!("Documenting {} routes", descriptors.len());

        let mut definitions = DefinitionRegistry::new(self.types);
        let mut resolver = IoParameterResolver::new(ExampleGenerator::new(self.config.seed));
        let mut builder = SwaggerBuilder::new(self.config.host.clone()).with_info(self.config.info.clone());

        for route in &descriptors {
            let operation = match Self::operation(route, docs, &mut resolver, &mut definitions) {
                Ok(operation) => operation,
                Err(e) => {
                    warn!(
                        "Documentation failed for {}@{} ({} {}): {}",
                        route.controller, route.action, route.http_method, route.path, e
                    );
                    return Err(e);
                }
            };
            builder.add_operation(route, operation);
        }

        let document = builder.build(definitions.into_definitions());
        info!(
            "Generated document with {} paths and {} definitions",
            document.paths.len(),
            document.definitions.len()
        );
        Ok(document)
    }

    fn operation(
        route: &RouteDescriptor,
        docs: &dyn DocCommentSource,
        resolver: &mut IoParameterResolver,
        definitions: &mut DefinitionRegistry<'_>,
    ) -> Result<Operation> {
        let doc_comment = docs.doc_comment(&route.controller, &route.action).unwrap_or_else(|| {
            debug!("No doc comment for {}@{}", route.controller, route.action);
            ""
        });

        let block = AnnotationParser::parse(doc_comment)?;

        let parameters = block
            .inputs()
            .map(|directive| resolver.input(directive, definitions))
            .collect::<Result<Vec<_>>>()?;

        let mut response = None;
        for directive in block.outputs() {
            if response.is_some() {
                debug!(
                    "{}@{} declares several outputs, line {} wins",
                    route.controller, route.action, directive.line
                );
            }
            response = Some(resolver.output(directive, definitions)?);
        }

        Ok(Operation::new(route, block.description(), parameters, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::route_collector::HttpMethod;
    use crate::type_registry::DtoDefinition;

    const USERS: &str = "App\\Http\\Controllers\\UserController";

    fn types() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register(
            DtoDefinition::new("\\Ns\\UserDto")
                .field("id", "int|required")
                .field("name", "string|required"),
        );
        types
    }

    fn routes() -> Vec<RouteRecord> {
        vec![
            RouteRecord::new(
                "api/v2/users",
                &["GET", "HEAD"],
                Some(&format!("{}@index", USERS)),
            ),
            RouteRecord::new("api/v2/users", &["POST"], Some(&format!("{}@store", USERS))),
        ]
    }

    fn docs() -> HandlerDocs {
        let mut docs = HandlerDocs::new();
        docs.insert(
            &format!("{}@index", USERS),
            "/**\n * List users.\n * @input integer page\n * @output \\Ns\\UserDto\n */",
        );
        docs.insert(
            &format!("\\{}@store", USERS),
            "/**\n * Create a user.\n * @input \\Ns\\UserDto\n * @output \\Ns\\UserDto\n */",
        );
        docs
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            seed: Some(1),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_handler_docs_lookup_ignores_leading_separator() {
        let docs = docs();
        assert!(docs.doc_comment(USERS, "index").is_some());
        assert!(docs.doc_comment(&format!("\\{}", USERS), "store").is_some());
        assert!(docs.doc_comment(USERS, "destroy").is_none());
    }

    #[test]
    fn test_generate_document() {
        let types = types();
        let generator = DocumentationGenerator::new(config(), &types);
        let doc = generator.generate(&routes(), &docs()).unwrap();

        assert_eq!(doc.paths.len(), 1);
        assert_eq!(doc.definitions.len(), 1);
        assert!(doc.definitions.contains_key("Ns_UserDto"));

        let item = &doc.paths["/api/v2/users"];
        let index = item.operation(HttpMethod::Get).unwrap();
        assert_eq!(index.description, "List users");
        assert_eq!(index.parameters.len(), 1);
        assert_eq!(index.parameters[0].name, "page");

        let store = item.operation(HttpMethod::Post).unwrap();
        assert_eq!(store.parameters[0].name, "body");
        assert_eq!(
            store.responses["200"].schema.as_ref().unwrap().reference.as_deref(),
            Some("#/definitions/Ns_UserDto")
        );
    }

    #[test]
    fn test_missing_doc_comment_still_documents_route() {
        let types = types();
        let generator = DocumentationGenerator::new(config(), &types);
        let doc = generator.generate(&routes(), &HandlerDocs::new()).unwrap();

        let op = doc.paths["/api/v2/users"].operation(HttpMethod::Get).unwrap();
        assert_eq!(op.description, "");
        assert!(op.parameters.is_empty());
        assert_eq!(op.responses["200"].description, "Successful response");
    }

    #[test]
    fn test_last_output_wins() {
        let types = types();
        let mut docs = HandlerDocs::new();
        docs.insert(
            &format!("{}@index", USERS),
            "/**\n * @output \\Ns\\UserDto\n * @output integer total\n */",
        );

        let doc = DocumentationGenerator::new(config(), &types)
            .generate(&routes()[..1], &docs)
            .unwrap();
        let op = doc.paths["/api/v2/users"].operation(HttpMethod::Get).unwrap();
        let schema = op.responses["200"].schema.as_ref().unwrap();
        assert_eq!(schema.title.as_deref(), Some("total"));
        // The overridden output still registered its definition
        assert!(doc.definitions.contains_key("Ns_UserDto"));
    }

    #[test]
    fn test_malformed_directive_aborts_build() {
        let types = types();
        let mut docs = docs();
        docs.insert(&format!("{}@store", USERS), "/** @input integer */");

        let err = DocumentationGenerator::new(config(), &types)
            .generate(&routes(), &docs)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedDirective { .. }));
    }

    #[test]
    fn test_unknown_type_aborts_build() {
        let types = TypeRegistry::new();
        let err = DocumentationGenerator::new(config(), &types)
            .generate(&routes(), &docs())
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvableStructuredType { .. }));
    }

    #[test]
    fn test_documentation_prefix_follows_route_prefix() {
        assert_eq!(
            GeneratorConfig::default().documentation_prefix().as_deref(),
            Some("api/v2/documentation")
        );

        let config = GeneratorConfig {
            prefix: "api/v3/".to_string(),
            ..config()
        };
        assert_eq!(config.documentation_prefix().as_deref(), Some("api/v3/documentation"));

        let disabled = GeneratorConfig {
            docs_prefix: Some(String::new()),
            ..self::config()
        };
        assert_eq!(disabled.documentation_prefix(), None);
    }

    #[test]
    fn test_documentation_endpoint_excluded_under_custom_prefix() {
        let types = types();
        let routes = vec![
            RouteRecord::new("api/v3/documentation", &["GET", "HEAD"], Some("Docs@show")),
            RouteRecord::new("api/v3/users", &["GET", "HEAD"], Some(&format!("{}@index", USERS))),
        ];
        let config = GeneratorConfig {
            prefix: "api/v3/".to_string(),
            ..config()
        };

        let doc = DocumentationGenerator::new(config, &types)
            .generate(&routes, &HandlerDocs::new())
            .unwrap();
        let paths: Vec<&String> = doc.paths.keys().collect();
        assert_eq!(paths, vec!["/api/v3/users"]);
    }

    #[test]
    fn test_seeded_builds_are_identical() {
        let types = types();
        let generator = DocumentationGenerator::new(config(), &types);

        let first = serde_json::to_string(&generator.generate(&routes(), &docs()).unwrap()).unwrap();
        let second = serde_json::to_string(&generator.generate(&routes(), &docs()).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
