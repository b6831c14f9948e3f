//! dto-swagger - Swagger 2.0 documentation from handler doc comments.
//!
//! Handlers document their request and response shapes with `@input` and
//! `@output` directives in their doc comments. A directive names either a
//! scalar field (`@input integer page`) or a structured type
//! (`@output \App\Dto\UserDto`) whose schema is built from its registered
//! field template, validation rules and nested subtypes.
//!
//! # Architecture
//!
//! 1. [`route_collector`] - Filters the route table to documented endpoints
//! 2. [`annotation`] - Parses doc comments and `@input` / `@output` directives
//! 3. [`io_parameter`] - Turns directives into parameters and responses
//! 4. [`type_registry`] - Registration table of self-describing structured types
//! 5. [`definition_registry`] - Per-build, memoized schema definitions
//! 6. [`swagger_builder`] - Assembles tags, definitions and paths
//! 7. [`generator`] - Runs one all-or-nothing build
//! 8. [`scanner`] / [`manifest`] - Load build inputs from YAML or JSON
//! 9. [`serializer`] - Writes the document as JSON or YAML
//!
//! # Example Usage
//!
//! ```
//! use dto_swagger::{
//!     generator::{DocumentationGenerator, GeneratorConfig, HandlerDocs},
//!     route_collector::RouteRecord,
//!     serializer::serialize_json,
//!     type_registry::{DtoDefinition, TypeRegistry},
//! };
//!
//! let mut types = TypeRegistry::new();
//! types.register(
//!     DtoDefinition::new("\\App\\Dto\\UserDto")
//!         .field("id", "int|required")
//!         .field("name", "string|max:100"),
//! );
//!
//! let routes = vec![RouteRecord::new(
//!     "api/v2/users/{id}",
//!     &["GET", "HEAD"],
//!     Some("App\\Http\\Controllers\\UserController@show"),
//! )];
//!
//! let mut docs = HandlerDocs::new();
//! docs.insert(
//!     "App\\Http\\Controllers\\UserController@show",
//!     "/**\n * Show a user.\n * @output \\App\\Dto\\UserDto\n */",
//! );
//!
//! let generator = DocumentationGenerator::new(GeneratorConfig::default(), &types);
//! let document = generator.generate(&routes, &docs).unwrap();
//!
//! assert!(document.definitions.contains_key("App_Dto_UserDto"));
//! println!("{}", serialize_json(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotation;
pub mod cli;
pub mod definition_registry;
pub mod error;
pub mod generator;
pub mod io_parameter;
pub mod manifest;
pub mod route_collector;
pub mod scanner;
pub mod serializer;
pub mod swagger_builder;
pub mod type_registry;
