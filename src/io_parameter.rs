//! Resolution of `@input` / `@output` directives into Swagger parameters and
//! responses.
//!
//! A directive whose type names a structured type becomes a reference to that
//! type's definition (registered on the way); any other directive becomes an
//! inline scalar with a generated example value.

use crate::annotation::{Directive, ScalarType, TypeToken};
use crate::definition_registry::{DefinitionRegistry, Schema};
use crate::error::{Error, Result};
use crate::type_registry::definition_title;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Resolved shape of one directive
#[derive(Debug, Clone, PartialEq)]
pub enum IoParameter {
    Reference {
        definition_id: String,
        /// `A -> B -> C` form of the type identifier
        title: String,
    },
    Scalar {
        name: String,
        scalar_type: ScalarType,
        required: bool,
        example: Value,
    },
}

/// Where a Swagger 2.0 parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Body,
    FormData,
}

/// Swagger 2.0 parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Schema>,
    /// Body schema; only set for `in: body`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(rename = "x-example", skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Swagger 2.0 response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Media type -> example payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<BTreeMap<String, Value>>,
}

impl Response {
    /// Plain 200 response used when a handler declares no output
    pub fn successful() -> Self {
        Self {
            description: "Successful response".to_string(),
            schema: None,
            examples: None,
        }
    }
}

/// Documentation-only example values.
///
/// Integers are drawn from `0..=100`, floats from `[0, 1]` rounded to two
/// decimals. Seeding makes the output reproducible.
pub struct ExampleGenerator {
    rng: StdRng,
}

impl ExampleGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn example(&mut self, scalar_type: &ScalarType) -> Value {
        match scalar_type {
            ScalarType::Integer => json!(self.rng.gen_range(0..=100)),
            ScalarType::Float => {
                let value: f64 = self.rng.gen_range(0.0..=1.0);
                json!((value * 100.0).round() / 100.0)
            }
            ScalarType::Boolean => json!(true),
            ScalarType::Array => json!([]),
            ScalarType::String | ScalarType::Other(_) => json!("string"),
        }
    }
}

impl Default for ExampleGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Turns directives into parameters and responses.
pub struct IoParameterResolver {
    examples: ExampleGenerator,
}

impl IoParameterResolver {
    pub fn new(examples: ExampleGenerator) -> Self {
        Self { examples }
    }

    /// Resolve a directive, registering its structured type if it has one.
    pub fn resolve(
        &mut self,
        directive: &Directive,
        definitions: &mut DefinitionRegistry<'_>,
    ) -> Result<IoParameter> {
        match &directive.type_token {
            TypeToken::Structured(type_name) => {
                let definition_id = definitions.ensure_definition(type_name)?;
                debug!("Directive on line {} references {}", directive.line, definition_id);
                Ok(IoParameter::Reference {
                    definition_id,
                    title: definition_title(type_name),
                })
            }
            TypeToken::Scalar(scalar_type) => {
                let name = directive
                    .field_name
                    .clone()
                    .ok_or_else(|| Error::MalformedDirective {
                        line: directive.line,
                        column: 1,
                        directive: format!("{} {}", directive.kind.keyword(), scalar_type.as_str()),
                        reason: "scalar directive without a field name".to_string(),
                    })?;
                Ok(IoParameter::Scalar {
                    name,
                    scalar_type: scalar_type.clone(),
                    required: true,
                    example: self.examples.example(scalar_type),
                })
            }
        }
    }

    /// Request parameter for an `@input` directive
    pub fn input(
        &mut self,
        directive: &Directive,
        definitions: &mut DefinitionRegistry<'_>,
    ) -> Result<Parameter> {
        Ok(self.resolve(directive, definitions)?.into_parameter())
    }

    /// 200-response for an `@output` directive
    pub fn output(
        &mut self,
        directive: &Directive,
        definitions: &mut DefinitionRegistry<'_>,
    ) -> Result<Response> {
        Ok(self.resolve(directive, definitions)?.into_response())
    }
}

impl IoParameter {
    /// References go in the request body, scalars in form data.
    pub fn into_parameter(self) -> Parameter {
        match self {
            IoParameter::Reference {
                definition_id,
                title,
            } => Parameter {
                name: "body".to_string(),
                location: ParameterLocation::Body,
                description: Some(format!("DTO {}", title)),
                required: None,
                param_type: None,
                items: None,
                schema: Some(Schema::reference(&definition_id)),
                example: None,
            },
            IoParameter::Scalar {
                name,
                scalar_type,
                required,
                example,
            } => {
                let items = (scalar_type == ScalarType::Array).then(|| array_items(&name));
                Parameter {
                    description: Some(name.clone()),
                    name,
                    location: ParameterLocation::FormData,
                    required: Some(required),
                    param_type: Some(scalar_type.as_str().to_string()),
                    items,
                    schema: None,
                    example: Some(example),
                }
            }
        }
    }

    /// References become the response body schema; scalars get a synthesized
    /// payload keyed by the field name.
    pub fn into_response(self) -> Response {
        match self {
            IoParameter::Reference {
                definition_id,
                title,
            } => Response {
                description: format!("DTO {}", title),
                schema: Some(Schema::reference(&definition_id)),
                examples: None,
            },
            IoParameter::Scalar {
                name,
                scalar_type,
                required,
                example,
            } => {
                let schema = Schema {
                    title: Some(name.clone()),
                    required: Some(required),
                    ..Schema::typed(scalar_type.as_str())
                };
                let mut data = serde_json::Map::new();
                data.insert(name, example);
                let mut examples = BTreeMap::new();
                examples.insert(JSON_MEDIA_TYPE.to_string(), json!({ "data": data }));

                Response {
                    description: "Successful response".to_string(),
                    schema: Some(schema),
                    examples: Some(examples),
                }
            }
        }
    }
}

/// Item schema guessed from an array field name: `tag_ids` holds `tag_id`
/// integers, anything else holds strings named like the field.
fn array_items(name: &str) -> Schema {
    match name.strip_suffix("_ids") {
        Some(stem) => Schema {
            title: Some(format!("{}_id", stem)),
            ..Schema::typed("integer")
        },
        None => Schema {
            title: Some(name.to_string()),
            ..Schema::typed("string")
        },
    }
}
