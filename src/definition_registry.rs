//! Schema definitions of structured types, built once per documentation run.

use crate::error::Result;
use crate::type_registry::{canonical_name, definition_id, DataTransferObject, TypeRegistry};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Swagger 2.0 schema fragment.
///
/// Only the keywords the generator emits are modelled. `required` is the
/// per-property boolean form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a definition (`#/definitions/<id>`)
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    /// `{ "$ref": "#/definitions/<id>" }`
    pub fn reference(definition_id: &str) -> Self {
        Self {
            reference: Some(format!("#/definitions/{}", definition_id)),
            ..Self::default()
        }
    }

    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    pub fn object(properties: BTreeMap<String, Schema>) -> Self {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            ..Self::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }
}

/// Per-build store of structured type definitions.
///
/// Each definition is built at most once. Nested subtypes are inlined; a type
/// nested inside itself (directly or through other types) is emitted as a
/// `$ref` to its own definition, which is then registered as well.
pub struct DefinitionRegistry<'a> {
    types: &'a TypeRegistry,
    definitions: BTreeMap<String, Schema>,
    /// Canonical names of the types currently being described
    describing: Vec<String>,
    /// Types referenced through the recursion guard
    pending: Vec<String>,
}

impl<'a> DefinitionRegistry<'a> {
    pub fn new(types: &'a TypeRegistry) -> Self {
        debug!("Initializing DefinitionRegistry");
        Self {
            types,
            definitions: BTreeMap::new(),
            describing: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Make sure a definition exists for `type_name` and return its id.
    ///
    /// # Errors
    ///
    /// [`crate::error::Error::UnresolvableStructuredType`] when the type, or
    /// any type nested in it, is not registered.
    pub fn ensure_definition(&mut self, type_name: &str) -> Result<String> {
        let id = definition_id(type_name);
        if self.definitions.contains_key(&id) {
            debug!("Definition {} already exists", id);
            return Ok(id);
        }

        let result = self.register(type_name, id.clone()).and_then(|_| self.register_pending());
        if result.is_err() {
            self.pending.clear();
        }
        result.map(|_| id)
    }

    pub fn contains(&self, definition_id: &str) -> bool {
        self.definitions.contains_key(definition_id)
    }

    pub fn definitions(&self) -> &BTreeMap<String, Schema> {
        &self.definitions
    }

    pub fn into_definitions(self) -> BTreeMap<String, Schema> {
        self.definitions
    }

    fn register(&mut self, type_name: &str, id: String) -> Result<()> {
        debug!("Generating definition {} for {}", id, type_name);
        let schema = self.describe(type_name)?;
        self.definitions.insert(id, schema);
        Ok(())
    }

    fn register_pending(&mut self) -> Result<()> {
        while let Some(type_name) = self.pending.pop() {
            let id = definition_id(&type_name);
            if !self.definitions.contains_key(&id) {
                self.register(&type_name, id)?;
            }
        }
        Ok(())
    }

    fn describe(&mut self, type_name: &str) -> Result<Schema> {
        let dto = self.types.resolve(type_name)?;

        self.describing.push(canonical_name(type_name).to_string());
        let result = self.describe_fields(dto.as_ref());
        self.describing.pop();

        result
    }

    fn describe_fields(&mut self, dto: &dyn DataTransferObject) -> Result<Schema> {
        let mut properties = BTreeMap::new();

        for (field, default) in dto.template() {
            let property = match dto.subtype(&field) {
                Some(subtype) => {
                    let nested = self.nested_schema(subtype)?;
                    if default.is_array() {
                        Schema::array(nested)
                    } else {
                        nested
                    }
                }
                None => rule_property(dto.rule(&field)),
            };
            properties.insert(field, property);
        }

        Ok(Schema::object(properties))
    }

    fn nested_schema(&mut self, subtype: &str) -> Result<Schema> {
        let canonical = canonical_name(subtype);
        if self.describing.iter().any(|t| t == canonical) {
            debug!("Recursive reference to {}, emitting $ref", canonical);
            self.pending.push(canonical.to_string());
            return Ok(Schema::reference(&definition_id(canonical)));
        }
        self.describe(subtype)
    }
}

/// Property schema derived from a validation rule expression.
fn rule_property(rule: Option<&str>) -> Schema {
    let Some(rule) = rule else {
        return Schema {
            required: Some(false),
            ..Schema::typed("string")
        };
    };

    let tokens: Vec<&str> = rule.split('|').map(str::trim).collect();

    Schema {
        required: Some(tokens.contains(&"required")),
        description: Some(rule.to_string()),
        ..Schema::typed(rule_type(tokens[0]))
    }
}

/// Schema type for the leading keyword of a rule
fn rule_type(keyword: &str) -> &'static str {
    match keyword {
        "int" => "integer",
        "numeric" => "number",
        "bool" => "boolean",
        "string" => "string",
        "date" => "date",
        "array" => "array",
        _ => "string",
    }
}
