//! Registration table of self-describing structured types.
//!
//! Types are looked up by fully-qualified identifier; the leading `\` is not
//! significant.

use crate::error::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A structured type able to describe its own shape.
///
/// Implementations expose the three pieces of information a DTO declares:
/// the default value template, the validation rule of each field and the
/// nested structured type of each field.
pub trait DataTransferObject: Send + Sync {
    /// Fully-qualified type identifier, e.g. `App\Dto\UserDto`
    fn type_name(&self) -> &str;

    /// Field names with their default values, in declaration order.
    ///
    /// A subtype field whose default is a sequence holds a list of that
    /// subtype; any other default holds a single value.
    fn template(&self) -> Vec<(String, Value)>;

    /// Validation rule expression of a field, e.g. `int|required|min:1`
    fn rule(&self, field: &str) -> Option<&str>;

    /// Fully-qualified identifier of the structured type nested in a field
    fn subtype(&self, field: &str) -> Option<&str>;
}

/// Declarative DTO, as written in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtoDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default)]
    pub default: Value,
}

impl DtoDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Add a plain field validated by `rule`
    pub fn field(mut self, name: &str, rule: &str) -> Self {
        self.fields.push(FieldDefinition {
            name: name.to_string(),
            rule: Some(rule.to_string()),
            subtype: None,
            default: Value::Null,
        });
        self
    }

    /// Add a field holding one `subtype` value
    pub fn nested(mut self, name: &str, subtype: &str) -> Self {
        self.fields.push(FieldDefinition {
            name: name.to_string(),
            rule: None,
            subtype: Some(subtype.to_string()),
            default: Value::Null,
        });
        self
    }

    /// Add a field holding a list of `subtype` values
    pub fn nested_list(mut self, name: &str, subtype: &str) -> Self {
        self.fields.push(FieldDefinition {
            name: name.to_string(),
            rule: None,
            subtype: Some(subtype.to_string()),
            default: Value::Array(Vec::new()),
        });
        self
    }

    fn find(&self, field: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == field)
    }
}

impl DataTransferObject for DtoDefinition {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn template(&self) -> Vec<(String, Value)> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect()
    }

    fn rule(&self, field: &str) -> Option<&str> {
        self.find(field).and_then(|f| f.rule.as_deref())
    }

    fn subtype(&self, field: &str) -> Option<&str> {
        self.find(field).and_then(|f| f.subtype.as_deref())
    }
}

/// Registration table of structured types, keyed by canonical identifier.
///
/// Populated once up front and shared read-only between builds.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<dyn DataTransferObject>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing and returning any previous registration
    /// under the same identifier.
    pub fn register<T>(&mut self, dto: T) -> Option<Arc<dyn DataTransferObject>>
    where
        T: DataTransferObject + 'static,
    {
        let key = canonical_name(dto.type_name()).to_string();
        debug!("Registering structured type: {}", key);

        let previous = self.types.insert(key.clone(), Arc::new(dto));
        if previous.is_some() {
            warn!("Structured type {} registered twice, keeping the last one", key);
        }
        previous
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(canonical_name(type_name))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Look up a type; the leading namespace separator is not significant.
    pub fn resolve(&self, type_name: &str) -> Result<Arc<dyn DataTransferObject>> {
        self.types
            .get(canonical_name(type_name))
            .cloned()
            .ok_or_else(|| Error::UnresolvableStructuredType {
                type_name: type_name.to_string(),
            })
    }

    /// Check that every nested subtype points at a registered type.
    pub fn validate(&self) -> Result<()> {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();

        for name in names {
            let dto = &self.types[name];
            for (field, _) in dto.template() {
                if let Some(subtype) = dto.subtype(&field) {
                    if !self.contains(subtype) {
                        return Err(Error::UnresolvableStructuredType {
                            type_name: subtype.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Identifier without its leading namespace separator
pub fn canonical_name(type_name: &str) -> &str {
    type_name.trim_start_matches('\\')
}

/// Definition id: canonical identifier with `\` replaced by `_`.
///
/// `\Ns\UserDto` becomes `Ns_UserDto`.
pub fn definition_id(type_name: &str) -> String {
    canonical_name(type_name).replace('\\', "_")
}

/// Human-readable title, e.g. `Ns -> UserDto`
pub fn definition_title(type_name: &str) -> String {
    canonical_name(type_name).replace('\\', " -> ")
}
