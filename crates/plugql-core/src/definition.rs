//! Plugin definitions.
//!
//! A definition is the declarative metadata of a pluggable field, type or
//! mutation: its public name, weight, the class (factory key) that builds it
//! and where it attaches in the schema. Definitions are immutable once read
//! from a provider.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::names::{ParentRef, TypeName, TypeSpec};

/// Declared argument of a field or mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArgumentRepr")]
pub struct ArgumentDefinition {
    #[serde(rename = "type")]
    pub type_spec: TypeSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArgumentRepr {
    Shorthand(TypeSpec),
    Full {
        #[serde(rename = "type")]
        type_spec: TypeSpec,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        default: Option<serde_json::Value>,
    },
}

impl TryFrom<ArgumentRepr> for ArgumentDefinition {
    type Error = CoreError;

    fn try_from(value: ArgumentRepr) -> Result<Self> {
        Ok(match value {
            ArgumentRepr::Shorthand(type_spec) => Self::new(type_spec),
            ArgumentRepr::Full {
                type_spec,
                description,
                default,
            } => Self {
                type_spec,
                description,
                default,
            },
        })
    }
}

impl ArgumentDefinition {
    pub fn new(type_spec: TypeSpec) -> Self {
        Self {
            type_spec,
            description: None,
            default: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Definition of a field, type or mutation plugin.
///
/// Only `name` and `class` are required. Kind-specific keys are ignored by
/// plugins that have no use for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Public name (e.g., "entityAccess", "Article")
    pub name: String,

    /// Priority used to resolve name collisions; higher wins
    #[serde(default)]
    pub weight: i64,

    /// Factory key the plugin is built with (e.g., "object", "entity_access")
    pub class: String,

    /// Parent types a field attaches to; empty means the root
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<ParentRef>,

    /// Abstract type this type stands in for (e.g., "email", "Entity")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<TypeName>,

    /// Return type of a field or mutation
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_spec: Option<TypeSpec>,

    /// Arguments of a field or mutation, in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, ArgumentDefinition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Deprecation reason; presence marks the element deprecated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,

    /// Interfaces an object type implements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,

    /// Values of an enum type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Member types of a union
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,

    /// Fields of an input object type
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, TypeSpec>,

    /// Key read from the parent value by property fields (defaults to `name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

impl Definition {
    /// Create a new definition with required fields
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            ..Default::default()
        }
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<TypeName>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_type(mut self, type_spec: TypeSpec) -> Self {
        self.type_spec = Some(type_spec);
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, argument: ArgumentDefinition) -> Self {
        self.arguments.insert(name.into(), argument);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_deprecation(mut self, reason: impl Into<String>) -> Self {
        self.deprecation = Some(reason.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.types.push(member.into());
        self
    }

    pub fn with_input_field(mut self, name: impl Into<String>, type_spec: TypeSpec) -> Self {
        self.fields.insert(name.into(), type_spec);
        self
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Parents this definition attaches to, defaulting to the root.
    pub fn effective_parents(&self) -> Vec<ParentRef> {
        if self.parents.is_empty() {
            vec![ParentRef::root()]
        } else {
            self.parents.clone()
        }
    }

    /// Checks the keys every provider must supply.
    pub fn validate(&self, id: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::malformed(id, "missing name"));
        }
        if self.class.trim().is_empty() {
            return Err(CoreError::malformed(id, "missing class"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let def = Definition::new("entityAccess", "entity_access")
            .with_weight(3)
            .with_parent(ParentRef::new("Entity"))
            .with_type(TypeSpec::named("Boolean"))
            .with_argument(
                "operation",
                ArgumentDefinition::new(TypeSpec::named("String").non_null()),
            );

        assert_eq!(def.name, "entityAccess");
        assert_eq!(def.class, "entity_access");
        assert_eq!(def.weight, 3);
        assert_eq!(def.parents, vec![ParentRef::new("Entity")]);
        assert_eq!(def.arguments["operation"].type_spec.to_string(), "String!");
        assert!(def.validate("entity_access").is_ok());
    }

    #[test]
    fn test_effective_parents_default_to_root() {
        let def = Definition::new("hello", "property");
        assert_eq!(def.effective_parents(), vec![ParentRef::root()]);
    }

    #[test]
    fn test_validate_rejects_missing_keys() {
        let err = Definition::new("", "object").validate("broken").unwrap_err();
        assert!(matches!(err, CoreError::MalformedDefinition { ref id, .. } if id == "broken"));

        assert!(Definition::new("Node", " ").validate("node").is_err());
    }

    #[test]
    fn test_deserialize_requires_name_and_class() {
        let result: std::result::Result<Definition, _> =
            serde_json::from_str(r#"{"class": "object"}"#);
        assert!(result.is_err());

        let result: std::result::Result<Definition, _> = serde_json::from_str(r#"{"name": "Node"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_with_shorthands() {
        let json = r#"{
            "name": "entityRendered",
            "class": "entity_rendered",
            "type": "String",
            "parents": ["Entity", "Node:rendered"],
            "arguments": {
                "mode": "String",
                "langcode": {"type": "String!", "default": "en"}
            }
        }"#;

        let def: Definition = serde_json::from_str(json).unwrap();
        assert_eq!(def.weight, 0);
        assert_eq!(def.type_spec, Some(TypeSpec::named("String")));
        assert_eq!(def.parents[1].alias.as_deref(), Some("rendered"));
        assert_eq!(def.arguments["mode"], ArgumentDefinition::new(TypeSpec::named("String")));
        assert_eq!(
            def.arguments["langcode"].default,
            Some(serde_json::Value::String("en".into()))
        );

        let keys: Vec<&str> = def.arguments.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["mode", "langcode"]);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let def = Definition::new("Email", "scalar").with_reference("email");
        let json = serde_json::to_string(&def).unwrap();
        let back: Definition = serde_json::from_str(&json).unwrap();
        assert_eq!(def, back);
    }
}
