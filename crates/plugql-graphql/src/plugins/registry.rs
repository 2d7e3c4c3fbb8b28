//! Startup-time plugin factory registry.
//!
//! Definitions name a `class`; the registry maps each class to the factory
//! function that turns a definition into a plugin instance. Factories are
//! registered explicitly, there is no runtime discovery.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use plugql_core::{Definition, DefinitionProvider};

use super::{FieldPlugin, TypePlugin, entity, fields, types};
use crate::error::SchemaError;
use crate::schema::SchemaBuilder;

/// Kind of plugin being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Field,
    Type,
    Mutation,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Field => write!(f, "field"),
            PluginKind::Type => write!(f, "type"),
            PluginKind::Mutation => write!(f, "mutation"),
        }
    }
}

/// Builds a field or mutation plugin from its definition.
///
/// The builder is passed in so factories can resolve other types while
/// constructing their instance.
pub type FieldFactory = fn(
    builder: &SchemaBuilder,
    provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn FieldPlugin>, SchemaError>;

/// Builds a type plugin from its definition.
pub type TypeFactory = fn(
    builder: &SchemaBuilder,
    provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn TypePlugin>, SchemaError>;

/// Class name → factory tables, one per plugin kind.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    fields: HashMap<String, FieldFactory>,
    types: HashMap<String, TypeFactory>,
    mutations: HashMap<String, FieldFactory>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in plugin class.
    pub fn with_builtins() -> Self {
        Self::new()
            .with_type(types::OBJECT, types::create_object)
            .with_type(types::INTERFACE, types::create_interface)
            .with_type(types::SCALAR, types::create_scalar)
            .with_type(types::BUILTIN_SCALAR, types::create_builtin_scalar)
            .with_type(types::ENUM, types::create_enum)
            .with_type(types::UNION, types::create_union)
            .with_type(types::INPUT, types::create_input)
            .with_field(fields::PROPERTY, fields::create_property)
            .with_field(entity::ENTITY_ACCESS, entity::create_entity_access)
            .with_field(entity::ENTITY_PUBLISHED, entity::create_entity_published)
            .with_field(entity::ENTITY_RENDERED, entity::create_entity_rendered)
            .with_mutation(fields::PROPERTY, fields::create_property)
    }

    pub fn register_field(&mut self, class: impl Into<String>, factory: FieldFactory) {
        self.fields.insert(class.into(), factory);
    }

    pub fn register_type(&mut self, class: impl Into<String>, factory: TypeFactory) {
        self.types.insert(class.into(), factory);
    }

    pub fn register_mutation(&mut self, class: impl Into<String>, factory: FieldFactory) {
        self.mutations.insert(class.into(), factory);
    }

    pub fn with_field(mut self, class: impl Into<String>, factory: FieldFactory) -> Self {
        self.register_field(class, factory);
        self
    }

    pub fn with_type(mut self, class: impl Into<String>, factory: TypeFactory) -> Self {
        self.register_type(class, factory);
        self
    }

    pub fn with_mutation(mut self, class: impl Into<String>, factory: FieldFactory) -> Self {
        self.register_mutation(class, factory);
        self
    }

    pub fn field_factory(&self, class: &str) -> Option<FieldFactory> {
        self.fields.get(class).copied()
    }

    pub fn type_factory(&self, class: &str) -> Option<TypeFactory> {
        self.types.get(class).copied()
    }

    pub fn mutation_factory(&self, class: &str) -> Option<FieldFactory> {
        self.mutations.get(class).copied()
    }

    /// Registered class names for a kind, sorted.
    pub fn classes(&self, kind: PluginKind) -> Vec<&str> {
        let mut classes: Vec<&str> = match kind {
            PluginKind::Field => self.fields.keys().map(String::as_str).collect(),
            PluginKind::Type => self.types.keys().map(String::as_str).collect(),
            PluginKind::Mutation => self.mutations.keys().map(String::as_str).collect(),
        };
        classes.sort_unstable();
        classes
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("fields", &self.classes(PluginKind::Field))
            .field("types", &self.classes(PluginKind::Type))
            .field("mutations", &self.classes(PluginKind::Mutation))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_classes() {
        let registry = PluginRegistry::with_builtins();

        assert_eq!(
            registry.classes(PluginKind::Type),
            vec!["builtin_scalar", "enum", "input", "interface", "object", "scalar", "union"]
        );
        assert_eq!(
            registry.classes(PluginKind::Field),
            vec!["entity_access", "entity_published", "entity_rendered", "property"]
        );
        assert_eq!(registry.classes(PluginKind::Mutation), vec!["property"]);
    }

    #[test]
    fn test_lookup_unknown_class() {
        let registry = PluginRegistry::new();
        assert!(registry.type_factory("object").is_none());
        assert!(registry.field_factory("property").is_none());
        assert!(registry.mutation_factory("property").is_none());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PluginKind::Field.to_string(), "field");
        assert_eq!(PluginKind::Mutation.to_string(), "mutation");
    }
}
