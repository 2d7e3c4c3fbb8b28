//! Plugin instances and built-in plugin classes.
//!
//! A plugin is the built form of a definition. Field and mutation plugins
//! emit async-graphql fields, type plugins emit whole types. Plugins are
//! created lazily by the [`SchemaBuilder`](crate::schema::SchemaBuilder)
//! through factories registered in a [`PluginRegistry`].
//!
//! ## Built-in classes
//!
//! - Types: `object`, `interface`, `scalar`, `builtin_scalar`, `enum`,
//!   `union`, `input`
//! - Fields: `property`, `entity_access`, `entity_published`,
//!   `entity_rendered`
//! - Mutations: `property`

pub mod builtin;
pub mod entity;
pub mod fields;
mod registry;
pub mod types;

use async_graphql::dynamic::{Field, InterfaceField, Type, TypeRef};
use plugql_core::{Definition, TypeCategory};

pub use registry::{FieldFactory, PluginKind, PluginRegistry, TypeFactory};

use crate::error::SchemaError;
use crate::schema::SchemaBuilder;

/// A built field or mutation plugin.
pub trait FieldPlugin: Send + Sync {
    /// Plugin id the instance was built for
    fn id(&self) -> &str;

    fn definition(&self) -> &Definition;

    /// Declared public name (parents may expose it under an alias)
    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Resolved return type.
    fn type_ref(&self, builder: &SchemaBuilder) -> Result<TypeRef, SchemaError> {
        let spec = self.definition().type_spec.as_ref().ok_or_else(|| {
            SchemaError::invalid_definition(self.id(), "field definition has no type")
        })?;
        builder.process_type(spec)
    }

    /// Emits the field under the given public name.
    fn to_field(&self, builder: &SchemaBuilder, name: &str) -> Result<Field, SchemaError>;

    /// Emits the field signature for an interface.
    fn to_interface_field(
        &self,
        builder: &SchemaBuilder,
        name: &str,
    ) -> Result<InterfaceField, SchemaError> {
        let mut field = InterfaceField::new(name, self.type_ref(builder)?);
        if let Some(description) = &self.definition().description {
            field = field.description(description);
        }
        if let Some(reason) = &self.definition().deprecation {
            field = field.deprecation(Some(reason.as_str()));
        }
        for argument in builder.process_arguments(&self.definition().arguments)? {
            field = field.argument(argument.to_input_value()?);
        }
        Ok(field)
    }
}

/// A built type plugin.
pub trait TypePlugin: Send + Sync {
    /// Plugin id the instance was built for
    fn id(&self) -> &str;

    fn definition(&self) -> &Definition;

    fn category(&self) -> TypeCategory;

    /// Public type name
    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Emits the type, or `None` when the execution engine already provides it.
    fn to_type(&self, builder: &SchemaBuilder) -> Result<Option<Type>, SchemaError>;
}

/// Adds description, deprecation and processed arguments to a field.
pub(crate) fn finish_field(
    mut field: Field,
    builder: &SchemaBuilder,
    definition: &Definition,
) -> Result<Field, SchemaError> {
    if let Some(description) = &definition.description {
        field = field.description(description);
    }
    if let Some(reason) = &definition.deprecation {
        field = field.deprecation(Some(reason.as_str()));
    }
    for argument in builder.process_arguments(&definition.arguments)? {
        field = field.argument(argument.to_input_value()?);
    }
    Ok(field)
}
