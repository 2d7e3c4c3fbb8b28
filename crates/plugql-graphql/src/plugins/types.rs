//! Generic type plugins.
//!
//! Each class turns a definition into one async-graphql type. Object and
//! interface types pull their fields from the builder's association map;
//! the other categories are fully described by their definition.

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, InputObject, InputValue, Interface, InterfaceField, Object,
    Scalar, Type, TypeRef, Union,
};
use indexmap::IndexMap;
use plugql_core::{Definition, DefinitionProvider, TypeCategory};
use tracing::trace;

use super::{FieldPlugin, TypePlugin};
use crate::error::SchemaError;
use crate::schema::SchemaBuilder;

pub const OBJECT: &str = "object";
pub const INTERFACE: &str = "interface";
pub const SCALAR: &str = "scalar";
pub const BUILTIN_SCALAR: &str = "builtin_scalar";
pub const ENUM: &str = "enum";
pub const UNION: &str = "union";
pub const INPUT: &str = "input";

/// Name of the field added to object and interface types without fields.
pub const PLACEHOLDER_FIELD: &str = "_placeholder";

/// Type plugin driven entirely by its definition.
#[derive(Debug, Clone)]
pub struct DefinedType {
    id: String,
    category: TypeCategory,
    definition: Definition,
}

impl DefinedType {
    pub fn new(id: impl Into<String>, category: TypeCategory, definition: Definition) -> Self {
        Self {
            id: id.into(),
            category,
            definition,
        }
    }

    /// Fields of this type: those of each implemented interface first, then
    /// its own, which take precedence on name clashes.
    fn collect_fields(
        &self,
        builder: &SchemaBuilder,
    ) -> Result<IndexMap<String, Arc<dyn FieldPlugin>>, SchemaError> {
        let mut fields = IndexMap::new();
        for interface in &self.definition.interfaces {
            let interface = builder.get_type(interface)?;
            fields.extend(builder.get_fields(interface.name())?);
        }
        fields.extend(builder.get_fields(self.name())?);
        Ok(fields)
    }

    fn object(&self, builder: &SchemaBuilder) -> Result<Type, SchemaError> {
        let mut object = Object::new(self.name());
        if let Some(description) = &self.definition.description {
            object = object.description(description);
        }

        // Interfaces without fields carry the placeholder, so implementers must too.
        let mut needs_placeholder = false;
        for interface in &self.definition.interfaces {
            let interface = builder.get_type(interface)?;
            needs_placeholder |= !builder.has_fields(interface.name())?;
            object = object.implement(interface.name());
        }

        let fields = self.collect_fields(builder)?;
        if needs_placeholder || fields.is_empty() {
            trace!(type_name = %self.name(), "No fields found, adding placeholder field");
            object = object.field(placeholder_field());
        }
        for (name, field) in fields {
            object = object.field(field.to_field(builder, &name)?);
        }

        Ok(object.into())
    }

    fn interface(&self, builder: &SchemaBuilder) -> Result<Type, SchemaError> {
        let mut interface = Interface::new(self.name());
        if let Some(description) = &self.definition.description {
            interface = interface.description(description);
        }

        let fields = self.collect_fields(builder)?;
        if fields.is_empty() {
            trace!(type_name = %self.name(), "No fields found, adding placeholder field");
            interface = interface.field(InterfaceField::new(
                PLACEHOLDER_FIELD,
                TypeRef::named(TypeRef::STRING),
            ));
        }
        for (name, field) in fields {
            interface = interface.field(field.to_interface_field(builder, &name)?);
        }

        Ok(interface.into())
    }

    fn scalar(&self) -> Type {
        let mut scalar = Scalar::new(self.name());
        if let Some(description) = &self.definition.description {
            scalar = scalar.description(description);
        }
        scalar.into()
    }

    fn enumeration(&self) -> Result<Type, SchemaError> {
        if self.definition.values.is_empty() {
            return Err(SchemaError::invalid_definition(&self.id, "enum without values"));
        }

        let mut enumeration = Enum::new(self.name());
        if let Some(description) = &self.definition.description {
            enumeration = enumeration.description(description);
        }
        for value in &self.definition.values {
            enumeration = enumeration.item(EnumItem::new(value));
        }
        Ok(enumeration.into())
    }

    fn union(&self, builder: &SchemaBuilder) -> Result<Type, SchemaError> {
        if self.definition.types.is_empty() {
            return Err(SchemaError::invalid_definition(&self.id, "union without member types"));
        }

        let mut union = Union::new(self.name());
        if let Some(description) = &self.definition.description {
            union = union.description(description);
        }
        for member in &self.definition.types {
            union = union.possible_type(builder.get_type(member)?.name());
        }
        Ok(union.into())
    }

    fn input(&self, builder: &SchemaBuilder) -> Result<Type, SchemaError> {
        if self.definition.fields.is_empty() {
            return Err(SchemaError::invalid_definition(&self.id, "input type without fields"));
        }

        let mut input = InputObject::new(self.name());
        if let Some(description) = &self.definition.description {
            input = input.description(description);
        }
        for (name, spec) in &self.definition.fields {
            input = input.field(InputValue::new(name, builder.process_type(spec)?));
        }
        Ok(input.into())
    }
}

impl TypePlugin for DefinedType {
    fn id(&self) -> &str {
        &self.id
    }

    fn definition(&self) -> &Definition {
        &self.definition
    }

    fn category(&self) -> TypeCategory {
        self.category
    }

    fn to_type(&self, builder: &SchemaBuilder) -> Result<Option<Type>, SchemaError> {
        let ty = match self.category {
            TypeCategory::Object => self.object(builder)?,
            TypeCategory::Interface => self.interface(builder)?,
            TypeCategory::Scalar => self.scalar(),
            TypeCategory::Enum => self.enumeration()?,
            TypeCategory::Union => self.union(builder)?,
            TypeCategory::Input => self.input(builder)?,
        };
        Ok(Some(ty))
    }
}

/// Scalar the execution engine provides itself (`String`, `Int`, ...).
#[derive(Debug, Clone)]
pub struct BuiltinScalar {
    id: String,
    definition: Definition,
}

impl TypePlugin for BuiltinScalar {
    fn id(&self) -> &str {
        &self.id
    }

    fn definition(&self) -> &Definition {
        &self.definition
    }

    fn category(&self) -> TypeCategory {
        TypeCategory::Scalar
    }

    fn to_type(&self, _builder: &SchemaBuilder) -> Result<Option<Type>, SchemaError> {
        Ok(None)
    }
}

pub(crate) fn placeholder_field() -> Field {
    Field::new(PLACEHOLDER_FIELD, TypeRef::named(TypeRef::STRING), |_| {
        FieldFuture::new(async { Ok(None::<Value>) })
    })
    .description("Placeholder field - type has no defined fields")
}

fn defined(
    category: TypeCategory,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn TypePlugin>, SchemaError> {
    Ok(Arc::new(DefinedType::new(id, category, definition.clone())))
}

pub fn create_object(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn TypePlugin>, SchemaError> {
    defined(TypeCategory::Object, definition, id)
}

pub fn create_interface(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn TypePlugin>, SchemaError> {
    defined(TypeCategory::Interface, definition, id)
}

pub fn create_scalar(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn TypePlugin>, SchemaError> {
    defined(TypeCategory::Scalar, definition, id)
}

pub fn create_builtin_scalar(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn TypePlugin>, SchemaError> {
    Ok(Arc::new(BuiltinScalar {
        id: id.to_string(),
        definition: definition.clone(),
    }))
}

pub fn create_enum(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn TypePlugin>, SchemaError> {
    defined(TypeCategory::Enum, definition, id)
}

pub fn create_union(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn TypePlugin>, SchemaError> {
    defined(TypeCategory::Union, definition, id)
}

pub fn create_input(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn TypePlugin>, SchemaError> {
    defined(TypeCategory::Input, definition, id)
}
