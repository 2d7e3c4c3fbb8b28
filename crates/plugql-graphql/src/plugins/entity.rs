//! Entity field plugins.
//!
//! Entities travel through the schema as parent values wrapping an
//! [`EntityRef`]. Fields on them delegate to the [`Entity`] trait: access
//! checks, publishing status and rendering all live in the entity itself.

use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, ResolverContext};
use plugql_core::{Definition, DefinitionProvider};

use super::{FieldPlugin, finish_field};
use crate::error::SchemaError;
use crate::schema::SchemaBuilder;

pub const ENTITY_ACCESS: &str = "entity_access";
pub const ENTITY_PUBLISHED: &str = "entity_published";
pub const ENTITY_RENDERED: &str = "entity_rendered";

/// Render mode used when a query does not pass one.
pub const DEFAULT_RENDER_MODE: &str = "full";

/// An entity exposed to GraphQL.
pub trait Entity: Send + Sync + 'static {
    fn entity_type_id(&self) -> &str;

    /// Whether the current account may perform `operation` on the entity.
    fn access(&self, operation: &str) -> bool;

    /// Publishing status, `None` when the entity is not publishable.
    fn is_published(&self) -> Option<bool> {
        None
    }

    /// Rendered markup for a view mode, `None` when it cannot be rendered.
    fn render(&self, _mode: &str) -> Option<String> {
        None
    }
}

/// Shared handle to an entity, stored as an opaque parent value.
#[derive(Clone)]
pub struct EntityRef(pub Arc<dyn Entity>);

impl EntityRef {
    pub fn new(entity: impl Entity) -> Self {
        Self(Arc::new(entity))
    }

    /// Wraps the entity as a resolver value for the fields below it.
    pub fn into_field_value<'a>(self) -> FieldValue<'a> {
        FieldValue::owned_any(self)
    }

    fn from_parent<'a>(ctx: &'a ResolverContext<'_>) -> Option<&'a EntityRef> {
        ctx.parent_value.downcast_ref::<EntityRef>()
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef")
            .field(&self.0.entity_type_id())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityOperation {
    Access,
    Published,
    Rendered,
}

/// Field resolving against the parent entity.
#[derive(Debug, Clone)]
pub struct EntityField {
    id: String,
    definition: Definition,
    operation: EntityOperation,
}

impl FieldPlugin for EntityField {
    fn id(&self) -> &str {
        &self.id
    }

    fn definition(&self) -> &Definition {
        &self.definition
    }

    fn to_field(&self, builder: &SchemaBuilder, name: &str) -> Result<Field, SchemaError> {
        let operation = self.operation;

        let field = Field::new(name, self.type_ref(builder)?, move |ctx| {
            FieldFuture::new(async move {
                let Some(entity) = EntityRef::from_parent(&ctx) else {
                    return Ok(None);
                };

                let value = match operation {
                    EntityOperation::Access => {
                        let op = ctx.args.try_get("operation")?.string()?;
                        Some(FieldValue::value(entity.0.access(op)))
                    }
                    EntityOperation::Published => {
                        entity.0.is_published().map(FieldValue::value)
                    }
                    EntityOperation::Rendered => {
                        let mode = match ctx.args.get("mode") {
                            Some(mode) => mode.string()?.to_string(),
                            None => DEFAULT_RENDER_MODE.to_string(),
                        };
                        entity.0.render(&mode).map(FieldValue::value)
                    }
                };
                Ok(value)
            })
        });

        finish_field(field, builder, &self.definition)
    }
}

fn entity_field(
    operation: EntityOperation,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn FieldPlugin>, SchemaError> {
    Ok(Arc::new(EntityField {
        id: id.to_string(),
        definition: definition.clone(),
        operation,
    }))
}

pub fn create_entity_access(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn FieldPlugin>, SchemaError> {
    if !definition.arguments.contains_key("operation") {
        return Err(SchemaError::invalid_definition(
            id,
            "entity access field requires an 'operation' argument",
        ));
    }
    entity_field(EntityOperation::Access, definition, id)
}

pub fn create_entity_published(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn FieldPlugin>, SchemaError> {
    entity_field(EntityOperation::Published, definition, id)
}

pub fn create_entity_rendered(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn FieldPlugin>, SchemaError> {
    entity_field(EntityOperation::Rendered, definition, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Article;

    impl Entity for Article {
        fn entity_type_id(&self) -> &str {
            "node"
        }

        fn access(&self, operation: &str) -> bool {
            operation == "view"
        }
    }

    #[test]
    fn test_entity_defaults() {
        let entity = EntityRef::new(Article);
        assert_eq!(entity.0.is_published(), None);
        assert_eq!(entity.0.render(DEFAULT_RENDER_MODE), None);
        assert!(entity.0.access("view"));
        assert!(!entity.0.access("delete"));
        assert_eq!(format!("{entity:?}"), "EntityRef(\"node\")");
    }
}
