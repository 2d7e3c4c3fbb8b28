//! Property field plugin.

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue};
use plugql_core::{Definition, DefinitionProvider};

use super::{FieldPlugin, finish_field};
use crate::error::SchemaError;
use crate::schema::SchemaBuilder;

pub const PROPERTY: &str = "property";

/// Resolves one key of the parent value.
///
/// The key is the definition's `property`, falling back to its declared
/// name. Parents that are not JSON-like objects resolve to `null`, which is
/// also what a property mutation returns since the mutation root carries no
/// value.
#[derive(Debug, Clone)]
pub struct PropertyField {
    id: String,
    definition: Definition,
}

impl PropertyField {
    pub fn new(id: impl Into<String>, definition: Definition) -> Self {
        Self {
            id: id.into(),
            definition,
        }
    }

    /// Key read from the parent value.
    pub fn property(&self) -> &str {
        self.definition
            .property
            .as_deref()
            .unwrap_or(&self.definition.name)
    }
}

impl FieldPlugin for PropertyField {
    fn id(&self) -> &str {
        &self.id
    }

    fn definition(&self) -> &Definition {
        &self.definition
    }

    fn to_field(&self, builder: &SchemaBuilder, name: &str) -> Result<Field, SchemaError> {
        let property = self.property().to_string();

        let field = Field::new(name, self.type_ref(builder)?, move |ctx| {
            let property = property.clone();
            FieldFuture::new(async move {
                let value = match ctx.parent_value.as_value() {
                    Some(Value::Object(object)) => object.get(property.as_str()).cloned(),
                    _ => None,
                };
                Ok(value.filter(|v| *v != Value::Null).map(FieldValue::value))
            })
        });

        finish_field(field, builder, &self.definition)
    }
}

pub fn create_property(
    _builder: &SchemaBuilder,
    _provider: &dyn DefinitionProvider,
    definition: &Definition,
    id: &str,
) -> Result<Arc<dyn FieldPlugin>, SchemaError> {
    Ok(Arc::new(PropertyField::new(id, definition.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_defaults_to_name() {
        let field = PropertyField::new("title", Definition::new("title", PROPERTY));
        assert_eq!(field.property(), "title");

        let field = PropertyField::new(
            "label",
            Definition::new("label", PROPERTY).with_property("display_name"),
        );
        assert_eq!(field.property(), "display_name");
        assert_eq!(field.id(), "label");
    }
}
