//! Definitions shipped with the registry.
//!
//! The engine's own scalars, the typed-data scalars and the entity fields.
//! Host applications register these providers ahead of their own so that
//! custom definitions of equal weight never displace them by accident, while
//! heavier ones still can.

use plugql_core::{ArgumentDefinition, Definition, ParentRef, StaticProvider, TypeCategory, TypeSpec};

use super::{entity, types};

pub const BUILTIN_SCALARS_PROVIDER: &str = "builtin.scalar";
pub const BUILTIN_FIELDS_PROVIDER: &str = "builtin.fields";

/// Names of the scalars the execution engine provides.
pub const ENGINE_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Type providers for the built-in definitions, with their category.
pub fn builtin_type_providers() -> Vec<(TypeCategory, StaticProvider)> {
    let mut scalars = StaticProvider::new(BUILTIN_SCALARS_PROVIDER);

    for name in ENGINE_SCALARS {
        scalars.insert(
            name.to_ascii_lowercase(),
            Definition::new(name, types::BUILTIN_SCALAR),
        );
    }

    scalars.insert(
        "email",
        Definition::new("Email", types::SCALAR)
            .with_reference("email")
            .with_description("An email address."),
    );
    scalars.insert(
        "filter_format",
        Definition::new("FilterFormat", types::SCALAR)
            .with_reference("filter_format")
            .with_description("A text format identifier."),
    );

    vec![(TypeCategory::Scalar, scalars)]
}

/// Field provider for the entity fields.
pub fn builtin_field_provider() -> StaticProvider {
    StaticProvider::new(BUILTIN_FIELDS_PROVIDER)
        .with_definition(
            "entity_access",
            Definition::new("entityAccess", entity::ENTITY_ACCESS)
                .with_parent(ParentRef::new("Entity"))
                .with_type(TypeSpec::named("Boolean"))
                .with_argument(
                    "operation",
                    ArgumentDefinition::new(TypeSpec::named("String").non_null()),
                )
                .with_description("Check entity access for the given operation."),
        )
        .with_definition(
            "entity_published",
            Definition::new("entityPublished", entity::ENTITY_PUBLISHED)
                .with_parent(ParentRef::new("EntityPublishable"))
                .with_type(TypeSpec::named("Boolean"))
                .with_description("Whether the entity is published."),
        )
        .with_definition(
            "entity_rendered",
            Definition::new("entityRendered", entity::ENTITY_RENDERED)
                .with_parent(ParentRef::new("Entity"))
                .with_type(TypeSpec::named("String"))
                .with_argument(
                    "mode",
                    ArgumentDefinition::new(TypeSpec::named("String"))
                        .with_default(serde_json::Value::from(entity::DEFAULT_RENDER_MODE)),
                )
                .with_description("Rendered output of the entity."),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugql_core::DefinitionProvider;

    #[test]
    fn test_builtin_scalars() {
        let providers = builtin_type_providers();
        assert_eq!(providers.len(), 1);

        let (category, provider) = &providers[0];
        assert_eq!(*category, TypeCategory::Scalar);

        let definitions = provider.definitions().unwrap();
        assert_eq!(definitions["string"].name, "String");
        assert_eq!(definitions["string"].class, types::BUILTIN_SCALAR);
        assert_eq!(definitions["email"].reference.as_ref().unwrap().as_str(), "email");
        assert_eq!(definitions.len(), 7);
    }

    #[test]
    fn test_builtin_fields() {
        let definitions = builtin_field_provider().definitions().unwrap();

        let access = &definitions["entity_access"];
        assert_eq!(access.parents[0].parent, "Entity");
        assert!(access.arguments.contains_key("operation"));

        let rendered = &definitions["entity_rendered"];
        assert_eq!(
            rendered.arguments["mode"].default,
            Some(serde_json::Value::from("full"))
        );
    }
}
