//! Error types for schema aggregation and compilation.
//!
//! Every failure here is a configuration or programming defect in the plugin
//! set: there are no soft-fail paths, errors propagate to the caller of the
//! compilation pass.

use plugql_core::CoreError;
use thiserror::Error;

use crate::plugins::PluginKind;

/// Errors that can occur while aggregating or compiling a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A type name could not be resolved directly or through references.
    #[error("Missing type {0}.")]
    MissingType(String),

    /// No factory is registered for a definition's class.
    #[error("No {kind} factory registered for class '{class}' (plugin {id})")]
    MissingFactory {
        kind: PluginKind,
        class: String,
        id: String,
    },

    /// A factory requested the plugin it is currently building.
    #[error("Cyclic {kind} definition: {id} was requested while being built")]
    CyclicDefinition { kind: PluginKind, id: String },

    /// A plugin id is not present in the aggregated maps.
    #[error("Missing {kind} definition: {id}")]
    MissingDefinition { kind: PluginKind, id: String },

    /// A definition lacks data its plugin class needs.
    #[error("Invalid definition {id}: {message}")]
    InvalidDefinition { id: String, message: String },

    /// A provider failed or returned malformed definitions.
    #[error(transparent)]
    Provider(#[from] CoreError),

    /// The GraphQL engine rejected the composed schema.
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuildFailed(String),

    /// Schema is still being built - client should retry.
    #[error("GraphQL schema is initializing, please retry")]
    SchemaInitializing,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchemaError {
    pub fn invalid_definition(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for diagnostics and GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingType(_) => "MISSING_TYPE",
            Self::MissingFactory { .. } => "MISSING_FACTORY",
            Self::CyclicDefinition { .. } => "CYCLIC_DEFINITION",
            Self::MissingDefinition { .. } => "MISSING_DEFINITION",
            Self::InvalidDefinition { .. } => "INVALID_DEFINITION",
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::SchemaInitializing => "SCHEMA_INITIALIZING",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    /// Returns the retry delay in seconds, if applicable.
    #[must_use]
    pub fn retry_after(&self) -> Option<u32> {
        match self {
            Self::SchemaInitializing => Some(5),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_type_message() {
        let err = SchemaError::MissingType("UnknownType".into());
        assert_eq!(err.to_string(), "Missing type UnknownType.");
        assert_eq!(err.error_code(), "MISSING_TYPE");
    }

    #[test]
    fn test_missing_factory_message() {
        let err = SchemaError::MissingFactory {
            kind: PluginKind::Type,
            class: "widget".into(),
            id: "thing".into(),
        };
        assert_eq!(
            err.to_string(),
            "No type factory registered for class 'widget' (plugin thing)"
        );
    }

    #[test]
    fn test_provider_errors_convert() {
        let err: SchemaError = CoreError::malformed("broken", "missing name").into();
        assert_eq!(err.error_code(), "PROVIDER_ERROR");
        assert_eq!(err.to_string(), "Malformed definition broken: missing name");
    }

    #[test]
    fn test_retry_after() {
        assert_eq!(SchemaError::SchemaInitializing.retry_after(), Some(5));
        assert_eq!(SchemaError::MissingType("X".into()).retry_after(), None);
    }
}
