//! Schema compilation configuration.
//!
//! Configuration can be loaded from a TOML file such as `plugql.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! query_type = "Query"
//! mutation_type = "Mutation"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! log_level = "info"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Options applied when composing plugins into an executable schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Name of the query root type that receives `Root` fields.
    /// Default: "Query"
    #[serde(default = "default_query_type")]
    pub query_type: String,

    /// Name of the mutation root type, registered only when mutations exist.
    /// Default: "Mutation"
    #[serde(default = "default_mutation_type")]
    pub mutation_type: String,

    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// Log filter used when `RUST_LOG` is not set.
    /// Default: "info"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_query_type() -> String {
    "Query".to_string()
}

fn default_mutation_type() -> String {
    "Mutation".to_string()
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            query_type: default_query_type(),
            mutation_type: default_mutation_type(),
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
            log_level: default_log_level(),
        }
    }
}

impl SchemaConfig {
    /// Parses and validates a TOML configuration.
    pub fn from_toml_str(source: &str) -> Result<Self, SchemaError> {
        let config: SchemaConfig =
            toml::from_str(source).map_err(|e| SchemaError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if !is_valid_graphql_name(&self.query_type) {
            return Err(SchemaError::InvalidConfig(format!(
                "query_type '{}' is not a valid GraphQL name",
                self.query_type
            )));
        }
        if !is_valid_graphql_name(&self.mutation_type) {
            return Err(SchemaError::InvalidConfig(format!(
                "mutation_type '{}' is not a valid GraphQL name",
                self.mutation_type
            )));
        }
        if self.query_type == self.mutation_type {
            return Err(SchemaError::InvalidConfig(
                "query_type and mutation_type must differ".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(SchemaError::InvalidConfig("max_depth must be > 0".into()));
        }
        if self.max_complexity == 0 {
            return Err(SchemaError::InvalidConfig("max_complexity must be > 0".into()));
        }
        Ok(())
    }
}

/// Checks the GraphQL name grammar: `[_A-Za-z][_0-9A-Za-z]*`.
pub(crate) fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
