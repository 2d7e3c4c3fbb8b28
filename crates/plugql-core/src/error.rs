use thiserror::Error;

/// Core error types for plugin definitions and providers
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Malformed definition {id}: {message}")]
    MalformedDefinition { id: String, message: String },

    #[error("Invalid type spec '{spec}': {message}")]
    InvalidTypeSpec { spec: String, message: String },

    #[error("Unknown type category: {0}")]
    UnknownCategory(String),

    #[error("Provider {provider} failed: {message}")]
    Provider { provider: String, message: String },

    #[error("Manifest parsing error: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a new MalformedDefinition error
    pub fn malformed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDefinition {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a new InvalidTypeSpec error
    pub fn invalid_type_spec(spec: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTypeSpec {
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Create a new Provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Check if this error comes from bad definition input rather than the environment
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedDefinition { .. }
                | Self::InvalidTypeSpec { .. }
                | Self::UnknownCategory(_)
                | Self::Manifest(_)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedDefinition { .. } | Self::InvalidTypeSpec { .. } => {
                ErrorCategory::Definition
            }
            Self::UnknownCategory(_) => ErrorCategory::Configuration,
            Self::Provider { .. } => ErrorCategory::Provider,
            Self::Manifest(_) | Self::JsonError(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::System,
        }
    }
}

/// Error categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Definition,
    Configuration,
    Provider,
    Serialization,
    System,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Definition => write!(f, "definition"),
            Self::Configuration => write!(f, "configuration"),
            Self::Provider => write!(f, "provider"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::malformed("entity_access", "missing name");
        assert!(matches!(err, CoreError::MalformedDefinition { .. }));
        assert_eq!(
            err.to_string(),
            "Malformed definition entity_access: missing name"
        );

        let err = CoreError::invalid_type_spec("[String", "unbalanced brackets");
        assert_eq!(
            err.to_string(),
            "Invalid type spec '[String': unbalanced brackets"
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            CoreError::malformed("x", "y").category(),
            ErrorCategory::Definition
        );
        assert_eq!(
            CoreError::UnknownCategory("widget".into()).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            CoreError::provider("fields", "offline").category(),
            ErrorCategory::Provider
        );
    }

    #[test]
    fn test_definition_error_classification() {
        assert!(CoreError::malformed("x", "y").is_definition_error());
        assert!(!CoreError::provider("fields", "offline").is_definition_error());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Definition.to_string(), "definition");
        assert_eq!(ErrorCategory::Serialization.to_string(), "serialization");
    }
}
