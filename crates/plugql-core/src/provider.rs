//! Definition providers.
//!
//! Providers are the external sources of plugin definitions (the schema
//! registry never discovers plugins itself). Definitions are returned as an
//! ordered map so that aggregation, and with it weight tie-breaking, is
//! deterministic.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::definition::Definition;
use crate::error::Result;

/// Source of plugin definitions.
///
/// Each module that contributes fields, types or mutations implements this
/// trait. Definitions are read once per schema compilation pass.
pub trait DefinitionProvider: Send + Sync {
    /// Identifier used in logs and diagnostics
    fn provider_id(&self) -> &str;

    /// All definitions keyed by plugin id, in registration order
    fn definitions(&self) -> Result<IndexMap<String, Definition>>;

    /// A single definition by plugin id
    fn definition(&self, id: &str) -> Result<Option<Definition>> {
        Ok(self.definitions()?.shift_remove(id))
    }
}

/// In-memory provider holding a fixed set of definitions.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    id: String,
    definitions: IndexMap<String, Definition>,
}

impl StaticProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            definitions: IndexMap::new(),
        }
    }

    /// Builds a provider from existing definitions.
    pub fn from_definitions(
        id: impl Into<String>,
        definitions: impl IntoIterator<Item = (String, Definition)>,
    ) -> Self {
        Self {
            id: id.into(),
            definitions: definitions.into_iter().collect(),
        }
    }

    pub fn with_definition(mut self, id: impl Into<String>, definition: Definition) -> Self {
        self.insert(id, definition);
        self
    }

    /// Adds a definition; an existing id keeps its position but takes the new value.
    pub fn insert(&mut self, id: impl Into<String>, definition: Definition) {
        self.definitions.insert(id.into(), definition);
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl DefinitionProvider for StaticProvider {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn definitions(&self) -> Result<IndexMap<String, Definition>> {
        for (id, definition) in &self.definitions {
            definition.validate(id)?;
        }
        Ok(self.definitions.clone())
    }

    fn definition(&self, id: &str) -> Result<Option<Definition>> {
        Ok(self.definitions.get(id).cloned())
    }
}

/// Chains several providers behind one provider id.
///
/// Definitions are read from each provider in order. A later provider
/// reusing an id replaces the earlier definition in place.
#[derive(Clone, Default)]
pub struct CompositeProvider {
    id: String,
    providers: Vec<Arc<dyn DefinitionProvider>>,
}

impl CompositeProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            providers: Vec::new(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn DefinitionProvider>) -> Self {
        self.push(provider);
        self
    }

    pub fn push(&mut self, provider: Arc<dyn DefinitionProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for CompositeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.providers.iter().map(|p| p.provider_id()).collect();
        f.debug_struct("CompositeProvider")
            .field("id", &self.id)
            .field("providers", &ids)
            .finish()
    }
}

impl DefinitionProvider for CompositeProvider {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn definitions(&self) -> Result<IndexMap<String, Definition>> {
        let mut merged = IndexMap::new();
        for provider in &self.providers {
            for (id, definition) in provider.definitions()? {
                if merged.insert(id.clone(), definition).is_some() {
                    debug!(
                        provider = %provider.provider_id(),
                        id = %id,
                        "Definition id overridden by later provider"
                    );
                }
            }
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_static_provider_preserves_order() {
        let provider = StaticProvider::new("fields")
            .with_definition("b", Definition::new("bee", "property"))
            .with_definition("a", Definition::new("ay", "property"))
            .with_definition("c", Definition::new("see", "property"));

        let ids: Vec<String> = provider.definitions().unwrap().keys().cloned().collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(provider.len(), 3);
        assert_eq!(provider.provider_id(), "fields");
    }

    #[test]
    fn test_static_provider_lookup() {
        let provider =
            StaticProvider::new("types").with_definition("node", Definition::new("Node", "object"));

        assert_eq!(
            provider.definition("node").unwrap().map(|d| d.name),
            Some("Node".to_string())
        );
        assert!(provider.definition("missing").unwrap().is_none());
    }

    #[test]
    fn test_malformed_definitions_propagate() {
        let provider =
            StaticProvider::new("types").with_definition("broken", Definition::new("", "object"));

        let err = provider.definitions().unwrap_err();
        assert!(matches!(err, CoreError::MalformedDefinition { .. }));
    }

    #[test]
    fn test_empty_provider() {
        let provider = StaticProvider::new("mutations");
        assert!(provider.is_empty());
        assert!(provider.definitions().unwrap().is_empty());
    }

    #[test]
    fn test_composite_provider_chains_in_order() {
        let builtin = StaticProvider::new("builtin")
            .with_definition("a", Definition::new("ay", "property"))
            .with_definition("b", Definition::new("bee", "property"));
        let custom = StaticProvider::new("custom")
            .with_definition("c", Definition::new("see", "property"))
            .with_definition("a", Definition::new("override", "property"));

        let composite = CompositeProvider::new("fields")
            .with_provider(Arc::new(builtin))
            .with_provider(Arc::new(custom));

        let definitions = composite.definitions().unwrap();
        let ids: Vec<&str> = definitions.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(definitions["a"].name, "override");
        assert_eq!(composite.len(), 2);
    }

    #[test]
    fn test_composite_provider_propagates_errors() {
        let broken =
            StaticProvider::new("broken").with_definition("x", Definition::new("x", ""));
        let composite = CompositeProvider::new("fields").with_provider(Arc::new(broken));
        assert!(composite.definitions().is_err());
    }
}
