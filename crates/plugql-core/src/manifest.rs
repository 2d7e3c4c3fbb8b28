//! TOML plugin manifests.
//!
//! A manifest declares definitions for all three plugin kinds in one file:
//!
//! ```toml
//! [fields.entity_access]
//! name = "entityAccess"
//! class = "entity_access"
//! type = "Boolean"
//! parents = ["Entity"]
//! arguments = { operation = "String!" }
//!
//! [types.interface.entity]
//! name = "Entity"
//! class = "interface"
//!
//! [types.object.article]
//! name = "Article"
//! class = "object"
//! interfaces = ["Entity"]
//! reference = "Entity"
//!
//! [mutations.publish]
//! name = "publishArticle"
//! class = "property"
//! type = "Boolean"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::definition::Definition;
use crate::error::Result;
use crate::names::TypeCategory;
use crate::provider::StaticProvider;

/// Definitions for every plugin kind, as read from a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub fields: IndexMap<String, Definition>,

    /// Type definitions grouped by category
    #[serde(default)]
    pub types: BTreeMap<TypeCategory, IndexMap<String, Definition>>,

    #[serde(default)]
    pub mutations: IndexMap<String, Definition>,
}

impl Manifest {
    /// Parses a manifest from TOML text and validates every definition.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(source)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reads and parses a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let manifest = Self::from_toml_str(&source)?;
        debug!(
            path = %path.display(),
            fields = manifest.fields.len(),
            types = manifest.type_count(),
            mutations = manifest.mutations.len(),
            "Loaded plugin manifest"
        );
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        let all = self
            .fields
            .iter()
            .chain(self.types.values().flatten())
            .chain(self.mutations.iter());
        for (id, definition) in all {
            definition.validate(id)?;
        }
        Ok(())
    }

    pub fn type_count(&self) -> usize {
        self.types.values().map(IndexMap::len).sum()
    }

    pub fn field_provider(&self) -> StaticProvider {
        StaticProvider::from_definitions("manifest.fields", self.fields.clone())
    }

    pub fn mutation_provider(&self) -> StaticProvider {
        StaticProvider::from_definitions("manifest.mutations", self.mutations.clone())
    }

    /// One provider per declared type category.
    pub fn type_providers(&self) -> Vec<(TypeCategory, StaticProvider)> {
        self.types
            .iter()
            .map(|(category, definitions)| {
                (
                    *category,
                    StaticProvider::from_definitions(
                        format!("manifest.{category}"),
                        definitions.clone(),
                    ),
                )
            })
            .collect()
    }
}
