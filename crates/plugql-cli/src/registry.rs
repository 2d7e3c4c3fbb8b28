//! Wires manifest and built-in providers into a schema builder.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use plugql_core::{CompositeProvider, Manifest};
use plugql_graphql::plugins::builtin::{builtin_field_provider, builtin_type_providers};
use plugql_graphql::{PluginRegistry, SchemaBuilder};
use tracing::debug;

pub struct Sources {
    pub manifest: Option<Manifest>,
    pub builtins: bool,
}

impl Sources {
    pub fn load(manifest: Option<&Path>, builtins: bool) -> Result<Self> {
        let manifest = manifest
            .map(|path| {
                Manifest::load(path)
                    .with_context(|| format!("Failed to load manifest {}", path.display()))
            })
            .transpose()?;

        if let Some(manifest) = &manifest {
            debug!(
                fields = manifest.fields.len(),
                types = manifest.type_count(),
                mutations = manifest.mutations.len(),
                "Loaded manifest"
            );
        }

        Ok(Self { manifest, builtins })
    }

    /// Builds a fresh schema builder. Built-in providers come first so that
    /// manifest definitions only displace them with a greater weight.
    pub fn builder(&self) -> SchemaBuilder {
        let mut fields = CompositeProvider::new("fields");
        let mut mutations = CompositeProvider::new("mutations");

        if self.builtins {
            fields.push(Arc::new(builtin_field_provider()));
        }
        if let Some(manifest) = &self.manifest {
            fields.push(Arc::new(manifest.field_provider()));
            mutations.push(Arc::new(manifest.mutation_provider()));
        }

        let mut builder = SchemaBuilder::new(
            Arc::new(fields),
            Arc::new(mutations),
            Arc::new(PluginRegistry::with_builtins()),
        );

        if self.builtins {
            for (category, provider) in builtin_type_providers() {
                builder.add_type_provider(category, Arc::new(provider));
            }
        }
        if let Some(manifest) = &self.manifest {
            for (category, provider) in manifest.type_providers() {
                builder.add_type_provider(category, Arc::new(provider));
            }
        }

        builder
    }
}
