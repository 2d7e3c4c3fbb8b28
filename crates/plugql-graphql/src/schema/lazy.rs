//! Lazy schema loading implementation.
//!
//! `LazySchema` compiles the schema on first access and shares the result.
//! Each compilation pass gets a fresh [`SchemaBuilder`] from the factory, so
//! invalidating the schema also drops every aggregated map and memoized
//! plugin instance.

use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::Schema;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::SchemaBuilder;
use crate::config::SchemaConfig;
use crate::error::SchemaError;

/// Creates the builder for one compilation pass.
pub type SchemaFactory = Arc<dyn Fn() -> Result<SchemaBuilder, SchemaError> + Send + Sync>;

/// State of the lazy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Schema has not been built yet.
    Uninitialized,
    /// Schema is currently being built.
    Building,
    /// Schema is ready for use.
    Ready,
    /// Schema build failed.
    Failed,
}

/// Thread-safe lazy schema holder.
///
/// # Example
///
/// ```ignore
/// let lazy = LazySchema::new(factory, SchemaConfig::default());
///
/// // First access triggers the build
/// let schema = lazy.get_or_build().await?;
///
/// // Force rebuild on next access
/// lazy.invalidate().await;
/// ```
pub struct LazySchema {
    /// The cached schema (None if not built yet or invalidated).
    schema: RwLock<Option<Arc<Schema>>>,

    /// Build lock to ensure only one build at a time.
    build_lock: Mutex<()>,

    state: RwLock<SchemaState>,

    factory: SchemaFactory,

    config: SchemaConfig,

    /// Last build error message (for diagnostics).
    last_error: RwLock<Option<String>>,
}

impl LazySchema {
    #[must_use]
    pub fn new(factory: SchemaFactory, config: SchemaConfig) -> Self {
        Self {
            schema: RwLock::new(None),
            build_lock: Mutex::new(()),
            state: RwLock::new(SchemaState::Uninitialized),
            factory,
            config,
            last_error: RwLock::new(None),
        }
    }

    /// Creates a holder from a plain closure.
    pub fn from_fn<F>(factory: F, config: SchemaConfig) -> Self
    where
        F: Fn() -> Result<SchemaBuilder, SchemaError> + Send + Sync + 'static,
    {
        Self::new(Arc::new(factory), config)
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub async fn state(&self) -> SchemaState {
        *self.state.read().await
    }

    /// Gets the schema, building it if necessary.
    ///
    /// Concurrent callers get `SchemaInitializing` while a build is in
    /// progress; use [`get_or_build_wait`](Self::get_or_build_wait) to block
    /// instead.
    ///
    /// # Errors
    ///
    /// `SchemaInitializing` if another build is in progress, or the build
    /// error itself.
    pub async fn get_or_build(&self) -> Result<Arc<Schema>, SchemaError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        if self.state().await == SchemaState::Building {
            return Err(SchemaError::SchemaInitializing);
        }

        let Ok(_guard) = self.build_lock.try_lock() else {
            return Err(SchemaError::SchemaInitializing);
        };

        // Double-check after acquiring lock
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        self.build().await
    }

    /// Gets the schema, waiting for an in-progress build instead of failing.
    ///
    /// A previous failure is reported again without rebuilding until the
    /// schema is invalidated.
    pub async fn get_or_build_wait(&self) -> Result<Arc<Schema>, SchemaError> {
        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        let _guard = self.build_lock.lock().await;

        if let Some(schema) = self.get().await {
            return Ok(schema);
        }

        if self.state().await == SchemaState::Failed {
            if let Some(err) = self.last_error.read().await.as_ref() {
                return Err(SchemaError::SchemaBuildFailed(err.clone()));
            }
        }

        self.build().await
    }

    /// Runs one compilation pass. Callers hold the build lock.
    async fn build(&self) -> Result<Arc<Schema>, SchemaError> {
        *self.state.write().await = SchemaState::Building;
        info!("Building GraphQL schema...");

        match self.compile() {
            Ok(schema) => {
                let schema = Arc::new(schema);
                *self.schema.write().await = Some(Arc::clone(&schema));
                *self.state.write().await = SchemaState::Ready;
                *self.last_error.write().await = None;
                info!("GraphQL schema built successfully");
                Ok(schema)
            }
            Err(e) => {
                let error_msg = e.to_string();
                warn!(error = %error_msg, code = e.error_code(), "Failed to build GraphQL schema");
                *self.state.write().await = SchemaState::Failed;
                *self.last_error.write().await = Some(error_msg);
                Err(e)
            }
        }
    }

    // The builder is not Sync, so it never lives across an await point.
    fn compile(&self) -> Result<Schema, SchemaError> {
        let builder = (self.factory)()?;
        builder.compile(&self.config)
    }

    /// Gets the schema if it's already built, without triggering a build.
    pub async fn get(&self) -> Option<Arc<Schema>> {
        self.schema.read().await.clone()
    }

    /// Drops the cached schema; the next access rebuilds it.
    pub async fn invalidate(&self) {
        let _guard = self.build_lock.lock().await;

        *self.schema.write().await = None;
        *self.state.write().await = SchemaState::Uninitialized;
        *self.last_error.write().await = None;

        info!("GraphQL schema invalidated - will rebuild on next request");
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    pub async fn is_ready(&self) -> bool {
        self.state().await == SchemaState::Ready
    }
}

impl fmt::Debug for LazySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySchema")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
