//! # plugql-graphql
//!
//! Plugin-driven GraphQL schema registry.
//!
//! Field, type and mutation plugins are declared as definitions by external
//! providers. The [`SchemaBuilder`] aggregates them, resolves public-name
//! collisions by weight, associates fields with their parent types,
//! resolves type references and instantiates plugins on demand. The result
//! is compiled into an `async_graphql::dynamic::Schema`, which executes
//! queries.
//!
//! ## Example
//!
//! ```ignore
//! let builder = SchemaBuilder::new(fields, mutations, Arc::new(PluginRegistry::with_builtins()))
//!     .with_type_provider(TypeCategory::Object, objects)
//!     .with_type_provider(TypeCategory::Interface, interfaces);
//!
//! let schema = builder.compile(&SchemaConfig::default())?;
//! println!("{}", schema.sdl());
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - Aggregation, conflict resolution, compilation, lazy loading
//! - [`plugins`] - Plugin traits, factory registry and built-in plugins
//! - [`access`] - Request access check
//! - [`config`] - Compilation options
//! - [`error`] - Error types

pub mod access;
pub mod config;
pub mod error;
pub mod plugins;
pub mod schema;

pub use access::{AccessResult, Account, OperationParams, PermissionSet, QueryAccessCheck};
pub use config::SchemaConfig;
pub use error::SchemaError;
pub use plugins::{FieldPlugin, PluginKind, PluginRegistry, TypePlugin};
pub use schema::{ArgumentSpec, Collision, LazySchema, SchemaBuilder, SchemaState};

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
