//! Schema aggregation, compilation and lazy loading.
//!
//! ## Components
//!
//! - [`SchemaBuilder`] - Aggregates plugin definitions and compiles the schema
//! - [`WeightedIndex`] - Weight-based resolution of public-name collisions
//! - [`maps`] - The aggregated type, reference, field and mutation maps
//! - [`LazySchema`] - Thread-safe lazy schema holder with invalidation
//!
//! ## Architecture
//!
//! 1. Providers supply raw definitions
//! 2. The builder reduces them to one winner per public name
//! 3. Plugins are instantiated on demand and memoized per id
//! 4. `compile()` registers every plugin's output with async-graphql
//! 5. `LazySchema` caches the compiled schema until invalidated

mod builder;
pub mod conflict;
mod lazy;
pub mod maps;

pub use builder::{ArgumentSpec, SchemaBuilder};
pub use conflict::{Collision, InsertAction, Namespace, WeightedIndex};
pub use lazy::{LazySchema, SchemaFactory, SchemaState};
pub use maps::{MutationEntry, TypeEntry};
