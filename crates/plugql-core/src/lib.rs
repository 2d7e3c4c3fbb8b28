pub mod definition;
pub mod error;
pub mod manifest;
pub mod names;
pub mod provider;

pub use definition::{ArgumentDefinition, Definition};
pub use error::{CoreError, ErrorCategory, Result};
pub use manifest::Manifest;
pub use names::{
    Decorator, ParentRef, QUALIFIER_SEPARATOR, ROOT_PARENT, TypeCategory, TypeName, TypeSpec,
};
pub use provider::{CompositeProvider, DefinitionProvider, StaticProvider};
