//! Type names, parent references and type specs.
//!
//! Plugin definitions refer to types and parents by name. Two kinds of
//! qualification are supported:
//!
//! - a parent reference may carry an alias (`Node:title` attaches the field
//!   to `Node` under the name `title`);
//! - a type name may carry discriminator segments (`entity:node:page`) that
//!   are stripped one at a time during reference resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Separator between a name and its qualifier.
pub const QUALIFIER_SEPARATOR: char = ':';

/// Synthetic parent name for fields without declared parents.
pub const ROOT_PARENT: &str = "Root";

/// A public type name, optionally qualified with discriminator segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the name carries at least one discriminator.
    pub fn is_qualified(&self) -> bool {
        self.0.contains(QUALIFIER_SEPARATOR)
    }

    /// The last discriminator segment, if any.
    pub fn discriminator(&self) -> Option<&str> {
        self.0
            .rsplit_once(QUALIFIER_SEPARATOR)
            .map(|(_, discriminator)| discriminator)
    }

    /// The name with its last discriminator removed.
    ///
    /// Returns `None` for unqualified names and for names whose remainder
    /// would be empty.
    pub fn truncate(&self) -> Option<TypeName> {
        truncate_str(&self.0).map(TypeName::new)
    }

    /// Iterates the name followed by each successive truncation.
    ///
    /// `entity:node:page` yields `entity:node:page`, `entity:node`, `entity`.
    pub fn lineage(&self) -> impl Iterator<Item = &str> {
        std::iter::successors(Some(self.0.as_str()), |name| truncate_str(*name))
    }
}

fn truncate_str(name: &str) -> Option<&str> {
    name.rsplit_once(QUALIFIER_SEPARATOR)
        .map(|(base, _)| base)
        .filter(|base| !base.is_empty())
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A parent type a field attaches to, with an optional per-parent field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParentRef {
    pub parent: String,
    pub alias: Option<String>,
}

impl ParentRef {
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The synthetic root parent.
    pub fn root() -> Self {
        Self::new(ROOT_PARENT)
    }

    /// Field name to use under this parent.
    pub fn field_name<'a>(&'a self, declared: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(declared)
    }
}

impl FromStr for ParentRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only the first two segments count: "Node:title:x" aliases to "title".
        let mut segments = s.split(QUALIFIER_SEPARATOR);
        let parent = segments.next().unwrap_or_default();
        let alias = segments.next().filter(|a| !a.is_empty());

        if parent.is_empty() {
            return Err(CoreError::malformed(s, "parent reference without a parent name"));
        }

        Ok(Self {
            parent: parent.to_string(),
            alias: alias.map(str::to_string),
        })
    }
}

impl TryFrom<String> for ParentRef {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParentRef> for String {
    fn from(value: ParentRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{}{QUALIFIER_SEPARATOR}{alias}", self.parent),
            None => f.write_str(&self.parent),
        }
    }
}

/// A wrapper applied to a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decorator {
    NonNull,
    List,
}

/// A type reference: base name plus decorators applied left to right.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TypeSpecRepr", into = "String")]
pub struct TypeSpec {
    pub name: TypeName,
    pub decorators: Vec<Decorator>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeSpecRepr {
    Shorthand(String),
    Structured {
        name: TypeName,
        #[serde(default)]
        decorators: Vec<Decorator>,
    },
}

impl TryFrom<TypeSpecRepr> for TypeSpec {
    type Error = CoreError;

    fn try_from(value: TypeSpecRepr) -> Result<Self, Self::Error> {
        match value {
            TypeSpecRepr::Shorthand(s) => s.parse(),
            TypeSpecRepr::Structured { name, decorators } => {
                if name.as_str().is_empty() {
                    return Err(CoreError::invalid_type_spec("", "empty type name"));
                }
                Ok(Self { name, decorators })
            }
        }
    }
}

impl TypeSpec {
    pub fn named(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            decorators: Vec::new(),
        }
    }

    pub fn decorate(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }

    pub fn non_null(self) -> Self {
        self.decorate(Decorator::NonNull)
    }

    pub fn list(self) -> Self {
        self.decorate(Decorator::List)
    }
}

impl FromStr for TypeSpec {
    type Err = CoreError;

    /// Parses GraphQL type notation, e.g. `[Node:page!]!`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type_spec(s.trim(), s)
    }
}

fn parse_type_spec(input: &str, original: &str) -> Result<TypeSpec, CoreError> {
    if let Some(inner) = input.strip_suffix('!') {
        if inner.ends_with('!') {
            return Err(CoreError::invalid_type_spec(original, "repeated non-null marker"));
        }
        return Ok(parse_type_spec(inner, original)?.non_null());
    }

    if let Some(rest) = input.strip_prefix('[') {
        let inner = rest
            .strip_suffix(']')
            .ok_or_else(|| CoreError::invalid_type_spec(original, "unbalanced brackets"))?;
        return Ok(parse_type_spec(inner.trim(), original)?.list());
    }

    if input.is_empty() {
        return Err(CoreError::invalid_type_spec(original, "empty type name"));
    }
    if input
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '[' | ']' | '!'))
    {
        return Err(CoreError::invalid_type_spec(original, "unexpected character in type name"));
    }

    Ok(TypeSpec::named(input))
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .decorators
            .iter()
            .fold(self.name.to_string(), |inner, decorator| match decorator {
                Decorator::NonNull => format!("{inner}!"),
                Decorator::List => format!("[{inner}]"),
            });
        f.write_str(&rendered)
    }
}

impl From<TypeSpec> for String {
    fn from(value: TypeSpec) -> Self {
        value.to_string()
    }
}

/// Classification of a type plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    #[serde(alias = "type")]
    Object,
    Interface,
    Scalar,
    Enum,
    Union,
    Input,
}

impl TypeCategory {
    pub const ALL: [TypeCategory; 6] = [
        TypeCategory::Object,
        TypeCategory::Interface,
        TypeCategory::Scalar,
        TypeCategory::Enum,
        TypeCategory::Union,
        TypeCategory::Input,
    ];

    /// Categories that can have fields attached.
    pub fn is_fieldable(self) -> bool {
        matches!(self, TypeCategory::Object | TypeCategory::Interface)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeCategory::Object => "object",
            TypeCategory::Interface => "interface",
            TypeCategory::Scalar => "scalar",
            TypeCategory::Enum => "enum",
            TypeCategory::Union => "union",
            TypeCategory::Input => "input",
        }
    }

    /// Derives the category from a provider service id such as
    /// `plugin.manager.graphql.interface` (last `.` segment).
    pub fn from_service_id(service_id: &str) -> Result<Self, CoreError> {
        service_id
            .rsplit('.')
            .next()
            .unwrap_or(service_id)
            .parse()
    }
}

impl FromStr for TypeCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // `type` is the historical tag for object types
            "object" | "type" => Ok(TypeCategory::Object),
            "interface" => Ok(TypeCategory::Interface),
            "scalar" => Ok(TypeCategory::Scalar),
            "enum" => Ok(TypeCategory::Enum),
            "union" => Ok(TypeCategory::Union),
            "input" => Ok(TypeCategory::Input),
            other => Err(CoreError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
