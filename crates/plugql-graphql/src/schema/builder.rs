//! Plugin-driven schema builder.
//!
//! `SchemaBuilder` aggregates the definitions of its providers into the
//! type, reference, field association and mutation maps, instantiates
//! plugins on demand and composes them into an async-graphql dynamic schema.
//!
//! A builder serves one compilation pass. Maps are computed on first use and
//! plugin instances are memoized per id, so repeated lookups return the same
//! `Arc`. It is not `Sync`; cross-request reuse goes through
//! [`LazySchema`](super::LazySchema).

use std::cell::{OnceCell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{InputValue, Object, Schema, TypeRef};
use indexmap::IndexMap;
use plugql_core::{
    ArgumentDefinition, Decorator, Definition, DefinitionProvider, ROOT_PARENT, TypeCategory,
    TypeSpec,
};
use tracing::{debug, info, trace};

use super::conflict::Collision;
use super::maps::{
    FieldAssociationMap, MutationMap, TypeEntry, TypeMap, TypeReferenceMap, TypeSnapshot,
    build_field_association_map, build_mutation_map, build_type_map, build_type_reference_map,
    resolve_type_name,
};
use crate::config::SchemaConfig;
use crate::error::SchemaError;
use crate::plugins::types::placeholder_field;
use crate::plugins::{FieldPlugin, PluginKind, PluginRegistry, TypePlugin};

/// A processed argument, ready to become an input value.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    pub name: String,
    pub type_ref: TypeRef,
    pub description: Option<String>,
    pub default: Option<serde_json::Value>,
}

impl ArgumentSpec {
    pub fn to_input_value(&self) -> Result<InputValue, SchemaError> {
        let mut input = InputValue::new(&self.name, self.type_ref.clone());
        if let Some(description) = &self.description {
            input = input.description(description);
        }
        if let Some(default) = &self.default {
            let value = Value::from_json(default.clone()).map_err(|e| {
                SchemaError::invalid_definition(&self.name, format!("invalid default value: {e}"))
            })?;
            input = input.default_value(value);
        }
        Ok(input)
    }
}

struct TypeIndex {
    types: TypeMap,
    references: TypeReferenceMap,
    /// Winning plugin id → public name
    ids: HashMap<String, String>,
    collisions: Vec<Collision>,
}

struct FieldIndex {
    associations: FieldAssociationMap,
    definitions: IndexMap<String, Definition>,
    collisions: Vec<Collision>,
}

struct MutationIndex {
    mutations: MutationMap,
    collisions: Vec<Collision>,
}

/// Aggregates plugin definitions and composes them into a schema.
pub struct SchemaBuilder {
    field_provider: Arc<dyn DefinitionProvider>,
    mutation_provider: Arc<dyn DefinitionProvider>,
    type_providers: Vec<(TypeCategory, Arc<dyn DefinitionProvider>)>,
    registry: Arc<PluginRegistry>,

    types: OnceCell<TypeIndex>,
    fields: OnceCell<FieldIndex>,
    mutations: OnceCell<MutationIndex>,

    field_cache: RefCell<HashMap<String, Arc<dyn FieldPlugin>>>,
    type_cache: RefCell<HashMap<String, Arc<dyn TypePlugin>>>,
    mutation_cache: RefCell<HashMap<String, Arc<dyn FieldPlugin>>>,
    building: RefCell<HashSet<(PluginKind, String)>>,
}

impl SchemaBuilder {
    /// Creates a builder without type providers.
    #[must_use]
    pub fn new(
        field_provider: Arc<dyn DefinitionProvider>,
        mutation_provider: Arc<dyn DefinitionProvider>,
        registry: Arc<PluginRegistry>,
    ) -> Self {
        Self {
            field_provider,
            mutation_provider,
            type_providers: Vec::new(),
            registry,
            types: OnceCell::new(),
            fields: OnceCell::new(),
            mutations: OnceCell::new(),
            field_cache: RefCell::new(HashMap::new()),
            type_cache: RefCell::new(HashMap::new()),
            mutation_cache: RefCell::new(HashMap::new()),
            building: RefCell::new(HashSet::new()),
        }
    }

    /// Registers a type provider for one category.
    ///
    /// Providers are visited in registration order, which decides weight
    /// ties. Adding a provider discards maps and instances built so far.
    pub fn add_type_provider(&mut self, category: TypeCategory, provider: Arc<dyn DefinitionProvider>) {
        debug!(category = %category, provider = %provider.provider_id(), "Adding type provider");
        self.type_providers.push((category, provider));
        self.reset();
    }

    /// Registers a type provider, deriving its category from the last `.`
    /// segment of a service id such as `plugin.manager.graphql.interface`.
    pub fn add_type_provider_for_service(
        &mut self,
        service_id: &str,
        provider: Arc<dyn DefinitionProvider>,
    ) -> Result<(), SchemaError> {
        let category = TypeCategory::from_service_id(service_id)?;
        self.add_type_provider(category, provider);
        Ok(())
    }

    pub fn with_type_provider(
        mut self,
        category: TypeCategory,
        provider: Arc<dyn DefinitionProvider>,
    ) -> Self {
        self.add_type_provider(category, provider);
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    fn reset(&mut self) {
        self.types = OnceCell::new();
        self.fields = OnceCell::new();
        self.mutations = OnceCell::new();
        self.field_cache.get_mut().clear();
        self.type_cache.get_mut().clear();
        self.mutation_cache.get_mut().clear();
    }

    // ------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------

    /// Reads every type provider once, in registration order.
    pub fn collect_types(&self) -> Result<Vec<TypeSnapshot>, SchemaError> {
        self.type_providers
            .iter()
            .enumerate()
            .map(|(position, (category, provider))| -> Result<TypeSnapshot, SchemaError> {
                let definitions = validated(provider.as_ref())?;
                trace!(
                    provider = %provider.provider_id(),
                    category = %category,
                    count = definitions.len(),
                    "Collected type definitions"
                );
                Ok(TypeSnapshot {
                    category: *category,
                    provider: position,
                    definitions,
                })
            })
            .collect()
    }

    pub fn collect_fields(&self) -> Result<IndexMap<String, Definition>, SchemaError> {
        validated(self.field_provider.as_ref())
    }

    pub fn collect_mutations(&self) -> Result<IndexMap<String, Definition>, SchemaError> {
        validated(self.mutation_provider.as_ref())
    }

    // ------------------------------------------------------------------
    // Aggregated maps
    // ------------------------------------------------------------------

    fn type_index(&self) -> Result<&TypeIndex, SchemaError> {
        if let Some(index) = self.types.get() {
            return Ok(index);
        }

        let (types, mut collisions) = build_type_map(self.collect_types()?);
        let (references, reference_collisions) = build_type_reference_map(&types);
        collisions.extend(reference_collisions);
        let ids = types
            .values()
            .map(|entry| (entry.id.clone(), entry.name.clone()))
            .collect();

        Ok(self.types.get_or_init(|| TypeIndex {
            types,
            references,
            ids,
            collisions,
        }))
    }

    fn field_index(&self) -> Result<&FieldIndex, SchemaError> {
        if let Some(index) = self.fields.get() {
            return Ok(index);
        }

        let definitions = self.collect_fields()?;
        let (associations, collisions) =
            build_field_association_map(&definitions, &self.type_index()?.types);

        Ok(self.fields.get_or_init(|| FieldIndex {
            associations,
            definitions,
            collisions,
        }))
    }

    fn mutation_index(&self) -> Result<&MutationIndex, SchemaError> {
        if let Some(index) = self.mutations.get() {
            return Ok(index);
        }

        let (mutations, collisions) = build_mutation_map(self.collect_mutations()?);
        Ok(self.mutations.get_or_init(|| MutationIndex {
            mutations,
            collisions,
        }))
    }

    pub fn type_map(&self) -> Result<&TypeMap, SchemaError> {
        Ok(&self.type_index()?.types)
    }

    pub fn type_references(&self) -> Result<&TypeReferenceMap, SchemaError> {
        Ok(&self.type_index()?.references)
    }

    pub fn field_associations(&self) -> Result<&FieldAssociationMap, SchemaError> {
        Ok(&self.field_index()?.associations)
    }

    pub fn mutation_map(&self) -> Result<&MutationMap, SchemaError> {
        Ok(&self.mutation_index()?.mutations)
    }

    /// Every name collision resolved while building the maps.
    pub fn collisions(&self) -> Result<Vec<Collision>, SchemaError> {
        let mut collisions = self.type_index()?.collisions.clone();
        collisions.extend(self.field_index()?.collisions.iter().cloned());
        collisions.extend(self.mutation_index()?.collisions.iter().cloned());
        Ok(collisions)
    }

    pub fn type_entry(&self, name: &str) -> Result<Option<&TypeEntry>, SchemaError> {
        Ok(self.type_map()?.get(name))
    }

    /// Public type names in aggregation order.
    pub fn type_names(&self) -> Result<Vec<&str>, SchemaError> {
        Ok(self.type_map()?.keys().map(String::as_str).collect())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn has_fields(&self, parent: &str) -> Result<bool, SchemaError> {
        Ok(self
            .field_associations()?
            .get(parent)
            .is_some_and(|fields| !fields.is_empty()))
    }

    pub fn has_mutations(&self) -> Result<bool, SchemaError> {
        Ok(!self.mutation_map()?.is_empty())
    }

    /// Whether a type is registered under exactly this public name.
    pub fn has_type(&self, name: &str) -> Result<bool, SchemaError> {
        Ok(self.type_map()?.contains_key(name))
    }

    /// Whether a name resolves to a type, directly or through references.
    pub fn resolves_type(&self, name: &str) -> Result<bool, SchemaError> {
        match self.resolve_type_name(name) {
            Ok(_) => Ok(true),
            Err(SchemaError::MissingType(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Resolves a possibly abstract or qualified name to its concrete entry.
    pub fn resolve_type_name(&self, name: &str) -> Result<&TypeEntry, SchemaError> {
        let index = self.type_index()?;
        resolve_type_name(name, &index.types, &index.references)
    }

    /// Built field plugins of a parent type, keyed by public field name.
    pub fn get_fields(
        &self,
        parent: &str,
    ) -> Result<IndexMap<String, Arc<dyn FieldPlugin>>, SchemaError> {
        let Some(fields) = self.field_associations()?.get(parent) else {
            return Ok(IndexMap::new());
        };

        fields
            .iter()
            .map(|(name, id)| -> Result<_, SchemaError> {
                Ok((name.clone(), self.build_field(id)?))
            })
            .collect()
    }

    /// Built mutation plugins keyed by public name.
    pub fn get_mutations(&self) -> Result<IndexMap<String, Arc<dyn FieldPlugin>>, SchemaError> {
        self.mutation_map()?
            .iter()
            .map(|(name, entry)| -> Result<_, SchemaError> {
                Ok((name.clone(), self.build_mutation(&entry.id)?))
            })
            .collect()
    }

    /// Built type plugins keyed by public name.
    pub fn get_types(&self) -> Result<IndexMap<String, Arc<dyn TypePlugin>>, SchemaError> {
        self.type_map()?
            .iter()
            .map(|(name, entry)| -> Result<_, SchemaError> {
                Ok((name.clone(), self.build_type(&entry.id)?))
            })
            .collect()
    }

    /// Built type plugin for a name, resolved through references.
    pub fn get_type(&self, name: &str) -> Result<Arc<dyn TypePlugin>, SchemaError> {
        let id = self.resolve_type_name(name)?.id.clone();
        self.build_type(&id)
    }

    // ------------------------------------------------------------------
    // Instantiation
    // ------------------------------------------------------------------

    pub fn build_field(&self, id: &str) -> Result<Arc<dyn FieldPlugin>, SchemaError> {
        if let Some(plugin) = self.field_cache.borrow().get(id) {
            return Ok(Arc::clone(plugin));
        }

        let definition = self
            .field_index()?
            .definitions
            .get(id)
            .ok_or_else(|| missing_definition(PluginKind::Field, id))?;
        let factory = self
            .registry
            .field_factory(&definition.class)
            .ok_or_else(|| missing_factory(PluginKind::Field, definition, id))?;

        let plugin = self.guarded(PluginKind::Field, id, || {
            factory(self, self.field_provider.as_ref(), definition, id)
        })?;
        self.field_cache
            .borrow_mut()
            .insert(id.to_string(), Arc::clone(&plugin));
        Ok(plugin)
    }

    pub fn build_type(&self, id: &str) -> Result<Arc<dyn TypePlugin>, SchemaError> {
        if let Some(plugin) = self.type_cache.borrow().get(id) {
            return Ok(Arc::clone(plugin));
        }

        let index = self.type_index()?;
        let entry = index
            .ids
            .get(id)
            .and_then(|name| index.types.get(name))
            .ok_or_else(|| missing_definition(PluginKind::Type, id))?;
        let factory = self
            .registry
            .type_factory(&entry.class)
            .ok_or_else(|| missing_factory(PluginKind::Type, &entry.definition, id))?;
        let provider = self.type_providers[entry.provider].1.as_ref();

        let plugin = self.guarded(PluginKind::Type, id, || {
            factory(self, provider, &entry.definition, id)
        })?;
        self.type_cache
            .borrow_mut()
            .insert(id.to_string(), Arc::clone(&plugin));
        Ok(plugin)
    }

    pub fn build_mutation(&self, id: &str) -> Result<Arc<dyn FieldPlugin>, SchemaError> {
        if let Some(plugin) = self.mutation_cache.borrow().get(id) {
            return Ok(Arc::clone(plugin));
        }

        let entry = self
            .mutation_map()?
            .values()
            .find(|entry| entry.id == id)
            .ok_or_else(|| missing_definition(PluginKind::Mutation, id))?;
        let factory = self
            .registry
            .mutation_factory(&entry.class)
            .ok_or_else(|| missing_factory(PluginKind::Mutation, &entry.definition, id))?;

        let plugin = self.guarded(PluginKind::Mutation, id, || {
            factory(self, self.mutation_provider.as_ref(), &entry.definition, id)
        })?;
        self.mutation_cache
            .borrow_mut()
            .insert(id.to_string(), Arc::clone(&plugin));
        Ok(plugin)
    }

    /// Runs a factory, failing if the same plugin is already being built.
    fn guarded<T>(
        &self,
        kind: PluginKind,
        id: &str,
        build: impl FnOnce() -> Result<T, SchemaError>,
    ) -> Result<T, SchemaError> {
        let key = (kind, id.to_string());
        if !self.building.borrow_mut().insert(key.clone()) {
            return Err(SchemaError::CyclicDefinition {
                kind,
                id: id.to_string(),
            });
        }

        trace!(kind = %kind, id, "Building plugin");
        let result = build();
        self.building.borrow_mut().remove(&key);
        result
    }

    // ------------------------------------------------------------------
    // Type decoration
    // ------------------------------------------------------------------

    /// Resolves a type spec to an engine type reference.
    ///
    /// The base name is resolved to its concrete type, which gets built,
    /// then each decorator wraps the result in order.
    pub fn process_type(&self, spec: &TypeSpec) -> Result<TypeRef, SchemaError> {
        let base = self.get_type(spec.name.as_str())?;
        let named = TypeRef::named(base.name());

        Ok(spec
            .decorators
            .iter()
            .fold(named, |inner, decorator| match decorator {
                Decorator::NonNull => TypeRef::NonNull(Box::new(inner)),
                Decorator::List => TypeRef::List(Box::new(inner)),
            }))
    }

    /// Resolves the type of each argument, keeping everything else as declared.
    pub fn process_arguments(
        &self,
        arguments: &IndexMap<String, ArgumentDefinition>,
    ) -> Result<Vec<ArgumentSpec>, SchemaError> {
        arguments
            .iter()
            .map(|(name, argument)| -> Result<ArgumentSpec, SchemaError> {
                Ok(ArgumentSpec {
                    name: name.clone(),
                    type_ref: self.process_type(&argument.type_spec)?,
                    description: argument.description.clone(),
                    default: argument.default.clone(),
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Compilation
    // ------------------------------------------------------------------

    /// Composes every plugin into an executable schema.
    ///
    /// # Errors
    ///
    /// Any aggregation or plugin error, or `SchemaBuildFailed` when the
    /// engine rejects the composed schema.
    pub fn compile(&self, config: &SchemaConfig) -> Result<Schema, SchemaError> {
        debug!("Starting GraphQL schema build");

        let has_mutations = self.has_mutations()?;
        let mut schema = Schema::build(
            &config.query_type,
            has_mutations.then_some(config.mutation_type.as_str()),
            None,
        );

        let mut registered = 0usize;
        for plugin in self.get_types()?.values() {
            if let Some(ty) = plugin.to_type(self)? {
                schema = schema.register(ty);
                registered += 1;
            }
        }

        let mut query = Object::new(&config.query_type);
        let root_fields = self.get_fields(ROOT_PARENT)?;
        if root_fields.is_empty() {
            trace!("No root fields found, adding placeholder field");
            query = query.field(placeholder_field());
        }
        for (name, field) in &root_fields {
            query = query.field(field.to_field(self, name)?);
        }
        schema = schema.register(query);

        if has_mutations {
            let mut mutation = Object::new(&config.mutation_type);
            for (name, field) in &self.get_mutations()? {
                mutation = mutation.field(field.to_field(self, name)?);
            }
            schema = schema.register(mutation);
        }

        let mut schema = schema
            .limit_depth(config.max_depth)
            .limit_complexity(config.max_complexity);
        if !config.introspection {
            schema = schema.disable_introspection();
        }

        let schema = schema
            .finish()
            .map_err(|e| SchemaError::SchemaBuildFailed(e.to_string()))?;

        info!(
            types = registered,
            root_fields = root_fields.len(),
            mutations = has_mutations,
            "GraphQL schema build complete"
        );
        Ok(schema)
    }
}

impl fmt::Debug for SchemaBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_providers: Vec<String> = self
            .type_providers
            .iter()
            .map(|(category, provider)| format!("{category}:{}", provider.provider_id()))
            .collect();

        f.debug_struct("SchemaBuilder")
            .field("field_provider", &self.field_provider.provider_id())
            .field("mutation_provider", &self.mutation_provider.provider_id())
            .field("type_providers", &type_providers)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Reads a provider's definitions, rejecting malformed ones whatever their source.
fn validated(provider: &dyn DefinitionProvider) -> Result<IndexMap<String, Definition>, SchemaError> {
    let definitions = provider.definitions()?;
    for (id, definition) in &definitions {
        definition.validate(id)?;
    }
    Ok(definitions)
}

fn missing_definition(kind: PluginKind, id: &str) -> SchemaError {
    SchemaError::MissingDefinition {
        kind,
        id: id.to_string(),
    }
}

fn missing_factory(kind: PluginKind, definition: &Definition, id: &str) -> SchemaError {
    SchemaError::MissingFactory {
        kind,
        class: definition.class.clone(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugql_core::{ParentRef, StaticProvider};

    fn builder() -> SchemaBuilder {
        let fields = StaticProvider::new("fields")
            .with_definition(
                "hello",
                Definition::new("hello", "property").with_type(TypeSpec::named("String")),
            )
            .with_definition(
                "title",
                Definition::new("title", "property")
                    .with_parent(ParentRef::new("Node"))
                    .with_type("String!".parse().unwrap()),
            );
        let scalars = StaticProvider::new("scalars")
            .with_definition("string", Definition::new("String", "builtin_scalar"));
        let interfaces =
            StaticProvider::new("interfaces").with_definition("node", Definition::new("Node", "interface"));
        let objects = StaticProvider::new("objects").with_definition(
            "page",
            Definition::new("Page", "object")
                .with_reference("Node")
                .with_interface("Node"),
        );

        SchemaBuilder::new(
            Arc::new(fields),
            Arc::new(StaticProvider::new("mutations")),
            Arc::new(PluginRegistry::with_builtins()),
        )
        .with_type_provider(TypeCategory::Scalar, Arc::new(scalars))
        .with_type_provider(TypeCategory::Interface, Arc::new(interfaces))
        .with_type_provider(TypeCategory::Object, Arc::new(objects))
    }

    #[test]
    fn test_process_type_applies_decorators_in_order() {
        let builder = builder();
        let spec: TypeSpec = "[Node:page!]!".parse().unwrap();

        let type_ref = builder.process_type(&spec).unwrap();
        assert_eq!(type_ref.to_string(), "[Page!]!");
    }

    #[test]
    fn test_process_arguments_keeps_declared_data() {
        let builder = builder();
        let arguments: IndexMap<String, ArgumentDefinition> = [(
            "mode".to_string(),
            ArgumentDefinition::new(TypeSpec::named("String"))
                .with_description("View mode")
                .with_default(serde_json::json!("full")),
        )]
        .into_iter()
        .collect();

        let processed = builder.process_arguments(&arguments).unwrap();
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].name, "mode");
        assert_eq!(processed[0].type_ref, TypeRef::named("String"));
        assert_eq!(processed[0].description.as_deref(), Some("View mode"));
        assert_eq!(processed[0].default, Some(serde_json::json!("full")));
        assert!(processed[0].to_input_value().is_ok());
    }

    #[test]
    fn test_has_queries() {
        let builder = builder();
        assert!(builder.has_fields(ROOT_PARENT).unwrap());
        assert!(builder.has_fields("Node").unwrap());
        assert!(!builder.has_fields("Page").unwrap());
        assert!(!builder.has_mutations().unwrap());
        assert!(builder.has_type("Node").unwrap());
        assert!(builder.has_type("Page").unwrap());
        assert!(!builder.has_type("Node:article").unwrap());
        assert!(!builder.has_type("Missing").unwrap());
    }

    #[test]
    fn test_has_type_is_a_direct_lookup() {
        let objects = StaticProvider::new("objects")
            .with_definition("page", Definition::new("Page", "object").with_reference("Node"));
        let builder = SchemaBuilder::new(
            Arc::new(StaticProvider::new("fields")),
            Arc::new(StaticProvider::new("mutations")),
            Arc::new(PluginRegistry::with_builtins()),
        )
        .with_type_provider(TypeCategory::Object, Arc::new(objects));

        assert!(!builder.has_type("Node").unwrap());
        assert!(!builder.has_type("Node:page").unwrap());
        assert!(builder.resolves_type("Node").unwrap());
        assert!(builder.resolves_type("Node:page").unwrap());
        assert!(!builder.resolves_type("Missing").unwrap());
    }

    #[test]
    fn test_adding_provider_resets_maps() {
        let mut builder = builder();
        assert!(!builder.has_type("Email").unwrap());

        builder.add_type_provider(
            TypeCategory::Scalar,
            Arc::new(StaticProvider::new("scalars").with_definition(
                "email",
                Definition::new("Email", "scalar"),
            )),
        );
        assert!(builder.has_type("Email").unwrap());
    }

    #[test]
    fn test_service_id_category() {
        let mut builder = builder();
        let result = builder.add_type_provider_for_service(
            "plugin.manager.graphql.widget",
            Arc::new(StaticProvider::new("widgets")),
        );
        assert!(result.is_err());

        builder
            .add_type_provider_for_service(
                "plugin.manager.graphql.enum",
                Arc::new(StaticProvider::new("enums").with_definition(
                    "status",
                    Definition::new("Status", "enum").with_value("DRAFT"),
                )),
            )
            .unwrap();
        assert_eq!(
            builder.type_entry("Status").unwrap().map(|e| e.category),
            Some(TypeCategory::Enum)
        );
    }
}
