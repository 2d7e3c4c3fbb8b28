//! Aggregated plugin maps.
//!
//! Pure functions turning raw provider snapshots into the maps the schema
//! builder serves from. Given the same inputs they always produce the same
//! maps, including the same key order.

use indexmap::IndexMap;
use plugql_core::{Definition, ROOT_PARENT, TypeCategory, TypeName};
use tracing::{debug, trace};

use super::conflict::{Collision, Namespace, WeightedIndex};
use crate::error::SchemaError;

/// Definitions read from one type provider.
#[derive(Debug, Clone)]
pub struct TypeSnapshot {
    pub category: TypeCategory,
    /// Position of the provider in registration order.
    pub provider: usize,
    pub definitions: IndexMap<String, Definition>,
}

/// The winning definition for one public type name.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    pub name: String,
    pub category: TypeCategory,
    pub id: String,
    pub class: String,
    pub weight: i64,
    /// Abstract type this entry implements, if any.
    pub reference: Option<TypeName>,
    pub definition: Definition,
    pub provider: usize,
}

/// Public type name → winning entry.
pub type TypeMap = IndexMap<String, TypeEntry>;

/// Abstract type name → concrete public type name.
pub type TypeReferenceMap = IndexMap<String, String>;

/// Parent type name → field name → field plugin id.
pub type FieldAssociationMap = IndexMap<String, IndexMap<String, String>>;

/// Winning mutation for one public name.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationEntry {
    pub id: String,
    pub class: String,
    pub weight: i64,
    pub definition: Definition,
}

/// Public mutation name → winning entry.
pub type MutationMap = IndexMap<String, MutationEntry>;

/// Reduces all type definitions to one entry per public name.
pub fn build_type_map(snapshots: Vec<TypeSnapshot>) -> (TypeMap, Vec<Collision>) {
    let mut index = WeightedIndex::new(Namespace::Types);

    for snapshot in snapshots {
        for (id, definition) in snapshot.definitions {
            let entry = TypeEntry {
                name: definition.name.clone(),
                category: snapshot.category,
                class: definition.class.clone(),
                weight: definition.weight,
                reference: definition.reference.clone(),
                id: id.clone(),
                provider: snapshot.provider,
                definition,
            };
            trace!(name = %entry.name, id = %id, category = %entry.category, "Offering type");
            index.offer(&entry.name.clone(), &id, entry.weight, entry);
        }
    }

    let (entries, collisions) = index.into_parts();
    let map: TypeMap = entries
        .into_iter()
        .map(|(name, winner)| (name, winner.value))
        .collect();

    debug!(types = map.len(), collisions = collisions.len(), "Built type map");
    (map, collisions)
}

/// Maps each abstract type name to its heaviest concrete implementer.
pub fn build_type_reference_map(types: &TypeMap) -> (TypeReferenceMap, Vec<Collision>) {
    let mut index = WeightedIndex::new(Namespace::References);

    for (name, entry) in types {
        if let Some(reference) = &entry.reference {
            index.offer(reference.as_str(), &entry.id, entry.weight, name.clone());
        }
    }

    let (entries, collisions) = index.into_parts();
    let map: TypeReferenceMap = entries
        .into_iter()
        .map(|(reference, winner)| (reference, winner.value))
        .collect();

    debug!(references = map.len(), "Built type reference map");
    (map, collisions)
}

/// Associates field plugins with their parent types.
///
/// Parents that are not registered as object or interface types are dropped,
/// except the synthetic root.
pub fn build_field_association_map(
    fields: &IndexMap<String, Definition>,
    types: &TypeMap,
) -> (FieldAssociationMap, Vec<Collision>) {
    let mut parents: IndexMap<String, WeightedIndex<()>> = IndexMap::new();

    for (id, definition) in fields {
        for parent in definition.effective_parents() {
            let name = parent.field_name(&definition.name);
            parents
                .entry(parent.parent.clone())
                .or_insert_with(|| {
                    WeightedIndex::new(Namespace::Fields {
                        parent: parent.parent.clone(),
                    })
                })
                .offer(name, id, definition.weight, ());
        }
    }

    let mut collisions = Vec::new();
    let mut map = FieldAssociationMap::new();

    for (parent, index) in parents {
        let (entries, parent_collisions) = index.into_parts();
        collisions.extend(parent_collisions);

        if !is_fieldable_parent(&parent, types) {
            trace!(parent = %parent, fields = entries.len(), "Dropping fields of non-fieldable parent");
            continue;
        }

        map.insert(
            parent,
            entries
                .into_iter()
                .map(|(name, winner)| (name, winner.id))
                .collect(),
        );
    }

    debug!(parents = map.len(), "Built field association map");
    (map, collisions)
}

fn is_fieldable_parent(parent: &str, types: &TypeMap) -> bool {
    parent == ROOT_PARENT
        || types
            .get(parent)
            .is_some_and(|entry| entry.category.is_fieldable())
}

/// Reduces mutation definitions to one entry per public name.
pub fn build_mutation_map(mutations: IndexMap<String, Definition>) -> (MutationMap, Vec<Collision>) {
    let mut index = WeightedIndex::new(Namespace::Mutations);

    for (id, definition) in mutations {
        let name = definition.name.clone();
        let entry = MutationEntry {
            id: id.clone(),
            class: definition.class.clone(),
            weight: definition.weight,
            definition,
        };
        index.offer(&name, &id, entry.weight, entry);
    }

    let (entries, collisions) = index.into_parts();
    let map: MutationMap = entries
        .into_iter()
        .map(|(name, winner)| (name, winner.value))
        .collect();

    debug!(mutations = map.len(), "Built mutation map");
    (map, collisions)
}

/// Resolves a type name to its concrete entry.
///
/// A direct hit in the type map wins. Otherwise the reference map is
/// consulted for the name and then for each truncation of it
/// (`Node:page` → `Node`).
pub fn resolve_type_name<'a>(
    name: &str,
    types: &'a TypeMap,
    references: &TypeReferenceMap,
) -> Result<&'a TypeEntry, SchemaError> {
    if let Some(entry) = types.get(name) {
        return Ok(entry);
    }

    let qualified = TypeName::new(name);
    for candidate in qualified.lineage() {
        if let Some(concrete) = references.get(candidate) {
            trace!(requested = name, via = candidate, concrete = %concrete, "Resolved type reference");
            return types
                .get(concrete)
                .ok_or_else(|| SchemaError::MissingType(concrete.clone()));
        }
    }

    Err(SchemaError::MissingType(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugql_core::ParentRef;

    use crate::schema::conflict::InsertAction;

    fn snapshot(category: TypeCategory, provider: usize, defs: &[(&str, Definition)]) -> TypeSnapshot {
        TypeSnapshot {
            category,
            provider,
            definitions: defs
                .iter()
                .map(|(id, def)| (id.to_string(), def.clone()))
                .collect(),
        }
    }

    fn sample_types() -> TypeMap {
        let (types, _) = build_type_map(vec![
            snapshot(
                TypeCategory::Interface,
                0,
                &[("node", Definition::new("Node", "interface"))],
            ),
            snapshot(
                TypeCategory::Object,
                1,
                &[
                    ("page", Definition::new("Page", "object").with_reference("Node").with_weight(1)),
                    ("article", Definition::new("Article", "object").with_reference("Node").with_weight(2)),
                ],
            ),
            snapshot(
                TypeCategory::Scalar,
                2,
                &[("email", Definition::new("Email", "scalar").with_reference("email"))],
            ),
        ]);
        types
    }

    #[test]
    fn test_type_map_heaviest_wins() {
        let (types, collisions) = build_type_map(vec![
            snapshot(
                TypeCategory::Object,
                0,
                &[("a", Definition::new("Node", "object").with_weight(1))],
            ),
            snapshot(
                TypeCategory::Interface,
                1,
                &[("b", Definition::new("Node", "interface").with_weight(2))],
            ),
        ]);

        let node = &types["Node"];
        assert_eq!(node.id, "b");
        assert_eq!(node.category, TypeCategory::Interface);
        assert_eq!(node.provider, 1);
        assert_eq!(collisions.len(), 1);
    }

    #[test]
    fn test_type_map_tie_keeps_first_provider() {
        let (types, _) = build_type_map(vec![
            snapshot(TypeCategory::Object, 0, &[("first", Definition::new("Node", "object"))]),
            snapshot(TypeCategory::Object, 1, &[("second", Definition::new("Node", "object"))]),
        ]);
        assert_eq!(types["Node"].id, "first");
    }

    #[test]
    fn test_reference_map_picks_heaviest_implementer() {
        let types = sample_types();
        let (references, collisions) = build_type_reference_map(&types);

        assert_eq!(references["Node"], "Article");
        assert_eq!(references["email"], "Email");
        assert_eq!(collisions.len(), 1);
    }

    #[test]
    fn test_reference_map_tie_keeps_first_implementer() {
        let (types, _) = build_type_map(vec![
            snapshot(
                TypeCategory::Object,
                0,
                &[("page", Definition::new("Page", "object").with_reference("Node").with_weight(1))],
            ),
            snapshot(
                TypeCategory::Object,
                1,
                &[("article", Definition::new("Article", "object").with_reference("Node").with_weight(1))],
            ),
        ]);
        let (references, collisions) = build_type_reference_map(&types);

        assert_eq!(references["Node"], "Page");
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].winner_id, "page");
        assert_eq!(collisions[0].action, InsertAction::KeptExisting);
        assert_eq!(resolve_type_name("Node:article", &types, &references).unwrap().name, "Page");
    }

    #[test]
    fn test_resolve_direct_and_referenced() {
        let types = sample_types();
        let (references, _) = build_type_reference_map(&types);

        assert_eq!(resolve_type_name("Page", &types, &references).unwrap().name, "Page");
        assert_eq!(resolve_type_name("Node", &types, &references).unwrap().name, "Node");
        assert_eq!(resolve_type_name("email", &types, &references).unwrap().name, "Email");
    }

    #[test]
    fn test_resolve_strips_discriminators() {
        let types = sample_types();
        let (references, _) = build_type_reference_map(&types);

        let entry = resolve_type_name("Node:page", &types, &references).unwrap();
        assert_eq!(entry.name, "Article");

        let entry = resolve_type_name("email:work:primary", &types, &references).unwrap();
        assert_eq!(entry.name, "Email");
    }

    #[test]
    fn test_resolve_missing_type() {
        let types = sample_types();
        let (references, _) = build_type_reference_map(&types);

        let err = resolve_type_name("UnknownType:variant", &types, &references).unwrap_err();
        assert!(matches!(err, SchemaError::MissingType(ref name) if name == "UnknownType:variant"));
    }

    #[test]
    fn test_field_associations_with_aliases() {
        let types = sample_types();
        let fields: IndexMap<String, Definition> = [
            ("hello".to_string(), Definition::new("hello", "property")),
            (
                "label".to_string(),
                Definition::new("label", "property")
                    .with_parent(ParentRef::new("Node").with_alias("title"))
                    .with_parent(ParentRef::new("Page")),
            ),
        ]
        .into_iter()
        .collect();

        let (associations, _) = build_field_association_map(&fields, &types);

        assert_eq!(associations[ROOT_PARENT]["hello"], "hello");
        assert_eq!(associations["Node"]["title"], "label");
        assert!(!associations["Node"].contains_key("label"));
        assert_eq!(associations["Page"]["label"], "label");
    }

    #[test]
    fn test_field_associations_drop_non_fieldable_parents() {
        let types = sample_types();
        let fields: IndexMap<String, Definition> = [
            (
                "on_scalar".to_string(),
                Definition::new("domain", "property").with_parent(ParentRef::new("Email")),
            ),
            (
                "on_unknown".to_string(),
                Definition::new("x", "property").with_parent(ParentRef::new("Ghost")),
            ),
        ]
        .into_iter()
        .collect();

        let (associations, _) = build_field_association_map(&fields, &types);
        assert!(!associations.contains_key("Email"));
        assert!(!associations.contains_key("Ghost"));
    }

    #[test]
    fn test_field_associations_weight_per_parent() {
        let types = sample_types();
        let fields: IndexMap<String, Definition> = [
            (
                "light".to_string(),
                Definition::new("title", "property").with_parent(ParentRef::new("Node")),
            ),
            (
                "heavy".to_string(),
                Definition::new("title", "property")
                    .with_weight(1)
                    .with_parent(ParentRef::new("Node"))
                    .with_parent(ParentRef::new("Page")),
            ),
        ]
        .into_iter()
        .collect();

        let (associations, collisions) = build_field_association_map(&fields, &types);
        assert_eq!(associations["Node"]["title"], "heavy");
        assert_eq!(associations["Page"]["title"], "heavy");
        assert_eq!(collisions.len(), 1);
    }

    #[test]
    fn test_mutation_map() {
        let mutations: IndexMap<String, Definition> = [
            ("a".to_string(), Definition::new("publish", "property").with_weight(1)),
            ("b".to_string(), Definition::new("publish", "property")),
            ("c".to_string(), Definition::new("archive", "property")),
        ]
        .into_iter()
        .collect();

        let (map, collisions) = build_mutation_map(mutations);
        assert_eq!(map.len(), 2);
        assert_eq!(map["publish"].id, "a");
        assert_eq!(collisions.len(), 1);
    }

    #[test]
    fn test_maps_are_idempotent() {
        let types = sample_types();
        let fields: IndexMap<String, Definition> = [
            ("hello".to_string(), Definition::new("hello", "property")),
            (
                "title".to_string(),
                Definition::new("title", "property").with_parent(ParentRef::new("Node")),
            ),
        ]
        .into_iter()
        .collect();

        let (first, _) = build_field_association_map(&fields, &types);
        let (second, _) = build_field_association_map(&fields, &types);
        assert_eq!(first, second);
    }
}
