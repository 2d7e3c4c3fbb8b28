//! Weight-based conflict resolution.
//!
//! Candidates compete for a public name within a namespace. They are offered
//! in a fixed order (provider registration order, then definition order) and
//! a later candidate replaces the current winner only with a strictly
//! greater weight, so the first candidate seen wins ties.

use std::fmt;

use indexmap::IndexMap;
use tracing::trace;

/// Namespace a name competes in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Public type names (global).
    Types,
    /// Field names under one parent type.
    Fields { parent: String },
    /// Public mutation names (global).
    Mutations,
    /// Concrete implementers of one abstract type name.
    References,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Types => write!(f, "types"),
            Namespace::Fields { parent } => write!(f, "fields of {parent}"),
            Namespace::Mutations => write!(f, "mutations"),
            Namespace::References => write!(f, "references"),
        }
    }
}

/// Result of offering a candidate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertAction {
    /// Key was new; candidate inserted.
    InsertedNew,
    /// Key existed; the current winner was kept.
    KeptExisting,
    /// Key existed; the candidate replaced the winner.
    ReplacedExisting,
}

/// Records a resolved name collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub namespace: Namespace,
    /// The contested name.
    pub key: String,
    /// Plugin id that held the name before this candidate.
    pub existing_id: String,
    /// Plugin id of the candidate.
    pub new_id: String,
    pub winner_id: String,
    pub action: InsertAction,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: '{}' claimed by {} and {}, kept {}",
            self.namespace, self.key, self.existing_id, self.new_id, self.winner_id
        )
    }
}

/// Strictly greater weight wins; ties keep the existing winner.
fn heavier_wins(existing_weight: i64, candidate_weight: i64) -> bool {
    candidate_weight > existing_weight
}

/// A winning candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Weighted<V> {
    pub id: String,
    pub weight: i64,
    pub value: V,
}

/// One winner per key, chosen by weight.
#[derive(Debug, Clone)]
pub struct WeightedIndex<V> {
    namespace: Namespace,
    entries: IndexMap<String, Weighted<V>>,
    collisions: Vec<Collision>,
}

impl<V> WeightedIndex<V> {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            entries: IndexMap::new(),
            collisions: Vec::new(),
        }
    }

    /// Offers a candidate for `key`.
    ///
    /// Keys keep the position of their first insertion even when the winner
    /// is replaced later.
    pub fn offer(&mut self, key: &str, id: &str, weight: i64, value: V) -> InsertAction {
        let Some(existing) = self.entries.get_mut(key) else {
            self.entries.insert(
                key.to_string(),
                Weighted {
                    id: id.to_string(),
                    weight,
                    value,
                },
            );
            return InsertAction::InsertedNew;
        };

        let existing_id = existing.id.clone();
        let action = if heavier_wins(existing.weight, weight) {
            *existing = Weighted {
                id: id.to_string(),
                weight,
                value,
            };
            InsertAction::ReplacedExisting
        } else {
            InsertAction::KeptExisting
        };

        let winner_id = match action {
            InsertAction::ReplacedExisting => id.to_string(),
            _ => existing_id.clone(),
        };

        trace!(
            namespace = %self.namespace,
            key,
            existing = %existing_id,
            candidate = id,
            winner = %winner_id,
            "Resolved name collision"
        );

        self.collisions.push(Collision {
            namespace: self.namespace.clone(),
            key: key.to_string(),
            existing_id,
            new_id: id.to_string(),
            winner_id,
            action,
        });

        action
    }

    #[cfg(test)]
    fn get(&self, key: &str) -> Option<&Weighted<V>> {
        self.entries.get(key)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Consumes the index, returning the winners and recorded collisions.
    pub fn into_parts(self) -> (IndexMap<String, Weighted<V>>, Vec<Collision>) {
        (self.entries, self.collisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert() {
        let mut index = WeightedIndex::new(Namespace::Types);
        assert_eq!(index.offer("Node", "a", 0, ()), InsertAction::InsertedNew);
        assert_eq!(index.len(), 1);
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn test_heavier_candidate_replaces() {
        let mut index = WeightedIndex::new(Namespace::Types);
        index.offer("Node", "light", 1, "light");
        let action = index.offer("Node", "heavy", 5, "heavy");

        assert_eq!(action, InsertAction::ReplacedExisting);
        assert_eq!(index.get("Node").unwrap().value, "heavy");

        let collision = &index.collisions()[0];
        assert_eq!(collision.existing_id, "light");
        assert_eq!(collision.new_id, "heavy");
        assert_eq!(collision.winner_id, "heavy");
    }

    #[test]
    fn test_lighter_candidate_is_discarded() {
        let mut index = WeightedIndex::new(Namespace::Mutations);
        index.offer("publish", "heavy", 5, ());
        assert_eq!(index.offer("publish", "light", 1, ()), InsertAction::KeptExisting);
        assert_eq!(index.get("publish").unwrap().id, "heavy");
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let mut index = WeightedIndex::new(Namespace::Types);
        index.offer("Node", "first", 3, ());
        index.offer("Node", "second", 3, ());
        index.offer("Node", "third", 3, ());

        assert_eq!(index.get("Node").unwrap().id, "first");
        assert_eq!(index.collisions().len(), 2);
        assert!(
            index
                .collisions()
                .iter()
                .all(|c| c.action == InsertAction::KeptExisting)
        );
    }

    #[test]
    fn test_negative_weights() {
        let mut index = WeightedIndex::new(Namespace::Types);
        index.offer("String", "fallback", -10, ());
        index.offer("String", "default", 0, ());
        assert_eq!(index.get("String").unwrap().id, "default");
    }

    #[test]
    fn test_replacement_keeps_key_position() {
        let mut index = WeightedIndex::new(Namespace::Fields {
            parent: "Root".into(),
        });
        index.offer("a", "a1", 0, ());
        index.offer("b", "b1", 0, ());
        index.offer("a", "a2", 1, ());

        let (entries, collisions) = index.into_parts();
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(entries["a"].id, "a2");
        assert_eq!(collisions.len(), 1);
    }

    #[test]
    fn test_collision_display() {
        let mut index = WeightedIndex::new(Namespace::Fields {
            parent: "Node".into(),
        });
        index.offer("title", "a", 0, ());
        index.offer("title", "b", 1, ());
        assert_eq!(
            index.collisions()[0].to_string(),
            "fields of Node: 'title' claimed by a and b, kept b"
        );
    }
}
