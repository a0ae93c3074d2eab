//! The resolved model graph.

use super::entity::Entity;
use super::morph::MorphGroup;
use super::pivot::PivotTable;
use super::relation::Relation;
use indexmap::IndexMap;
use serde::Serialize;

/// A fully resolved schema. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelGraph {
    entities: IndexMap<String, Entity>,
    morph_groups: IndexMap<String, MorphGroup>,
    pivots: IndexMap<String, PivotTable>,
    order: Vec<String>,
}

impl ModelGraph {
    pub(crate) fn new(
        entities: IndexMap<String, Entity>,
        morph_groups: IndexMap<String, MorphGroup>,
        pivots: IndexMap<String, PivotTable>,
        order: Vec<String>,
    ) -> Self {
        Self {
            entities,
            morph_groups,
            pivots,
            order,
        }
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the graph has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up an entity by key, case-insensitively.
    pub fn entity(&self, key: &str) -> Option<&Entity> {
        let key = key.trim().replace('/', "\\");
        let key = key.trim_matches('\\');
        self.entities
            .get(key)
            .or_else(|| self.entities.values().find(|e| e.key.eq_ignore_ascii_case(key)))
    }

    /// Entities in declaration order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Entities in dependency order: referenced entities come first.
    pub fn ordered(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|key| self.entities.get(key))
    }

    /// Entity keys in dependency order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Look up a morph group by morph name.
    pub fn morph_group(&self, name: &str) -> Option<&MorphGroup> {
        self.morph_groups.get(name)
    }

    /// Morph groups in first-seen order.
    pub fn morph_groups(&self) -> impl Iterator<Item = &MorphGroup> {
        self.morph_groups.values()
    }

    /// Look up a pivot table by name.
    pub fn pivot(&self, table: &str) -> Option<&PivotTable> {
        self.pivots.get(table)
    }

    /// Pivot tables in first-seen order.
    pub fn pivots(&self) -> impl Iterator<Item = &PivotTable> {
        self.pivots.values()
    }

    /// Relations on any entity that point at `key`.
    pub fn relations_to<'a>(&'a self, key: &'a str) -> impl Iterator<Item = (&'a Entity, &'a Relation)> + 'a {
        self.entities.values().flat_map(move |entity| {
            entity
                .relations
                .values()
                .filter(move |relation| relation.points_to(key))
                .map(move |relation| (entity, relation))
        })
    }

    /// Entities that get a seeder, in dependency order.
    pub fn seedable(&self) -> impl Iterator<Item = &Entity> {
        self.ordered().filter(|entity| entity.is_seedable())
    }
}
