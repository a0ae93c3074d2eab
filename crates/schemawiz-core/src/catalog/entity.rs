//! Entity definitions.

use super::column::Column;
use super::relation::Relation;
use super::types::{KeyStorage, PrimaryKey};
use indexmap::IndexMap;
use serde::Serialize;

/// A trait used by an entity class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitRef {
    /// Normalized path, relative to the base namespace unless external.
    pub path: String,
    /// Trait name (last path segment).
    pub class: String,
    /// Fully qualified namespace of the trait.
    pub namespace: String,
    /// Whether the trait lives outside the generated code.
    pub external: bool,
}

impl TraitRef {
    /// Parse a trait path. A leading `\` marks an external trait.
    pub fn parse(path: &str, base_namespace: &str) -> Self {
        let normalized = path.trim().replace('/', "\\");
        let external = normalized.starts_with('\\');
        let path = normalized.trim_matches('\\').to_string();

        let (parent, class) = match path.rsplit_once('\\') {
            Some((parent, class)) => (Some(parent), class.to_string()),
            None => (None, path.clone()),
        };
        let namespace = match (external, parent) {
            (true, Some(parent)) => parent.to_string(),
            (true, None) => String::new(),
            (false, Some(parent)) => format!("{}\\{}", base_namespace, parent),
            (false, None) => base_namespace.to_string(),
        };

        Self {
            path,
            class,
            namespace,
            external,
        }
    }

    /// Fully qualified trait name.
    pub fn fqcn(&self) -> String {
        if self.namespace.is_empty() {
            self.class.clone()
        } else {
            format!("{}\\{}", self.namespace, self.class)
        }
    }
}

/// A resolved entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Normalized key (unique, case-insensitive).
    pub key: String,
    /// Class name (last path segment of the key).
    pub class: String,
    /// Fully qualified namespace of the class.
    pub namespace: String,
    /// Table name.
    pub table: String,
    /// Primary key, if any.
    pub primary_key: Option<PrimaryKey>,
    /// Columns in declaration order, synthesized columns included.
    pub columns: IndexMap<String, Column>,
    /// Relations in declaration order.
    pub relations: IndexMap<String, Relation>,
    /// Whether `created_at`/`updated_at` are managed.
    pub timestamps: bool,
    /// Whether deletes are soft.
    pub soft_deletes: bool,
    /// Whether a seeder is generated.
    pub seeder: bool,
    /// Traits in declaration order.
    pub traits: Vec<TraitRef>,
    /// Whether the entity backs a many-to-many pivot.
    pub pivot: bool,
    /// Whether the entity backs a polymorphic pivot.
    pub morph_pivot: bool,
}

impl Entity {
    /// Create an empty entity.
    pub fn new(
        key: impl Into<String>,
        class: impl Into<String>,
        namespace: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            class: class.into(),
            namespace: namespace.into(),
            table: table.into(),
            primary_key: None,
            columns: IndexMap::new(),
            relations: IndexMap::new(),
            timestamps: false,
            soft_deletes: false,
            seeder: false,
            traits: Vec::new(),
            pivot: false,
            morph_pivot: false,
        }
    }

    /// Fully qualified class name.
    pub fn fqcn(&self) -> String {
        format!("{}\\{}", self.namespace, self.class)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Get a relation by name.
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Storage class of the primary key, if any.
    pub fn key_storage(&self) -> Option<KeyStorage> {
        self.primary_key.as_ref().map(|pk| pk.storage)
    }

    /// Check whether the primary key is a uuid.
    pub fn uses_uuid_key(&self) -> bool {
        self.key_storage() == Some(KeyStorage::Uuid)
    }

    /// Check whether a seeder should be generated.
    pub fn is_seedable(&self) -> bool {
        self.seeder && !self.pivot
    }

    /// Columns synthesized by the resolver.
    pub fn synthesized_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values().filter(|c| c.is_synthesized())
    }
}
