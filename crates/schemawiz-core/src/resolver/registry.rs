//! Entity registry: canonical entity records built from raw input.
//!
//! Entities live in an arena addressed by [`EntityId`]. Relations refer to
//! each other only through ids or keys, so forward references are resolved
//! after every entity is registered.

use crate::catalog::{Column, ColumnType, Entity, PrimaryKey, TraitRef};
use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::inflect;
use crate::raw::{RawEntity, RawSchema};
use indexmap::IndexMap;
use schemawiz_lang::{parse_declaration, Declaration, RelationDirective};
use std::collections::HashMap;
use tracing::debug;

/// Index of an entity in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EntityId(pub usize);

/// A member position, used to keep columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    Column(String),
    Relation(String),
}

/// What a relation directive was bound to.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Binding {
    pub target: Option<EntityId>,
    pub morph_name: Option<String>,
    /// Pivot entity, from `using:` or a many-to-many pivot argument naming an entity.
    pub using: Option<EntityId>,
}

/// An entity under construction.
#[derive(Debug, Clone)]
pub(crate) struct EntityDraft {
    /// Name as written in the input.
    pub raw_name: String,
    pub entity: Entity,
    /// Explicit columns, primary key column included.
    pub declared: IndexMap<String, Column>,
    pub directives: IndexMap<String, RelationDirective>,
    pub bindings: IndexMap<String, Binding>,
    pub slots: Vec<Slot>,
    /// Columns each relation adds to this entity.
    pub implied: IndexMap<String, Vec<Column>>,
    /// Columns added because this entity backs a pivot.
    pub pivot_columns: Vec<Column>,
    /// Entities this one holds foreign columns for.
    pub depends_on: Vec<EntityId>,
}

impl EntityDraft {
    fn new(raw_name: &str, entity: Entity) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            entity,
            declared: IndexMap::new(),
            directives: IndexMap::new(),
            bindings: IndexMap::new(),
            slots: Vec::new(),
            implied: IndexMap::new(),
            pivot_columns: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.entity.key
    }

    /// Record a dependency on another entity.
    pub fn depend_on(&mut self, id: EntityId) {
        if !self.depends_on.contains(&id) {
            self.depends_on.push(id);
        }
    }

    fn declare_key(&mut self, key: PrimaryKey, column: Column) -> Result<()> {
        if let Some(existing) = &self.entity.primary_key {
            return Err(ResolveError::invalid_schema(format!(
                "The [{}] model declares more than one primary key: [{}] and [{}].",
                self.entity.key, existing.name, key.name
            )));
        }
        self.push_column(column.primary());
        self.entity.primary_key = Some(key);
        Ok(())
    }

    fn push_column(&mut self, column: Column) {
        self.slots.push(Slot::Column(column.name.clone()));
        self.declared.insert(column.name.clone(), column);
    }

    /// Drop an implied primary key. Declared keys are kept.
    pub fn demote_implicit_key(&mut self) {
        let Some(pk) = &self.entity.primary_key else {
            return;
        };
        if pk.explicit {
            return;
        }
        let name = pk.name.clone();
        debug!(entity = %self.entity.key, "dropping implicit primary key of pivot entity");
        self.entity.primary_key = None;
        self.declared.shift_remove(&name);
        self.slots.retain(|slot| *slot != Slot::Column(name.clone()));
    }

    fn read_member(&mut self, member: &str, value: Option<&str>) -> Result<()> {
        match (member, value) {
            ("id", None) => {
                let pk = PrimaryKey::auto_increment("id");
                let column = Column::new("id", pk.column_type.clone());
                self.declare_key(pk, column)
            }
            ("uuid", None) => {
                let pk = PrimaryKey::uuid("uuid");
                let column = Column::new("uuid", pk.column_type.clone());
                self.declare_key(pk, column)
            }
            ("id", Some(name)) if is_key_name(name) => {
                let pk = PrimaryKey::auto_increment(name);
                let column = Column::new(name, pk.column_type.clone());
                self.declare_key(pk, column)
            }
            ("uuid", Some(name)) if is_key_name(name) => {
                let pk = PrimaryKey::uuid(name);
                let column = Column::new(name, pk.column_type.clone());
                self.declare_key(pk, column)
            }
            ("timestamps", None) => {
                self.entity.timestamps = true;
                Ok(())
            }
            ("softDeletes", None) => {
                self.entity.soft_deletes = true;
                Ok(())
            }
            (_, None) => Err(ResolveError::invalid_schema(format!(
                "The [{}] member of [{}] must declare a column type or a relation.",
                member, self.entity.key
            ))),
            (_, Some(source)) => {
                let declaration = parse_declaration(source).map_err(|e| {
                    ResolveError::malformed_directive(&self.entity.key, member, source, &e)
                })?;
                match declaration {
                    Declaration::Relation(directive) => {
                        self.slots.push(Slot::Relation(member.to_string()));
                        self.directives.insert(member.to_string(), directive);
                        Ok(())
                    }
                    Declaration::Column(decl) => {
                        let primary = decl.primary || (member == "id" || member == "uuid");
                        let column = Column::from_decl(member, decl);
                        if primary {
                            let pk = PrimaryKey::from_column(member, column.column_type.clone());
                            self.declare_key(pk, column)
                        } else {
                            self.push_column(column);
                            Ok(())
                        }
                    }
                }
            }
        }
    }
}

/// `id: <name>` names the key unless the value is itself a key type.
fn is_key_name(value: &str) -> bool {
    !value.contains([' ', ':', ','])
        && !ColumnType::new(value).is_incrementing()
        && value != "uuid"
}

/// Normalize an entity key: unify separators and trim.
pub(crate) fn normalize_key(name: &str) -> String {
    name.trim()
        .replace('/', "\\")
        .trim_matches('\\')
        .to_string()
}

/// Arena of entities with a case-insensitive key index.
#[derive(Debug)]
pub(crate) struct Registry {
    drafts: Vec<EntityDraft>,
    index: HashMap<String, EntityId>,
}

impl Registry {
    /// Register every raw entity in input order.
    pub fn build(raw: &RawSchema, config: &ResolverConfig) -> Result<Self> {
        if raw.is_empty() {
            return Err(ResolveError::empty_schema());
        }

        let mut registry = Registry {
            drafts: Vec::with_capacity(raw.len()),
            index: HashMap::with_capacity(raw.len()),
        };

        for (name, raw_entity) in &raw.entities {
            let key = normalize_key(name);
            if key.is_empty() {
                return Err(ResolveError::invalid_schema(format!(
                    "The model name [{}] is empty.",
                    name
                )));
            }

            let lower = key.to_lowercase();
            if let Some(existing) = registry.index.get(&lower) {
                let first = &registry.drafts[existing.0];
                return Err(ResolveError::duplicate_entity(
                    &first.entity.class,
                    &[first.raw_name.clone(), name.clone()],
                ));
            }

            let draft = build_draft(name, key, raw_entity, config)?;
            debug!(
                entity = %draft.entity.key,
                table = %draft.entity.table,
                members = raw_entity.members.len(),
                "registered entity"
            );
            let id = EntityId(registry.drafts.len());
            registry.drafts.push(draft);
            registry.index.insert(lower, id);
        }

        registry.check_trait_collisions()?;
        Ok(registry)
    }

    fn check_trait_collisions(&self) -> Result<()> {
        let mut collisions: Vec<String> = Vec::new();
        for draft in &self.drafts {
            for trait_ref in draft.entity.traits.iter().filter(|t| !t.external) {
                let seen = collisions.iter().any(|c| c.eq_ignore_ascii_case(&trait_ref.path));
                if !seen && self.lookup(&trait_ref.path).is_some() {
                    collisions.push(trait_ref.path.clone());
                }
            }
        }
        if collisions.is_empty() {
            Ok(())
        } else {
            Err(ResolveError::trait_collision(&collisions))
        }
    }

    /// Find an entity by key, case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<EntityId> {
        self.index.get(&normalize_key(name).to_lowercase()).copied()
    }

    pub fn get(&self, id: EntityId) -> &EntityDraft {
        &self.drafts[id.0]
    }

    pub fn get_mut(&mut self, id: EntityId) -> &mut EntityDraft {
        &mut self.drafts[id.0]
    }

    pub fn key(&self, id: EntityId) -> &str {
        self.drafts[id.0].key()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    /// All ids in declaration order.
    pub fn ids(&self) -> Vec<EntityId> {
        (0..self.drafts.len()).map(EntityId).collect()
    }

    pub fn drafts(&self) -> impl Iterator<Item = &EntityDraft> {
        self.drafts.iter()
    }

    /// Consume the registry, keeping the finished entities.
    pub fn into_entities(self) -> IndexMap<String, Entity> {
        self.drafts
            .into_iter()
            .map(|draft| (draft.entity.key.clone(), draft.entity))
            .collect()
    }
}

fn build_draft(
    raw_name: &str,
    key: String,
    raw: &RawEntity,
    config: &ResolverConfig,
) -> Result<EntityDraft> {
    let (class, namespace) = match key.rsplit_once('\\') {
        Some((parent, class)) => (
            class.to_string(),
            format!("{}\\{}", config.base_namespace, parent),
        ),
        None => (key.clone(), config.base_namespace.clone()),
    };
    let table = inflect::table_name(&class);

    let mut entity = Entity::new(key, class, namespace, table);
    entity.timestamps = raw
        .timestamps
        .unwrap_or(raw.is_quick() && config.default_timestamps);
    entity.soft_deletes = raw.soft_deletes.unwrap_or(false);
    entity.seeder = raw.seeder.unwrap_or(config.default_seeder);
    entity.traits = raw
        .traits
        .iter()
        .map(|path| TraitRef::parse(path, &config.base_namespace))
        .collect();

    let mut draft = EntityDraft::new(raw_name, entity);
    for (member, value) in &raw.members {
        draft.read_member(member, value.as_deref())?;
    }

    if raw.is_quick() && draft.entity.primary_key.is_none() {
        let pk = PrimaryKey::implicit();
        let column = Column::new(&pk.name, pk.column_type.clone()).primary();
        draft.slots.insert(0, Slot::Column(pk.name.clone()));
        draft.declared.shift_insert(0, pk.name.clone(), column);
        draft.entity.primary_key = Some(pk);
    }

    Ok(draft)
}
