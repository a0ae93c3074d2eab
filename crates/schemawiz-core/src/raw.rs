//! Raw schema input, as loaded from a declarative file.
//!
//! A raw schema is an ordered map of entity names to their member
//! declarations. Nothing here interprets shorthand strings; that happens
//! during resolution.

use crate::error::{ResolveError, Result};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

/// Keys that toggle entity behavior instead of declaring a member.
const SEEDER: &str = "seeder";
const TIMESTAMPS: &str = "timestamps";
const SOFT_DELETES: &str = "softDeletes";
const TRAITS: &str = "traits";
const COLUMNS: &str = "columns";

/// How an entity was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityStyle {
    /// A flat member map. Gets an implicit `id` key and timestamps.
    Quick,
    /// An object with an explicit `columns` map. Gets only what it declares.
    Custom,
}

/// A raw entity declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntity {
    /// Declaration style.
    pub style: EntityStyle,
    /// Member name to shorthand, in declaration order. `None` is a bare key.
    pub members: IndexMap<String, Option<String>>,
    /// Explicit seeder toggle.
    pub seeder: Option<bool>,
    /// Explicit timestamps toggle.
    pub timestamps: Option<bool>,
    /// Explicit soft-delete toggle.
    pub soft_deletes: Option<bool>,
    /// Trait paths, in declaration order.
    pub traits: Vec<String>,
}

impl RawEntity {
    fn new(style: EntityStyle) -> Self {
        Self {
            style,
            members: IndexMap::new(),
            seeder: None,
            timestamps: None,
            soft_deletes: None,
            traits: Vec::new(),
        }
    }

    /// Create an empty quick entity.
    pub fn quick() -> Self {
        Self::new(EntityStyle::Quick)
    }

    /// Create an empty custom entity.
    pub fn custom() -> Self {
        Self::new(EntityStyle::Custom)
    }

    /// Add a member declared with a shorthand string.
    pub fn with_member(mut self, name: impl Into<String>, shorthand: impl Into<String>) -> Self {
        self.members.insert(name.into(), Some(shorthand.into()));
        self
    }

    /// Add a bare member such as `id: null`.
    pub fn with_bare_member(mut self, name: impl Into<String>) -> Self {
        self.members.insert(name.into(), None);
        self
    }

    /// Set the seeder toggle.
    pub fn with_seeder(mut self, enabled: bool) -> Self {
        self.seeder = Some(enabled);
        self
    }

    /// Set the timestamps toggle.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = Some(enabled);
        self
    }

    /// Set the soft-delete toggle.
    pub fn with_soft_deletes(mut self, enabled: bool) -> Self {
        self.soft_deletes = Some(enabled);
        self
    }

    /// Add a trait.
    pub fn with_trait(mut self, path: impl Into<String>) -> Self {
        self.traits.push(path.into());
        self
    }

    /// Check whether this is a quick entity.
    pub fn is_quick(&self) -> bool {
        self.style == EntityStyle::Quick
    }

    fn from_json(name: &str, value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            ResolveError::invalid_schema(format!(
                "The [{}] model must be a map of columns and relations.",
                name
            ))
        })?;

        match object.get(COLUMNS) {
            Some(Value::Object(columns)) => {
                let mut entity = RawEntity::custom();
                for (key, value) in object {
                    if key == COLUMNS {
                        continue;
                    }
                    if !entity.apply_toggle(name, key, value)? {
                        debug!(entity = %name, key = %key, "ignoring unknown model option");
                    }
                }
                entity.read_members(name, columns)?;
                Ok(entity)
            }
            Some(_) => Err(ResolveError::invalid_schema(format!(
                "The [columns] key of the [{}] model must be a map.",
                name
            ))),
            None => {
                let mut entity = RawEntity::quick();
                entity.read_members(name, object)?;
                Ok(entity)
            }
        }
    }

    fn read_members(&mut self, entity: &str, members: &Map<String, Value>) -> Result<()> {
        for (key, value) in members {
            if self.apply_toggle(entity, key, value)? {
                continue;
            }
            match value {
                Value::String(s) => {
                    self.members.insert(key.clone(), Some(s.clone()));
                }
                Value::Null => {
                    self.members.insert(key.clone(), None);
                }
                _ => {
                    return Err(ResolveError::invalid_schema(format!(
                        "The [{}] member of [{}] must be a string or null.",
                        key, entity
                    )))
                }
            }
        }
        Ok(())
    }

    /// Consume a reserved toggle key. Returns `false` if the key is a member.
    fn apply_toggle(&mut self, entity: &str, key: &str, value: &Value) -> Result<bool> {
        match (key, value) {
            (SEEDER, Value::Bool(b)) => self.seeder = Some(*b),
            (TIMESTAMPS, Value::Bool(b)) => self.timestamps = Some(*b),
            (SOFT_DELETES, Value::Bool(b)) => self.soft_deletes = Some(*b),
            (TRAITS, Value::Array(items)) => {
                for item in items {
                    let path = item.as_str().ok_or_else(|| {
                        ResolveError::invalid_schema(format!(
                            "The traits of [{}] must be a list of names.",
                            entity
                        ))
                    })?;
                    self.traits.push(path.to_string());
                }
            }
            (TRAITS, Value::String(_)) => {
                debug!(entity = %entity, "traits must be a list, ignoring single name");
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A raw schema: entity names to declarations, in input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSchema {
    /// Entities in declaration order.
    pub entities: IndexMap<String, RawEntity>,
}

impl RawSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity.
    pub fn with_entity(mut self, name: impl Into<String>, entity: RawEntity) -> Self {
        self.entities.insert(name.into(), entity);
        self
    }

    /// Number of declared entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if no entities are declared.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Load from a JSON document, either `{"models": {...}}` or a bare map.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| ResolveError::invalid_schema(format!("Invalid schema document: {}", e)))?;
        Self::from_json_value(&value)
    }

    /// Load from an already parsed JSON value.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let root = value.as_object().ok_or_else(|| {
            ResolveError::invalid_schema("The schema document must be a map of models.")
        })?;

        let models = match root.get("models") {
            Some(Value::Object(models)) => models,
            // An absent or empty [models] key is reported by the resolver.
            Some(Value::Null) => return Ok(Self::new()),
            Some(_) => {
                return Err(ResolveError::invalid_schema(
                    "The [models] key must be a map of models.",
                ))
            }
            None => root,
        };

        let mut schema = Self::new();
        for (name, value) in models {
            schema
                .entities
                .insert(name.clone(), RawEntity::from_json(name, value)?);
        }
        Ok(schema)
    }
}
