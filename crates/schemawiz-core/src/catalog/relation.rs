//! Resolved relations between entities.

use schemawiz_lang::RelationKind;
use serde::Serialize;

/// Reference to a relation on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelationRef {
    /// Entity key.
    pub entity: String,
    /// Relation name.
    pub relation: String,
}

impl RelationRef {
    /// Create a new relation reference.
    pub fn new(entity: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            relation: relation.into(),
        }
    }
}

/// Resolution state of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationStatus {
    /// Target bound, columns not yet derived.
    Pending,
    /// Fully resolved.
    Resolved,
}

/// A relation declared on an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relation {
    /// Relation name.
    pub name: String,
    /// Relation kind.
    pub kind: RelationKind,
    /// Target entity key. Absent for morphTo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Column holding the reference, on whichever side owns it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    /// Column the foreign key points at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_key: Option<String>,
    /// Pivot table name for many-to-many relations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<String>,
    /// Pivot entity key when the pivot has its own entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    /// Extra pivot columns exposed by this relation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub with_pivot: Vec<String>,
    /// Morph name for polymorphic relations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morph_name: Option<String>,
    /// Possible targets of a morphTo relation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub morph_targets: Vec<String>,
    /// Return a null object instead of `null` when empty.
    pub with_default: bool,
    /// Whether the owned column is nullable.
    pub nullable: bool,
    /// The counterpart relation on the target, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse: Option<RelationRef>,
    /// Resolution state.
    pub status: RelationStatus,
}

impl Relation {
    /// Create a pending relation.
    pub fn new(name: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            target: None,
            foreign_key: None,
            owner_key: None,
            pivot: None,
            using: None,
            with_pivot: Vec::new(),
            morph_name: None,
            morph_targets: Vec::new(),
            with_default: false,
            nullable: false,
            inverse: None,
            status: RelationStatus::Pending,
        }
    }

    /// Set the target entity key.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the morph name.
    pub fn with_morph_name(mut self, morph_name: impl Into<String>) -> Self {
        self.morph_name = Some(morph_name.into());
        self
    }

    /// Check whether the relation is resolved.
    pub fn is_resolved(&self) -> bool {
        self.status == RelationStatus::Resolved
    }

    /// Check whether this relation points at the given entity key.
    pub fn points_to(&self, key: &str) -> bool {
        self.target.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(key))
            || self.morph_targets.iter().any(|t| t.eq_ignore_ascii_case(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_builder() {
        let relation = Relation::new("tags", RelationKind::MorphToMany)
            .with_target("Tag")
            .with_morph_name("taggable");

        assert_eq!(relation.target.as_deref(), Some("Tag"));
        assert_eq!(relation.morph_name.as_deref(), Some("taggable"));
        assert!(!relation.is_resolved());
        assert!(relation.points_to("tag"));
        assert!(!relation.points_to("Photo"));
    }

    #[test]
    fn test_morph_to_points_to_parents() {
        let mut relation = Relation::new("taggable", RelationKind::MorphTo);
        relation.morph_targets = vec!["Photo".into(), "Video".into()];
        assert!(relation.points_to("Video"));
    }
}
