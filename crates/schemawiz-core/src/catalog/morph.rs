//! Polymorphic relation groups.

use super::column::{Column, ColumnOrigin};
use super::relation::RelationRef;
use super::types::{ColumnType, KeyStorage};
use serde::Serialize;

/// Shape of the `{morph}_type` / `{morph}_id` column pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MorphShape {
    /// Integer id, for auto-incrementing parents or no parents at all.
    Classic,
    /// Uuid id.
    Uuid,
    /// Id typed after the parents' shared custom key.
    Custom(ColumnType),
}

impl MorphShape {
    /// Pick the shape for a uniform parent storage class.
    pub fn for_storage(storage: Option<KeyStorage>, custom_type: Option<&ColumnType>) -> Self {
        match (storage, custom_type) {
            (Some(KeyStorage::Uuid), _) => MorphShape::Uuid,
            (Some(KeyStorage::Custom), Some(ty)) => MorphShape::Custom(ty.clone()),
            _ => MorphShape::Classic,
        }
    }

    /// Type of the id column.
    pub fn id_type(&self) -> ColumnType {
        match self {
            MorphShape::Classic => ColumnType::unsigned_big_integer(),
            MorphShape::Uuid => ColumnType::uuid(),
            MorphShape::Custom(ty) => ty.clone(),
        }
    }

    /// Migration helper that creates both columns, if one exists.
    pub fn helper(&self, nullable: bool) -> Option<&'static str> {
        match (self, nullable) {
            (MorphShape::Classic, false) => Some("morphs"),
            (MorphShape::Classic, true) => Some("nullableMorphs"),
            (MorphShape::Uuid, false) => Some("uuidMorphs"),
            (MorphShape::Uuid, true) => Some("nullableUuidMorphs"),
            (MorphShape::Custom(_), _) => None,
        }
    }
}

/// All relations sharing one morph name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MorphGroup {
    /// Morph name.
    pub name: String,
    /// Entities that are the polymorphic owners, in first-seen order.
    pub parents: Vec<String>,
    /// Entities declaring the morphTo side.
    pub children: Vec<String>,
    /// Entities on the far side of many-to-many morph relations.
    pub related: Vec<String>,
    /// Storage class shared by all parents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<KeyStorage>,
    /// Column pair shape.
    pub shape: MorphShape,
    /// Name of the type column.
    pub type_column: String,
    /// Name of the id column.
    pub id_column: String,
    /// Pivot table for many-to-many members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<String>,
    /// Pivot entity key from `using:`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot_entity: Option<String>,
    /// Member relations in declaration order.
    pub members: Vec<RelationRef>,
}

impl MorphGroup {
    /// Create an empty group with the classic shape.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            type_column: format!("{}_type", name),
            id_column: format!("{}_id", name),
            name,
            parents: Vec::new(),
            children: Vec::new(),
            related: Vec::new(),
            storage: None,
            shape: MorphShape::Classic,
            pivot: None,
            pivot_entity: None,
            members: Vec::new(),
        }
    }

    /// The type and id columns, tagged with the group as origin.
    pub fn columns(&self) -> [Column; 2] {
        let origin = ColumnOrigin::Morph {
            morph_name: self.name.clone(),
        };
        [
            Column::new(&self.type_column, ColumnType::string()).with_origin(origin.clone()),
            Column::new(&self.id_column, self.shape.id_type()).with_origin(origin),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_selection() {
        assert_eq!(MorphShape::for_storage(None, None), MorphShape::Classic);
        assert_eq!(
            MorphShape::for_storage(Some(KeyStorage::AutoIncrement), None),
            MorphShape::Classic
        );
        assert_eq!(MorphShape::for_storage(Some(KeyStorage::Uuid), None), MorphShape::Uuid);
        let ulid = ColumnType::new("ulid");
        assert_eq!(
            MorphShape::for_storage(Some(KeyStorage::Custom), Some(&ulid)),
            MorphShape::Custom(ulid)
        );
    }

    #[test]
    fn test_helpers() {
        assert_eq!(MorphShape::Classic.helper(false), Some("morphs"));
        assert_eq!(MorphShape::Classic.helper(true), Some("nullableMorphs"));
        assert_eq!(MorphShape::Uuid.helper(false), Some("uuidMorphs"));
        assert_eq!(MorphShape::Custom(ColumnType::string()).helper(false), None);
    }

    #[test]
    fn test_group_columns() {
        let mut group = MorphGroup::new("taggable");
        group.shape = MorphShape::Uuid;
        let [kind, id] = group.columns();
        assert_eq!(kind.name, "taggable_type");
        assert_eq!(kind.column_type, ColumnType::string());
        assert_eq!(id.name, "taggable_id");
        assert_eq!(id.column_type, ColumnType::uuid());
    }
}
