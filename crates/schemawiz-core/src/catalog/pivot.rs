//! Pivot tables for many-to-many relations.

use super::column::Column;
use super::relation::RelationRef;
use indexmap::IndexMap;
use serde::Serialize;

/// A pivot table, with or without its own entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    /// Table name.
    pub table: String,
    /// Entity key when the pivot has a generated class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Columns in the order they were contributed.
    pub columns: IndexMap<String, Column>,
    /// Morph name when the pivot backs a morph group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub morph_name: Option<String>,
    /// Relations going through this pivot.
    pub relations: Vec<RelationRef>,
}

impl PivotTable {
    /// Create an empty pivot table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            entity: None,
            columns: IndexMap::new(),
            morph_name: None,
            relations: Vec::new(),
        }
    }

    /// Check whether this pivot is a bare table without its own class.
    pub fn is_table_only(&self) -> bool {
        self.entity.is_none()
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }
}
