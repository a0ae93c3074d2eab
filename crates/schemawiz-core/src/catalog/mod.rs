//! Resolved catalog types.
//!
//! The catalog is what the resolver produces: entities with their columns and
//! relations, morph groups, pivot tables, and the graph tying them together.

mod column;
mod entity;
mod graph;
mod morph;
mod pivot;
mod relation;
mod types;

pub use column::{Column, ColumnOrigin};
pub use entity::{Entity, TraitRef};
pub use graph::ModelGraph;
pub use morph::{MorphGroup, MorphShape};
pub use pivot::PivotTable;
pub use relation::{Relation, RelationRef, RelationStatus};
pub use types::{ColumnType, KeyStorage, PrimaryKey, DEFAULT_ID, DEFAULT_UUID};
