//! Column merging and final column assembly.

use super::registry::{Registry, Slot};
use crate::catalog::Column;
use crate::error::{ResolveError, Result};
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Add a column, deduplicating same-typed columns.
///
/// A declared column replaces a synthesized one of the same type in place.
/// Two columns with one name and different types are a conflict.
pub(crate) fn merge_column(
    columns: &mut IndexMap<String, Column>,
    column: Column,
    owner: &str,
) -> Result<()> {
    match columns.entry(column.name.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(column);
            Ok(())
        }
        Entry::Occupied(mut slot) => {
            let existing = slot.get_mut();
            if existing.column_type != column.column_type {
                return Err(ResolveError::column_conflict(
                    owner,
                    &column.name,
                    (
                        &existing.origin.label(&existing.name),
                        &existing.column_type.to_string(),
                    ),
                    (&column.origin.label(&column.name), &column.column_type.to_string()),
                ));
            }
            if existing.is_synthesized() && !column.is_synthesized() {
                *existing = column;
            }
            Ok(())
        }
    }
}

/// Assemble each entity's columns in member order, then pivot columns.
pub(crate) fn synthesize(registry: &mut Registry) -> Result<()> {
    for id in registry.ids() {
        let draft = registry.get_mut(id);
        let owner = draft.entity.key.clone();
        let mut columns = IndexMap::new();

        for slot in &draft.slots {
            match slot {
                Slot::Column(name) => {
                    if let Some(column) = draft.declared.get(name) {
                        merge_column(&mut columns, column.clone(), &owner)?;
                    }
                }
                Slot::Relation(name) => {
                    for column in draft.implied.get(name).into_iter().flatten() {
                        merge_column(&mut columns, column.clone(), &owner)?;
                    }
                }
            }
        }
        for column in &draft.pivot_columns {
            merge_column(&mut columns, column.clone(), &owner)?;
        }

        draft.entity.columns = columns;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnOrigin, ColumnType};
    use crate::error::ErrorKind;

    #[test]
    fn test_same_type_is_deduplicated() {
        let mut columns = IndexMap::new();
        merge_column(
            &mut columns,
            Column::for_relation("user_id", ColumnType::unsigned_big_integer(), "author"),
            "Post",
        )
        .unwrap();
        merge_column(
            &mut columns,
            Column::new("user_id", ColumnType::unsigned_big_integer()).nullable(true),
            "Post",
        )
        .unwrap();

        assert_eq!(columns.len(), 1);
        let column = &columns["user_id"];
        assert_eq!(column.origin, ColumnOrigin::Declared);
        assert!(column.nullable);
    }

    #[test]
    fn test_synthesized_does_not_replace_declared() {
        let mut columns = IndexMap::new();
        merge_column(&mut columns, Column::new("tag_id", ColumnType::uuid()), "Vegetable").unwrap();
        merge_column(
            &mut columns,
            Column::for_relation("tag_id", ColumnType::uuid(), "tag"),
            "Vegetable",
        )
        .unwrap();
        assert_eq!(columns["tag_id"].origin, ColumnOrigin::Declared);
    }

    #[test]
    fn test_type_conflict() {
        let mut columns = IndexMap::new();
        merge_column(&mut columns, Column::new("user_id", ColumnType::string()), "Post").unwrap();
        let err = merge_column(
            &mut columns,
            Column::for_relation("user_id", ColumnType::unsigned_big_integer(), "author"),
            "Post",
        )
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::ColumnConflict);
        assert_eq!(
            err.message,
            "The [user_id] column of [Post] is defined by [user_id] and [author] with different types [string] and [unsignedBigInteger]."
        );
    }
}
