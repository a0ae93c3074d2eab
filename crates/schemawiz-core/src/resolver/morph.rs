//! Polymorphic grouping: roles, key uniformity, column shape and pivots.

use super::columns::merge_column;
use super::registry::{Binding, EntityId, Registry};
use crate::catalog::{
    Column, ColumnOrigin, ColumnType, KeyStorage, MorphGroup, MorphShape, PivotTable, PrimaryKey,
    RelationRef, RelationStatus,
};
use crate::error::{ResolveError, Result};
use crate::inflect;
use indexmap::IndexMap;
use schemawiz_lang::{RelationKind, RelationModifier};
use tracing::debug;

/// A relation taking part in a morph group.
#[derive(Debug, Clone)]
struct Member {
    owner: EntityId,
    relation: String,
    kind: RelationKind,
    binding: Binding,
}

impl Member {
    /// The entity on the non-polymorphic side of a many-to-many member.
    fn related(&self) -> Option<EntityId> {
        match self.kind {
            RelationKind::MorphToMany => self.binding.target,
            RelationKind::MorphedByMany => Some(self.owner),
            _ => None,
        }
    }

    /// The polymorphic owner introduced by this member.
    fn parent(&self) -> Option<EntityId> {
        match self.kind {
            RelationKind::MorphToMany | RelationKind::MorphOne | RelationKind::MorphMany => {
                Some(self.owner)
            }
            RelationKind::MorphedByMany => self.binding.target,
            _ => None,
        }
    }
}

/// Relation field updates computed for one group.
struct MemberUpdate {
    owner: EntityId,
    relation: String,
    foreign_key: Option<String>,
    owner_key: Option<String>,
    pivot: Option<String>,
    morph_targets: Vec<String>,
    implied: Vec<Column>,
}

fn push_unique(ids: &mut Vec<EntityId>, id: EntityId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// Group polymorphic relations by morph name and resolve each group.
pub(crate) fn plan(
    registry: &mut Registry,
    pivots: &mut IndexMap<String, PivotTable>,
) -> Result<IndexMap<String, MorphGroup>> {
    let mut members: IndexMap<String, Vec<Member>> = IndexMap::new();
    for id in registry.ids() {
        let draft = registry.get(id);
        for (relation, binding) in &draft.bindings {
            let Some(morph_name) = &binding.morph_name else {
                continue;
            };
            members.entry(morph_name.clone()).or_default().push(Member {
                owner: id,
                relation: relation.clone(),
                kind: draft.directives[relation].kind,
                binding: binding.clone(),
            });
        }
    }

    let mut groups = IndexMap::new();
    for (name, members) in members {
        let group = plan_group(registry, pivots, &name, &members)?;
        debug!(
            morph = %name,
            parents = group.parents.len(),
            shape = ?group.shape,
            pivot = ?group.pivot,
            "planned morph group"
        );
        groups.insert(name, group);
    }
    Ok(groups)
}

fn plan_group(
    registry: &mut Registry,
    pivots: &mut IndexMap<String, PivotTable>,
    name: &str,
    members: &[Member],
) -> Result<MorphGroup> {
    let pivot_entity = pivot_entity(registry, name, members)?;

    let mut parents: Vec<(EntityId, &Member)> = Vec::new();
    let mut children = Vec::new();
    let mut related = Vec::new();
    for member in members {
        if let Some(parent) = member.parent() {
            if !parents.iter().any(|(id, _)| *id == parent) {
                parents.push((parent, member));
            }
        }
        if member.kind == RelationKind::MorphTo {
            push_unique(&mut children, member.owner);
        }
        if let Some(entity) = member.related() {
            push_unique(&mut related, entity);
        }
    }

    let mut keys: Vec<(EntityId, &PrimaryKey)> = Vec::with_capacity(parents.len());
    for (parent, member) in &parents {
        let pk = registry.get(*parent).entity.primary_key.as_ref().ok_or_else(|| {
            ResolveError::missing_key(registry.key(member.owner), &member.relation, registry.key(*parent))
        })?;
        keys.push((*parent, pk));
    }
    check_uniformity(registry, name, members, &keys)?;

    let mut group = MorphGroup::new(name);
    if let Some((_, first)) = keys.first() {
        group.storage = Some(first.storage);
        group.shape = MorphShape::for_storage(Some(first.storage), Some(&first.column_type));
        let shared_name = keys.iter().all(|(_, pk)| pk.name == first.name);
        if first.storage != KeyStorage::AutoIncrement && shared_name && !first.has_default_name() {
            group.id_column = format!("{}_{}", name, first.name);
        }
    }
    group.parents = keys.iter().map(|(id, _)| registry.key(*id).to_string()).collect();
    group.children = children.iter().map(|id| registry.key(*id).to_string()).collect();
    group.related = related.iter().map(|id| registry.key(*id).to_string()).collect();
    group.members = members
        .iter()
        .map(|m| RelationRef::new(registry.key(m.owner), &m.relation))
        .collect();
    group.pivot_entity = pivot_entity.map(|id| registry.key(id).to_string());

    let related_keys = if members.iter().any(|m| m.kind.uses_pivot()) {
        plan_pivot(registry, pivots, &mut group, members, pivot_entity, &related)?
    } else {
        IndexMap::new()
    };

    let updates = member_updates(registry, &group, members, &related_keys);
    for update in updates {
        let draft = registry.get_mut(update.owner);
        if !update.implied.is_empty() {
            draft.implied.insert(update.relation.clone(), update.implied);
        }
        if let Some(relation) = draft.entity.relations.get_mut(&update.relation) {
            relation.foreign_key = update.foreign_key;
            relation.owner_key = update.owner_key;
            relation.pivot = update.pivot;
            relation.morph_targets = update.morph_targets;
            relation.status = RelationStatus::Resolved;
        }
    }

    Ok(group)
}

/// The single pivot entity of the group, if any member names one.
fn pivot_entity(registry: &Registry, name: &str, members: &[Member]) -> Result<Option<EntityId>> {
    let mut pivot: Option<EntityId> = None;
    for member in members.iter().filter(|m| m.kind.uses_pivot()) {
        match (pivot, member.binding.using) {
            (None, Some(using)) => pivot = Some(using),
            (Some(first), Some(using)) if first != using => {
                return Err(ResolveError::pivot_conflict(
                    name,
                    registry.key(first),
                    registry.key(using),
                ));
            }
            _ => {}
        }
    }

    if let Some(id) = pivot {
        let has_morph_to = registry
            .get(id)
            .directives
            .get(name)
            .is_some_and(|d| d.kind == RelationKind::MorphTo);
        if !has_morph_to {
            return Err(ResolveError::pivot_missing_morph_to(registry.key(id), name));
        }
    }
    Ok(pivot)
}

fn storage_label(pk: &PrimaryKey) -> String {
    match pk.storage {
        KeyStorage::Custom => format!("custom {}", pk.column_type),
        storage => storage.as_str().to_string(),
    }
}

fn check_uniformity(
    registry: &Registry,
    name: &str,
    members: &[Member],
    keys: &[(EntityId, &PrimaryKey)],
) -> Result<()> {
    let Some((first_id, first)) = keys.first() else {
        return Ok(());
    };
    for (id, pk) in &keys[1..] {
        let same = pk.storage == first.storage
            && (pk.storage != KeyStorage::Custom || pk.column_type == first.column_type);
        if !same {
            let relation = members.first().map(|m| m.relation.as_str()).unwrap_or(name);
            return Err(ResolveError::primary_key_uniformity(
                relation,
                name,
                (registry.key(*first_id), &storage_label(first)),
                (registry.key(*id), &storage_label(pk)),
            ));
        }
    }
    Ok(())
}

/// Build the group's pivot table. Returns the foreign column name of each
/// related entity.
fn plan_pivot(
    registry: &mut Registry,
    pivots: &mut IndexMap<String, PivotTable>,
    group: &mut MorphGroup,
    members: &[Member],
    pivot_entity: Option<EntityId>,
    related: &[EntityId],
) -> Result<IndexMap<EntityId, String>> {
    let table = match pivot_entity {
        Some(id) => registry.get(id).entity.table.clone(),
        None => inflect::plural(&group.name),
    };
    let pivot_members: Vec<&Member> = members.iter().filter(|m| m.kind.uses_pivot()).collect();

    let mut related_keys = IndexMap::new();
    let mut columns = Vec::new();
    for &entity_id in related {
        let Some(member) = pivot_members.iter().find(|m| m.related() == Some(entity_id)) else {
            continue;
        };
        let entity = &registry.get(entity_id).entity;
        let pk = entity.primary_key.as_ref().ok_or_else(|| {
            ResolveError::missing_key(registry.key(member.owner), &member.relation, &entity.key)
        })?;
        let column_name = format!("{}_{}", inflect::foreign_prefix(&entity.class), pk.name);
        columns.push(
            Column::new(&column_name, pk.foreign_type()).with_origin(ColumnOrigin::Pivot {
                relation: member.relation.clone(),
            }),
        );
        related_keys.insert(entity_id, column_name);
    }

    columns.extend(group.columns());

    for member in &pivot_members {
        let directive = &registry.get(member.owner).directives[&member.relation];
        for extra in directive.with_pivot() {
            columns.push(
                Column::new(extra, ColumnType::string())
                    .nullable(true)
                    .with_origin(ColumnOrigin::Pivot {
                        relation: member.relation.clone(),
                    }),
            );
        }
    }

    let pivot = pivots
        .entry(table.clone())
        .or_insert_with(|| PivotTable::new(&table));
    for column in &columns {
        merge_column(&mut pivot.columns, column.clone(), &table)?;
    }
    pivot.morph_name = Some(group.name.clone());
    pivot.entity = pivot_entity.map(|id| registry.key(id).to_string());
    pivot.relations.extend(
        pivot_members
            .iter()
            .map(|m| RelationRef::new(registry.key(m.owner), &m.relation)),
    );

    if let Some(id) = pivot_entity {
        let draft = registry.get_mut(id);
        draft.pivot_columns.extend(columns);
        for &entity_id in related.iter().filter(|r| **r != id) {
            draft.depend_on(entity_id);
        }
    }

    group.pivot = Some(table);
    Ok(related_keys)
}

fn member_updates(
    registry: &Registry,
    group: &MorphGroup,
    members: &[Member],
    related_keys: &IndexMap<EntityId, String>,
) -> Vec<MemberUpdate> {
    members
        .iter()
        .map(|member| {
            let mut update = MemberUpdate {
                owner: member.owner,
                relation: member.relation.clone(),
                foreign_key: Some(group.id_column.clone()),
                owner_key: None,
                pivot: None,
                morph_targets: Vec::new(),
                implied: Vec::new(),
            };

            match member.kind {
                RelationKind::MorphToMany | RelationKind::MorphedByMany => {
                    update.pivot = group.pivot.clone();
                    update.owner_key = member
                        .related()
                        .and_then(|id| related_keys.get(&id).cloned());
                }
                RelationKind::MorphOne | RelationKind::MorphMany => {
                    update.owner_key = registry
                        .get(member.owner)
                        .entity
                        .primary_key
                        .as_ref()
                        .map(|pk| pk.name.clone());
                }
                RelationKind::MorphTo => {
                    let directive = &registry.get(member.owner).directives[&member.relation];
                    let nullable = directive.has(&RelationModifier::Nullable);
                    let indexed = directive.has(&RelationModifier::Index);
                    let unique = directive.has(&RelationModifier::Unique);
                    let default = directive.default_value().map(str::to_string);
                    update.morph_targets = group.parents.clone();
                    update.implied = group
                        .columns()
                        .into_iter()
                        .map(|column| {
                            Column::for_relation(&column.name, column.column_type, &member.relation)
                                .nullable(nullable)
                                .with_index(indexed)
                                .with_unique(unique)
                                .with_default(default.clone())
                        })
                        .collect();
                }
                _ => {}
            }
            update
        })
        .collect()
}
