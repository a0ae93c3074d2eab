//! Relation binding and foreign column inference.

use super::columns::merge_column;
use super::registry::{Binding, EntityId, Registry};
use crate::catalog::{
    Column, ColumnOrigin, ColumnType, PivotTable, PrimaryKey, Relation, RelationRef, RelationStatus,
};
use crate::error::{ResolveError, Result};
use crate::inflect;
use indexmap::IndexMap;
use schemawiz_lang::{RelationDirective, RelationKind, RelationModifier};
use tracing::{debug, warn};

const COLUMN_KINDS: &str = "belongsTo, morphTo";
const WITH_DEFAULT_KINDS: &str = "belongsTo, hasOne, morphOne, morphTo";
const PIVOT_KINDS: &str = "belongsToMany, morphToMany, morphedByMany";

/// Bind every directive to its target, morph name, and pivot entity.
pub(crate) fn bind(registry: &mut Registry) -> Result<()> {
    for id in registry.ids() {
        let mut bound = Vec::new();
        {
            let draft = registry.get(id);
            for (name, directive) in &draft.directives {
                let binding = bind_directive(registry, id, name, directive)?;
                let relation = skeleton(registry, name, directive, &binding);
                debug!(
                    entity = %draft.key(),
                    relation = %name,
                    kind = %directive.kind,
                    target = ?relation.target,
                    "bound relation"
                );
                bound.push((name.clone(), binding, relation));
            }
        }

        let draft = registry.get_mut(id);
        for (name, binding, relation) in bound {
            draft.bindings.insert(name.clone(), binding);
            draft.entity.relations.insert(name, relation);
        }
    }

    mark_pivot_entities(registry);
    Ok(())
}

fn bind_directive(
    registry: &Registry,
    id: EntityId,
    name: &str,
    directive: &RelationDirective,
) -> Result<Binding> {
    let entity = registry.key(id);

    let target = match directive.kind {
        RelationKind::MorphTo => None,
        RelationKind::MorphToMany => {
            let target = directive
                .target
                .as_ref()
                .and_then(|t| registry.lookup(&t.value))
                .ok_or_else(|| ResolveError::missing_polymorphic_target(entity, name))?;
            Some(target)
        }
        _ => Some(match &directive.target {
            Some(target) => registry
                .lookup(&target.value)
                .ok_or_else(|| ResolveError::unknown_target(entity, name, &target.value))?,
            None => infer_target(registry, name)
                .ok_or_else(|| ResolveError::ambiguous_target(entity, name))?,
        }),
    };

    let morph_name = match directive.kind {
        RelationKind::MorphTo => Some(name.to_string()),
        kind if kind.is_morph() => Some(
            directive
                .column
                .as_ref()
                .map(|c| c.value.clone())
                .ok_or_else(|| ResolveError::missing_morph_name(entity, name))?,
        ),
        _ => None,
    };

    let mut using = None;
    if let Some(modifier) = directive.using() {
        if let RelationModifier::Using(pivot) = &modifier.value {
            using = Some(
                registry
                    .lookup(pivot)
                    .ok_or_else(|| ResolveError::unknown_pivot_model(name, pivot))?,
            );
        }
    }
    if using.is_none() && directive.kind == RelationKind::BelongsToMany {
        using = directive.column.as_ref().and_then(|c| registry.lookup(&c.value));
    }

    check_modifiers(entity, name, directive)?;

    Ok(Binding {
        target,
        morph_name,
        using,
    })
}

/// Match the relation name, singular or plural, against entity classes and keys.
fn infer_target(registry: &Registry, relation: &str) -> Option<EntityId> {
    let squash = |s: &str| s.replace(['_', '\\'], "").to_lowercase();
    let candidates = [
        squash(relation),
        squash(&inflect::singular(relation)),
        squash(&inflect::plural(relation)),
    ];

    let matches: Vec<EntityId> = registry
        .ids()
        .into_iter()
        .filter(|id| {
            let entity = &registry.get(*id).entity;
            let class = squash(&entity.class);
            let key = squash(&entity.key);
            candidates.iter().any(|c| *c == class || *c == key)
        })
        .collect();

    match matches.as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

fn check_modifiers(entity: &str, relation: &str, directive: &RelationDirective) -> Result<()> {
    let kind = directive.kind;
    for modifier in &directive.modifiers {
        let modifier = &modifier.value;
        let allowed = if modifier.is_column_modifier() && !kind.owns_column() {
            Some(COLUMN_KINDS)
        } else if *modifier == RelationModifier::WithDefault && !kind.supports_with_default() {
            Some(WITH_DEFAULT_KINDS)
        } else if matches!(modifier, RelationModifier::WithPivot(_) | RelationModifier::Using(_))
            && !kind.uses_pivot()
        {
            Some(PIVOT_KINDS)
        } else {
            None
        };

        if let Some(allowed) = allowed {
            return Err(ResolveError::invalid_modifier(
                entity,
                relation,
                modifier.name(),
                allowed,
            ));
        }
    }
    Ok(())
}

fn skeleton(
    registry: &Registry,
    name: &str,
    directive: &RelationDirective,
    binding: &Binding,
) -> Relation {
    let mut relation = Relation::new(name, directive.kind);
    relation.target = binding.target.map(|t| registry.key(t).to_string());
    relation.morph_name = binding.morph_name.clone();
    relation.using = binding.using.map(|u| registry.key(u).to_string());
    relation.with_pivot = directive.with_pivot();
    relation.with_default = directive.has(&RelationModifier::WithDefault);
    relation.nullable = directive.has(&RelationModifier::Nullable);
    relation
}

/// Flag entities that back a pivot and drop their implied primary key.
fn mark_pivot_entities(registry: &mut Registry) {
    let mut pivots: Vec<(EntityId, bool)> = Vec::new();
    for draft in registry.drafts() {
        for (name, binding) in &draft.bindings {
            if let Some(pivot) = binding.using {
                let morph = draft.directives[name].kind.is_morph();
                pivots.push((pivot, morph));
            }
        }
    }

    for (id, morph) in pivots {
        let draft = registry.get_mut(id);
        draft.entity.pivot = true;
        draft.entity.morph_pivot |= morph;
        draft.demote_implicit_key();
    }
}

/// Derive foreign columns and pivots for the non-polymorphic kinds.
pub(crate) fn link(registry: &mut Registry, pivots: &mut IndexMap<String, PivotTable>) -> Result<()> {
    for id in registry.ids() {
        let mut outcome = LinkOutcome::default();
        {
            let draft = registry.get(id);
            for (name, directive) in &draft.directives {
                let binding = &draft.bindings[name];
                match directive.kind {
                    RelationKind::BelongsTo => {
                        link_belongs_to(registry, id, name, directive, binding, &mut outcome)?
                    }
                    RelationKind::HasOne | RelationKind::HasMany => {
                        link_has(registry, id, name, directive, &mut outcome)
                    }
                    RelationKind::BelongsToMany => link_belongs_to_many(
                        registry,
                        id,
                        name,
                        directive,
                        binding,
                        pivots,
                        &mut outcome,
                    )?,
                    _ => {}
                }
            }
        }
        outcome.apply(registry, id);
    }
    Ok(())
}

/// Changes computed for one entity, applied once the registry is writable.
#[derive(Default)]
struct LinkOutcome {
    relations: Vec<(String, Option<String>, Option<String>, Option<String>)>,
    implied: Vec<(String, Column)>,
    depends_on: Vec<EntityId>,
    pivot_entities: Vec<(EntityId, Vec<Column>, Vec<EntityId>)>,
}

impl LinkOutcome {
    fn resolve(
        &mut self,
        relation: &str,
        foreign_key: Option<String>,
        owner_key: Option<String>,
        pivot: Option<String>,
    ) {
        self.relations
            .push((relation.to_string(), foreign_key, owner_key, pivot));
    }

    fn apply(self, registry: &mut Registry, id: EntityId) {
        for (pivot, columns, deps) in self.pivot_entities {
            let draft = registry.get_mut(pivot);
            draft.pivot_columns.extend(columns);
            for dep in deps.into_iter().filter(|d| *d != pivot) {
                draft.depend_on(dep);
            }
        }

        let draft = registry.get_mut(id);
        for dep in self.depends_on.into_iter().filter(|d| *d != id) {
            draft.depend_on(dep);
        }
        for (relation, column) in self.implied {
            draft.implied.entry(relation).or_default().push(column);
        }
        for (name, foreign_key, owner_key, pivot) in self.relations {
            if let Some(relation) = draft.entity.relations.get_mut(&name) {
                relation.foreign_key = foreign_key;
                relation.owner_key = owner_key;
                relation.pivot = pivot;
                relation.status = RelationStatus::Resolved;
            }
        }
    }
}

fn link_belongs_to(
    registry: &Registry,
    id: EntityId,
    name: &str,
    directive: &RelationDirective,
    binding: &Binding,
    outcome: &mut LinkOutcome,
) -> Result<()> {
    let entity = registry.key(id);
    let Some(target_id) = binding.target else {
        return Err(ResolveError::unresolved_relation(entity, name));
    };
    let target = registry.get(target_id);
    let target_key = target.entity.primary_key.as_ref();

    let explicit = directive.column.as_ref().filter(|c| c.value.contains('_'));

    let (column_name, owner_key, column_type) = match explicit {
        // `user_name` references the `name` column of the target.
        Some(column) => {
            let referenced = referenced_column(&column.value, target_key, &target.declared)
                .ok_or_else(|| {
                    let suffix = column.value.rsplit_once('_').map_or("", |(_, s)| s);
                    ResolveError::missing_source_column(name, suffix, target.key())
                })?;
            let column_type = match target_key {
                Some(pk) if pk.name == referenced => pk.foreign_type(),
                _ => target.declared[referenced].column_type.referencing(),
            };
            (column.value.clone(), referenced.to_string(), column_type)
        }
        None => {
            let pk = target_key
                .ok_or_else(|| ResolveError::missing_key(entity, name, target.key()))?;
            let column_name = match &directive.column {
                Some(column) => column.value.clone(),
                None => format!("{}_{}", inflect::foreign_prefix(&target.entity.class), pk.name),
            };
            (
                column_name,
                pk.name.clone(),
                pk.foreign_type(),
            )
        }
    };

    let column = Column::for_relation(&column_name, column_type, name)
        .nullable(directive.has(&RelationModifier::Nullable))
        .with_unique(directive.has(&RelationModifier::Unique))
        .with_index(directive.has(&RelationModifier::Index))
        .with_default(directive.default_value().map(str::to_string));

    debug!(entity = %entity, relation = %name, column = %column_name, "synthesized foreign column");
    outcome.implied.push((name.to_string(), column));
    outcome.depends_on.push(target_id);
    outcome.resolve(name, Some(column_name), Some(owner_key), None);
    Ok(())
}

/// Picks the target column named by the longest `_`-separated suffix of an
/// explicit foreign column, preferring the primary key on equal names.
fn referenced_column<'a>(
    column: &str,
    pk: Option<&'a PrimaryKey>,
    declared: &'a IndexMap<String, Column>,
) -> Option<&'a str> {
    let refers_to = |candidate: &str| {
        column == candidate
            || column
                .strip_suffix(candidate)
                .is_some_and(|prefix| prefix.ends_with('_'))
    };

    let mut best: Option<&'a str> = pk.map(|pk| pk.name.as_str()).filter(|n| refers_to(n));
    for candidate in declared.keys().map(String::as_str) {
        if refers_to(candidate) && best.map_or(true, |b| candidate.len() > b.len()) {
            best = Some(candidate);
        }
    }
    best
}

fn link_has(
    registry: &Registry,
    id: EntityId,
    name: &str,
    directive: &RelationDirective,
    outcome: &mut LinkOutcome,
) {
    let source = &registry.get(id).entity;
    let pk = source.primary_key.as_ref();
    let foreign_key = directive.column.as_ref().map(|c| c.value.clone()).or_else(|| {
        pk.map(|pk| format!("{}_{}", inflect::foreign_prefix(&source.class), pk.name))
    });
    outcome.resolve(name, foreign_key, pk.map(|pk| pk.name.clone()), None);
}

fn link_belongs_to_many(
    registry: &Registry,
    id: EntityId,
    name: &str,
    directive: &RelationDirective,
    binding: &Binding,
    pivots: &mut IndexMap<String, PivotTable>,
    outcome: &mut LinkOutcome,
) -> Result<()> {
    let source = &registry.get(id).entity;
    let Some(target_id) = binding.target else {
        return Err(ResolveError::unresolved_relation(&source.key, name));
    };
    let target = &registry.get(target_id).entity;

    let source_prefix = inflect::foreign_prefix(&source.class);
    let target_prefix = inflect::foreign_prefix(&target.class);

    let table = match (&directive.column, binding.using) {
        (Some(column), _) if registry.lookup(&column.value).is_none() => column.value.clone(),
        (_, Some(pivot)) => registry.get(pivot).entity.table.clone(),
        _ => {
            let mut names = [source_prefix.clone(), target_prefix.clone()];
            names.sort();
            names.join("_")
        }
    };

    let origin = ColumnOrigin::Pivot {
        relation: name.to_string(),
    };
    let source_pk = source
        .primary_key
        .as_ref()
        .ok_or_else(|| ResolveError::missing_key(&source.key, name, &source.key))?;
    let target_pk = target
        .primary_key
        .as_ref()
        .ok_or_else(|| ResolveError::missing_key(&source.key, name, &target.key))?;

    let foreign_key = format!("{}_{}", source_prefix, source_pk.name);
    let related_key = format!("{}_{}", target_prefix, target_pk.name);

    let mut columns = vec![
        Column::new(&foreign_key, source_pk.foreign_type()).with_origin(origin.clone()),
        Column::new(&related_key, target_pk.foreign_type()).with_origin(origin.clone()),
    ];
    columns.extend(directive.with_pivot().into_iter().map(|extra| {
        Column::new(extra, ColumnType::string())
            .nullable(true)
            .with_origin(origin.clone())
    }));

    let pivot = pivots
        .entry(table.clone())
        .or_insert_with(|| PivotTable::new(&table));
    for column in &columns {
        merge_column(&mut pivot.columns, column.clone(), &table)?;
    }
    pivot.relations.push(RelationRef::new(&source.key, name));

    if let Some(pivot_entity) = binding.using {
        pivot.entity = Some(registry.key(pivot_entity).to_string());
        outcome
            .pivot_entities
            .push((pivot_entity, columns, vec![id, target_id]));
    }

    debug!(entity = %source.key, relation = %name, pivot = %table, "resolved pivot");
    outcome.resolve(name, Some(foreign_key), Some(related_key), Some(table));
    Ok(())
}

/// Kinds that can be the counterpart of a relation on its target.
fn counterpart_kinds(kind: RelationKind) -> &'static [RelationKind] {
    match kind {
        RelationKind::BelongsTo => &[RelationKind::HasOne, RelationKind::HasMany],
        RelationKind::HasOne | RelationKind::HasMany => &[RelationKind::BelongsTo],
        RelationKind::BelongsToMany => &[RelationKind::BelongsToMany],
        RelationKind::MorphOne | RelationKind::MorphMany => &[RelationKind::MorphTo],
        RelationKind::MorphToMany => &[RelationKind::MorphedByMany],
        RelationKind::MorphedByMany => &[RelationKind::MorphToMany],
        RelationKind::MorphTo => &[],
    }
}

/// Point each relation at its counterpart on the target. Missing
/// counterparts are reported but never fail resolution.
pub(crate) fn link_inverses(registry: &mut Registry) {
    let mut found: Vec<(EntityId, String, RelationRef)> = Vec::new();

    for id in registry.ids() {
        let draft = registry.get(id);
        for relation in draft.entity.relations.values() {
            let kinds = counterpart_kinds(relation.kind);
            if kinds.is_empty() {
                continue;
            }
            let Some(target_id) = relation.target.as_deref().and_then(|t| registry.lookup(t)) else {
                continue;
            };
            let target = &registry.get(target_id).entity;

            let inverse = target.relations.values().find(|candidate| {
                kinds.contains(&candidate.kind)
                    && candidate.points_to(draft.key())
                    && (!relation.kind.is_morph() || candidate.morph_name == relation.morph_name)
                    && !(target_id == id && candidate.name == relation.name)
            });

            match inverse {
                Some(inverse) => found.push((
                    id,
                    relation.name.clone(),
                    RelationRef::new(&target.key, &inverse.name),
                )),
                None if matches!(
                    relation.kind,
                    RelationKind::HasOne
                        | RelationKind::HasMany
                        | RelationKind::MorphOne
                        | RelationKind::MorphMany
                ) =>
                {
                    warn!(
                        entity = %draft.key(),
                        relation = %relation.name,
                        target = %target.key,
                        expected = %kinds[0],
                        "relation has no inverse on its target"
                    );
                }
                None => {}
            }
        }
    }

    for (id, name, inverse) in found {
        if let Some(relation) = registry.get_mut(id).entity.relations.get_mut(&name) {
            relation.inverse = Some(inverse);
        }
    }
}
