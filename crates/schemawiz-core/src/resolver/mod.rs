//! Schema resolution.
//!
//! Resolution runs as a fixed sequence of passes over an entity registry:
//!
//! 1. register entities and parse their members
//! 2. bind relations to targets, morph names and pivot entities
//! 3. plan morph groups and their pivots
//! 4. derive foreign columns and many-to-many pivots
//! 5. assemble columns, link inverses, validate, order
//!
//! The first error aborts resolution.

mod columns;
mod morph;
mod order;
mod registry;
mod relations;
mod validate;

use crate::catalog::ModelGraph;
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::raw::RawSchema;
use indexmap::IndexMap;
use registry::Registry;
use tracing::{info, instrument};

/// Turns raw declarations into a [`ModelGraph`].
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    /// Create a resolver with the given configuration.
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a raw schema.
    #[instrument(skip_all, fields(entities = raw.len()))]
    pub fn resolve(&self, raw: &RawSchema) -> Result<ModelGraph> {
        let mut registry = Registry::build(raw, &self.config)?;
        let mut pivots = IndexMap::new();

        relations::bind(&mut registry)?;
        let morph_groups = morph::plan(&mut registry, &mut pivots)?;
        relations::link(&mut registry, &mut pivots)?;
        columns::synthesize(&mut registry)?;
        relations::link_inverses(&mut registry);
        validate::validate(&registry)?;
        let order = order::dependency_order(&registry);

        info!(
            entities = registry.len(),
            morph_groups = morph_groups.len(),
            pivots = pivots.len(),
            "schema resolved"
        );

        Ok(ModelGraph::new(
            registry.into_entities(),
            morph_groups,
            pivots,
            order,
        ))
    }
}

/// Resolve a raw schema with the default configuration.
pub fn resolve(raw: &RawSchema) -> Result<ModelGraph> {
    Resolver::default().resolve(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnOrigin, ColumnType, MorphShape, RelationRef};
    use crate::error::ErrorKind;
    use crate::raw::RawEntity;
    use pretty_assertions::assert_eq;
    use schemawiz_lang::RelationKind;

    fn column_names(graph: &ModelGraph, entity: &str) -> Vec<String> {
        graph
            .entity(entity)
            .unwrap()
            .columns
            .keys()
            .cloned()
            .collect()
    }

    #[test]
    fn test_belongs_to_synthesizes_column() {
        let raw = RawSchema::new()
            .with_entity("User", RawEntity::quick().with_member("name", "string"))
            .with_entity(
                "Post",
                RawEntity::quick()
                    .with_member("title", "string")
                    .with_member("author", "belongsTo:User nullable index"),
            );
        let graph = resolve(&raw).unwrap();

        assert_eq!(column_names(&graph, "Post"), vec!["id", "title", "user_id"]);
        let column = graph.entity("Post").unwrap().column("user_id").unwrap();
        assert_eq!(column.column_type, ColumnType::unsigned_big_integer());
        assert!(column.nullable);
        assert!(column.indexed);
        assert_eq!(column.comment.as_deref(), Some("Created for [author] relation."));
        assert_eq!(
            column.origin,
            ColumnOrigin::Relation {
                relation: "author".into()
            }
        );

        let relation = graph.entity("Post").unwrap().relation("author").unwrap();
        assert_eq!(relation.foreign_key.as_deref(), Some("user_id"));
        assert_eq!(relation.owner_key.as_deref(), Some("id"));
        assert_eq!(graph.order(), &["User".to_string(), "Post".to_string()]);
    }

    #[test]
    fn test_inverse_linking() {
        let raw = RawSchema::new()
            .with_entity("User", RawEntity::quick().with_member("posts", "hasMany:Post"))
            .with_entity("Post", RawEntity::quick().with_member("user", "belongsTo"));
        let graph = resolve(&raw).unwrap();

        let posts = graph.entity("User").unwrap().relation("posts").unwrap();
        assert_eq!(posts.foreign_key.as_deref(), Some("user_id"));
        assert_eq!(posts.inverse, Some(RelationRef::new("Post", "user")));

        let user = graph.entity("Post").unwrap().relation("user").unwrap();
        assert_eq!(user.target.as_deref(), Some("User"));
        assert_eq!(user.inverse, Some(RelationRef::new("User", "posts")));
    }

    #[test]
    fn test_missing_inverse_is_not_an_error() {
        let raw = RawSchema::new()
            .with_entity("User", RawEntity::quick().with_member("phone", "hasOne:Phone"))
            .with_entity("Phone", RawEntity::quick().with_member("number", "string"));
        let graph = resolve(&raw).unwrap();
        let phone = graph.entity("User").unwrap().relation("phone").unwrap();
        assert!(phone.inverse.is_none());
        assert!(phone.is_resolved());
    }

    #[test]
    fn test_morph_group() {
        let raw = RawSchema::new()
            .with_entity("Post", RawEntity::quick().with_member("image", "morphOne:Image,imageable"))
            .with_entity("User", RawEntity::quick().with_member("image", "morphOne:Image,imageable"))
            .with_entity("Image", RawEntity::quick().with_member("imageable", "morphTo"));
        let graph = resolve(&raw).unwrap();

        let group = graph.morph_group("imageable").unwrap();
        assert_eq!(group.parents, vec!["Post", "User"]);
        assert_eq!(group.children, vec!["Image"]);
        assert_eq!(group.shape, MorphShape::Classic);
        assert!(group.pivot.is_none());

        assert_eq!(
            column_names(&graph, "Image"),
            vec!["id", "imageable_type", "imageable_id"]
        );
        let morph_to = graph.entity("Image").unwrap().relation("imageable").unwrap();
        assert_eq!(morph_to.morph_targets, vec!["Post", "User"]);

        let image = graph.entity("Post").unwrap().relation("image").unwrap();
        assert_eq!(image.inverse, Some(RelationRef::new("Image", "imageable")));
        assert_eq!(image.foreign_key.as_deref(), Some("imageable_id"));
    }

    #[test]
    fn test_many_to_many_pivot() {
        let raw = RawSchema::new()
            .with_entity("User", RawEntity::quick().with_member("roles", "belongsToMany:Role withPivot:expires_at"))
            .with_entity("Role", RawEntity::quick().with_member("users", "belongsToMany:User"));
        let graph = resolve(&raw).unwrap();

        let pivot = graph.pivot("role_user").unwrap();
        assert!(pivot.is_table_only());
        let names: Vec<_> = pivot.columns.keys().cloned().collect();
        assert_eq!(names, vec!["user_id", "role_id", "expires_at"]);
        assert_eq!(pivot.relations.len(), 2);

        let roles = graph.entity("User").unwrap().relation("roles").unwrap();
        assert_eq!(roles.pivot.as_deref(), Some("role_user"));
        assert_eq!(roles.inverse, Some(RelationRef::new("Role", "users")));
    }

    #[test]
    fn test_unknown_target() {
        let raw = RawSchema::new()
            .with_entity("Post", RawEntity::quick().with_member("author", "belongsTo:Writer"));
        let err = resolve(&raw).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownTarget);
        assert_eq!(
            err.message,
            "The [author] relation in [Post] points to a non-existent [Writer] model."
        );
    }

    #[test]
    fn test_relation_kinds_survive() {
        let raw = RawSchema::new()
            .with_entity("Video", RawEntity::quick().with_member("comments", "morphMany:Comment,commentable"))
            .with_entity("Comment", RawEntity::quick().with_member("commentable", "morphTo"));
        let graph = resolve(&raw).unwrap();
        let comments = graph.entity("Video").unwrap().relation("comments").unwrap();
        assert_eq!(comments.kind, RelationKind::MorphMany);
        assert_eq!(comments.morph_name.as_deref(), Some("commentable"));
    }
}
