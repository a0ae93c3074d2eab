//! Schemawiz Core - schema resolution for model scaffolding.
//!
//! This crate turns raw model declarations into a resolved [`ModelGraph`]:
//! entities with their primary keys and columns, relations bound to their
//! targets and inverses, polymorphic groups, and pivot tables.
//!
//! # Usage
//!
//! ```rust
//! use schemawiz_core::{resolve, RawEntity, RawSchema};
//!
//! let raw = RawSchema::new()
//!     .with_entity("User", RawEntity::quick().with_member("name", "string"))
//!     .with_entity("Post", RawEntity::quick().with_member("author", "belongsTo:User"));
//!
//! let graph = resolve(&raw).unwrap();
//! let post = graph.entity("Post").unwrap();
//! assert!(post.column("user_id").is_some());
//! assert_eq!(graph.order(), ["User", "Post"]);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod inflect;
pub mod raw;
pub mod resolver;

pub use catalog::{
    Column, ColumnOrigin, ColumnType, Entity, KeyStorage, ModelGraph, MorphGroup, MorphShape,
    PivotTable, PrimaryKey, Relation, RelationRef, RelationStatus, TraitRef,
};
pub use config::ResolverConfig;
pub use error::{ErrorCategory, ErrorKind, ResolveError, Result};
pub use raw::{EntityStyle, RawEntity, RawSchema};
pub use resolver::{resolve, Resolver};

// Shorthand types surface in relations and columns.
pub use schemawiz_lang::{RelationKind, RelationModifier};
