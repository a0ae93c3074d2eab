//! Resolver error types.
//!
//! Every failure aborts the whole resolution run. Messages name the offending
//! entity, relation, and column verbatim so callers can match on them.

use schemawiz_lang::ParseError;
use thiserror::Error;

/// Result alias for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Broad family of a resolver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Empty or malformed input.
    Schema,
    /// Missing entity or column target.
    Reference,
    /// Duplicate names, type or uniformity mismatches.
    Consistency,
    /// Missing required relation parameter.
    Configuration,
}

/// Kinds of resolver errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No entities were declared.
    EmptySchema,
    /// The raw input does not have the expected shape.
    InvalidSchema,
    /// A shorthand string could not be parsed.
    MalformedDirective,
    /// Two entity keys normalize to the same class.
    DuplicateEntity,
    /// A trait path collides with an entity key.
    TraitCollision,
    /// An explicit relation target is not registered.
    UnknownTarget,
    /// No unique entity matches an inferred relation target.
    AmbiguousTarget,
    /// A foreign column cannot be derived from the target.
    MissingSourceColumn,
    /// A morphToMany relation lacks an existing target.
    MissingPolymorphicTarget,
    /// A `using:` pivot entity is not registered.
    UnknownPivotModel,
    /// A relation never reached the resolved state.
    UnresolvedRelation,
    /// Two sources define one column with different types.
    ColumnConflict,
    /// Parents of one morph group use different key storage.
    PrimaryKeyUniformity,
    /// One morph group names two different pivot entities.
    PivotConflict,
    /// A morph relation omits its morph name.
    MissingMorphName,
    /// A morph pivot entity lacks the matching morphTo relation.
    PivotMissingMorphTo,
    /// A modifier is used on a relation kind that does not accept it.
    InvalidModifier,
}

impl ErrorKind {
    /// Stable tag used by consumers and the CLI.
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorKind::EmptySchema => "EmptySchemaError",
            ErrorKind::InvalidSchema => "InvalidSchemaError",
            ErrorKind::MalformedDirective => "MalformedDirectiveError",
            ErrorKind::DuplicateEntity => "DuplicateEntityError",
            ErrorKind::TraitCollision => "TraitCollisionError",
            ErrorKind::UnknownTarget => "UnknownTargetError",
            ErrorKind::AmbiguousTarget => "AmbiguousTargetError",
            ErrorKind::MissingSourceColumn => "MissingSourceColumnError",
            ErrorKind::MissingPolymorphicTarget => "MissingPolymorphicTargetError",
            ErrorKind::UnknownPivotModel => "UnknownPivotModelError",
            ErrorKind::UnresolvedRelation => "UnresolvedRelationError",
            ErrorKind::ColumnConflict => "ColumnConflictError",
            ErrorKind::PrimaryKeyUniformity => "PrimaryKeyUniformityError",
            ErrorKind::PivotConflict => "PivotConflictError",
            ErrorKind::MissingMorphName => "MissingMorphNameError",
            ErrorKind::PivotMissingMorphTo => "PivotMissingMorphToError",
            ErrorKind::InvalidModifier => "InvalidModifierError",
        }
    }

    /// Category of this kind.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::EmptySchema | ErrorKind::InvalidSchema | ErrorKind::MalformedDirective => {
                ErrorCategory::Schema
            }
            ErrorKind::UnknownTarget
            | ErrorKind::AmbiguousTarget
            | ErrorKind::MissingSourceColumn
            | ErrorKind::MissingPolymorphicTarget
            | ErrorKind::UnknownPivotModel
            | ErrorKind::UnresolvedRelation => ErrorCategory::Reference,
            ErrorKind::DuplicateEntity
            | ErrorKind::TraitCollision
            | ErrorKind::ColumnConflict
            | ErrorKind::PrimaryKeyUniformity
            | ErrorKind::PivotConflict => ErrorCategory::Consistency,
            ErrorKind::MissingMorphName
            | ErrorKind::PivotMissingMorphTo
            | ErrorKind::InvalidModifier => ErrorCategory::Configuration,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error raised while resolving a schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ResolveError {
    /// Error kind for programmatic handling.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResolveError {
    /// Create a new resolve error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn empty_schema() -> Self {
        Self::new(
            ErrorKind::EmptySchema,
            "No models were detected. Are you sure you filled the [models] key?",
        )
    }

    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSchema, message)
    }

    /// Wrap a shorthand parse error with the member it came from.
    pub fn malformed_directive(entity: &str, member: &str, source: &str, err: &ParseError) -> Self {
        let mut message = format!(
            "The [{}] declaration of [{}] is malformed: {} in [{}].",
            member, entity, err.message, source
        );
        if let Some(hint) = &err.hint {
            message.push_str(&format!(" Hint: {}.", hint.trim_end_matches('.')));
        }
        Self::new(ErrorKind::MalformedDirective, message)
    }

    pub fn duplicate_entity(class: &str, keys: &[String]) -> Self {
        Self::new(
            ErrorKind::DuplicateEntity,
            format!(
                "The model class name [{}] is duplicated in [{}].",
                class,
                keys.join(", ")
            ),
        )
    }

    pub fn trait_collision(traits: &[String]) -> Self {
        Self::new(
            ErrorKind::TraitCollision,
            format!(
                "The following traits collide with the models: {}.",
                traits.join(", ")
            ),
        )
    }

    pub fn unknown_target(entity: &str, relation: &str, target: &str) -> Self {
        Self::new(
            ErrorKind::UnknownTarget,
            format!(
                "The [{}] relation in [{}] points to a non-existent [{}] model.",
                relation, entity, target
            ),
        )
    }

    pub fn ambiguous_target(entity: &str, relation: &str) -> Self {
        Self::new(
            ErrorKind::AmbiguousTarget,
            format!(
                "The [{}] relation of [{}] must have a target model.",
                relation, entity
            ),
        )
    }

    /// The target has no primary key to derive a foreign column from.
    pub fn missing_key(entity: &str, relation: &str, target: &str) -> Self {
        Self::new(
            ErrorKind::MissingSourceColumn,
            format!(
                "The [{}] relation in [{}] needs a column of [{}].",
                relation, entity, target
            ),
        )
    }

    /// An explicit foreign column references a column the target lacks.
    pub fn missing_source_column(relation: &str, column: &str, target: &str) -> Self {
        Self::new(
            ErrorKind::MissingSourceColumn,
            format!(
                "The relation [{}] references the [{}] column in the [{}] but it doesn't exist.",
                relation, column, target
            ),
        )
    }

    pub fn missing_polymorphic_target(entity: &str, relation: &str) -> Self {
        Self::new(
            ErrorKind::MissingPolymorphicTarget,
            format!(
                "The [{}] of [{}] needs an existing polymorphic target model.",
                relation, entity
            ),
        )
    }

    pub fn unknown_pivot_model(relation: &str, pivot: &str) -> Self {
        Self::new(
            ErrorKind::UnknownPivotModel,
            format!(
                "The [{}] relation is using a non-existent [{}] model.",
                relation, pivot
            ),
        )
    }

    pub fn unresolved_relation(entity: &str, relation: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvedRelation,
            format!(
                "The [{}] relation of [{}] was left unresolved.",
                relation, entity
            ),
        )
    }

    pub fn column_conflict(
        entity: &str,
        column: &str,
        (first, first_type): (&str, &str),
        (second, second_type): (&str, &str),
    ) -> Self {
        Self::new(
            ErrorKind::ColumnConflict,
            format!(
                "The [{}] column of [{}] is defined by [{}] and [{}] with different types [{}] and [{}].",
                column, entity, first, second, first_type, second_type
            ),
        )
    }

    pub fn primary_key_uniformity(
        relation: &str,
        morph_name: &str,
        (first, first_storage): (&str, &str),
        (second, second_storage): (&str, &str),
    ) -> Self {
        Self::new(
            ErrorKind::PrimaryKeyUniformity,
            format!(
                "The polymorphic relation [{}] must have all parent models with same primary key type. \
                 [{}] uses [{}] but [{}] uses [{}] in the [{}] morph.",
                relation, first, first_storage, second, second_storage, morph_name
            ),
        )
    }

    pub fn pivot_conflict(morph_name: &str, first: &str, second: &str) -> Self {
        Self::new(
            ErrorKind::PivotConflict,
            format!(
                "The [{}] morph is using both [{}] and [{}] as pivot models.",
                morph_name, first, second
            ),
        )
    }

    pub fn missing_morph_name(entity: &str, relation: &str) -> Self {
        Self::new(
            ErrorKind::MissingMorphName,
            format!("The [{}] of [{}] needs an [~ble] relation key.", relation, entity),
        )
    }

    pub fn pivot_missing_morph_to(pivot: &str, morph_name: &str) -> Self {
        Self::new(
            ErrorKind::PivotMissingMorphTo,
            format!(
                "The pivot model [{}] must have a [{}] as [morphTo] relation.",
                pivot, morph_name
            ),
        )
    }

    pub fn invalid_modifier(entity: &str, relation: &str, modifier: &str, allowed: &str) -> Self {
        Self::new(
            ErrorKind::InvalidModifier,
            format!(
                "The [{}] modifier of the [{}] relation in [{}] is only valid for {}.",
                modifier, relation, entity, allowed
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemawiz_lang::Span;

    #[test]
    fn test_display_is_message() {
        let err = ResolveError::ambiguous_target("Post", "authors");
        assert_eq!(
            err.to_string(),
            "The [authors] relation of [Post] must have a target model."
        );
        assert_eq!(err.kind.tag(), "AmbiguousTargetError");
    }

    #[test]
    fn test_categories() {
        assert_eq!(ResolveError::empty_schema().category(), ErrorCategory::Schema);
        assert_eq!(
            ResolveError::unknown_target("Post", "user", "Foo").category(),
            ErrorCategory::Reference
        );
        assert_eq!(
            ResolveError::duplicate_entity("User", &["User".into(), "user".into()]).category(),
            ErrorCategory::Consistency
        );
        assert_eq!(
            ResolveError::missing_morph_name("Photo", "tags").category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_malformed_directive_carries_hint() {
        let parse = ParseError::new("unknown relation modifier 'nulable'", Span::new(15, 22))
            .with_hint("expected one of: nullable, index");
        let err = ResolveError::malformed_directive("Post", "user", "belongsTo:User nulable", &parse);
        assert_eq!(err.kind, ErrorKind::MalformedDirective);
        assert!(err.message.contains("[user] declaration of [Post]"));
        assert!(err.message.contains("[belongsTo:User nulable]"));
        assert!(err.message.contains("Hint: expected one of: nullable, index."));
    }

    #[test]
    fn test_duplicate_entity_lists_keys() {
        let err = ResolveError::duplicate_entity("User", &["User".into(), "user".into()]);
        assert_eq!(
            err.message,
            "The model class name [User] is duplicated in [User, user]."
        );
    }
}
