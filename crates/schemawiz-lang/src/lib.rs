//! Schemawiz shorthand language
//!
//! This crate parses the compact declaration strings used to describe
//! model members: column types and relation directives.
//!
//! # Shorthand Syntax
//!
//! ```text
//! <head>[:<arg>[,<arg>...]][ <modifier>[:<arg>[,<arg>...]]]*
//! ```
//!
//! ## Columns
//!
//! ```text
//! string
//! decimal:8,2 nullable default:0
//! string:100 unique comment:slug
//! ```
//!
//! ## Relations
//!
//! ```text
//! belongsTo
//! belongsTo:User,user_name nullable withDefault
//! hasMany:Post
//! belongsToMany:Role,role_user withPivot:expires_at
//! morphTo
//! morphToMany:Tag,taggable using:Vegetable
//! ```
//!
//! # Usage
//!
//! ```rust
//! use schemawiz_lang::{parse_declaration, Declaration, RelationKind};
//!
//! let decl = parse_declaration("belongsTo:User nullable").unwrap();
//! if let Declaration::Relation(rel) = decl {
//!     assert_eq!(rel.kind, RelationKind::BelongsTo);
//! }
//! ```

pub mod ast;
pub mod directive;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

// Re-export main types
pub use ast::{Modifier, Shorthand};
pub use directive::{
    parse_column, parse_declaration, parse_relation, ColumnDecl, Declaration, RelationDirective,
    RelationKind, RelationModifier,
};
pub use error::ParseError;
pub use span::{Span, Spanned};

/// Parse a shorthand string into its untyped parts.
///
/// # Example
///
/// ```rust
/// use schemawiz_lang::parse;
///
/// let sh = parse("string:100 unique").unwrap();
/// assert_eq!(sh.head.value, "string");
/// ```
pub fn parse(source: &str) -> Result<Shorthand, ParseError> {
    parser::parse(source)
}

/// Tokenize a source string (for debugging/testing).
///
/// # Example
///
/// ```rust
/// use schemawiz_lang::tokenize;
///
/// let tokens = tokenize("belongsTo:User");
/// assert_eq!(tokens.len(), 3);
/// ```
pub fn tokenize(source: &str) -> Vec<lexer::SpannedToken> {
    lexer::tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_relation_kind() {
        for kind in RelationKind::ALL {
            let rel = parse_relation(kind.keyword()).unwrap();
            assert_eq!(rel.kind, kind);
        }
    }

    #[test]
    fn test_error_with_source_context() {
        let source = "belongsTo:User nulable";
        let err = parse_relation(source).unwrap_err();
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("col 16"));
        assert!(formatted.contains("hint"));
    }

    #[test]
    fn test_kind_classification() {
        assert!(RelationKind::MorphTo.is_morph());
        assert!(RelationKind::MorphTo.owns_column());
        assert!(!RelationKind::HasMany.owns_column());
        assert!(RelationKind::BelongsToMany.uses_pivot());
        assert!(RelationKind::HasOne.supports_with_default());
        assert!(!RelationKind::HasMany.supports_with_default());
    }
}
