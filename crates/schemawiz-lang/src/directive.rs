//! Typed relation directives and column declarations.
//!
//! The parser only decomposes strings; this module gives the pieces meaning
//! without looking at any other entity.

use crate::ast::{Modifier, Shorthand};
use crate::error::ParseError;
use crate::parser;
use crate::span::{Span, Spanned};
use serde::Serialize;

/// Kind of relation between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
    BelongsToMany,
    MorphTo,
    MorphOne,
    MorphMany,
    MorphToMany,
    MorphedByMany,
}

impl RelationKind {
    /// Every recognized kind, in keyword order.
    pub const ALL: [RelationKind; 9] = [
        RelationKind::BelongsTo,
        RelationKind::HasOne,
        RelationKind::HasMany,
        RelationKind::BelongsToMany,
        RelationKind::MorphTo,
        RelationKind::MorphOne,
        RelationKind::MorphMany,
        RelationKind::MorphToMany,
        RelationKind::MorphedByMany,
    ];

    /// Look up a kind by its case-sensitive keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    /// The shorthand keyword of this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongsTo",
            RelationKind::HasOne => "hasOne",
            RelationKind::HasMany => "hasMany",
            RelationKind::BelongsToMany => "belongsToMany",
            RelationKind::MorphTo => "morphTo",
            RelationKind::MorphOne => "morphOne",
            RelationKind::MorphMany => "morphMany",
            RelationKind::MorphToMany => "morphToMany",
            RelationKind::MorphedByMany => "morphedByMany",
        }
    }

    /// Polymorphic kinds that take part in a morph group.
    pub fn is_morph(&self) -> bool {
        matches!(
            self,
            RelationKind::MorphTo
                | RelationKind::MorphOne
                | RelationKind::MorphMany
                | RelationKind::MorphToMany
                | RelationKind::MorphedByMany
        )
    }

    /// Kinds whose columns live on the declaring entity.
    pub fn owns_column(&self) -> bool {
        matches!(self, RelationKind::BelongsTo | RelationKind::MorphTo)
    }

    /// Kinds that go through a pivot table.
    pub fn uses_pivot(&self) -> bool {
        matches!(
            self,
            RelationKind::BelongsToMany | RelationKind::MorphToMany | RelationKind::MorphedByMany
        )
    }

    /// Kinds that return a single model and may fall back to a null object.
    pub fn supports_with_default(&self) -> bool {
        matches!(
            self,
            RelationKind::BelongsTo
                | RelationKind::HasOne
                | RelationKind::MorphOne
                | RelationKind::MorphTo
        )
    }

    /// Kinds that return a collection.
    pub fn is_to_many(&self) -> bool {
        matches!(
            self,
            RelationKind::HasMany
                | RelationKind::BelongsToMany
                | RelationKind::MorphMany
                | RelationKind::MorphToMany
                | RelationKind::MorphedByMany
        )
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A modifier recognized on relation directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationModifier {
    Nullable,
    Index,
    Unique,
    /// Return a null object instead of `null` when the relation is empty.
    WithDefault,
    /// Default value of the synthesized column.
    Default(String),
    /// Extra pivot columns.
    WithPivot(Vec<String>),
    /// Pivot entity key.
    Using(String),
}

impl RelationModifier {
    /// The shorthand name of this modifier.
    pub fn name(&self) -> &'static str {
        match self {
            RelationModifier::Nullable => "nullable",
            RelationModifier::Index => "index",
            RelationModifier::Unique => "unique",
            RelationModifier::WithDefault => "withDefault",
            RelationModifier::Default(_) => "default",
            RelationModifier::WithPivot(_) => "withPivot",
            RelationModifier::Using(_) => "using",
        }
    }

    /// Modifiers that shape a synthesized column.
    pub fn is_column_modifier(&self) -> bool {
        matches!(
            self,
            RelationModifier::Nullable
                | RelationModifier::Index
                | RelationModifier::Unique
                | RelationModifier::Default(_)
        )
    }

    fn from_ast(modifier: &Modifier) -> Result<Self, ParseError> {
        let name = modifier.name.value.as_str();
        let no_args = |m: RelationModifier| {
            if modifier.args.is_empty() {
                Ok(m)
            } else {
                Err(ParseError::new(
                    format!("modifier '{}' does not take arguments", name),
                    modifier.span,
                ))
            }
        };
        let one_arg = || match modifier.args.as_slice() {
            [single] => Ok(single.value.clone()),
            _ => Err(ParseError::new(
                format!("modifier '{}' takes exactly one argument", name),
                modifier.span,
            )
            .with_hint(format!("write it as '{}:<value>'", name))),
        };

        match name {
            "nullable" => no_args(RelationModifier::Nullable),
            "index" => no_args(RelationModifier::Index),
            "unique" => no_args(RelationModifier::Unique),
            "withDefault" => no_args(RelationModifier::WithDefault),
            "default" => one_arg().map(RelationModifier::Default),
            "using" => one_arg().map(RelationModifier::Using),
            "withPivot" => {
                if modifier.args.is_empty() {
                    Err(ParseError::new("modifier 'withPivot' needs at least one column", modifier.span)
                        .with_hint("write it as 'withPivot:<column>[,<column>...]'"))
                } else {
                    Ok(RelationModifier::WithPivot(modifier.arg_values()))
                }
            }
            other => Err(ParseError::new(
                format!("unknown relation modifier '{}'", other),
                modifier.name.span,
            )
            .with_hint("expected one of: nullable, index, unique, withDefault, default, withPivot, using")),
        }
    }
}

/// A typed relation directive.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDirective {
    /// Relation kind.
    pub kind: RelationKind,
    /// Explicit target entity, if any.
    pub target: Option<Spanned<String>>,
    /// Second argument: a foreign column, pivot name, or morph name depending on the kind.
    pub column: Option<Spanned<String>>,
    /// Modifiers in declaration order.
    pub modifiers: Vec<Spanned<RelationModifier>>,
    /// Span of the whole directive.
    pub span: Span,
}

impl RelationDirective {
    /// Check whether a modifier is present.
    pub fn has(&self, modifier: &RelationModifier) -> bool {
        self.modifiers.iter().any(|m| &m.value == modifier)
    }

    /// The `using:` pivot entity, if declared.
    pub fn using(&self) -> Option<&Spanned<RelationModifier>> {
        self.modifiers
            .iter()
            .find(|m| matches!(m.value, RelationModifier::Using(_)))
    }

    /// All `withPivot:` columns, flattened in declaration order.
    pub fn with_pivot(&self) -> Vec<String> {
        self.modifiers
            .iter()
            .filter_map(|m| match &m.value {
                RelationModifier::WithPivot(cols) => Some(cols.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// The `default:` value, if declared.
    pub fn default_value(&self) -> Option<&str> {
        self.modifiers.iter().find_map(|m| match &m.value {
            RelationModifier::Default(v) => Some(v.as_str()),
            _ => None,
        })
    }
}

/// A column declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnDecl {
    /// Column type name (`string`, `decimal`, ...).
    pub type_name: String,
    /// Type arguments (`decimal:8,2` → `["8", "2"]`).
    pub args: Vec<String>,
    pub nullable: bool,
    pub unique: bool,
    pub index: bool,
    pub primary: bool,
    pub unsigned: bool,
    pub default: Option<String>,
    pub comment: Option<String>,
    /// Modifiers the resolver does not interpret, kept for emitters.
    pub extra: Vec<(String, Vec<String>)>,
}

impl ColumnDecl {
    fn from_shorthand(sh: Shorthand) -> Self {
        let mut decl = ColumnDecl {
            type_name: sh.head.value,
            args: sh.args.into_iter().map(|a| a.value).collect(),
            ..Default::default()
        };

        for modifier in sh.modifiers {
            let args = modifier.arg_values();
            match modifier.name.value.as_str() {
                "nullable" => decl.nullable = true,
                "unique" => decl.unique = true,
                "index" => decl.index = true,
                "primary" => decl.primary = true,
                "unsigned" => decl.unsigned = true,
                "default" if !args.is_empty() => decl.default = Some(args.join(",")),
                "comment" if !args.is_empty() => decl.comment = Some(args.join(",")),
                _ => decl.extra.push((modifier.name.value, args)),
            }
        }

        decl
    }
}

/// A member declaration: either a column or a relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Column(ColumnDecl),
    Relation(RelationDirective),
}

/// Parse a relation directive. Fails when the head is not a relation kind.
pub fn parse_relation(source: &str) -> Result<RelationDirective, ParseError> {
    let sh = parser::parse(source)?;
    relation_from_shorthand(sh)
}

/// Parse a column declaration.
pub fn parse_column(source: &str) -> Result<ColumnDecl, ParseError> {
    let sh = parser::parse(source)?;
    Ok(ColumnDecl::from_shorthand(sh))
}

/// Parse any member declaration, deciding by its head.
///
/// A head that spells a relation keyword with the wrong case is rejected
/// instead of silently becoming a column type.
pub fn parse_declaration(source: &str) -> Result<Declaration, ParseError> {
    let sh = parser::parse(source)?;
    if RelationKind::from_keyword(&sh.head.value).is_some() {
        return relation_from_shorthand(sh).map(Declaration::Relation);
    }
    if let Some(kind) = RelationKind::ALL
        .into_iter()
        .find(|k| k.keyword().eq_ignore_ascii_case(&sh.head.value))
    {
        return Err(ParseError::new(
            format!("unknown relation kind '{}'", sh.head.value),
            sh.head.span,
        )
        .with_hint(format!("relation kinds are case-sensitive, did you mean '{}'?", kind)));
    }
    Ok(Declaration::Column(ColumnDecl::from_shorthand(sh)))
}

fn relation_from_shorthand(sh: Shorthand) -> Result<RelationDirective, ParseError> {
    let kind = RelationKind::from_keyword(&sh.head.value).ok_or_else(|| {
        ParseError::new(
            format!("unknown relation kind '{}'", sh.head.value),
            sh.head.span,
        )
        .with_hint("expected one of: belongsTo, hasOne, hasMany, belongsToMany, morphTo, morphOne, morphMany, morphToMany, morphedByMany")
    })?;

    if sh.args.len() > 2 {
        return Err(ParseError::new(
            format!("relation '{}' takes at most two arguments", kind),
            sh.args[2].span,
        )
        .with_hint("write it as '<kind>:<target>,<column>'"));
    }

    let modifiers = sh
        .modifiers
        .iter()
        .map(|m| RelationModifier::from_ast(m).map(|value| Spanned::new(value, m.span)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut args = sh.args.into_iter();
    Ok(RelationDirective {
        kind,
        target: args.next(),
        column: args.next(),
        modifiers,
        span: sh.span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_relation() {
        let d = parse_relation("belongsTo").unwrap();
        assert_eq!(d.kind, RelationKind::BelongsTo);
        assert!(d.target.is_none());
        assert!(d.column.is_none());
    }

    #[test]
    fn test_relation_with_column_and_modifiers() {
        let d = parse_relation("belongsTo:User,user_name nullable withDefault").unwrap();
        assert_eq!(d.target.as_ref().unwrap().value, "User");
        assert_eq!(d.column.as_ref().unwrap().value, "user_name");
        assert!(d.has(&RelationModifier::Nullable));
        assert!(d.has(&RelationModifier::WithDefault));
        assert!(!d.has(&RelationModifier::Unique));
    }

    #[test]
    fn test_pivot_modifiers() {
        let d =
            parse_relation("morphToMany:Tag,taggable withPivot:foo,bar withPivot:quz using:Vegetable")
                .unwrap();
        assert_eq!(d.with_pivot(), vec!["foo", "bar", "quz"]);
        assert_eq!(
            d.using().map(|m| m.value.clone()),
            Some(RelationModifier::Using("Vegetable".into()))
        );
    }

    #[test]
    fn test_default_modifier() {
        let d = parse_relation("belongsTo:User default:1").unwrap();
        assert_eq!(d.default_value(), Some("1"));
    }

    #[test]
    fn test_unknown_kind() {
        let err = parse_relation("belongTo:User").unwrap_err();
        assert_eq!(err.message, "unknown relation kind 'belongTo'");
    }

    #[test]
    fn test_unknown_modifier() {
        let err = parse_relation("belongsTo:User nulable").unwrap_err();
        assert_eq!(err.message, "unknown relation modifier 'nulable'");
        assert_eq!(err.span, Span::new(15, 22));
    }

    #[test]
    fn test_modifier_arity() {
        assert!(parse_relation("belongsTo nullable:yes").is_err());
        assert!(parse_relation("morphToMany:Tag,taggable using:A,B").is_err());
    }

    #[test]
    fn test_too_many_arguments() {
        let err = parse_relation("belongsTo:User,user_id,extra").unwrap_err();
        assert!(err.message.contains("at most two arguments"));
    }

    #[test]
    fn test_column_declaration() {
        let c = parse_column("decimal:8,2 nullable default:0 comment:price unsigned").unwrap();
        assert_eq!(c.type_name, "decimal");
        assert_eq!(c.args, vec!["8", "2"]);
        assert!(c.nullable);
        assert!(c.unsigned);
        assert_eq!(c.default.as_deref(), Some("0"));
        assert_eq!(c.comment.as_deref(), Some("price"));
    }

    #[test]
    fn test_column_keeps_unknown_modifiers() {
        let c = parse_column("string useCurrent charset:utf8").unwrap();
        assert_eq!(
            c.extra,
            vec![
                ("useCurrent".to_string(), vec![]),
                ("charset".to_string(), vec!["utf8".to_string()])
            ]
        );
    }

    #[test]
    fn test_declaration_dispatch() {
        assert!(matches!(
            parse_declaration("hasMany:Post").unwrap(),
            Declaration::Relation(_)
        ));
        assert!(matches!(
            parse_declaration("string unique").unwrap(),
            Declaration::Column(_)
        ));
    }

    #[test]
    fn test_declaration_rejects_miscased_kind() {
        let err = parse_declaration("BelongsTo:User").unwrap_err();
        assert_eq!(err.message, "unknown relation kind 'BelongsTo'");
        assert!(err.hint.unwrap().contains("'belongsTo'"));
    }
}
