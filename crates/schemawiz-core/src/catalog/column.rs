//! Column definitions.

use super::types::ColumnType;
use schemawiz_lang::ColumnDecl;
use serde::Serialize;

/// Where a column came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ColumnOrigin {
    /// Declared explicitly in the schema.
    Declared,
    /// The entity's primary key.
    PrimaryKey,
    /// Synthesized for a column-owning relation.
    Relation { relation: String },
    /// Synthesized for a pivot of a many-to-many relation.
    Pivot { relation: String },
    /// Synthesized for a morph group.
    Morph { morph_name: String },
}

impl ColumnOrigin {
    /// Check whether the column was synthesized by the resolver.
    pub fn is_synthesized(&self) -> bool {
        !matches!(self, ColumnOrigin::Declared | ColumnOrigin::PrimaryKey)
    }

    /// Short label naming the source, used in conflict messages.
    pub fn label(&self, column: &str) -> String {
        match self {
            ColumnOrigin::Declared => column.to_string(),
            ColumnOrigin::PrimaryKey => "primary key".to_string(),
            ColumnOrigin::Relation { relation } | ColumnOrigin::Pivot { relation } => {
                relation.clone()
            }
            ColumnOrigin::Morph { morph_name } => morph_name.clone(),
        }
    }
}

/// A column of an entity or pivot table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether the column accepts null.
    pub nullable: bool,
    /// Whether the column has a unique index.
    pub unique: bool,
    /// Whether the column has a plain index.
    pub indexed: bool,
    /// Whether the column is the primary key.
    pub primary: bool,
    /// Default value, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Free-text comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Provenance.
    pub origin: ColumnOrigin,
    /// Modifiers not interpreted by the resolver.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, Vec<String>)>,
}

impl Column {
    /// Create a declared, non-nullable column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            unique: false,
            indexed: false,
            primary: false,
            default: None,
            comment: None,
            origin: ColumnOrigin::Declared,
            extra: Vec::new(),
        }
    }

    /// Create a declared column from its parsed shorthand.
    ///
    /// `unsigned` folds into the type name for integer types, so
    /// `bigInteger unsigned` and `unsignedBigInteger` are the same type.
    pub fn from_decl(name: impl Into<String>, decl: ColumnDecl) -> Self {
        let mut type_name = decl.type_name;
        let mut extra = decl.extra;
        if decl.unsigned {
            match type_name.as_str() {
                "bigInteger" | "integer" | "mediumInteger" | "smallInteger" | "tinyInteger" => {
                    let mut chars = type_name.chars();
                    let capitalized: String = chars
                        .next()
                        .map(|c| c.to_ascii_uppercase())
                        .into_iter()
                        .chain(chars)
                        .collect();
                    type_name = format!("unsigned{}", capitalized);
                }
                _ => extra.push(("unsigned".to_string(), Vec::new())),
            }
        }

        Self {
            name: name.into(),
            column_type: ColumnType::new(type_name).with_args(decl.args),
            nullable: decl.nullable,
            unique: decl.unique,
            indexed: decl.index,
            primary: decl.primary,
            default: decl.default,
            comment: decl.comment,
            origin: ColumnOrigin::Declared,
            extra,
        }
    }

    /// Create a column synthesized for a relation.
    pub fn for_relation(
        name: impl Into<String>,
        column_type: ColumnType,
        relation: impl Into<String>,
    ) -> Self {
        let relation = relation.into();
        Self::new(name, column_type)
            .with_comment(format!("Created for [{}] relation.", relation))
            .with_origin(ColumnOrigin::Relation { relation })
    }

    /// Make the column nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the unique flag.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set the index flag.
    pub fn with_index(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Mark as primary key.
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self.origin = ColumnOrigin::PrimaryKey;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the origin.
    pub fn with_origin(mut self, origin: ColumnOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Check whether the column was synthesized by the resolver.
    pub fn is_synthesized(&self) -> bool {
        self.origin.is_synthesized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemawiz_lang::parse_column;

    #[test]
    fn test_from_decl() {
        let decl = parse_column("decimal:8,2 nullable default:0").unwrap();
        let column = Column::from_decl("price", decl);
        assert_eq!(column.column_type.to_string(), "decimal:8,2");
        assert!(column.nullable);
        assert_eq!(column.default.as_deref(), Some("0"));
        assert_eq!(column.origin, ColumnOrigin::Declared);
    }

    #[test]
    fn test_unsigned_folds_into_integer_types() {
        let column = Column::from_decl("user_id", parse_column("bigInteger unsigned").unwrap());
        assert_eq!(column.column_type, ColumnType::unsigned_big_integer());
        assert!(column.extra.is_empty());

        let column = Column::from_decl("price", parse_column("decimal unsigned").unwrap());
        assert_eq!(column.extra, vec![("unsigned".to_string(), vec![])]);
    }

    #[test]
    fn test_relation_column() {
        let column = Column::for_relation("user_id", ColumnType::unsigned_big_integer(), "user")
            .nullable(true);
        assert!(column.is_synthesized());
        assert!(column.nullable);
        assert_eq!(column.comment.as_deref(), Some("Created for [user] relation."));
        assert_eq!(column.origin.label("user_id"), "user");
    }
}
