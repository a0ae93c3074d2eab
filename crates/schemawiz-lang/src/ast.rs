//! Untyped syntax tree for a shorthand declaration.
//!
//! `<head>[:<arg>[,<arg>...]][ <modifier>[:<arg>[,<arg>...]]]*`

use crate::span::{Span, Spanned};

/// A decomposed shorthand string.
#[derive(Debug, Clone, PartialEq)]
pub struct Shorthand {
    /// Column type or relation kind keyword.
    pub head: Spanned<String>,
    /// Colon-separated arguments to the head.
    pub args: Vec<Spanned<String>>,
    /// Space-separated modifiers in declaration order.
    pub modifiers: Vec<Modifier>,
    /// The full span of the shorthand.
    pub span: Span,
}

/// A single modifier token, optionally colon-qualified.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    /// Modifier name (`nullable`, `withPivot`, ...).
    pub name: Spanned<String>,
    /// Arguments after the colon.
    pub args: Vec<Spanned<String>>,
    /// Span of the whole modifier.
    pub span: Span,
}

impl Shorthand {
    /// Get an argument value by position.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|a| a.value.as_str())
    }

    /// Find a modifier by name.
    pub fn modifier(&self, name: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.name.value == name)
    }
}

impl Modifier {
    /// Argument values without spans.
    pub fn arg_values(&self) -> Vec<String> {
        self.args.iter().map(|a| a.value.clone()).collect()
    }
}
