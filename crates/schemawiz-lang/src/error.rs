//! Error types for shorthand parsing.

use crate::span::{offset_to_col, Span};
use thiserror::Error;

/// Error while lexing or parsing a shorthand declaration.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Source span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Add a hint to the error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the error with the offending shorthand underlined.
    pub fn format_with_source(&self, source: &str) -> String {
        let col = offset_to_col(source, self.span.start);
        let mut result = format!("error: {}\n", self.message);
        result.push_str(&format!("  --> col {}\n", col));
        result.push_str(&format!("   |\n   | {}\n   | ", source));

        for _ in 1..col {
            result.push(' ');
        }
        result.push('^');

        let width = source[self.span.start.min(source.len())..self.span.end.min(source.len())]
            .chars()
            .count();
        for _ in 1..width {
            result.push('~');
        }
        result.push('\n');

        if let Some(hint) = &self.hint {
            result.push_str(&format!("   = hint: {}\n", hint));
        }

        result
    }
}
