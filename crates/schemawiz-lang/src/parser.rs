//! Recursive descent parser for shorthand declarations.

use crate::ast::{Modifier, Shorthand};
use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};

/// Parser for a single shorthand string.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
        }
    }

    /// Parse the whole shorthand.
    pub fn parse_shorthand(&mut self) -> Result<Shorthand, ParseError> {
        self.skip_space();

        let head = match self.lexer.next_token() {
            Some(SpannedToken {
                token: Token::Word(w),
                span,
            }) => Spanned::new(w, span),
            Some(tok) => {
                return Err(ParseError::new(
                    format!("expected a type or relation kind, found {}", tok.token),
                    tok.span,
                ))
            }
            None => {
                return Err(ParseError::new("empty declaration", self.eof_span())
                    .with_hint("declare a column type such as 'string' or a relation such as 'belongsTo'"))
            }
        };

        let mut end = head.span;
        let args = if self.peek_is(&Token::Colon) {
            let colon = self.next_token()?;
            let args = self.parse_list(colon.span)?;
            if let Some(last) = args.last() {
                end = last.span;
            }
            args
        } else {
            Vec::new()
        };

        let mut modifiers = Vec::new();
        loop {
            match self.lexer.peek().map(|t| t.token.clone()) {
                None => break,
                Some(Token::Space) => {
                    self.skip_space();
                    if self.lexer.peek().is_none() {
                        break;
                    }
                    let modifier = self.parse_modifier()?;
                    end = modifier.span;
                    modifiers.push(modifier);
                }
                Some(other) => {
                    let tok = self.next_token()?;
                    return Err(ParseError::new(
                        format!("unexpected {} after '{}'", other, &self.source[..tok.span.start]),
                        tok.span,
                    )
                    .with_hint("separate modifiers with spaces and arguments with ','"));
                }
            }
        }

        Ok(Shorthand {
            span: head.span.merge(end),
            head,
            args,
            modifiers,
        })
    }

    /// Parse `name[:arg[,arg...]]`.
    fn parse_modifier(&mut self) -> Result<Modifier, ParseError> {
        let name = self.expect_word("a modifier")?;
        let mut span = name.span;

        let args = if self.peek_is(&Token::Colon) {
            let colon = self.next_token()?;
            let args = self.parse_list(colon.span)?;
            if let Some(last) = args.last() {
                span = span.merge(last.span);
            }
            args
        } else {
            Vec::new()
        };

        Ok(Modifier { name, args, span })
    }

    /// Parse a comma-separated list of words following a colon.
    fn parse_list(&mut self, colon: Span) -> Result<Vec<Spanned<String>>, ParseError> {
        let mut items = Vec::new();
        match self.lexer.peek() {
            Some(SpannedToken {
                token: Token::Word(_),
                ..
            }) => {}
            _ => {
                return Err(ParseError::new("expected a value after ':'", colon)
                    .with_hint("remove the ':' or add an argument"))
            }
        }
        items.push(self.expect_word("an argument")?);

        while self.peek_is(&Token::Comma) {
            let comma = self.next_token()?;
            match self.lexer.peek() {
                Some(SpannedToken {
                    token: Token::Word(_),
                    ..
                }) => items.push(self.expect_word("an argument")?),
                _ => return Err(ParseError::new("expected a value after ','", comma.span)),
            }
        }

        Ok(items)
    }

    /// Expect and consume a word.
    fn expect_word(&mut self, what: &str) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Word(w) => Ok(Spanned::new(w, tok.span)),
            other => Err(ParseError::new(
                format!("expected {}, found {}", what, other),
                tok.span,
            )),
        }
    }

    fn peek_is(&mut self, expected: &Token) -> bool {
        self.lexer.peek().map(|t| &t.token == expected).unwrap_or(false)
    }

    fn skip_space(&mut self) {
        while self.peek_is(&Token::Space) {
            self.lexer.next_token();
        }
    }

    /// Get the next token or error if EOF.
    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        self.lexer
            .next_token()
            .ok_or_else(|| ParseError::new("unexpected end of input", self.eof_span()))
    }

    fn eof_span(&self) -> Span {
        Span::new(self.source.len(), self.source.len())
    }
}

/// Parse a shorthand string into its untyped parts.
pub fn parse(source: &str) -> Result<Shorthand, ParseError> {
    let mut parser = Parser::new(source);
    parser.parse_shorthand()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(items: &[Spanned<String>]) -> Vec<&str> {
        items.iter().map(|s| s.value.as_str()).collect()
    }

    #[test]
    fn test_parse_bare_head() {
        let sh = parse("string").unwrap();
        assert_eq!(sh.head.value, "string");
        assert!(sh.args.is_empty());
        assert!(sh.modifiers.is_empty());
        assert_eq!(sh.span, Span::new(0, 6));
    }

    #[test]
    fn test_parse_head_with_args() {
        let sh = parse("belongsTo:User,user_name").unwrap();
        assert_eq!(sh.head.value, "belongsTo");
        assert_eq!(values(&sh.args), vec!["User", "user_name"]);
        assert_eq!(sh.arg(1), Some("user_name"));
        assert_eq!(sh.arg(2), None);
    }

    #[test]
    fn test_parse_modifiers_with_arguments() {
        let sh = parse("morphToMany:Tag,taggable withPivot:foo,bar using:Vegetable").unwrap();
        assert_eq!(sh.modifiers.len(), 2);
        assert_eq!(sh.modifiers[0].name.value, "withPivot");
        assert_eq!(sh.modifiers[0].arg_values(), vec!["foo", "bar"]);
        assert_eq!(sh.modifier("using").unwrap().arg_values(), vec!["Vegetable"]);
        assert_eq!(sh.span.end, "morphToMany:Tag,taggable withPivot:foo,bar using:Vegetable".len());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let sh = parse("  morphTo nullable  ").unwrap();
        assert_eq!(sh.head.value, "morphTo");
        assert_eq!(sh.modifiers.len(), 1);
    }

    #[test]
    fn test_empty_declaration() {
        let err = parse("   ").unwrap_err();
        assert_eq!(err.message, "empty declaration");
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_dangling_colon() {
        let err = parse("belongsTo:").unwrap_err();
        assert_eq!(err.message, "expected a value after ':'");
        assert_eq!(err.span, Span::new(9, 10));
    }

    #[test]
    fn test_dangling_comma() {
        let err = parse("belongsTo:User, nullable").unwrap_err();
        assert_eq!(err.message, "expected a value after ','");
    }

    #[test]
    fn test_comma_after_modifier() {
        let err = parse("belongsTo:User nullable,index").unwrap_err();
        assert!(err.message.starts_with("unexpected ','"));
    }
}
