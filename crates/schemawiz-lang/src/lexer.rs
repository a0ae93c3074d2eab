//! Lexer for shorthand declarations using logos.
//!
//! Whitespace is significant in the shorthand grammar (it separates
//! modifiers), so it is emitted as a token rather than skipped.

use crate::span::Span;
use logos::Logos;

/// Token types for the shorthand grammar.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// Run of whitespace separating the head from modifiers.
    #[regex(r"[ \t\r\n]+")]
    Space,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    /// Anything else: kinds, entity names, column names, modifier values.
    #[regex(r"[^ \t\r\n:,]+", |lex| lex.slice().to_string())]
    Word(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Space => write!(f, "whitespace"),
            Token::Colon => write!(f, "':'"),
            Token::Comma => write!(f, "','"),
            Token::Word(w) => write!(f, "'{}'", w),
        }
    }
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<SpannedToken>>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&SpannedToken> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_inner());
        }
        self.peeked.as_ref().and_then(|o| o.as_ref())
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Option<SpannedToken> {
        if let Some(peeked) = self.peeked.take() {
            peeked
        } else {
            self.next_inner()
        }
    }

    fn next_inner(&mut self) -> Option<SpannedToken> {
        loop {
            match self.inner.next() {
                Some(Ok(token)) => {
                    return Some(SpannedToken {
                        token,
                        span: self.inner.span().into(),
                    });
                }
                // The token set covers every character; nothing to report.
                Some(Err(())) => continue,
                None => return None,
            }
        }
    }

    /// Get the source string.
    pub fn source(&self) -> &'source str {
        self.inner.source()
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a source string into a vector of spanned tokens.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn test_relation_shorthand() {
        let tokens = tokenize("belongsTo:User,user_name nullable");
        let kinds: Vec<Token> = tokens.into_iter().map(|t| t.token).collect();
        assert_eq!(
            kinds,
            vec![
                word("belongsTo"),
                Token::Colon,
                word("User"),
                Token::Comma,
                word("user_name"),
                Token::Space,
                word("nullable"),
            ]
        );
    }

    #[test]
    fn test_namespaced_target_is_one_word() {
        let tokens = tokenize(r"hasMany:Admin\Post");
        assert_eq!(tokens[2].token, word(r"Admin\Post"));
        assert_eq!(tokens[2].span, Span::new(8, 18));
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let tokens = tokenize("morphTo \t  nullable");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].token, Token::Space);
    }

    #[test]
    fn test_lexer_peek() {
        let mut lexer = Lexer::new("a:b");

        assert_eq!(lexer.peek().map(|t| &t.token), Some(&word("a")));
        assert_eq!(lexer.peek().map(|t| &t.token), Some(&word("a")));

        assert_eq!(lexer.next_token().map(|t| t.token), Some(word("a")));
        assert_eq!(lexer.next_token().map(|t| t.token), Some(Token::Colon));
        assert_eq!(lexer.source(), "a:b");
    }
}
