//! Token cursor for navigating the token stream.

use shape_ir::StringInterner;

use crate::{ParseError, Token, TokenKind};

/// Cursor for navigating tokens.
///
/// Invariant: the token list always ends with `Eof`, and the position never
/// advances past it, so `current()` is always valid.
pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    interner: &'a StringInterner,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a [Token], interner: &'a StringInterner) -> Self {
        debug_assert!(matches!(
            tokens.last(),
            Some(Token {
                kind: TokenKind::Eof,
                ..
            })
        ));
        Cursor {
            tokens,
            interner,
            pos: 0,
        }
    }

    /// Get the current token.
    #[inline]
    pub(crate) fn current(&self) -> Token {
        self.tokens[self.pos]
    }

    /// Check if the current token matches `kind`.
    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Check if at end of input.
    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    /// Advance past the current token (but never past `Eof`).
    #[inline]
    pub(crate) fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Consume the current token if it matches `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail with `expected`.
    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Consume the closing token of a delimited construct, or fail with
    /// an unclosed-delimiter error naming the opening character.
    pub(crate) fn expect_closing(
        &mut self,
        kind: TokenKind,
        delimiter: char,
        expected: &'static str,
    ) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(ParseError::UnclosedDelimiter {
                delimiter,
                expected,
                span: self.current().span,
            })
        }
    }

    /// Build an error for the current token not matching `expected`.
    pub(crate) fn unexpected(&self, expected: &'static str) -> ParseError {
        let token = self.current();
        if matches!(token.kind, TokenKind::Eof) {
            ParseError::UnexpectedEof {
                expected,
                span: token.span,
            }
        } else {
            ParseError::UnexpectedToken {
                expected,
                found: token.kind.describe(self.interner),
                span: token.span,
            }
        }
    }
}
