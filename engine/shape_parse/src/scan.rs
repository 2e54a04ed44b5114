//! Low-level scanner for type expressions.
//!
//! Produces a flat token list terminated by `Eof`. Identifiers and keywords
//! are interned; numeric-looking keys become `Int` tokens here, which is
//! what makes `{0: int, 1: string}` a tuple shape rather than a record
//! with string keys "0" and "1".

use shape_ir::{Span, StringInterner};

use crate::{ParseError, Token, TokenKind};

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scan `source` into tokens. The returned list always ends with `Eof`.
pub(crate) fn scan(source: &str, interner: &StringInterner) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_ascii_whitespace() {
            chars.next();
            continue;
        }

        let punct = match c {
            '?' => Some(TokenKind::Question),
            '<' => Some(TokenKind::Lt),
            '>' => Some(TokenKind::Gt),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            '|' => Some(TokenKind::Pipe),
            '!' => Some(TokenKind::Bang),
            _ => None,
        };
        if let Some(kind) = punct {
            chars.next();
            tokens.push(Token {
                kind,
                span: span_at(start, c.len_utf8()),
            });
            continue;
        }

        if is_ident_start(c) {
            let mut end = start + c.len_utf8();
            chars.next();
            while let Some(&(i, n)) = chars.peek() {
                if is_ident_continue(n) {
                    end = i + n.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let name = interner.intern(&source[start..end]);
            tokens.push(Token {
                kind: TokenKind::Ident(name),
                span: span_range(start, end),
            });
            continue;
        }

        if c.is_ascii_digit() || c == '-' {
            let mut end = start + c.len_utf8();
            chars.next();
            if c == '-' && !chars.peek().is_some_and(|&(_, n)| n.is_ascii_digit()) {
                return Err(ParseError::InvalidChar {
                    ch: c,
                    span: span_at(start, 1),
                });
            }
            while let Some(&(i, n)) = chars.peek() {
                if n.is_ascii_digit() {
                    end = i + n.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let span = span_range(start, end);
            let value: i64 = source[start..end]
                .parse()
                .map_err(|_| ParseError::IntKeyOutOfRange { span })?;
            tokens.push(Token {
                kind: TokenKind::Int(value),
                span,
            });
            continue;
        }

        return Err(ParseError::InvalidChar {
            ch: c,
            span: span_at(start, c.len_utf8()),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::point(clamp_u32(source.len())),
    });
    Ok(tokens)
}

fn span_at(start: usize, len: usize) -> Span {
    span_range(start, start + len)
}

fn span_range(start: usize, end: usize) -> Span {
    Span::new(clamp_u32(start), clamp_u32(end))
}

// Type expressions are short; offsets beyond u32 would mean a >4GiB
// declaration, so saturation is fine for error reporting.
fn clamp_u32(v: usize) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}
