//! Parse error types.

use shape_diagnostic::{Diagnostic, ErrorCode};
use shape_ir::Span;
use thiserror::Error;

/// Error produced while parsing a type expression.
///
/// Carries the byte offset of the failure and a description of what was
/// expected there. Always surfaced at type-declaration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character the grammar has no use for.
    #[error("invalid character `{ch}` at offset {}", span.start)]
    InvalidChar { ch: char, span: Span },

    /// The input ended where more tokens were required.
    #[error("unexpected end of type expression, expected {expected}")]
    UnexpectedEof { expected: &'static str, span: Span },

    /// A token that does not fit the grammar at this position.
    #[error("expected {expected}, found {found} at offset {}", span.start)]
    UnexpectedToken {
        expected: &'static str,
        /// Rendered description of the offending token.
        found: String,
        span: Span,
    },

    /// A `List<`, `Map<`, or `{` construct whose closing token never
    /// arrived.
    #[error("unclosed `{delimiter}`: expected {expected} at offset {}", span.start)]
    UnclosedDelimiter {
        /// The opening character of the construct.
        delimiter: char,
        expected: &'static str,
        span: Span,
    },

    /// An integer key that does not fit in `i64`.
    #[error("integer key out of range at offset {}", span.start)]
    IntKeyOutOfRange { span: Span },
}

impl ParseError {
    /// The span of the failure within the type expression.
    pub fn span(&self) -> Span {
        match self {
            ParseError::InvalidChar { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::UnclosedDelimiter { span, .. }
            | ParseError::IntKeyOutOfRange { span } => *span,
        }
    }

    /// Byte offset of the failure.
    pub fn offset(&self) -> u32 {
        self.span().start
    }

    /// Convert to a diagnostic for rendering against the source text.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            ParseError::InvalidChar { .. } => ErrorCode::E0003,
            ParseError::UnexpectedEof { .. } => ErrorCode::E0002,
            ParseError::UnexpectedToken { .. } => ErrorCode::E0001,
            ParseError::UnclosedDelimiter { .. } => ErrorCode::E0004,
            ParseError::IntKeyOutOfRange { .. } => ErrorCode::E0005,
        };
        let label = match self {
            ParseError::UnexpectedEof { expected, .. }
            | ParseError::UnexpectedToken { expected, .. }
            | ParseError::UnclosedDelimiter { expected, .. } => format!("expected {expected}"),
            ParseError::InvalidChar { .. } => "not valid in a type expression".to_owned(),
            ParseError::IntKeyOutOfRange { .. } => "does not fit in a 64-bit key".to_owned(),
        };
        Diagnostic::error(code)
            .with_message(self.to_string())
            .with_label(self.span(), label)
    }
}
