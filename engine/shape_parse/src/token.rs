//! Tokens of the type-expression grammar.

use shape_ir::{Name, Span, StringInterner};

/// A lexed token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token kinds. Scalar keywords are lexed as identifiers and resolved by
/// the parser against pre-interned keyword names.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident(Name),
    /// Integer literal (shape/tuple key).
    Int(i64),
    /// `?`
    Question,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `|`
    Pipe,
    /// `!`
    Bang,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Render for "found ..." parse-error messages.
    pub fn describe(self, interner: &StringInterner) -> String {
        match self {
            TokenKind::Ident(name) => format!("`{}`", interner.lookup(name)),
            TokenKind::Int(n) => format!("`{n}`"),
            TokenKind::Question => "`?`".to_owned(),
            TokenKind::Lt => "`<`".to_owned(),
            TokenKind::Gt => "`>`".to_owned(),
            TokenKind::LBrace => "`{`".to_owned(),
            TokenKind::RBrace => "`}`".to_owned(),
            TokenKind::Comma => "`,`".to_owned(),
            TokenKind::Colon => "`:`".to_owned(),
            TokenKind::Pipe => "`|`".to_owned(),
            TokenKind::Bang => "`!`".to_owned(),
            TokenKind::Eof => "end of input".to_owned(),
        }
    }
}
