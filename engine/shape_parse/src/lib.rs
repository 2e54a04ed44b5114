//! Type-expression parser for the shape validation engine.
//!
//! Converts a textual type declaration into a `TypeExpr` AST. Grammar:
//!
//! ```text
//! type        := nullable ('|' nullable)*
//! nullable    := '?'? base
//! base        := scalar | listOf | mapOf | inlineShape | shapeRef
//! scalar      := 'int' | 'float' | 'string' | 'bool' | 'null' | 'mixed'
//! listOf      := 'List' '<' type '>'
//! mapOf       := 'Map' '<' keyKind ',' type '>'
//! inlineShape := '{' field (',' field)* ','? '}' '!'?
//! field       := key '?'? ':' type
//! key         := ident | integer
//! ```
//!
//! The parser is recursive descent, so commas inside nested generics and
//! shape bodies are attributed to the innermost construct by construction;
//! there is no flat splitting anywhere. Numeric-looking keys lex as
//! integers, so tuples use the same shape mechanism as records. A bare
//! identifier parses to `ShapeRef`; whether the name denotes a shape or a
//! class is resolved against the registry at validation time.
//!
//! Malformed syntax is always a parse-time `ParseError` (offset plus an
//! expected-token description), never deferred to validation time.

mod cursor;
mod error;
mod grammar;
mod scan;
mod token;

#[cfg(test)]
mod tests;

pub use error::ParseError;
pub use token::{Token, TokenKind};

use shape_ir::{StringInterner, TypeExpr};

/// Parse a type expression into a `TypeExpr`.
///
/// Identifiers and string keys are interned into `interner`. The whole
/// input must be consumed; trailing tokens are an error.
pub fn parse_type_expr(source: &str, interner: &StringInterner) -> Result<TypeExpr, ParseError> {
    let tokens = scan::scan(source, interner)?;
    let mut parser = grammar::Parser::new(&tokens, interner);
    let ty = parser.parse_type()?;
    parser.expect_end()?;
    Ok(ty)
}
