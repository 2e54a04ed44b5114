//! Recursive-descent grammar for type expressions.

use shape_ir::{FieldKey, KeyKind, Name, ScalarKind, ShapeBody, ShapeField, StringInterner, TypeExpr};

use crate::cursor::Cursor;
use crate::{ParseError, Token, TokenKind};

/// Pre-interned keyword names, resolved once per parse.
struct Keywords {
    kw_int: Name,
    kw_float: Name,
    kw_string: Name,
    kw_bool: Name,
    kw_null: Name,
    kw_mixed: Name,
    kw_list: Name,
    kw_map: Name,
}

impl Keywords {
    fn new(interner: &StringInterner) -> Self {
        Keywords {
            kw_int: interner.intern("int"),
            kw_float: interner.intern("float"),
            kw_string: interner.intern("string"),
            kw_bool: interner.intern("bool"),
            kw_null: interner.intern("null"),
            kw_mixed: interner.intern("mixed"),
            kw_list: interner.intern("List"),
            kw_map: interner.intern("Map"),
        }
    }

    fn scalar(&self, name: Name) -> Option<ScalarKind> {
        if name == self.kw_int {
            Some(ScalarKind::Int)
        } else if name == self.kw_float {
            Some(ScalarKind::Float)
        } else if name == self.kw_string {
            Some(ScalarKind::String)
        } else if name == self.kw_bool {
            Some(ScalarKind::Bool)
        } else if name == self.kw_null {
            Some(ScalarKind::Null)
        } else if name == self.kw_mixed {
            Some(ScalarKind::Mixed)
        } else {
            None
        }
    }
}

/// Type-expression parser over a scanned token list.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    kw: Keywords,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Token], interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens, interner),
            kw: Keywords::new(interner),
        }
    }

    /// type := nullable ('|' nullable)*
    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let first = self.parse_nullable()?;
        if !self.cursor.check(TokenKind::Pipe) {
            return Ok(first);
        }
        let mut alternatives = vec![first];
        while self.cursor.eat(TokenKind::Pipe) {
            alternatives.push(self.parse_nullable()?);
        }
        Ok(TypeExpr::Union(alternatives))
    }

    /// nullable := '?'? base
    fn parse_nullable(&mut self) -> Result<TypeExpr, ParseError> {
        if self.cursor.eat(TokenKind::Question) {
            Ok(TypeExpr::nullable(self.parse_base()?))
        } else {
            self.parse_base()
        }
    }

    /// base := scalar | listOf | mapOf | inlineShape | shapeRef
    fn parse_base(&mut self) -> Result<TypeExpr, ParseError> {
        match self.cursor.current().kind {
            TokenKind::Ident(name) => {
                self.cursor.advance();
                if let Some(kind) = self.kw.scalar(name) {
                    Ok(TypeExpr::Scalar(kind))
                } else if name == self.kw.kw_list {
                    self.parse_list_of()
                } else if name == self.kw.kw_map {
                    self.parse_map_of()
                } else {
                    // Shape or class name; the registry resolves the kind
                    // at validation time.
                    Ok(TypeExpr::ShapeRef(name))
                }
            }
            TokenKind::LBrace => self.parse_inline_shape(),
            _ => Err(self.cursor.unexpected("a type")),
        }
    }

    /// listOf := 'List' '<' type '>'
    fn parse_list_of(&mut self) -> Result<TypeExpr, ParseError> {
        self.cursor.expect(TokenKind::Lt, "`<` after `List`")?;
        let element = self.parse_type()?;
        self.cursor
            .expect_closing(TokenKind::Gt, '<', "`>` to close `List<`")?;
        Ok(TypeExpr::list_of(element))
    }

    /// mapOf := 'Map' '<' keyKind ',' type '>'
    fn parse_map_of(&mut self) -> Result<TypeExpr, ParseError> {
        self.cursor.expect(TokenKind::Lt, "`<` after `Map`")?;
        let key = self.parse_key_kind()?;
        self.cursor.expect(TokenKind::Comma, "`,` between map key and value types")?;
        let value = self.parse_type()?;
        self.cursor
            .expect_closing(TokenKind::Gt, '<', "`>` to close `Map<`")?;
        Ok(TypeExpr::map_of(key, value))
    }

    fn parse_key_kind(&mut self) -> Result<KeyKind, ParseError> {
        if let TokenKind::Ident(name) = self.cursor.current().kind {
            let kind = if name == self.kw.kw_int {
                Some(KeyKind::Int)
            } else if name == self.kw.kw_string {
                Some(KeyKind::String)
            } else {
                None
            };
            if let Some(kind) = kind {
                self.cursor.advance();
                return Ok(kind);
            }
        }
        Err(self.cursor.unexpected("`int` or `string` as map key kind"))
    }

    /// inlineShape := '{' field (',' field)* ','? '}' '!'?
    ///
    /// A trailing `!` marks the shape closed (undeclared keys rejected).
    fn parse_inline_shape(&mut self) -> Result<TypeExpr, ParseError> {
        self.cursor.expect(TokenKind::LBrace, "`{`")?;
        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_field()?);
            if self.cursor.eat(TokenKind::Comma) {
                // Trailing comma before `}` is allowed.
                if self.cursor.check(TokenKind::RBrace) {
                    break;
                }
            } else {
                break;
            }
        }
        self.cursor
            .expect_closing(TokenKind::RBrace, '{', "`}` to close shape")?;
        let closed = self.cursor.eat(TokenKind::Bang);
        Ok(TypeExpr::InlineShape(ShapeBody { fields, closed }))
    }

    /// field := key '?'? ':' type
    fn parse_field(&mut self) -> Result<ShapeField, ParseError> {
        let key = match self.cursor.current().kind {
            TokenKind::Ident(name) => {
                self.cursor.advance();
                FieldKey::Str(name)
            }
            TokenKind::Int(n) => {
                self.cursor.advance();
                FieldKey::Int(n)
            }
            _ => return Err(self.cursor.unexpected("a field key")),
        };
        let optional = self.cursor.eat(TokenKind::Question);
        self.cursor.expect(TokenKind::Colon, "`:` after field key")?;
        let ty = self.parse_type()?;
        Ok(ShapeField { key, ty, optional })
    }

    /// Fail unless the whole input was consumed.
    pub(crate) fn expect_end(&mut self) -> Result<(), ParseError> {
        if self.cursor.is_at_end() {
            Ok(())
        } else {
            Err(self.cursor.unexpected("end of type expression"))
        }
    }
}
