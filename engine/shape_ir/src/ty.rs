//! The type AST.
//!
//! `TypeExpr` is the tree produced by `shape_parse` and walked by the
//! validator. Nodes are built once at declaration time and immutable
//! afterwards; that immutability is what makes sharing parsed declarations
//! across worker threads (and caching validation results) sound.
//!
//! Structural equality and hashing are derived so hosts can deduplicate
//! declarations; `display` renders the same surface syntax the parser
//! accepts, for use in diagnostics.

use std::fmt;

use crate::{Name, StringInterner};

/// Scalar type kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Float,
    String,
    Bool,
    Null,
    /// Accepts any value.
    Mixed,
}

impl ScalarKind {
    /// Surface-syntax keyword for this kind.
    pub const fn keyword(self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::Null => "null",
            ScalarKind::Mixed => "mixed",
        }
    }
}

/// Permitted key kinds for `Map<K, V>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Int,
    String,
}

impl KeyKind {
    /// Surface-syntax keyword for this kind.
    pub const fn keyword(self) -> &'static str {
        match self {
            KeyKind::Int => "int",
            KeyKind::String => "string",
        }
    }
}

/// A shape field key: either an interned string or an integer.
///
/// Integer keys make tuples expressible through the same shape mechanism
/// as records (`{0: int, 1: string}`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Str(Name),
    Int(i64),
}

impl FieldKey {
    /// Render for diagnostics: string keys quoted, integer keys bare.
    pub fn display(self, interner: &StringInterner) -> String {
        match self {
            FieldKey::Str(name) => format!("'{}'", interner.lookup(name)),
            FieldKey::Int(n) => n.to_string(),
        }
    }
}

/// A single declared field of a shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeField {
    pub key: FieldKey,
    pub ty: TypeExpr,
    /// Optional fields may be entirely absent from a conforming value.
    pub optional: bool,
}

/// The field list of an inline or registered shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ShapeBody {
    pub fields: Vec<ShapeField>,
    /// Closed shapes reject keys not present in `fields`.
    /// Open shapes ignore extra keys. Not inherited, never cascades
    /// into nested sub-shapes.
    pub closed: bool,
}

impl ShapeBody {
    /// Look up a declared field by key.
    pub fn field(&self, key: FieldKey) -> Option<&ShapeField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Whether `key` is declared by this shape.
    pub fn declares(&self, key: FieldKey) -> bool {
        self.field(key).is_some()
    }

    /// Iterate the declared keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.fields.iter().map(|f| f.key)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A parsed type expression.
///
/// Closed sum type: the validator matches exhaustively over these, so a new
/// kind is a compile-time-checked addition rather than a runtime dispatch
/// chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Scalar(ScalarKind),
    /// Accepts `null` or a value matching the inner type.
    Nullable(Box<TypeExpr>),
    /// Homogeneous sequence.
    ListOf(Box<TypeExpr>),
    /// Homogeneous keyed mapping.
    MapOf(KeyKind, Box<TypeExpr>),
    /// Reference to a registered shape (or class) name, resolved lazily at
    /// validation time. Never inlined, so registered shapes may reference
    /// each other (and themselves under `List`/`Map`) freely.
    ShapeRef(Name),
    /// Anonymous shape literal.
    InlineShape(ShapeBody),
    /// Nominal object type, checked via the host's is-instance-of predicate.
    ClassRef(Name),
    /// Value must match at least one alternative. Always has >= 2 entries.
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    /// Wrap in `Nullable`, collapsing `??T` to `?T`.
    pub fn nullable(inner: TypeExpr) -> TypeExpr {
        match inner {
            already @ TypeExpr::Nullable(_) => already,
            other => TypeExpr::Nullable(Box::new(other)),
        }
    }

    /// Build a `List<T>`.
    pub fn list_of(element: TypeExpr) -> TypeExpr {
        TypeExpr::ListOf(Box::new(element))
    }

    /// Build a `Map<K, V>`.
    pub fn map_of(key: KeyKind, value: TypeExpr) -> TypeExpr {
        TypeExpr::MapOf(key, Box::new(value))
    }

    /// Whether this type accepts `null` directly.
    pub fn accepts_null(&self) -> bool {
        match self {
            TypeExpr::Nullable(_) => true,
            TypeExpr::Scalar(ScalarKind::Null | ScalarKind::Mixed) => true,
            TypeExpr::Union(alts) => alts.iter().any(TypeExpr::accepts_null),
            _ => false,
        }
    }

    /// Element type of a `List<T>` or value type of a `Map<K, V>`.
    pub fn element_type(&self) -> Option<&TypeExpr> {
        match self {
            TypeExpr::ListOf(elem) => Some(elem),
            TypeExpr::MapOf(_, value) => Some(value),
            _ => None,
        }
    }

    /// The inline shape body, if this is an `InlineShape`.
    pub fn shape_body(&self) -> Option<&ShapeBody> {
        match self {
            TypeExpr::InlineShape(body) => Some(body),
            _ => None,
        }
    }

    /// Union alternatives, if this is a `Union`.
    pub fn alternatives(&self) -> Option<&[TypeExpr]> {
        match self {
            TypeExpr::Union(alts) => Some(alts),
            _ => None,
        }
    }

    /// Render in surface syntax. The returned value implements `Display`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, interner }
    }
}

/// Displays a `TypeExpr` in the surface syntax the parser accepts.
pub struct TypeDisplay<'a> {
    ty: &'a TypeExpr,
    interner: &'a StringInterner,
}

impl TypeDisplay<'_> {
    fn fmt_ty(&self, ty: &TypeExpr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match ty {
            TypeExpr::Scalar(kind) => f.write_str(kind.keyword()),
            TypeExpr::Nullable(inner) => {
                f.write_str("?")?;
                // Unions bind looser than `?`, so parenthesize for re-parseability.
                if matches!(**inner, TypeExpr::Union(_)) {
                    f.write_str("(")?;
                    self.fmt_ty(inner, f)?;
                    f.write_str(")")
                } else {
                    self.fmt_ty(inner, f)
                }
            }
            TypeExpr::ListOf(elem) => {
                f.write_str("List<")?;
                self.fmt_ty(elem, f)?;
                f.write_str(">")
            }
            TypeExpr::MapOf(key, value) => {
                write!(f, "Map<{}, ", key.keyword())?;
                self.fmt_ty(value, f)?;
                f.write_str(">")
            }
            TypeExpr::ShapeRef(name) | TypeExpr::ClassRef(name) => {
                f.write_str(self.interner.lookup(*name))
            }
            TypeExpr::InlineShape(body) => {
                f.write_str("{")?;
                for (i, field) in body.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match field.key {
                        FieldKey::Str(name) => f.write_str(self.interner.lookup(name))?,
                        FieldKey::Int(n) => write!(f, "{n}")?,
                    }
                    if field.optional {
                        f.write_str("?")?;
                    }
                    f.write_str(": ")?;
                    self.fmt_ty(&field.ty, f)?;
                }
                f.write_str("}")?;
                if body.closed {
                    f.write_str("!")?;
                }
                Ok(())
            }
            TypeExpr::Union(alts) => {
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    self.fmt_ty(alt, f)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_ty(self.ty, f)
    }
}
