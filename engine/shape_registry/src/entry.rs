//! Registry entry types and their introspection surface.

use shape_ir::{FieldKey, Name, ShapeBody, ShapeField};

/// The kind of a registered declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Shape,
    Class,
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclKind::Shape => f.write_str("shape"),
            DeclKind::Class => f.write_str("class"),
        }
    }
}

/// A shape declaration as submitted to the registry.
///
/// `qualified` is a display-oriented fully-qualified name for hosts with
/// namespaces; it defaults to `name` and plays no part in resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeDecl {
    pub name: Name,
    pub qualified: Name,
    pub parent: Option<Name>,
    pub body: ShapeBody,
}

/// A registered shape with its inheritance chain already flattened.
///
/// Immutable once the registry is sealed; external tooling can walk the
/// field list, optionality, and closedness without re-parsing anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeEntry {
    pub name: Name,
    pub qualified: Name,
    /// Flattened field list: ancestor fields overridden left-to-right by
    /// descendants, child-only fields appended in declaration order.
    body: ShapeBody,
}

impl ShapeEntry {
    pub(crate) fn new(name: Name, qualified: Name, body: ShapeBody) -> Self {
        ShapeEntry {
            name,
            qualified,
            body,
        }
    }

    /// The flattened field list.
    pub fn fields(&self) -> &[ShapeField] {
        &self.body.fields
    }

    /// Look up a declared field by key.
    pub fn field(&self, key: FieldKey) -> Option<&ShapeField> {
        self.body.field(key)
    }

    /// Iterate declared keys in flattened order.
    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.body.keys()
    }

    /// Whether keys outside the declared set are rejected.
    /// Closedness is per-shape: it is not inherited from parents.
    pub fn is_closed(&self) -> bool {
        self.body.closed
    }

    /// Number of declared fields after flattening.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the shape declares no fields.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// The full shape body, for validation.
    pub fn body(&self) -> &ShapeBody {
        &self.body
    }
}

/// A registered nominal class. The engine only tracks the name and parent
/// (for cross-kind inheritance checks); instance membership is judged by
/// the host's predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntry {
    pub name: Name,
    pub parent: Option<Name>,
}

/// Result of resolving a name: either kind of declaration.
#[derive(Copy, Clone, Debug)]
pub enum ResolvedRef<'a> {
    Shape(&'a ShapeEntry),
    Class(&'a ClassEntry),
}

impl ResolvedRef<'_> {
    /// The kind of the resolved declaration.
    pub fn kind(&self) -> DeclKind {
        match self {
            ResolvedRef::Shape(_) => DeclKind::Shape,
            ResolvedRef::Class(_) => DeclKind::Class,
        }
    }
}
