//! The registry itself.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use shape_ir::{Name, ShapeBody, SharedInterner, StringInterner, TypeExpr};
use shape_parse::parse_type_expr;
use tracing::debug;

use crate::{
    cycle, ClassEntry, DeclKind, RegistryError, ResolveError, ResolvedRef, ShapeDecl, ShapeEntry,
};

/// Registry of named shapes and nominal classes.
///
/// Dual storage: shapes in a `BTreeMap` for deterministic iteration (stable
/// diagnostics and introspection order), classes in an `FxHashMap` (lookup
/// only). A registry never contains two declarations with the same name,
/// across both kinds.
pub struct ShapeRegistry {
    interner: SharedInterner,
    shapes: BTreeMap<Name, ShapeEntry>,
    classes: FxHashMap<Name, ClassEntry>,
    sealed: bool,
}

impl ShapeRegistry {
    /// Create an empty, unsealed registry.
    pub fn new(interner: SharedInterner) -> Self {
        ShapeRegistry {
            interner,
            shapes: BTreeMap::new(),
            classes: FxHashMap::default(),
            sealed: false,
        }
    }

    /// The interner shared with parsed declarations and values.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Whether the registration phase is over.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Declare a shape from source text.
    ///
    /// `body` must be a shape literal (`{...}`, optionally `{...}!` for a
    /// closed shape); `extends` names an already-registered shape whose
    /// flattened fields are copied under the child's own.
    pub fn declare_shape(
        &mut self,
        name: &str,
        extends: Option<&str>,
        body: &str,
    ) -> Result<(), RegistryError> {
        let parsed = parse_type_expr(body, &self.interner)?;
        let TypeExpr::InlineShape(shape_body) = parsed else {
            return Err(RegistryError::BodyNotAShape {
                name: name.to_owned(),
                got: parsed.display(&self.interner).to_string(),
            });
        };
        let name = self.interner.intern(name);
        self.register_shape(ShapeDecl {
            name,
            qualified: name,
            parent: extends.map(|p| self.interner.intern(p)),
            body: shape_body,
        })
    }

    /// Register a programmatically constructed shape declaration.
    pub fn register_shape(&mut self, decl: ShapeDecl) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed {
                name: self.display(decl.name).to_owned(),
            });
        }
        self.check_fresh(decl.name)?;
        self.check_own_keys(decl.name, &decl.body)?;

        let flattened = match decl.parent {
            None => decl.body,
            Some(parent) => {
                let parent_entry = self.parent_shape(decl.name, parent)?;
                flatten(parent_entry.body(), decl.body)
            }
        };

        debug!(
            shape = self.display(decl.name),
            fields = flattened.len(),
            closed = flattened.closed,
            "registered shape"
        );
        self.shapes.insert(
            decl.name,
            ShapeEntry::new(decl.name, decl.qualified, flattened),
        );
        Ok(())
    }

    /// Declare a nominal class, optionally extending another class.
    ///
    /// The engine tracks classes only to reject cross-kind inheritance and
    /// to resolve `ClassRef` names; instance membership stays with the
    /// host predicate.
    pub fn declare_class(&mut self, name: &str, extends: Option<&str>) -> Result<(), RegistryError> {
        let name = self.interner.intern(name);
        if self.sealed {
            return Err(RegistryError::Sealed {
                name: self.display(name).to_owned(),
            });
        }
        self.check_fresh(name)?;

        let parent = match extends {
            None => None,
            Some(parent_str) => {
                let parent = self.interner.intern(parent_str);
                if self.shapes.contains_key(&parent) {
                    return Err(RegistryError::ClassExtendsShape {
                        child: self.display(name).to_owned(),
                        parent: parent_str.to_owned(),
                    });
                }
                if !self.classes.contains_key(&parent) {
                    return Err(RegistryError::UnknownParent {
                        child: self.display(name).to_owned(),
                        parent: parent_str.to_owned(),
                    });
                }
                Some(parent)
            }
        };

        debug!(class = self.display(name), "registered class");
        self.classes.insert(name, ClassEntry { name, parent });
        Ok(())
    }

    /// End the registration phase.
    ///
    /// Runs cycle detection over the shape-reference graph; on success the
    /// registry becomes read-only and safe to share across workers.
    pub fn seal(&mut self) -> Result<(), RegistryError> {
        let interner = self.interner.clone();
        cycle::check(&self.shapes, |name| interner.lookup(name))?;
        self.sealed = true;
        debug!(
            shapes = self.shapes.len(),
            classes = self.classes.len(),
            "registry sealed"
        );
        Ok(())
    }

    /// Resolve a name to either kind of declaration.
    pub fn resolve(&self, name: Name) -> Result<ResolvedRef<'_>, ResolveError> {
        if let Some(shape) = self.shapes.get(&name) {
            return Ok(ResolvedRef::Shape(shape));
        }
        if let Some(class) = self.classes.get(&name) {
            return Ok(ResolvedRef::Class(class));
        }
        Err(ResolveError::Unknown {
            name: self.display(name).to_owned(),
        })
    }

    /// Resolve a name that must be a shape.
    pub fn resolve_shape(&self, name: Name) -> Result<&ShapeEntry, ResolveError> {
        match self.resolve(name)? {
            ResolvedRef::Shape(entry) => Ok(entry),
            ResolvedRef::Class(_) => Err(ResolveError::WrongKind {
                name: self.display(name).to_owned(),
                expected: DeclKind::Shape,
                found: DeclKind::Class,
            }),
        }
    }

    /// Resolve a name that must be a class.
    pub fn resolve_class(&self, name: Name) -> Result<&ClassEntry, ResolveError> {
        match self.resolve(name)? {
            ResolvedRef::Class(entry) => Ok(entry),
            ResolvedRef::Shape(_) => Err(ResolveError::WrongKind {
                name: self.display(name).to_owned(),
                expected: DeclKind::Class,
                found: DeclKind::Shape,
            }),
        }
    }

    /// Iterate registered shapes in name order.
    pub fn shapes(&self) -> impl Iterator<Item = &ShapeEntry> {
        self.shapes.values()
    }

    fn display(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn check_fresh(&self, name: Name) -> Result<(), RegistryError> {
        let existing = if self.shapes.contains_key(&name) {
            Some(DeclKind::Shape)
        } else if self.classes.contains_key(&name) {
            Some(DeclKind::Class)
        } else {
            None
        };
        match existing {
            Some(existing) => Err(RegistryError::Duplicate {
                name: self.display(name).to_owned(),
                existing,
            }),
            None => Ok(()),
        }
    }

    fn check_own_keys(&self, name: Name, body: &ShapeBody) -> Result<(), RegistryError> {
        for (i, field) in body.fields.iter().enumerate() {
            if body.fields[..i].iter().any(|f| f.key == field.key) {
                return Err(RegistryError::DuplicateKey {
                    name: self.display(name).to_owned(),
                    key: field.key.display(&self.interner),
                });
            }
        }
        Ok(())
    }

    fn parent_shape(&self, child: Name, parent: Name) -> Result<&ShapeEntry, RegistryError> {
        if self.classes.contains_key(&parent) {
            return Err(RegistryError::ShapeExtendsClass {
                child: self.display(child).to_owned(),
                parent: self.display(parent).to_owned(),
            });
        }
        self.shapes
            .get(&parent)
            .ok_or_else(|| RegistryError::UnknownParent {
                child: self.display(child).to_owned(),
                parent: self.display(parent).to_owned(),
            })
    }
}

/// Flatten a child body onto its parent's (already flattened) body.
///
/// Parent fields keep their positions; a child field with the same key
/// replaces the parent's in place; child-only fields are appended in
/// declaration order. `closed` is not inherited: the child's own flag wins.
fn flatten(parent: &ShapeBody, child: ShapeBody) -> ShapeBody {
    let mut fields = parent.fields.clone();
    for field in child.fields {
        match fields.iter_mut().find(|f| f.key == field.key) {
            Some(slot) => *slot = field,
            None => fields.push(field),
        }
    }
    ShapeBody {
        fields,
        closed: child.closed,
    }
}
