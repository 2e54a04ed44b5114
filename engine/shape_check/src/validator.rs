//! The recursive structural walk.
//!
//! Depth-first, left-to-right, stopping at the first violation. The only
//! allocation on the success path is the reused [`ValuePath`]; everything
//! failure-related (rendered type strings, path clones) happens once, at
//! the failure site.

use std::sync::Arc;

use shape_ir::{
    FieldKey, KeyKind, MapKey, Name, PathStep, ScalarKind, ShapeBody, ShapeField, StringInterner,
    TypeExpr, Value, ValueKind, ValuePath,
};
use shape_registry::{ResolveError, ResolvedRef, ShapeRegistry};

use crate::outcome::{Outcome, Violation, ViolationKind};

/// Host-supplied judgement of nominal class membership.
///
/// The engine never inspects object internals; it asks the host whether a
/// given value is an instance of a named class.
pub trait InstancePredicate: Send + Sync {
    fn is_instance_of(&self, value: &Value, class: Name) -> bool;
}

/// Default predicate: an object is an instance of a class when its class
/// name matches, or a registered parent chain leads to it.
pub struct NominalInstanceOf {
    registry: Arc<ShapeRegistry>,
}

impl NominalInstanceOf {
    pub fn new(registry: Arc<ShapeRegistry>) -> Self {
        NominalInstanceOf { registry }
    }
}

impl InstancePredicate for NominalInstanceOf {
    fn is_instance_of(&self, value: &Value, class: Name) -> bool {
        let Value::Object(obj) = value else {
            return false;
        };
        let mut current = obj.class;
        loop {
            if current == class {
                return true;
            }
            match self.registry.resolve_class(current) {
                Ok(entry) => match entry.parent {
                    Some(parent) => current = parent,
                    None => return false,
                },
                // The value's own class need not be registered; treat it
                // as a chain of length one.
                Err(_) => return false,
            }
        }
    }
}

/// Validates one value against one type expression.
pub struct Validator<'a> {
    registry: &'a ShapeRegistry,
    classes: &'a dyn InstancePredicate,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a ShapeRegistry, classes: &'a dyn InstancePredicate) -> Self {
        Validator { registry, classes }
    }

    /// Walk `value` against `ty`. `Err` means the type definition itself
    /// is defective (unresolved or wrong-kind reference), not that the
    /// value failed.
    pub fn validate(&self, value: &Value, ty: &TypeExpr) -> Result<Outcome, ResolveError> {
        let mut path = ValuePath::root();
        self.check_node(value, ty, &mut path)
    }

    fn interner(&self) -> &StringInterner {
        self.registry.interner()
    }

    fn check_node(
        &self,
        value: &Value,
        ty: &TypeExpr,
        path: &mut ValuePath,
    ) -> Result<Outcome, ResolveError> {
        match ty {
            TypeExpr::Scalar(kind) => Ok(self.check_scalar(value, *kind, path)),
            TypeExpr::Nullable(inner) => {
                if matches!(value, Value::Null) {
                    Ok(Outcome::Valid)
                } else {
                    self.check_node(value, inner, path)
                }
            }
            TypeExpr::ListOf(element) => self.check_list(value, element, ty, path),
            TypeExpr::MapOf(key_kind, value_ty) => {
                self.check_map(value, *key_kind, value_ty, ty, path)
            }
            TypeExpr::InlineShape(body) => {
                let expected = ty.display(self.interner()).to_string();
                self.check_shape(value, body, &expected, path)
            }
            TypeExpr::ShapeRef(name) => match self.registry.resolve(*name)? {
                ResolvedRef::Shape(entry) => {
                    let expected = self.interner().lookup(entry.name).to_owned();
                    self.check_shape(value, entry.body(), &expected, path)
                }
                ResolvedRef::Class(entry) => Ok(self.check_instance(value, entry.name, path)),
            },
            TypeExpr::ClassRef(name) => {
                let entry = self.registry.resolve_class(*name)?;
                Ok(self.check_instance(value, entry.name, path))
            }
            TypeExpr::Union(alternatives) => self.check_union(value, alternatives, ty, path),
        }
    }

    fn check_scalar(&self, value: &Value, kind: ScalarKind, path: &ValuePath) -> Outcome {
        let ok = match kind {
            ScalarKind::Mixed => true,
            ScalarKind::Int => matches!(value, Value::Int(_)),
            ScalarKind::Float => matches!(value, Value::Float(_)),
            ScalarKind::String => matches!(value, Value::Str(_)),
            ScalarKind::Bool => matches!(value, Value::Bool(_)),
            ScalarKind::Null => matches!(value, Value::Null),
        };
        if ok {
            Outcome::Valid
        } else {
            self.wrong_kind(kind.keyword().to_owned(), value.kind(), path)
        }
    }

    fn check_list(
        &self,
        value: &Value,
        element: &TypeExpr,
        ty: &TypeExpr,
        path: &mut ValuePath,
    ) -> Result<Outcome, ResolveError> {
        let Value::List(list) = value else {
            let expected = ty.display(self.interner()).to_string();
            return Ok(self.wrong_kind(expected, value.kind(), path));
        };
        // Empty lists conform to every element type.
        let elems = list.read();
        for (index, elem) in elems.iter().enumerate() {
            path.push(PathStep::Index(index));
            match self.check_node(elem, element, path)? {
                Outcome::Valid => path.pop(),
                invalid => return Ok(invalid),
            }
        }
        Ok(Outcome::Valid)
    }

    fn check_map(
        &self,
        value: &Value,
        key_kind: KeyKind,
        value_ty: &TypeExpr,
        ty: &TypeExpr,
        path: &mut ValuePath,
    ) -> Result<Outcome, ResolveError> {
        let Value::Map(map) = value else {
            let expected = ty.display(self.interner()).to_string();
            return Ok(self.wrong_kind(expected, value.kind(), path));
        };
        let entries = map.read();
        for (&key, entry) in entries.iter() {
            let (step, key_ok) = match key {
                MapKey::Int(n) => (PathStep::IntKey(n), key_kind == KeyKind::Int),
                MapKey::Str(name) => (PathStep::Key(name), key_kind == KeyKind::String),
            };
            path.push(step);
            if !key_ok {
                let actual = match key {
                    MapKey::Int(_) => ValueKind::Int,
                    MapKey::Str(_) => ValueKind::Str,
                };
                let expected = format!("{} key", key_kind.keyword());
                return Ok(self.wrong_kind(expected, actual, path));
            }
            match self.check_node(entry, value_ty, path)? {
                Outcome::Valid => path.pop(),
                invalid => return Ok(invalid),
            }
        }
        Ok(Outcome::Valid)
    }

    /// Validate a shape against a keyed container. Maps are the natural
    /// carrier; lists are accepted too, with indices standing in for
    /// integer keys, so tuples flow through the same machinery.
    fn check_shape(
        &self,
        value: &Value,
        body: &ShapeBody,
        expected: &str,
        path: &mut ValuePath,
    ) -> Result<Outcome, ResolveError> {
        match value {
            Value::Map(map) => {
                let entries = map.read();
                for field in &body.fields {
                    let map_key = match field.key {
                        FieldKey::Str(name) => MapKey::Str(name),
                        FieldKey::Int(n) => MapKey::Int(n),
                    };
                    let outcome = self.check_field(entries.get(&map_key), field, path)?;
                    if !outcome.is_valid() {
                        return Ok(outcome);
                    }
                }
                if body.closed {
                    for &key in entries.keys() {
                        let field_key = match key {
                            MapKey::Str(name) => FieldKey::Str(name),
                            MapKey::Int(n) => FieldKey::Int(n),
                        };
                        if !body.declares(field_key) {
                            return Ok(self.unexpected_key(field_key, expected, path));
                        }
                    }
                }
                Ok(Outcome::Valid)
            }
            Value::List(list) => {
                let elems = list.read();
                for field in &body.fields {
                    let slot = match field.key {
                        FieldKey::Int(n) if n >= 0 => elems.get(n as usize),
                        _ => None,
                    };
                    let outcome = self.check_field(slot, field, path)?;
                    if !outcome.is_valid() {
                        return Ok(outcome);
                    }
                }
                if body.closed {
                    for index in 0..elems.len() {
                        let field_key = FieldKey::Int(index as i64);
                        if !body.declares(field_key) {
                            return Ok(self.unexpected_key(field_key, expected, path));
                        }
                    }
                }
                Ok(Outcome::Valid)
            }
            other => Ok(self.wrong_kind(expected.to_owned(), other.kind(), path)),
        }
    }

    fn check_field(
        &self,
        slot: Option<&Value>,
        field: &ShapeField,
        path: &mut ValuePath,
    ) -> Result<Outcome, ResolveError> {
        let step = match field.key {
            FieldKey::Str(name) => PathStep::Key(name),
            FieldKey::Int(n) => PathStep::IntKey(n),
        };
        match slot {
            None if field.optional => Ok(Outcome::Valid),
            None => {
                path.push(step);
                let violation = Violation {
                    kind: ViolationKind::MissingKey(field.key),
                    path: path.clone(),
                    expected: field.ty.display(self.interner()).to_string(),
                    actual: None,
                };
                path.pop();
                Ok(Outcome::Invalid(violation))
            }
            Some(value) => {
                path.push(step);
                match self.check_node(value, &field.ty, path)? {
                    Outcome::Valid => {
                        path.pop();
                        Ok(Outcome::Valid)
                    }
                    invalid => Ok(invalid),
                }
            }
        }
    }

    fn check_union(
        &self,
        value: &Value,
        alternatives: &[TypeExpr],
        ty: &TypeExpr,
        path: &mut ValuePath,
    ) -> Result<Outcome, ResolveError> {
        let depth = path.len();
        let mut attempts = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            match self.check_node(value, alternative, path)? {
                Outcome::Valid => return Ok(Outcome::Valid),
                Outcome::Invalid(violation) => {
                    attempts.push(violation);
                    path.truncate(depth);
                }
            }
        }
        Ok(Outcome::Invalid(Violation {
            kind: ViolationKind::UnionExhausted(attempts),
            path: path.clone(),
            expected: ty.display(self.interner()).to_string(),
            actual: Some(value.kind()),
        }))
    }

    fn check_instance(&self, value: &Value, class: Name, path: &ValuePath) -> Outcome {
        if self.classes.is_instance_of(value, class) {
            Outcome::Valid
        } else {
            self.wrong_kind(
                self.interner().lookup(class).to_owned(),
                value.kind(),
                path,
            )
        }
    }

    fn wrong_kind(&self, expected: String, actual: ValueKind, path: &ValuePath) -> Outcome {
        Outcome::Invalid(Violation {
            kind: ViolationKind::WrongKind,
            path: path.clone(),
            expected,
            actual: Some(actual),
        })
    }

    fn unexpected_key(&self, key: FieldKey, shape_name: &str, path: &mut ValuePath) -> Outcome {
        let step = match key {
            FieldKey::Str(name) => PathStep::Key(name),
            FieldKey::Int(n) => PathStep::IntKey(n),
        };
        path.push(step);
        let violation = Violation {
            kind: ViolationKind::UnexpectedKey(key),
            path: path.clone(),
            expected: shape_name.to_owned(),
            actual: None,
        };
        path.pop();
        Outcome::Invalid(violation)
    }
}
