//! Constant-literal escape analysis.
//!
//! Hosts can describe how the value at a call site is constructed. When
//! the description is fully constant, the engine materializes the value
//! once at declaration time, validates it against the declared type, and
//! exempts the site from all runtime checks. A constant that fails its
//! type is a declaration-time error, not a deferred runtime failure.
//!
//! Any [`ConstExpr::Opaque`] node anywhere in the tree makes the site
//! ineligible: a variable read, call result, or parameter can change
//! between invocations, so the site stays on the normal check path.

use std::collections::BTreeMap;

use shape_ir::{MapKey, StringInterner, Value};

/// A key in a constant map literal.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstKey {
    Int(i64),
    Str(String),
}

/// Host description of how a call-site value is built.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstExpr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ConstExpr>),
    Map(Vec<(ConstKey, ConstExpr)>),
    /// Not provably constant. Poisons every enclosing literal.
    Opaque,
}

impl ConstExpr {
    /// Build the value this literal denotes, or `None` if any part of it
    /// is opaque.
    pub(crate) fn try_materialize(&self, interner: &StringInterner) -> Option<Value> {
        match self {
            ConstExpr::Null => Some(Value::Null),
            ConstExpr::Bool(b) => Some(Value::Bool(*b)),
            ConstExpr::Int(n) => Some(Value::Int(*n)),
            ConstExpr::Float(f) => Some(Value::Float(*f)),
            ConstExpr::Str(s) => Some(Value::string(s)),
            ConstExpr::List(items) => {
                let mut elems = Vec::with_capacity(items.len());
                for item in items {
                    elems.push(item.try_materialize(interner)?);
                }
                Some(Value::list(elems))
            }
            ConstExpr::Map(entries) => {
                let mut map = BTreeMap::new();
                for (key, entry) in entries {
                    let key = match key {
                        ConstKey::Int(n) => MapKey::Int(*n),
                        ConstKey::Str(s) => MapKey::str(interner, s),
                    };
                    // Later duplicates win, matching literal evaluation
                    // order in the host.
                    map.insert(key, entry.try_materialize(interner)?);
                }
                Some(Value::map(map))
            }
            ConstExpr::Opaque => None,
        }
    }
}
