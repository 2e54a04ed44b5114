//! Core representation types for the shape validation engine.
//!
//! This crate has no internal dependencies; every other engine crate builds
//! on it. It provides:
//! - `Name`/`StringInterner`: compact interned identifiers for shape names,
//!   class names, and string keys (string keys are interned the same way the
//!   original runtime interns array keys, so field lookup compares u32s)
//! - `Span`: byte offsets into a type-expression string, for parse errors
//! - `TypeExpr`: the type AST produced by the parser and walked by the
//!   validator, with read-only introspection accessors
//! - `Value`: the dynamically-shaped runtime value model, with container
//!   identity and mutation versioning for the validation cache
//! - `ValuePath`: the key/index trail carried by diagnostics

/// Assert the size of a type at compile time.
///
/// Guards against accidental size regressions in types that are stored
/// in bulk or passed by value on hot paths.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
mod name;
mod path;
mod span;
mod ty;
mod value;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use path::{PathDisplay, PathStep, ValuePath};
pub use span::Span;
pub use ty::{
    FieldKey, KeyKind, ScalarKind, ShapeBody, ShapeField, TypeDisplay, TypeExpr,
};
pub use value::{
    Fingerprint, ListValue, MapKey, MapValue, ObjectValue, Value, ValueKind,
};

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{Name, PathStep, Span};
    static_assert_size!(Name, 4);
    static_assert_size!(Span, 8);
    // PathStep: largest variant is Index(usize)/IntKey(i64) = 8 bytes + tag
    static_assert_size!(PathStep, 16);
}
