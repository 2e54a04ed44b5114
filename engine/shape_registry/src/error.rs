//! Registration and resolution errors.
//!
//! Registration errors are startup-fatal by design: they describe broken
//! type declarations, and the propagation policy is to stop program
//! startup rather than validate values against a half-built registry.

use shape_diagnostic::{Diagnostic, ErrorCode};
use shape_parse::ParseError;
use thiserror::Error;

use crate::DeclKind;

/// Error while registering a shape or class declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A declaration with this name already exists. Idempotent
    /// re-registration is deliberately unsupported so accidental duplicate
    /// definitions surface early.
    #[error("cannot redeclare `{name}`: a {existing} with that name is already registered")]
    Duplicate { name: String, existing: DeclKind },

    /// The `extends` clause names something that is not registered.
    #[error("`{child}` extends unknown name `{parent}`")]
    UnknownParent { child: String, parent: String },

    /// A shape attempted to extend a class.
    #[error("shape `{child}` cannot extend `{parent}`: `{parent}` is a class, not a shape")]
    ShapeExtendsClass { child: String, parent: String },

    /// A class attempted to extend a shape.
    #[error("class `{child}` cannot extend `{parent}`: `{parent}` is a shape, not a class")]
    ClassExtendsShape { child: String, parent: String },

    /// Registration was attempted after `seal()`.
    #[error("registry is sealed: `{name}` must be registered during the startup phase")]
    Sealed { name: String },

    /// The shape-reference graph contains a cycle with no intervening
    /// `List`/`Map`, which would make validation recurse at equal type
    /// depth on every value level.
    #[error("cyclic shape reference: {chain}")]
    CyclicShape { chain: String },

    /// One declaration lists the same key twice.
    #[error("duplicate key {key} in declaration of `{name}`")]
    DuplicateKey { name: String, key: String },

    /// The declared body text parsed to something other than a shape
    /// literal.
    #[error("body of `{name}` must be a shape literal `{{...}}`, got `{got}`")]
    BodyNotAShape { name: String, got: String },

    /// The declared body text did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl RegistryError {
    /// Convert to a diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            RegistryError::Duplicate { .. } => ErrorCode::E1001,
            RegistryError::UnknownParent { .. } => ErrorCode::E1002,
            RegistryError::ShapeExtendsClass { .. } => ErrorCode::E1003,
            RegistryError::ClassExtendsShape { .. } => ErrorCode::E1004,
            RegistryError::Sealed { .. } => ErrorCode::E1005,
            RegistryError::CyclicShape { .. } => ErrorCode::E1006,
            RegistryError::DuplicateKey { .. } => ErrorCode::E1007,
            RegistryError::BodyNotAShape { .. } => ErrorCode::E1001,
            RegistryError::Parse(parse) => return parse.to_diagnostic(),
        };
        Diagnostic::error(code).with_message(self.to_string())
    }
}

/// Error while resolving a name against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The name is not registered at all.
    #[error("unknown type name `{name}`")]
    Unknown { name: String },

    /// The name is registered, but as the other kind of declaration.
    #[error("`{name}` is a {found}, expected a {expected}")]
    WrongKind {
        name: String,
        expected: DeclKind,
        found: DeclKind,
    },
}

impl ResolveError {
    /// Convert to a diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            ResolveError::Unknown { .. } => ErrorCode::E9001,
            ResolveError::WrongKind { .. } => ErrorCode::E9002,
        };
        Diagnostic::error(code).with_message(self.to_string())
    }
}
