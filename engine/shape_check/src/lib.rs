//! Structural validation of runtime values against declared types.
//!
//! The crate splits into four layers:
//!
//! - [`validator`]: the recursive walk of a `Value` against a `TypeExpr`,
//!   producing an [`Outcome`] with a full key/index path on failure.
//! - [`cache`]: the per-call-site validation cache keyed on container
//!   fingerprints, so an unchanged container is never re-walked at the
//!   same site.
//! - [`escape`]: declaration-time analysis of constant literals. A call
//!   site whose value is provably constant is validated once and then
//!   exempted from runtime checks entirely.
//! - [`engine`]: the facade hosts talk to. Declare a type per call site,
//!   then check values against it.
//!
//! Validation distinguishes two failure classes. A [`Violation`] means the
//! value does not conform; it is data, not an error, and carries enough to
//! render a precise message. A type-definition defect (an unresolved or
//! wrong-kind reference reached during a walk) is a configuration error
//! and surfaces as `Err`, never as an invalid outcome.

mod cache;
mod engine;
mod escape;
mod outcome;
mod validator;

pub use engine::{CallSiteId, CheckError, DeclareError, Engine, EngineError, EngineStats};
pub use escape::{ConstExpr, ConstKey};
pub use outcome::{Outcome, Violation, ViolationKind};
pub use validator::{InstancePredicate, NominalInstanceOf, Validator};

#[cfg(test)]
mod tests;
