//! Diagnostic and error reporting for the shape validation engine.
//!
//! The engine's core components emit structured errors (parse errors,
//! registration errors, validation violations); this crate provides the
//! shared presentation layer they convert into:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Labeled spans into the type-expression text (where it went wrong)
//! - Notes providing context
//!
//! Rendering to a human-readable string is a presentation concern; hosts
//! that translate `Outcome::Invalid` into their own error-signaling
//! mechanism can ignore this crate entirely and consume the structured
//! violations directly.

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
