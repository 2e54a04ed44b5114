//! Shape alias registry.
//!
//! Stores named shape declarations and a nominal class table. Inheritance
//! (`extends`) is resolved at registration time by flattening parent fields
//! into the child; cross-kind inheritance (shape extends class, class
//! extends shape) and redeclaration are rejected when the declaration is
//! made, not when a value is first validated.
//!
//! # Phase discipline
//!
//! A registry is mutable during the startup registration phase and sealed
//! before concurrent validation begins. `seal()` runs cycle detection over
//! the shape-reference graph and flips the registry to read-only; after
//! that it may be shared (`Arc`) and read from any number of workers
//! without locking.

mod cycle;
mod entry;
mod error;
mod registry;

pub use entry::{ClassEntry, DeclKind, ResolvedRef, ShapeDecl, ShapeEntry};
pub use error::{RegistryError, ResolveError};
pub use registry::ShapeRegistry;
