//! Diagnostic value paths.
//!
//! A `ValuePath` records the key/index trail from the root value down to
//! the point where validation failed. It is used only for diagnostics,
//! never for validation logic.

use std::fmt;

use smallvec::SmallVec;

use crate::{Name, StringInterner};

/// One step into a nested value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// List element index.
    Index(usize),
    /// String map key / shape field.
    Key(Name),
    /// Integer map key / shape field.
    IntKey(i64),
}

/// Accumulating key/index trail for diagnostics.
///
/// Backed by a `SmallVec` sized for typical nesting; paths deeper than the
/// inline capacity spill to the heap, which only happens on the failure
/// path anyway.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ValuePath(SmallVec<[PathStep; 8]>);

impl ValuePath {
    /// Empty path (the root value).
    pub fn root() -> Self {
        ValuePath(SmallVec::new())
    }

    /// Append a step.
    pub fn push(&mut self, step: PathStep) {
        self.0.push(step);
    }

    /// Remove the most recent step.
    pub fn pop(&mut self) {
        self.0.pop();
    }

    /// Truncate back to `len` steps. Used to restore the path when
    /// backtracking out of a failed union alternative.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// The steps from root to leaf.
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render for diagnostics, e.g. `$value[2]["name"]`. The root path
    /// renders as plain `$value`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> PathDisplay<'a> {
        PathDisplay {
            path: self,
            interner,
        }
    }
}

/// Displays a `ValuePath` in subscript notation.
pub struct PathDisplay<'a> {
    path: &'a ValuePath,
    interner: &'a StringInterner,
}

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$value")?;
        for step in self.path.steps() {
            match step {
                PathStep::Index(i) => write!(f, "[{i}]")?,
                PathStep::Key(name) => write!(f, "[\"{}\"]", self.interner.lookup(*name))?,
                PathStep::IntKey(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}
