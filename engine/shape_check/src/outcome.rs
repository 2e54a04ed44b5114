//! Validation outcomes and structured violation reports.

use shape_diagnostic::{Diagnostic, ErrorCode};
use shape_ir::{FieldKey, StringInterner, ValueKind, ValuePath};

/// Result of validating a conforming-or-not value.
///
/// Only describes the value; definition defects (unresolved references)
/// travel as `Err` on the validation call itself.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Valid,
    Invalid(Violation),
}

impl Outcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid)
    }

    /// The violation, if the outcome is invalid.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Outcome::Valid => None,
            Outcome::Invalid(v) => Some(v),
        }
    }
}

/// What went wrong at the failure site.
#[derive(Clone, Debug, PartialEq)]
pub enum ViolationKind {
    /// The value at the path has the wrong runtime kind for its type.
    WrongKind,
    /// A required shape field is absent. The path points at the missing
    /// slot itself.
    MissingKey(FieldKey),
    /// A closed shape received a key it does not declare.
    UnexpectedKey(FieldKey),
    /// No alternative of a union accepted the value. Carries the
    /// first-failure report of every alternative, in declaration order.
    UnionExhausted(Vec<Violation>),
}

/// A single validation failure.
///
/// Walks stop at the first violation, so one check produces at most one
/// of these (unions nest their per-alternative failures inside).
#[derive(Clone, Debug, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Key/index trail from the checked value's root to the failure.
    pub path: ValuePath,
    /// The expected type, rendered in surface syntax.
    pub expected: String,
    /// Runtime kind of the offending value. `None` when nothing was
    /// there, as for a missing key.
    pub actual: Option<ValueKind>,
}

impl Violation {
    /// Render a host-facing message, e.g.
    /// `$value[2]["name"] must be of type string, int given`.
    pub fn message(&self, interner: &StringInterner) -> String {
        let path = self.path.display(interner);
        match &self.kind {
            ViolationKind::WrongKind | ViolationKind::UnionExhausted(_) => {
                let actual = self.actual.map_or("none", ValueKind::name);
                format!(
                    "{path} must be of type {}, {actual} given",
                    self.expected
                )
            }
            ViolationKind::MissingKey(key) => {
                // The path points at the missing slot; the message names
                // the containing value.
                let mut parent = self.path.clone();
                parent.pop();
                format!(
                    "{} is missing required key {} of type {}",
                    parent.display(interner),
                    key.display(interner),
                    self.expected
                )
            }
            ViolationKind::UnexpectedKey(key) => {
                format!(
                    "{path} contains key {} not declared by closed shape {}",
                    key.display(interner),
                    self.expected
                )
            }
        }
    }

    /// Convert to a diagnostic, with per-alternative notes for unions.
    pub fn to_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        let code = match &self.kind {
            ViolationKind::WrongKind => ErrorCode::E2001,
            ViolationKind::MissingKey(_) => ErrorCode::E2002,
            ViolationKind::UnexpectedKey(_) => ErrorCode::E2003,
            ViolationKind::UnionExhausted(_) => ErrorCode::E2004,
        };
        let mut diag = Diagnostic::error(code).with_message(self.message(interner));
        if let ViolationKind::UnionExhausted(attempts) = &self.kind {
            for attempt in attempts {
                diag = diag.with_note(attempt.message(interner));
            }
        }
        diag
    }
}
