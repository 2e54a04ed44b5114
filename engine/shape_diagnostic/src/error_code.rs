use std::fmt;

/// Error codes for all engine diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E0xxx: Type-expression parse errors
/// - E1xxx: Registration errors
/// - E2xxx: Data validation errors
/// - E9xxx: Type-definition defects (fatal configuration errors)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Parse Errors (E0xxx)
    /// Unexpected token in type expression
    E0001,
    /// Unexpected end of type expression
    E0002,
    /// Invalid character in type expression
    E0003,
    /// Unclosed delimiter in type expression
    E0004,
    /// Integer key out of range
    E0005,

    // Registration Errors (E1xxx)
    /// Duplicate shape or class name
    E1001,
    /// Unknown parent in extends clause
    E1002,
    /// Shape extends a class
    E1003,
    /// Class extends a shape
    E1004,
    /// Registration after the registry was sealed
    E1005,
    /// Cyclic shape reference chain
    E1006,
    /// Duplicate key within one shape declaration
    E1007,

    // Data Validation Errors (E2xxx)
    /// Value kind does not match the expected type
    E2001,
    /// Required shape key is absent
    E2002,
    /// Closed shape received an undeclared key
    E2003,
    /// No union alternative matched
    E2004,

    // Type-Definition Defects (E9xxx)
    /// Reference to a shape name absent from the registry
    E9001,
    /// Reference resolved to a declaration of the wrong kind
    E9002,
    /// Constant literal at a call site fails its declared type
    E9003,
}

impl ErrorCode {
    /// Short description of what the code means.
    pub const fn description(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unexpected token in type expression",
            ErrorCode::E0002 => "unexpected end of type expression",
            ErrorCode::E0003 => "invalid character in type expression",
            ErrorCode::E0004 => "unclosed delimiter in type expression",
            ErrorCode::E0005 => "integer key out of range",
            ErrorCode::E1001 => "duplicate shape or class name",
            ErrorCode::E1002 => "unknown parent in extends clause",
            ErrorCode::E1003 => "shape extends a class",
            ErrorCode::E1004 => "class extends a shape",
            ErrorCode::E1005 => "registration after seal",
            ErrorCode::E1006 => "cyclic shape reference chain",
            ErrorCode::E1007 => "duplicate key in shape declaration",
            ErrorCode::E2001 => "value kind mismatch",
            ErrorCode::E2002 => "missing required key",
            ErrorCode::E2003 => "unexpected key in closed shape",
            ErrorCode::E2004 => "no union alternative matched",
            ErrorCode::E9001 => "unresolved shape reference",
            ErrorCode::E9002 => "reference to wrong declaration kind",
            ErrorCode::E9003 => "constant literal fails declared type",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
