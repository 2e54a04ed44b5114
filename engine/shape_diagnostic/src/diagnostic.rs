use std::fmt;

use shape_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A labeled span into the type-expression text.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    /// Create a label.
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
        }
    }
}

/// A structured diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// Labeled spans showing where in the type expression the error is.
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a labeled span.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    /// Add a contextual note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Render to a plain-text report, optionally quoting the source
    /// type expression under the labels.
    pub fn render(&self, source: Option<&str>) -> String {
        let mut out = format!("{}[{}]: {}", self.severity, self.code, self.message);
        for label in &self.labels {
            out.push('\n');
            match source {
                Some(src) => {
                    out.push_str(&format!(
                        "  --> offset {}: {}\n", label.span.start, label.message
                    ));
                    out.push_str(&format!("   | {src}\n"));
                    let pad = " ".repeat(label.span.start as usize);
                    let width = (label.span.len().max(1)) as usize;
                    out.push_str(&format!("   | {pad}{}", "^".repeat(width)));
                }
                None => {
                    out.push_str(&format!(
                        "  --> offset {}: {}", label.span.start, label.message
                    ));
                }
            }
        }
        for note in &self.notes {
            out.push_str(&format!("\nnote: {note}"));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_code_and_message() {
        let diag = Diagnostic::error(ErrorCode::E2002)
            .with_message("missing required key 'name'")
            .with_note("declared in shape `User`");
        assert_eq!(
            diag.render(None),
            "error[E2002]: missing required key 'name'\nnote: declared in shape `User`"
        );
    }

    #[test]
    fn renders_label_with_source_caret() {
        let diag = Diagnostic::error(ErrorCode::E0001)
            .with_message("unexpected token")
            .with_label(Span::new(5, 6), "expected `>`");
        let report = diag.render(Some("List<int,"));
        assert!(report.contains("offset 5"));
        assert!(report.contains("List<int,"));
        assert!(report.contains("^"));
    }
}
