//! Build report: non-fatal schema defects collected while building.
//!
//! Fatal problems (duplicate names, hierarchy cycles) abort the build with an
//! [`Error`](crate::Error). Everything else lands here: the model stays
//! usable and the host decides whether to log, display or reject it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of defect a diagnostic describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A slot range names nothing in the schema.
    MissingRange,
    /// No occurrence, slot definition or default supplied a range.
    UnspecifiedRange,
    /// One class supplies the same slot name from more than one source.
    SourceConflict,
    /// A class names a parent that is not a registered class.
    MissingParent,
    /// A variable is mapped onto a class that does not exist.
    MissingMappedClass,
    /// A custom type refines a type that is not registered.
    MissingTypeBase,
}

impl DiagnosticKind {
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticKind::MissingRange => "missing range",
            DiagnosticKind::UnspecifiedRange => "unspecified range",
            DiagnosticKind::SourceConflict => "source conflict",
            DiagnosticKind::MissingParent => "missing parent",
            DiagnosticKind::MissingMappedClass => "missing mapped class",
            DiagnosticKind::MissingTypeBase => "missing type base",
        }
    }
}

/// One non-fatal defect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Entity the defect was found on (class, variable or type name).
    pub subject: String,
    /// Slot name, when the defect concerns one slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    /// The name that failed to resolve, or the conflicting sources.
    pub detail: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { kind, subject: subject.into(), slot: None, detail: detail.into() }
    }

    pub fn on_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => write!(f, "{}: {}.{}: {}", self.kind.label(), self.subject, slot, self.detail),
            None => write!(f, "{}: {}: {}", self.kind.label(), self.subject, self.detail),
        }
    }
}

/// Everything non-fatal that happened during one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Emit every diagnostic as a `tracing` warning.
    pub fn log(&self) {
        for d in &self.diagnostics {
            tracing::warn!(
                kind = d.kind.label(),
                subject = %d.subject,
                slot = d.slot.as_deref().unwrap_or(""),
                "{}",
                d.detail
            );
        }
        if !self.diagnostics.is_empty() {
            tracing::info!(count = self.diagnostics.len(), "schema build reported non-fatal defects");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_kind() {
        let mut report = BuildReport::new();
        report.push(Diagnostic::new(DiagnosticKind::MissingRange, "Car", "Wheel").on_slot("wheels"));
        report.push(Diagnostic::new(DiagnosticKind::MissingParent, "Car", "Vehicle"));
        report.push(Diagnostic::new(DiagnosticKind::MissingRange, "Bus", "Seat").on_slot("seats"));

        assert_eq!(report.len(), 3);
        assert_eq!(report.count(DiagnosticKind::MissingRange), 2);
        assert_eq!(report.count(DiagnosticKind::SourceConflict), 0);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::new(DiagnosticKind::MissingRange, "Car", "Wheel").on_slot("wheels");
        assert_eq!(d.to_string(), "missing range: Car.wheels: Wheel");
    }
}
