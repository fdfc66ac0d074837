//! Shared types for the conversion pipeline: content diagnostics and
//! resource kinds.
//!
//! Content-level problems (malformed markup, bad CSS, missing resources)
//! are never errors. Every stage records what it recovered from into a
//! [`Diagnostics`] list and keeps going; the caller decides whether any of
//! it matters.

use std::fmt;

/// Kind of resource requested from a caller-supplied resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Markup,
    Stylesheet,
    Image,
}

/// Category of a recovered content problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Markup was malformed and repaired (auto-closed element, ignored end
    /// tag, unterminated construct).
    MalformedMarkup,
    /// A CSS rule, selector, or declaration could not be parsed and was
    /// dropped.
    UnparseableCss,
    /// A declared property value could not be resolved; the property fell
    /// back to its initial or inherited value.
    UnresolvedProperty,
    /// An external resource was not available; a placeholder or default was
    /// used instead.
    MissingResource,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedMarkup => "malformed-markup",
            DiagnosticKind::UnparseableCss => "unparseable-css",
            DiagnosticKind::UnresolvedProperty => "unresolved-property",
            DiagnosticKind::MissingResource => "missing-resource",
        }
    }
}

/// One recovered content problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// What the problem was about: a tag name, selector text, property
    /// name, or resource URL.
    pub subject: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "{}: {} ({})", self.kind.as_str(), self.message, subject),
            None => write!(f, "{}: {}", self.kind.as_str(), self.message),
        }
    }
}

/// Ordered collection of diagnostics gathered across pipeline stages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Diagnostic {
            kind,
            message: message.into(),
            subject: None,
        });
    }

    pub fn record_about(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        subject: impl Into<String>,
    ) {
        self.push(Diagnostic {
            kind,
            message: message.into(),
            subject: Some(subject.into()),
        });
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("{diagnostic}");
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.items.iter().any(|d| d.kind == kind)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
