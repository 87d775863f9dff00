//! Flat diagnostic list (spec §3.4, §6).
//!
//! Nodes do not own their diagnostics (see `DESIGN.md` for why the spec's
//! Design Notes steer away from that); instead every diagnostic records the
//! offending node's `NodeId` when one exists, and the list lives on
//! whichever phase produced it (lexer, parser, `SemanticContext`).

use std::fmt;

use crate::ast::NodeId;
use crate::lexer::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub is_warning: bool,
    pub description: String,
    pub source_file: String,
    pub span: Span,
    pub offender_node: Option<NodeId>,
}

impl Diagnostic {
    pub fn error(source_file: impl Into<String>, span: Span, description: impl Into<String>) -> Self {
        Self {
            is_warning: false,
            description: description.into(),
            source_file: source_file.into(),
            span,
            offender_node: None,
        }
    }

    pub fn warning(source_file: impl Into<String>, span: Span, description: impl Into<String>) -> Self {
        Self {
            is_warning: true,
            description: description.into(),
            source_file: source_file.into(),
            span,
            offender_node: None,
        }
    }

    pub fn with_offender(mut self, node: NodeId) -> Self {
        self.offender_node = Some(node);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.source_file,
            self.span.line,
            self.span.column,
            if self.is_warning { "warning" } else { "error" },
            self.description
        )
    }
}

/// A phase's accumulated diagnostics. A phase "succeeds" iff no error was
/// ever pushed, independent of insertion order (spec §3.4).
#[derive(Debug, Default, Clone)]
pub struct DiagnosticList {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        if !diag.is_warning {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
    }

    pub fn extend(&mut self, other: DiagnosticList) {
        self.error_count += other.error_count;
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn succeeded(&self) -> bool {
        !self.has_errors()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_per_spec() {
        let d = Diagnostic::error("a.shiro", Span::new(3, 7), "redeclaration of 'mul'");
        assert_eq!(
            d.to_string(),
            "a.shiro:3:7: error: redeclaration of 'mul'"
        );
    }

    #[test]
    fn success_requires_zero_errors_not_zero_diagnostics() {
        let mut list = DiagnosticList::new();
        list.push(Diagnostic::warning("a.shiro", Span::default(), "shadowed"));
        assert!(list.succeeded());
        list.push(Diagnostic::error("a.shiro", Span::default(), "boom"));
        assert!(!list.succeeded());
    }
}
