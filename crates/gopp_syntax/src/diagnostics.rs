//! Diagnostics and error reporting for the gopp front end.
//!
//! Every problem found while scanning, parsing, composing packages or checking branches becomes a [`Diagnostic`].
//! All of them flow through one [`DiagnosticSink`], which either forwards them to a caller-supplied handler or
//! remembers the first one and asks the parser to stop.

use std::fmt;

use crate::ast::Span;
use crate::source::Position;

/// A front-end diagnostic with location information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{position}: {message}")]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub position: Position,
    pub kind: DiagnosticKind,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            position: Position::default(),
            kind,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Lexical, message, span)
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Syntax, message, span)
    }

    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Semantic, message, span)
    }

    pub fn io(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Io, message, span)
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Render this diagnostic as a [`miette::Report`] labelled against `source`.
    ///
    /// ## Parameters
    /// - `source`: the text the span points into. Pass the same text that was parsed.
    pub fn to_report(&self, source: &str) -> miette::Report {
        let start = self.span.start.min(source.len());
        let len = self.span.end.min(source.len()).saturating_sub(start);
        let mut diag = miette::MietteDiagnostic::new(self.message.clone())
            .with_severity(miette::Severity::Error)
            .with_code(self.kind.code())
            .with_label(miette::LabeledSpan::at(start..start + len, self.kind.to_string()));
        let mut help: Vec<String> = self.hints.clone();
        help.extend(self.notes.iter().map(|n| format!("note: {n}")));
        if !help.is_empty() {
            diag = diag.with_help(help.join("\n"));
        }
        miette::Report::new(diag)
            .with_source_code(miette::NamedSource::new(self.position.file.clone(), source.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Malformed literal, unterminated string or comment.
    Lexical,
    /// Unexpected or missing token, or use of a feature that is not permitted.
    Syntax,
    /// Label, branch, template and import-alias problems.
    Semantic,
    /// Failed include fetch.
    Io,
}

impl DiagnosticKind {
    fn code(self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "gopp::lexical",
            DiagnosticKind::Syntax => "gopp::syntax",
            DiagnosticKind::Semantic => "gopp::semantic",
            DiagnosticKind::Io => "gopp::io",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Lexical => write!(f, "lexical error"),
            DiagnosticKind::Syntax => write!(f, "syntax error"),
            DiagnosticKind::Semantic => write!(f, "error"),
            DiagnosticKind::Io => write!(f, "i/o error"),
        }
    }
}

/// Caller-supplied callback invoked once per diagnostic.
pub type ErrorHandler = Box<dyn FnMut(&Diagnostic)>;

/// The single funnel every diagnostic passes through.
///
/// ## Notes
/// - With a handler, every diagnostic is forwarded and parsing continues.
/// - Without one, the first diagnostic is kept and [`DiagnosticSink::aborted`] turns `true`; callers stop at their
///   next checkpoint and the entry point returns that diagnostic as its error.
/// - A second diagnostic reported at end of input is dropped: it is almost always a cascade of the first.
pub struct DiagnosticSink {
    handler: Option<ErrorHandler>,
    first: Option<Diagnostic>,
    count: usize,
    eof_reported: bool,
}

impl DiagnosticSink {
    pub fn new(handler: Option<ErrorHandler>) -> Self {
        Self {
            handler,
            first: None,
            count: 0,
            eof_reported: false,
        }
    }

    /// Report a diagnostic.
    ///
    /// ## Parameters
    /// - `at_eof`: the diagnostic was raised at the end-of-input token.
    pub fn report(&mut self, diag: Diagnostic, at_eof: bool) {
        if at_eof {
            if self.eof_reported || self.count > 0 {
                tracing::warn!(message = %diag.message, "suppressed repeated error at end of input");
                return;
            }
            self.eof_reported = true;
        }
        self.count += 1;
        tracing::debug!(kind = ?diag.kind, message = %diag.message, "diagnostic");
        if let Some(handler) = self.handler.as_mut() {
            handler(&diag);
        }
        if self.first.is_none() {
            self.first = Some(diag);
        }
    }

    /// `true` once parsing should stop: no handler is installed and an error has been seen.
    pub fn aborted(&self) -> bool {
        self.handler.is_none() && self.first.is_some()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Number of diagnostics accepted so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.first.as_ref()
    }

    pub fn take_first(&mut self) -> Option<Diagnostic> {
        self.first.take()
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("handler", &self.handler.is_some())
            .field("first", &self.first)
            .field("count", &self.count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn without_handler_first_error_aborts() {
        let mut sink = DiagnosticSink::new(None);
        assert!(!sink.aborted());
        sink.report(Diagnostic::syntax("first", Span::new(0, 1)), false);
        sink.report(Diagnostic::syntax("second", Span::new(1, 2)), false);
        assert!(sink.aborted());
        assert_eq!(sink.first().map(|d| d.message.as_str()), Some("first"));
    }

    #[test]
    fn handler_sees_every_diagnostic() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = Rc::clone(&seen);
        let mut sink = DiagnosticSink::new(Some(Box::new(move |d: &Diagnostic| {
            sink_seen.borrow_mut().push(d.message.clone())
        })));
        sink.report(Diagnostic::syntax("a", Span::default()), false);
        sink.report(Diagnostic::semantic("b", Span::default()), false);
        assert!(!sink.aborted());
        assert_eq!(*seen.borrow(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn repeated_error_at_eof_is_suppressed() {
        let seen = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&seen);
        let mut sink = DiagnosticSink::new(Some(Box::new(move |_: &Diagnostic| *counter.borrow_mut() += 1)));
        sink.report(Diagnostic::syntax("unexpected }", Span::new(3, 4)), false);
        sink.report(Diagnostic::syntax("expected }, found EOF", Span::new(9, 9)), true);
        sink.report(Diagnostic::syntax("expected }, found EOF", Span::new(9, 9)), true);
        assert_eq!(*seen.borrow(), 1);
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn display_includes_position() {
        let d = Diagnostic::syntax("oops", Span::new(0, 1)).at(Position::new("a.gopp", 3, 7));
        assert_eq!(d.to_string(), "a.gopp:3:7: oops");
    }
}
