//! Analyzer diagnostics: collection and rendering.
//!
//! Lowering gaps and other recoverable defects accumulate here instead of
//! aborting a walk; rendering goes through `annotate-snippets` when source
//! text is available.

use std::fmt;
use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single message with its 1-based source line and byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: u32,
    pub span: Range<usize>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}: {}", self.severity, self.line, self.message)
    }
}

/// Collection of diagnostics from one parse or analysis pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>, line: u32, span: Range<usize>) {
        self.messages.push(Diagnostic {
            severity: Severity::Error,
            line,
            span,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, message: impl Into<String>, line: u32, span: Range<usize>) {
        self.messages.push(Diagnostic {
            severity: Severity::Warning,
            line,
            span,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.severity == Severity::Warning)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}

/// Builder for rendering diagnostics with various options.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut impl Write) -> fmt::Result {
        let Some(source) = self.source else {
            return self.format_plain(w);
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            let range = clamp_range(&diag.span, source.len());

            let mut snippet = Snippet::source(source).line_start(1).annotation(
                AnnotationKind::Primary
                    .span(range)
                    .label(&diag.message),
            );
            if let Some(path) = self.path {
                snippet = snippet.path(path);
            }

            let level = severity_to_level(diag.severity);
            let report: Vec<Group> = vec![level.primary_title(&diag.message).element(snippet)];

            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&report))?;
        }
        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write) -> fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{diag}")?;
        }
        Ok(())
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

fn clamp_range(range: &Range<usize>, limit: usize) -> Range<usize> {
    range.start.min(limit)..range.end.min(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_by_severity() {
        let mut diag = Diagnostics::new();
        assert!(diag.is_empty());

        diag.warning("odd construct", 2, 5..9);
        diag.error("broken", 4, 20..24);

        assert_eq!(diag.len(), 2);
        assert!(diag.has_errors());
        assert!(diag.has_warnings());
    }

    #[test]
    fn plain_rendering_without_source() {
        let mut diag = Diagnostics::new();
        diag.warning("odd construct", 2, 5..9);

        assert_eq!(diag.printer().render(), "warning at line 2: odd construct");
    }

    #[test]
    fn snippet_rendering_points_at_span() {
        let source = "<?php\n$a = `ls`;\n";
        let mut diag = Diagnostics::new();
        diag.warning("no dedicated syntax node", 2, 11..15);

        let rendered = diag.printer().source(source).path("a.php").render();
        assert!(rendered.contains("no dedicated syntax node"));
        assert!(rendered.contains("a.php"));
        assert!(rendered.contains("`ls`"));
    }

    #[test]
    fn spans_are_clamped_to_source() {
        let mut diag = Diagnostics::new();
        diag.error("past the end", 1, 100..200);

        // Must not panic on out-of-range spans.
        let rendered = diag.printer().source("<?php\n").render();
        assert!(rendered.contains("past the end"));
    }
}
