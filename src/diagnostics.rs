//! Structured diagnostics
//!
//! A [`Diagnostic`] pairs a [`Severity`] with a [`Category`] naming the
//! pipeline stage that produced it, plus an optional source position, file
//! name and hint. Fatal problems travel as
//! [`CompileError`]s and are converted here for display; warnings are
//! collected during parsing and generation and returned alongside the output.
//!
//! Rendering goes through [`DiagnosticRenderer`], which colors the severity
//! and category with crossterm styling when asked to.

use std::fmt;

use crossterm::style::Stylize;

use crate::errors::CompileError;
use crate::parser::ast::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Pipeline stage a diagnostic originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lexer,
    Parser,
    Semantic,
    Codegen,
    General,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Lexer => write!(f, "lexer"),
            Category::Parser => write!(f, "parser"),
            Category::Semantic => write!(f, "semantic"),
            Category::Codegen => write!(f, "codegen"),
            Category::General => write!(f, "general"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub file: Option<String>,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            location: None,
            file: None,
            hint: None,
        }
    }

    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    pub fn info(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Trace the diagnostic at debug level. The user sees it once, through
    /// [`DiagnosticRenderer`].
    pub fn log(&self) {
        match self.location {
            Some(loc) => log::debug!(
                "{}[{}] line {}: {}",
                self.severity,
                self.category,
                loc.line,
                self.message
            ),
            None => log::debug!("{}[{}] {}", self.severity, self.category, self.message),
        }
    }
}

impl From<&CompileError> for Diagnostic {
    fn from(err: &CompileError) -> Self {
        let diag = Diagnostic::new(Severity::Error, err.category(), err.message())
            .at(err.location());
        match err {
            CompileError::JumpOutsideLoop { .. } => diag.with_hint(
                "'break' and 'continue' may only appear inside a while or for body",
            ),
            CompileError::ArrayIndexOutOfBounds { size, .. } => {
                diag.with_hint(format!("valid indices are 0 to {}", size.saturating_sub(1)))
            }
            _ => diag,
        }
    }
}

/// Formats diagnostics for the terminal
pub struct DiagnosticRenderer<'a> {
    color: bool,
    file: Option<&'a str>,
    source: Option<&'a str>,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            file: None,
            source: None,
        }
    }

    /// Attach the compiled source so snippets can be filled in from it.
    pub fn with_source(mut self, file: &'a str, source: &'a str) -> Self {
        self.file = Some(file);
        self.source = Some(source);
        self
    }

    pub fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();

        let severity = diag.severity.to_string();
        let header = format!("{}[{}]", severity, diag.category);
        if self.color {
            let styled = match diag.severity {
                Severity::Error => header.red().bold(),
                Severity::Warning => header.yellow().bold(),
                Severity::Info => header.cyan().bold(),
            };
            out.push_str(&styled.to_string());
        } else {
            out.push_str(&header);
        }
        out.push_str(": ");

        let file = diag.file.as_deref().or(self.file);
        match (file, diag.location) {
            (Some(file), Some(loc)) => {
                out.push_str(&format!("{}:{}:{}: ", file, loc.line, loc.column))
            }
            (None, Some(loc)) => out.push_str(&format!("{}:{}: ", loc.line, loc.column)),
            (Some(file), None) => out.push_str(&format!("{}: ", file)),
            (None, None) => {}
        }
        out.push_str(&diag.message);
        out.push('\n');

        let snippet = diag.location.and_then(|loc| {
            self.source?.lines().nth(loc.line.checked_sub(1)?)
        });

        if let (Some(line), Some(loc)) = (snippet, diag.location) {
            let gutter = loc.line.to_string();
            let pad = " ".repeat(gutter.len());
            out.push_str(&format!(" {} | {}\n", gutter, line));
            let caret = format!("{}^", " ".repeat(loc.column.saturating_sub(1)));
            if self.color {
                out.push_str(&format!(" {} | {}\n", pad, caret.green().bold()));
            } else {
                out.push_str(&format!(" {} | {}\n", pad, caret));
            }
        }

        if let Some(hint) = &diag.hint {
            if self.color {
                out.push_str(&format!("{}: {}\n", "hint".cyan(), hint));
            } else {
                out.push_str(&format!("hint: {}\n", hint));
            }
        }

        out
    }
}

/// One-line count of warnings and errors, `None` when there are neither.
pub fn summary(diagnostics: &[Diagnostic]) -> Option<String> {
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    let plural = |n: usize, word: &str| {
        if n == 1 {
            format!("1 {word}")
        } else {
            format!("{n} {word}s")
        }
    };

    match (errors, warnings) {
        (0, 0) => None,
        (0, w) => Some(format!("{} emitted", plural(w, "warning"))),
        (e, 0) => Some(format!("{} emitted", plural(e, "error"))),
        (e, w) => Some(format!(
            "{} and {} emitted",
            plural(e, "error"),
            plural(w, "warning")
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_render_plain_with_snippet() {
        let source = "int f() {\n  x = 1\n}\n";
        let diag = Diagnostic::new(Severity::Error, Category::Parser, "Expected ';'")
            .at(SourceLocation::new(2, 8));
        let rendered = DiagnosticRenderer::new(false)
            .with_source("input.c", source)
            .render(&diag);

        assert_eq!(
            rendered,
            "error[parser]: input.c:2:8: Expected ';'\n 2 |   x = 1\n   |        ^\n"
        );
    }

    #[test]
    fn test_render_without_location() {
        let diag = Diagnostic::warning(Category::General, "nothing to do");
        let rendered = DiagnosticRenderer::new(false).render(&diag);
        assert_eq!(rendered, "warning[general]: nothing to do\n");
    }

    #[test]
    fn test_render_uses_file_of_diagnostic() {
        let diag = Diagnostic::new(Severity::Error, Category::General, "cannot read input")
            .with_file("missing.c");
        let rendered = DiagnosticRenderer::new(false).render(&diag);
        assert_eq!(rendered, "error[general]: missing.c: cannot read input\n");
    }

    struct Capture(Mutex<Vec<(log::Level, String)>>);

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = self.0.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    #[test]
    fn test_warnings_are_logged_below_default_filter() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);

        Diagnostic::warning(Category::Codegen, "unique warning text")
            .at(SourceLocation::new(4, 2))
            .log();

        let records = CAPTURE.0.lock().unwrap();
        let (level, text) = records
            .iter()
            .find(|(_, text)| text.contains("unique warning text"))
            .expect("warning was not logged");
        assert_eq!(*level, log::Level::Debug);
        assert_eq!(text, "warning[codegen] line 4: unique warning text");
    }

    #[test]
    fn test_error_conversion_adds_hint() {
        let err = CompileError::JumpOutsideLoop {
            keyword: "break",
            location: SourceLocation::new(3, 5),
        };
        let diag = Diagnostic::from(&err);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.category, Category::Semantic);
        assert!(diag.hint.is_some());

        let rendered = DiagnosticRenderer::new(false).render(&diag);
        assert!(rendered.contains("hint: 'break' and 'continue'"));
    }

    #[test]
    fn test_summary_counts() {
        let diags = vec![
            Diagnostic::warning(Category::Parser, "a"),
            Diagnostic::warning(Category::Codegen, "b"),
            Diagnostic::info(Category::General, "c"),
        ];
        assert_eq!(summary(&diags).as_deref(), Some("2 warnings emitted"));
        assert_eq!(summary(&[]), None);
    }
}
