//! # Error Reporting Utilities
//!
//! Formats diagnostics for humans. Two renderings are offered: the plain
//! one-line `<code> L<line>:C<column> -> <message>` form used on the error
//! stream, and an annotated source snippet built with `ariadne`.

use ariadne::{Label, Report, ReportKind};

use crate::{Diagnostic, DiagnosticSeverity, SourceLocation};

/// Byte offsets of every line start, for mapping line/column spans back
/// onto the source text ariadne works with.
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Converts a 1-based line/column location into a byte offset,
    /// clamping past-the-end positions to the source length.
    pub fn offset(&self, location: SourceLocation) -> usize {
        let line = (location.line.max(1) as usize) - 1;
        let column = (location.column.max(1) as usize) - 1;
        match self.line_starts.get(line) {
            Some(start) => (start + column).min(self.len),
            None => self.len,
        }
    }

    /// Converts a byte offset into a 1-based line/column location.
    pub fn location(&self, offset: usize) -> SourceLocation {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let column = offset - self.line_starts[line];
        SourceLocation::new(line as u32 + 1, column as u32 + 1)
    }
}

/// Builds an annotated snippet for one diagnostic.
pub fn build_diagnostic_message(
    module_name: &str,
    source_content: &str,
    diagnostic: &Diagnostic,
    with_color: bool,
) -> String {
    let index = LineIndex::new(source_content);
    let begin = index.offset(diagnostic.span.begin);
    let end = index.offset(diagnostic.span.end).max(begin);

    let kind = match diagnostic.severity {
        DiagnosticSeverity::Error => ReportKind::Error,
        DiagnosticSeverity::Warning => ReportKind::Warning,
    };

    let file_id = module_name.to_string();
    let report_span = (file_id.clone(), begin..end);
    let cache = ariadne::sources(vec![(file_id.clone(), source_content.to_string())]);

    let mut report = Report::build(kind, report_span.clone())
        .with_config(
            ariadne::Config::new()
                .with_index_type(ariadne::IndexType::Byte)
                .with_color(with_color),
        )
        .with_code(diagnostic.code.to_string())
        .with_message(&diagnostic.message)
        .with_label(Label::new(report_span).with_message(&diagnostic.message));

    if let Some(hint) = &diagnostic.fixit {
        report = report.with_help(hint);
    }

    let mut write_buffer = Vec::new();
    report.finish().write(cache, &mut write_buffer).unwrap();
    String::from_utf8_lossy(&write_buffer).to_string()
}

/// Renders diagnostics in the stable one-line form, one per line, with
/// `fix-it:` follow-ups where present.
pub fn render_plain<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        out.push_str(&diagnostic.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiagnosticCode, SourceSpan};

    #[test]
    fn line_index_maps_locations_to_offsets() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.offset(SourceLocation::new(1, 1)), 0);
        assert_eq!(index.offset(SourceLocation::new(1, 3)), 2);
        assert_eq!(index.offset(SourceLocation::new(2, 2)), 4);
        assert_eq!(index.offset(SourceLocation::new(9, 1)), 6);
        assert_eq!(index.location(0), SourceLocation::new(1, 1));
        assert_eq!(index.location(4), SourceLocation::new(2, 2));
        assert_eq!(index.location(99), SourceLocation::new(3, 1));
    }

    #[test]
    fn plain_rendering_is_one_line_per_diagnostic() {
        let diagnostics = vec![
            Diagnostic::new(
                DiagnosticCode::UnexpectedCharacter,
                "Unexpected character in source.",
                SourceSpan::at(SourceLocation::new(1, 4)),
            ),
            Diagnostic::new(
                DiagnosticCode::DuplicateImport,
                "Duplicate import 'demo.alpha' in module.",
                SourceSpan::at(SourceLocation::new(3, 1)),
            ),
        ];
        let rendered = render_plain(&diagnostics);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("BOLT-E2000 L1:C4 -> "));
        assert!(lines[1].starts_with("BOLT-E2218 L3:C1 -> "));
    }

    #[test]
    fn snippet_rendering_mentions_code_and_message() {
        let source = "package demo;\nmodule demo;\n";
        let diagnostic = Diagnostic::new(
            DiagnosticCode::MissingModuleDeclaration,
            "Missing 'module' declaration.",
            SourceSpan::at(SourceLocation::new(2, 1)),
        );
        let rendered = build_diagnostic_message("demo", source, &diagnostic, false);
        assert!(rendered.contains("BOLT-E2105"));
        assert!(rendered.contains("Missing 'module' declaration."));
    }
}
