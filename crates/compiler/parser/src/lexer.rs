//! Lexer for Bolt source text.
//!
//! A single linear pass over the input: [`logos`] produces byte-span
//! tokens, and this wrapper rewrites them onto 1-based line/column spans,
//! classifies error slices into the stable lexical diagnostic codes, and
//! appends the terminating end-of-file token.

use bolt_compiler_diagnostics::reporting::LineIndex;
use bolt_compiler_diagnostics::{Diagnostic, DiagnosticCode, SourceLocation, SourceSpan};
use logos::Logos;
use tracing::debug;

use crate::tokens::{Token, TokenKind};

/// Result of lexing one source file: the token stream (always terminated
/// by exactly one end-of-file token) and any lexical diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

struct Positions {
    index: LineIndex,
}

impl Positions {
    fn new(source: &str) -> Self {
        Self {
            index: LineIndex::new(source),
        }
    }

    fn location(&self, offset: usize) -> SourceLocation {
        self.index.location(offset)
    }

    fn span(&self, range: &std::ops::Range<usize>) -> SourceSpan {
        SourceSpan::new(self.location(range.start), self.location(range.end))
    }
}

/// Lexes `source` into tokens. `module_name` is only a label for logging;
/// diagnostics carry spans, not file names.
pub fn lex(source: &str, module_name: &str) -> LexOutput {
    let positions = Positions::new(source);
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();

    for (result, range) in TokenKind::lexer(source).spanned() {
        let span = positions.span(&range);
        let slice = &source[range.clone()];

        match result {
            Ok(kind) => {
                let text = match kind {
                    TokenKind::StringLiteral => slice[1..slice.len() - 1].to_string(),
                    _ => slice.to_string(),
                };
                if kind == TokenKind::Identifier && (text.contains('_') || text.contains('-')) {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticCode::MalformedIdentifier,
                        "Identifiers must avoid underscores and hyphens.",
                        span,
                    ));
                }
                tokens.push(Token::new(kind, span, text));
            }
            Err(()) => {
                let (code, message) = if slice.starts_with('"') {
                    (
                        DiagnosticCode::UnterminatedString,
                        "Unterminated string literal.",
                    )
                } else if slice.starts_with("/*") {
                    (
                        DiagnosticCode::UnterminatedBlockComment,
                        "Unterminated block comment.",
                    )
                } else {
                    (
                        DiagnosticCode::UnexpectedCharacter,
                        "Unexpected character in source.",
                    )
                };
                diagnostics.push(Diagnostic::new(code, message, span));
            }
        }
    }

    let eof_location = positions.location(source.len());
    tokens.push(Token::new(
        TokenKind::EndOfFile,
        SourceSpan::at(eof_location),
        "",
    ));

    debug!(
        module = module_name,
        tokens = tokens.len(),
        diagnostics = diagnostics.len(),
        "lexed source"
    );

    LexOutput {
        tokens,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(output: &LexOutput) -> Vec<TokenKind> {
        output.tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_yields_single_end_of_file() {
        let output = lex("", "lexer-test");
        assert_eq!(kinds(&output), vec![TokenKind::EndOfFile]);
        assert!(output.diagnostics.is_empty());
        let eof = &output.tokens[0];
        assert_eq!(eof.span.begin, SourceLocation::new(1, 1));
        assert!(eof.text.is_empty());
    }

    #[test]
    fn lexes_module_header() {
        let output = lex("package demo; module demo;\n", "lexer-test");
        assert!(output.diagnostics.is_empty());
        assert_eq!(
            kinds(&output),
            vec![
                TokenKind::KeywordPackage,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::KeywordModule,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::EndOfFile,
            ]
        );
        assert_eq!(output.tokens[1].text, "demo");
        assert_eq!(output.tokens[1].span.begin, SourceLocation::new(1, 9));
        assert_eq!(output.tokens[1].span.end, SourceLocation::new(1, 13));
    }

    #[test]
    fn two_character_operators_lex_as_single_tokens() {
        let output = lex("-> == != <= >= ++ -- += -= &&", "lexer-test");
        assert!(output.diagnostics.is_empty());
        assert_eq!(
            kinds(&output),
            vec![
                TokenKind::Arrow,
                TokenKind::EqualsEquals,
                TokenKind::BangEquals,
                TokenKind::LessEquals,
                TokenKind::GreaterEquals,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusEquals,
                TokenKind::MinusEquals,
                TokenKind::AmpersandAmpersand,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn double_closing_angle_stays_two_tokens() {
        let output = lex("reference<pointer<integer>>", "lexer-test");
        assert!(output.diagnostics.is_empty());
        let gt_count = output
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::GreaterThan)
            .count();
        assert_eq!(gt_count, 2);
    }

    #[test]
    fn numbers_accept_decimal_hex_and_binary() {
        let output = lex("42 0x2A 0b101010", "lexer-test");
        assert!(output.diagnostics.is_empty());
        let texts: Vec<&str> = output
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::IntegerLiteral)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["42", "0x2A", "0b101010"]);
    }

    #[test]
    fn underscored_identifier_is_reported_but_kept() {
        let output = lex("snake_case", "lexer-test");
        assert_eq!(output.tokens[0].kind, TokenKind::Identifier);
        assert_eq!(output.tokens[0].text, "snake_case");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics[0].code,
            DiagnosticCode::MalformedIdentifier
        );
    }

    #[test]
    fn unexpected_character_is_skipped_with_diagnostic() {
        let output = lex("integer @ value", "lexer-test");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics[0].code,
            DiagnosticCode::UnexpectedCharacter
        );
        assert_eq!(
            kinds(&output),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_e2002() {
        let output = lex("\"no closing quote", "lexer-test");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics[0].code,
            DiagnosticCode::UnterminatedString
        );
        assert_eq!(kinds(&output), vec![TokenKind::EndOfFile]);
    }

    #[test]
    fn string_escapes_do_not_terminate_the_literal() {
        let output = lex(r#""an \" escaped quote""#, "lexer-test");
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(output.tokens[0].text, r#"an \" escaped quote"#);
    }

    #[test]
    fn comments_are_discarded() {
        let output = lex("alpha // trailing\n/* block\ncomment */ beta", "lexer-test");
        assert!(output.diagnostics.is_empty());
        assert_eq!(
            kinds(&output),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::EndOfFile,
            ]
        );
        assert_eq!(output.tokens[1].span.begin, SourceLocation::new(3, 12));
    }

    #[test]
    fn unterminated_block_comment_reports_e2003() {
        let output = lex("/* never closed", "lexer-test");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics[0].code,
            DiagnosticCode::UnterminatedBlockComment
        );
    }

    #[test]
    fn newlines_advance_lines_and_reset_columns() {
        let output = lex("a\nbb\n  c", "lexer-test");
        assert_eq!(output.tokens[0].span.begin, SourceLocation::new(1, 1));
        assert_eq!(output.tokens[1].span.begin, SourceLocation::new(2, 1));
        assert_eq!(output.tokens[1].span.end, SourceLocation::new(2, 3));
        assert_eq!(output.tokens[2].span.begin, SourceLocation::new(3, 3));
    }
}
