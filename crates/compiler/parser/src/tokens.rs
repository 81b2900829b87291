//! Token model for the Bolt surface language.
//!
//! Token recognition is driven by a [`logos`] derive; the surrounding
//! [`crate::lexer`] module converts the raw byte spans into the 1-based
//! line/column spans carried on every token.

use bolt_compiler_diagnostics::SourceSpan;
use logos::{FilterResult, Logos};

/// Consumes a string literal after the opening quote. Backslash escapes
/// the next character without interpreting it; an unterminated literal
/// swallows the rest of the input and surfaces as a lexer error.
fn lex_string(lex: &mut logos::Lexer<TokenKind>) -> FilterResult<(), ()> {
    let bytes = lex.remainder().as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'"' => {
                lex.bump(index + 1);
                return FilterResult::Emit(());
            }
            b'\\' if index + 1 < bytes.len() => index += 2,
            _ => index += 1,
        }
    }
    lex.bump(bytes.len());
    FilterResult::Error(())
}

/// Consumes a block comment after the opening `/*`. Terminated comments
/// are skipped; unterminated ones surface as a lexer error.
fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> FilterResult<(), ()> {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(remainder.len());
            FilterResult::Error(())
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")] // Skip whitespace, including carriage return
#[logos(skip r"//[^\n]*")] // Skip single-line comments
pub enum TokenKind {
    // Literals
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*")]
    Identifier,
    #[regex(r"0[xX][0-9a-fA-F]*|0[bB][01]*|[0-9]+")]
    IntegerLiteral,
    #[token("\"", lex_string)]
    #[token("/*", lex_block_comment)]
    StringLiteral,

    // Keywords (full words, per language glossary)
    #[token("package")]
    KeywordPackage,
    #[token("module")]
    KeywordModule,
    #[token("import")]
    KeywordImport,
    #[token("blueprint")]
    KeywordBlueprint,
    #[token("enumeration")]
    KeywordEnumeration,
    #[token("interface")]
    KeywordInterface,
    #[token("function")]
    KeywordFunction,
    #[token("constant")]
    KeywordConstant,
    #[token("mutable")]
    KeywordMutable,
    #[token("fixed")]
    KeywordFixed,
    #[token("alias")]
    KeywordAlias,
    #[token("match")]
    KeywordMatch,
    #[token("guard")]
    KeywordGuard,
    #[token("return")]
    KeywordReturn,
    #[token("break")]
    KeywordBreak,
    #[token("continue")]
    KeywordContinue,
    #[token("public")]
    KeywordPublic,
    #[token("use")]
    KeywordUse,
    #[token("external")]
    KeywordExternal,
    #[token("intrinsic")]
    KeywordIntrinsic,
    #[token("new")]
    KeywordNew,
    #[token("delete")]
    KeywordDelete,
    #[token("true")]
    KeywordTrue,
    #[token("false")]
    KeywordFalse,
    #[token("null")]
    KeywordNull,
    #[token("void")]
    KeywordVoid,
    #[token("link")]
    KeywordLink,
    #[token("if")]
    KeywordIf,
    #[token("else")]
    KeywordElse,
    #[token("while")]
    KeywordWhile,
    #[token("for")]
    KeywordFor,
    #[token("switch")]
    KeywordSwitch,
    #[token("case")]
    KeywordCase,

    // Punctuation
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("=")]
    Equals,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("+=")]
    PlusEquals,
    #[token("-=")]
    MinusEquals,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Ampersand,
    #[token("&&")]
    AmpersandAmpersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("<=")]
    LessEquals,
    #[token(">=")]
    GreaterEquals,
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    BangEquals,

    // Synthesised by the lexer wrapper once the input is exhausted. The
    // NUL pattern keeps the variant out of real token streams.
    #[token("\0")]
    EndOfFile,
}

/// A lexed token: category, source span, and raw lexeme.
///
/// `text` is the literal slice of the source, except for string literals
/// (quotes stripped) and the end-of-file token (empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: SourceSpan, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}
