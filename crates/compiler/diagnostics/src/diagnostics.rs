//! Core diagnostic types shared by the lexer, parser, binder, import
//! machinery, and MIR passes.
//!
//! Every stage accumulates [`Diagnostic`]s instead of returning errors;
//! the pipeline decides whether later stages run by asking a
//! [`DiagnosticCollection`] whether any errors were recorded.

use std::fmt;

/// A 1-based line/column position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The position of the first character of a file.
    pub const fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}:C{}", self.line, self.column)
    }
}

/// A half-open source region; `end` points just past the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    pub begin: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub const fn new(begin: SourceLocation, end: SourceLocation) -> Self {
        Self { begin, end }
    }

    /// A zero-width span at the given location.
    pub const fn at(location: SourceLocation) -> Self {
        Self {
            begin: location,
            end: location,
        }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(self, other: Self) -> Self {
        let mut span = self;
        if span.begin.line == 0 && span.begin.column == 0 {
            span.begin = other.begin;
        }
        if (other.begin.line, other.begin.column) < (span.begin.line, span.begin.column) {
            span.begin = other.begin;
        }
        if (other.end.line, other.end.column) > (span.end.line, span.end.column) {
            span.end = other.end;
        }
        span
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Stable identifiers for every diagnostic the pipeline can emit.
///
/// The numbering is part of the compiler's external contract: tools key
/// off the rendered `BOLT-E####` form, so variants may share a number
/// (the original reports several distinct syntax problems as `E2115`)
/// but a number is never reused for an unrelated meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Lexer (2000-2003)
    UnexpectedCharacter,
    MalformedIdentifier,
    UnterminatedString,
    UnterminatedBlockComment,

    // Parser (2100-2153)
    MissingPackageDeclaration,
    ExpectedPackageIdentifier,
    ExpectedPackageTerminator,
    MissingModuleDeclaration,
    ExpectedModuleTerminator,
    ExpectedImportPath,
    AttributesOnImport,
    ModifiersOnImport,
    ExpectedFunctionName,
    ExpectedParameterList,
    ExpectedParameterListEnd,
    ExpectedFunctionBody,
    ExpectedReturnTypeBeforeFunction,
    LegacyParameterSyntax,
    UnterminatedFunctionBody,
    ExpectedFunctionKeyword,
    MissingReturnType,
    LegacyReturnTypeSyntax,
    ExpectedBlueprintName,
    ExpectedBlueprintBody,
    ExpectedBlueprintEnd,
    ExpectedAttributeEnd,
    ExpectedAttributeName,
    ExpectedAttributeArgumentsEnd,
    ExpectedAttributeArgument,
    MalformedAttributeArgument,
    ExpectedParameterType,
    ExpectedParameterName,
    ExpectedFieldType,
    ExpectedFieldName,
    LegacyFieldSyntax,

    // Binder (2200-2302)
    DuplicateAttribute,
    UnknownAttribute,
    DuplicateFunction,
    DuplicateBlueprint,
    DuplicateParameter,
    DuplicateField,
    InvalidAttributeArgument,
    ConflictingFunctionAttributes,
    BitsOutsidePacked,
    LiveWithoutType,
    DuplicateImport,
    ConstructorReferenceParameter,
    DestructorWithParameters,
    DuplicateQualifier,
    LegacyConstQualifier,

    // Imports and module locator (2219-2226)
    SelfImport,
    ImportNotFound,
    ModuleLocatorIssue,
    ModuleLocatorDuplicate,

    // Live enforcement (4100-4105)
    LiveEnforcementFailed,
    LiveReturnWithoutType,
    LiveFunctionWithoutBlocks,
    LiveFunctionWithoutReturn,
    LiveEmptyBlock,
    LiveBlockMissingTerminator,

    // SSA construction (4300-4302)
    SsaConversionFailed,
    UseBeforeDefinition,
    MissingPhiInput,
}

impl DiagnosticCode {
    /// The numeric component of the rendered code.
    pub const fn number(self) -> u32 {
        match self {
            Self::UnexpectedCharacter => 2000,
            Self::MalformedIdentifier => 2001,
            Self::UnterminatedString => 2002,
            Self::UnterminatedBlockComment => 2003,

            Self::MissingPackageDeclaration => 2102,
            Self::ExpectedPackageIdentifier => 2103,
            Self::ExpectedPackageTerminator => 2104,
            Self::MissingModuleDeclaration => 2105,
            Self::ExpectedModuleTerminator => 2106,
            Self::ExpectedImportPath => 2107,
            Self::AttributesOnImport => 2108,
            Self::ModifiersOnImport => 2109,
            Self::ExpectedFunctionName => 2110,
            Self::ExpectedParameterList => 2111,
            Self::ExpectedParameterListEnd => 2112,
            Self::ExpectedFunctionBody => 2114,
            Self::ExpectedReturnTypeBeforeFunction
            | Self::LegacyParameterSyntax
            | Self::UnterminatedFunctionBody => 2115,
            Self::ExpectedFunctionKeyword => 2116,
            Self::MissingReturnType => 2117,
            Self::LegacyReturnTypeSyntax => 2118,
            Self::ExpectedBlueprintName => 2120,
            Self::ExpectedBlueprintBody => 2121,
            Self::ExpectedBlueprintEnd => 2122,
            Self::ExpectedAttributeEnd => 2130,
            Self::ExpectedAttributeName => 2131,
            Self::ExpectedAttributeArgumentsEnd => 2132,
            Self::ExpectedAttributeArgument => 2133,
            Self::MalformedAttributeArgument => 2134,
            Self::ExpectedParameterType => 2142,
            Self::ExpectedParameterName => 2143,
            Self::ExpectedFieldType => 2152,
            Self::ExpectedFieldName | Self::LegacyFieldSyntax => 2153,

            Self::DuplicateAttribute => 2200,
            Self::UnknownAttribute => 2201,
            Self::DuplicateFunction => 2210,
            Self::DuplicateBlueprint => 2211,
            Self::DuplicateParameter => 2212,
            Self::DuplicateField => 2213,
            Self::InvalidAttributeArgument => 2214,
            Self::ConflictingFunctionAttributes => 2215,
            Self::BitsOutsidePacked => 2216,
            Self::LiveWithoutType => 2217,
            Self::DuplicateImport => 2218,
            Self::ConstructorReferenceParameter => 2210,
            Self::DestructorWithParameters => 2230,
            Self::DuplicateQualifier => 2301,
            Self::LegacyConstQualifier => 2302,

            Self::SelfImport => 2219,
            Self::ImportNotFound => 2220,
            Self::ModuleLocatorIssue => 2225,
            Self::ModuleLocatorDuplicate => 2226,

            Self::LiveEnforcementFailed => 4100,
            Self::LiveReturnWithoutType => 4101,
            Self::LiveFunctionWithoutBlocks => 4102,
            Self::LiveFunctionWithoutReturn => 4103,
            Self::LiveEmptyBlock => 4104,
            Self::LiveBlockMissingTerminator => 4105,

            Self::SsaConversionFailed => 4300,
            Self::UseBeforeDefinition => 4301,
            Self::MissingPhiInput => 4302,
        }
    }

    /// The default severity implied by the code's prefix letter.
    pub const fn default_severity(self) -> DiagnosticSeverity {
        match self {
            Self::ConstructorReferenceParameter => DiagnosticSeverity::Warning,
            _ => DiagnosticSeverity::Error,
        }
    }

    const fn prefix(self) -> char {
        match self.default_severity() {
            DiagnosticSeverity::Error => 'E',
            DiagnosticSeverity::Warning => 'W',
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BOLT-{}{:04}", self.prefix(), self.number())
    }
}

/// A single report from any stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: SourceSpan,
    /// Optional suggested correction, rendered as a `fix-it:` follow-up.
    pub fixit: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with the severity implied by its code.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            span,
            fixit: None,
        }
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            message: message.into(),
            span,
            fixit: None,
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code,
            message: message.into(),
            span,
            fixit: None,
        }
    }

    pub fn with_fixit(mut self, hint: impl Into<String>) -> Self {
        self.fixit = Some(hint.into());
        self
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Error)
    }

    pub const fn is_warning(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Warning)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.code, self.span.begin, self.message)?;
        if let Some(hint) = &self.fixit {
            write!(f, "\nfix-it: {hint}")?;
        }
        Ok(())
    }
}

/// An ordered collection of diagnostics accumulated by one or more stages.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn summary(&self) -> String {
        if self.diagnostics.is_empty() {
            "No issues found".to_string()
        } else {
            format!(
                "{} errors, {} warnings",
                self.errors().count(),
                self.warnings().count()
            )
        }
    }
}

impl From<Vec<Diagnostic>> for DiagnosticCollection {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl IntoIterator for DiagnosticCollection {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
