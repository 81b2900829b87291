//! Abstract syntax tree for one Bolt compilation unit.
//!
//! The parser is best-effort: a missing subterm is substituted with an
//! empty placeholder and a diagnostic, so every node here must tolerate
//! empty names and invalid type captures.

use bolt_compiler_diagnostics::SourceSpan;

/// Raw text consumed by the type-capture sub-grammar, together with its
/// span and whether anything was consumed at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCapture {
    pub text: String,
    pub span: SourceSpan,
    pub valid: bool,
}

/// `package a.b; module c.d;` header. When the package declaration is
/// missing, `package_name` mirrors `module_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDeclaration {
    pub package_name: String,
    pub module_name: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub module_path: String,
    pub span: SourceSpan,
}

/// One argument of a bracketed attribute; `name` is empty for positional
/// arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeArgument {
    pub name: String,
    pub value: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub arguments: Vec<AttributeArgument>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
    pub type_span: SourceSpan,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub modifiers: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub return_type_span: Option<SourceSpan>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintField {
    pub name: String,
    pub type_name: String,
    pub type_span: SourceSpan,
    pub attributes: Vec<Attribute>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintDeclaration {
    pub name: String,
    pub modifiers: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub fields: Vec<BlueprintField>,
    pub span: SourceSpan,
}

/// Everything parsed from one source file, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    pub module: ModuleDeclaration,
    pub imports: Vec<ImportDeclaration>,
    pub functions: Vec<FunctionDeclaration>,
    pub blueprints: Vec<BlueprintDeclaration>,
}
