//! HIR data model: the validated, normalised form of one module.

use bolt_compiler_diagnostics::SourceSpan;
use bolt_compiler_parser::ast::AttributeArgument;

use crate::type_ref::TypeReference;

/// A validated attribute. Arguments keep their parsed spelling; the
/// binder interprets them per attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub arguments: Vec<AttributeArgument>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeReference,
    pub span: SourceSpan,
    pub is_live_value: bool,
    /// Synthesised by constructor binding for value-category parameters.
    pub default_value: Option<String>,
    /// Set for constructor parameters that cannot take a synthesised
    /// default (reference types).
    pub requires_explicit_value: bool,
}

impl Parameter {
    pub const fn has_default_value(&self) -> bool {
        self.default_value.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub modifiers: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeReference,
    pub has_return_type: bool,
    pub return_is_live_value: bool,
    pub is_interrupt_handler: bool,
    pub is_bare_function: bool,
    pub is_page_aligned: bool,
    pub alignment_bytes: Option<u64>,
    pub section_name: Option<String>,
    pub system_request_id: Option<u64>,
    pub intrinsic_name: Option<String>,
    /// Forward-compatibility markers: every `kernel_*` attribute name, in
    /// declaration order.
    pub kernel_markers: Vec<String>,
    pub is_blueprint_constructor: bool,
    pub is_blueprint_destructor: bool,
    pub blueprint_name: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintField {
    pub name: String,
    pub ty: TypeReference,
    pub attributes: Vec<Attribute>,
    pub bit_width: Option<u32>,
    pub alignment_bytes: Option<u64>,
    pub is_live_value: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blueprint {
    pub name: String,
    pub modifiers: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub fields: Vec<BlueprintField>,
    pub is_packed: bool,
    pub alignment_bytes: Option<u64>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Import {
    pub module_path: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub package_name: String,
    pub module_name: String,
    pub imports: Vec<Import>,
    pub functions: Vec<Function>,
    pub blueprints: Vec<Blueprint>,
    pub span: SourceSpan,
}
