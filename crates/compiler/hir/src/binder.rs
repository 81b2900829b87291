//! Lifts a parsed compilation unit into HIR.
//!
//! The binder owns the attribute policy (which attribute is legal where,
//! and what its arguments mean), symbol-uniqueness checks, the Live
//! marker, and blueprint lifecycle binding: a function named after a
//! blueprint is its constructor, `~Name` its destructor.

use std::collections::{HashMap, HashSet};

use bolt_compiler_diagnostics::{Diagnostic, DiagnosticCode, SourceSpan};
use bolt_compiler_parser::ast;
use bolt_compiler_parser::ast::AttributeArgument;
use tracing::debug;

use crate::module::{Attribute, Blueprint, BlueprintField, Function, Import, Module, Parameter};
use crate::type_ref::{parse_type_reference, parse_unsigned, strip_live_marker, TypeKind};

/// Result of binding one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOutput {
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeContext {
    Function,
    Blueprint,
    BlueprintField,
}

impl AttributeContext {
    const fn describe(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Blueprint => "blueprint",
            Self::BlueprintField => "blueprint field",
        }
    }

    const fn allowed(self) -> &'static [&'static str] {
        match self {
            Self::Function => &[
                "interruptHandler",
                "bareFunction",
                "inSection",
                "aligned",
                "pageAligned",
                "systemRequest",
                "intrinsic",
            ],
            Self::Blueprint => &["packed", "aligned"],
            Self::BlueprintField => &["bits", "aligned"],
        }
    }
}

// Stage-0: no attributes are repeatable yet.
fn is_repeatable_attribute(_name: &str) -> bool {
    false
}

pub struct Binder<'a> {
    ast: &'a ast::CompilationUnit,
    module_path: &'a str,
    diagnostics: Vec<Diagnostic>,
    function_symbols: HashMap<String, SourceSpan>,
    blueprint_symbols: HashMap<String, SourceSpan>,
    blueprint_names: HashSet<String>,
}

impl<'a> Binder<'a> {
    pub fn new(ast: &'a ast::CompilationUnit, module_path: &'a str) -> Self {
        Self {
            ast,
            module_path,
            diagnostics: Vec::new(),
            function_symbols: HashMap::new(),
            blueprint_symbols: HashMap::new(),
            blueprint_names: HashSet::new(),
        }
    }

    pub fn bind(mut self) -> BindOutput {
        let mut module = Module {
            package_name: self.ast.module.package_name.clone(),
            module_name: self.ast.module.module_name.clone(),
            span: self.ast.module.span,
            ..Module::default()
        };

        let mut import_symbols: HashMap<String, SourceSpan> = HashMap::new();
        for import_decl in &self.ast.imports {
            if import_decl.module_path.is_empty() {
                continue;
            }

            if import_symbols.contains_key(&import_decl.module_path) {
                self.emit(
                    DiagnosticCode::DuplicateImport,
                    format!(
                        "Duplicate import '{}' in module.",
                        import_decl.module_path
                    ),
                    import_decl.span,
                );
                continue;
            }
            import_symbols.insert(import_decl.module_path.clone(), import_decl.span);

            module.imports.push(Import {
                module_path: import_decl.module_path.clone(),
                span: import_decl.span,
            });
        }

        // Lifecycle binding needs blueprint names before any function is
        // converted, regardless of declaration order.
        self.blueprint_names = self
            .ast
            .blueprints
            .iter()
            .map(|blueprint| blueprint.name.clone())
            .collect();

        for function in &self.ast.functions {
            let converted = self.convert_function(function);
            module.functions.push(converted);
        }

        for blueprint in &self.ast.blueprints {
            let converted = self.convert_blueprint(blueprint);
            module.blueprints.push(converted);
        }

        debug!(
            module = self.module_path,
            functions = module.functions.len(),
            blueprints = module.blueprints.len(),
            diagnostics = self.diagnostics.len(),
            "bound module"
        );

        BindOutput {
            module,
            diagnostics: self.diagnostics,
        }
    }

    fn emit(&mut self, code: DiagnosticCode, message: impl Into<String>, span: SourceSpan) {
        self.diagnostics.push(Diagnostic::new(code, message, span));
    }

    fn convert_attribute(attribute: &ast::Attribute) -> Attribute {
        Attribute {
            name: attribute.name.clone(),
            arguments: attribute.arguments.clone(),
            span: attribute.span,
        }
    }

    fn check_duplicate_attributes(&mut self, attributes: &[Attribute]) {
        let mut seen: HashSet<&str> = HashSet::new();
        for attribute in attributes {
            if !seen.insert(&attribute.name) && !is_repeatable_attribute(&attribute.name) {
                self.emit(
                    DiagnosticCode::DuplicateAttribute,
                    format!("Duplicate attribute '{}' is not allowed.", attribute.name),
                    attribute.span,
                );
            }
        }
    }

    fn validate_attributes(&mut self, attributes: &[Attribute], context: AttributeContext) {
        for attribute in attributes {
            let allowed = context.allowed().contains(&attribute.name.as_str())
                || attribute.name.starts_with("kernel_");
            if !allowed {
                self.emit(
                    DiagnosticCode::UnknownAttribute,
                    format!(
                        "Unknown or misplaced attribute '{}' on {}.",
                        attribute.name,
                        context.describe()
                    ),
                    attribute.span,
                );
            }
        }
    }

    /// Finds the argument named `name`, falling back to the first
    /// positional argument.
    fn find_attribute_argument<'b>(
        attribute: &'b Attribute,
        name: &str,
    ) -> Option<&'b AttributeArgument> {
        if !name.is_empty() {
            if let Some(argument) = attribute
                .arguments
                .iter()
                .find(|argument| argument.name == name)
            {
                return Some(argument);
            }
        }
        attribute
            .arguments
            .iter()
            .find(|argument| argument.name.is_empty())
            .or_else(|| {
                if name.is_empty() {
                    attribute.arguments.first()
                } else {
                    None
                }
            })
    }

    fn apply_live_marker(
        &mut self,
        raw_type: &mut String,
        is_live: &mut bool,
        subject: &str,
        span: SourceSpan,
    ) {
        let stripped = strip_live_marker(raw_type).map(str::to_string);
        match stripped {
            Some(rest) if rest.is_empty() => {
                self.emit(
                    DiagnosticCode::LiveWithoutType,
                    format!("LiveValue qualifier on {subject} must reference a concrete type."),
                    span,
                );
            }
            Some(rest) => {
                *raw_type = rest;
                *is_live = true;
            }
            None => {}
        }
    }

    // --- Functions ---

    fn convert_function(&mut self, function: &ast::FunctionDeclaration) -> Function {
        let mut converted = Function {
            name: function.name.clone(),
            modifiers: function.modifiers.clone(),
            span: function.span,
            ..Function::default()
        };

        if self.function_symbols.contains_key(&converted.name) {
            self.emit(
                DiagnosticCode::DuplicateFunction,
                format!("Duplicate function '{}' in module.", converted.name),
                converted.span,
            );
        } else {
            self.function_symbols
                .insert(converted.name.clone(), converted.span);
        }

        converted.attributes = function
            .attributes
            .iter()
            .map(Self::convert_attribute)
            .collect();
        let attributes = converted.attributes.clone();
        self.check_duplicate_attributes(&attributes);
        self.validate_attributes(&attributes, AttributeContext::Function);

        for attribute in &attributes {
            match attribute.name.as_str() {
                "interruptHandler" => {
                    if converted.is_bare_function {
                        self.emit(
                            DiagnosticCode::ConflictingFunctionAttributes,
                            "Attributes 'interruptHandler' and 'bareFunction' cannot be combined.",
                            attribute.span,
                        );
                    }
                    converted.is_interrupt_handler = true;
                }
                "bareFunction" => {
                    if converted.is_interrupt_handler {
                        self.emit(
                            DiagnosticCode::ConflictingFunctionAttributes,
                            "Attributes 'interruptHandler' and 'bareFunction' cannot be combined.",
                            attribute.span,
                        );
                    }
                    converted.is_bare_function = true;
                }
                "inSection" => match Self::find_attribute_argument(attribute, "name") {
                    Some(argument) if !argument.value.is_empty() => {
                        converted.section_name = Some(argument.value.clone());
                    }
                    _ => self.emit(
                        DiagnosticCode::InvalidAttributeArgument,
                        "Attribute 'inSection' requires a section name.",
                        attribute.span,
                    ),
                },
                "aligned" => match Self::find_attribute_argument(attribute, "bytes") {
                    None => self.emit(
                        DiagnosticCode::InvalidAttributeArgument,
                        "Attribute 'aligned' requires a positive integer argument.",
                        attribute.span,
                    ),
                    Some(argument) => match parse_unsigned(&argument.value) {
                        Some(value) if value > 0 => converted.alignment_bytes = Some(value),
                        _ => {
                            let span = argument.span;
                            self.emit(
                                DiagnosticCode::InvalidAttributeArgument,
                                "Attribute 'aligned' requires a positive integer argument.",
                                span,
                            );
                        }
                    },
                },
                "pageAligned" => converted.is_page_aligned = true,
                "systemRequest" => match Self::find_attribute_argument(attribute, "identifier") {
                    None => self.emit(
                        DiagnosticCode::InvalidAttributeArgument,
                        "Attribute 'systemRequest' requires an identifier argument.",
                        attribute.span,
                    ),
                    Some(argument) => match parse_unsigned(&argument.value) {
                        Some(value) => converted.system_request_id = Some(value),
                        None => {
                            let span = argument.span;
                            self.emit(
                                DiagnosticCode::InvalidAttributeArgument,
                                "Attribute 'systemRequest' requires an integer identifier.",
                                span,
                            );
                        }
                    },
                },
                "intrinsic" => match Self::find_attribute_argument(attribute, "name") {
                    Some(argument) if !argument.value.is_empty() => {
                        converted.intrinsic_name = Some(argument.value.clone());
                    }
                    _ => self.emit(
                        DiagnosticCode::InvalidAttributeArgument,
                        "Attribute 'intrinsic' requires a non-empty name argument.",
                        attribute.span,
                    ),
                },
                name if name.starts_with("kernel_") => {
                    converted.kernel_markers.push(name.to_string());
                }
                _ => {}
            }
        }

        for parameter in &function.parameters {
            let mut raw_type = parameter.type_name.clone();
            let mut is_live = false;
            let subject = format!(
                "parameter '{}' in function '{}'",
                parameter.name, converted.name
            );
            self.apply_live_marker(&mut raw_type, &mut is_live, &subject, parameter.type_span);

            let ty = parse_type_reference(&raw_type, parameter.type_span, &mut self.diagnostics);
            converted.parameters.push(Parameter {
                name: parameter.name.clone(),
                ty,
                span: parameter.span,
                is_live_value: is_live,
                default_value: None,
                requires_explicit_value: false,
            });
        }

        let mut parameter_symbols: HashSet<String> = HashSet::new();
        for parameter in &converted.parameters {
            if !parameter_symbols.insert(parameter.name.clone()) {
                let message = format!(
                    "Duplicate parameter '{}' in function '{}'.",
                    parameter.name, converted.name
                );
                let span = parameter.span;
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticCode::DuplicateParameter,
                    message,
                    span,
                ));
            }
        }

        if let Some(return_type) = &function.return_type {
            let mut raw_type = return_type.clone();
            let span = function.return_type_span.unwrap_or(function.span);
            let subject = format!("return type of function '{}'", converted.name);
            let mut is_live = false;
            self.apply_live_marker(&mut raw_type, &mut is_live, &subject, span);
            converted.return_is_live_value = is_live;
            converted.return_type = parse_type_reference(&raw_type, span, &mut self.diagnostics);
            converted.has_return_type = true;
        }

        self.bind_lifecycle(&mut converted);
        converted
    }

    /// Constructor/destructor binding against the module's blueprints.
    fn bind_lifecycle(&mut self, function: &mut Function) {
        if let Some(stripped) = function.name.strip_prefix('~') {
            if self.blueprint_names.contains(stripped) {
                function.is_blueprint_destructor = true;
                function.blueprint_name = Some(stripped.to_string());
                if !function.parameters.is_empty() {
                    let span = function.span;
                    self.emit(
                        DiagnosticCode::DestructorWithParameters,
                        format!("Destructor '~{stripped}' must not declare parameters."),
                        span,
                    );
                }
            }
            return;
        }

        if !self.blueprint_names.contains(&function.name) {
            return;
        }

        function.is_blueprint_constructor = true;
        function.blueprint_name = Some(function.name.clone());

        let function_name = function.name.clone();
        for parameter in &mut function.parameters {
            match default_value_for(&parameter.ty) {
                DefaultValue::Value(value) => parameter.default_value = Some(value.to_string()),
                DefaultValue::ExplicitRequired => {
                    parameter.requires_explicit_value = true;
                    let message = format!(
                        "Constructor parameter '{}' of blueprint '{}' takes a reference and requires an explicit value.",
                        parameter.name, function_name
                    );
                    let span = parameter.span;
                    self.diagnostics.push(Diagnostic::warning(
                        DiagnosticCode::ConstructorReferenceParameter,
                        message,
                        span,
                    ));
                }
                DefaultValue::None => {}
            }
        }
    }

    // --- Blueprints ---

    fn convert_blueprint(&mut self, blueprint: &ast::BlueprintDeclaration) -> Blueprint {
        let mut converted = Blueprint {
            name: blueprint.name.clone(),
            modifiers: blueprint.modifiers.clone(),
            span: blueprint.span,
            ..Blueprint::default()
        };

        if self.blueprint_symbols.contains_key(&converted.name) {
            self.emit(
                DiagnosticCode::DuplicateBlueprint,
                format!("Duplicate blueprint '{}' in module.", converted.name),
                converted.span,
            );
        } else {
            self.blueprint_symbols
                .insert(converted.name.clone(), converted.span);
        }

        converted.attributes = blueprint
            .attributes
            .iter()
            .map(Self::convert_attribute)
            .collect();
        let attributes = converted.attributes.clone();
        self.check_duplicate_attributes(&attributes);
        self.validate_attributes(&attributes, AttributeContext::Blueprint);

        for attribute in &attributes {
            match attribute.name.as_str() {
                "packed" => converted.is_packed = true,
                "aligned" => match Self::find_attribute_argument(attribute, "bytes") {
                    None => self.emit(
                        DiagnosticCode::InvalidAttributeArgument,
                        "Blueprint-level 'aligned' requires a positive integer argument.",
                        attribute.span,
                    ),
                    Some(argument) => match parse_unsigned(&argument.value) {
                        Some(value) if value > 0 => converted.alignment_bytes = Some(value),
                        _ => {
                            let span = argument.span;
                            self.emit(
                                DiagnosticCode::InvalidAttributeArgument,
                                "Blueprint-level 'aligned' requires a positive integer argument.",
                                span,
                            );
                        }
                    },
                },
                _ => {}
            }
        }

        let mut field_symbols: HashSet<String> = HashSet::new();
        for field in &blueprint.fields {
            let converted_field =
                self.convert_field(field, converted.is_packed, &converted.name);
            if !field_symbols.insert(converted_field.name.clone()) {
                let message = format!(
                    "Duplicate field '{}' in blueprint '{}'.",
                    converted_field.name, converted.name
                );
                let span = converted_field.span;
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticCode::DuplicateField,
                    message,
                    span,
                ));
            }
            converted.fields.push(converted_field);
        }

        converted
    }

    fn convert_field(
        &mut self,
        field: &ast::BlueprintField,
        parent_is_packed: bool,
        blueprint_name: &str,
    ) -> BlueprintField {
        let mut converted = BlueprintField {
            name: field.name.clone(),
            span: field.span,
            ..BlueprintField::default()
        };

        converted.attributes = field
            .attributes
            .iter()
            .map(Self::convert_attribute)
            .collect();
        let attributes = converted.attributes.clone();
        self.check_duplicate_attributes(&attributes);
        self.validate_attributes(&attributes, AttributeContext::BlueprintField);

        for attribute in &attributes {
            match attribute.name.as_str() {
                "bits" => match Self::find_attribute_argument(attribute, "width") {
                    None => self.emit(
                        DiagnosticCode::InvalidAttributeArgument,
                        "Attribute 'bits' requires a width argument.",
                        attribute.span,
                    ),
                    Some(argument) => match parse_unsigned(&argument.value) {
                        Some(value) if (1..=64).contains(&value) => {
                            converted.bit_width = Some(value as u32);
                            if !parent_is_packed {
                                let span = attribute.span;
                                self.emit(
                                    DiagnosticCode::BitsOutsidePacked,
                                    "Attribute 'bits' requires the containing blueprint to be marked 'packed'.",
                                    span,
                                );
                            }
                        }
                        _ => {
                            let span = argument.span;
                            self.emit(
                                DiagnosticCode::InvalidAttributeArgument,
                                "Attribute 'bits' requires a width between 1 and 64.",
                                span,
                            );
                        }
                    },
                },
                "aligned" => match Self::find_attribute_argument(attribute, "bytes") {
                    None => self.emit(
                        DiagnosticCode::InvalidAttributeArgument,
                        "Field-level 'aligned' requires a positive integer argument.",
                        attribute.span,
                    ),
                    Some(argument) => match parse_unsigned(&argument.value) {
                        Some(value) if value > 0 => converted.alignment_bytes = Some(value),
                        _ => {
                            let span = argument.span;
                            self.emit(
                                DiagnosticCode::InvalidAttributeArgument,
                                "Field-level 'aligned' requires a positive integer argument.",
                                span,
                            );
                        }
                    },
                },
                _ => {}
            }
        }

        let mut raw_type = field.type_name.clone();
        let mut is_live = false;
        let subject = format!(
            "field '{}' in blueprint '{}'",
            converted.name, blueprint_name
        );
        self.apply_live_marker(&mut raw_type, &mut is_live, &subject, field.type_span);
        converted.is_live_value = is_live;
        converted.ty = parse_type_reference(&raw_type, field.type_span, &mut self.diagnostics);

        converted
    }
}

enum DefaultValue {
    Value(&'static str),
    ExplicitRequired,
    None,
}

/// Synthesised constructor defaults per type category.
fn default_value_for(ty: &crate::type_ref::TypeReference) -> DefaultValue {
    match ty.kind {
        TypeKind::Pointer => DefaultValue::Value("null"),
        TypeKind::Reference => DefaultValue::ExplicitRequired,
        TypeKind::Named if ty.is_builtin => match ty.base_name() {
            "integer" | "byte" => DefaultValue::Value("0"),
            "float" => DefaultValue::Value("0.0"),
            _ => DefaultValue::None,
        },
        _ => DefaultValue::None,
    }
}

/// Binds a compilation unit in one call.
pub fn bind_unit(unit: &ast::CompilationUnit, module_path: &str) -> BindOutput {
    Binder::new(unit, module_path).bind()
}
