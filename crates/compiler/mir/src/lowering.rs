//! HIR to MIR lowering.
//!
//! Declaration-surface lowering: each function (and a synthetic
//! `blueprint.<Name>` function per blueprint) gets a single `entry`
//! block holding one `Unary` annotation instruction per modifier,
//! attribute, return record, and parameter, in a fixed order, followed
//! by a `Return` terminator. Type text in details always uses the
//! normalised rendering so reruns print identically.

use bolt_compiler_hir as hir;
use log::debug;

use crate::{Blueprint, BlueprintField, Function, InstructionKind, Module, Parameter};

fn join_list(list: &[String], label: &str) -> String {
    let mut text = String::from(label);
    for entry in list {
        text.push(' ');
        text.push_str(entry);
    }
    text
}

/// Lowers a bound HIR module into MIR.
pub fn lower_from_hir(hir_module: &hir::Module) -> Module {
    let mut module = Module {
        package_name: hir_module.package_name.clone(),
        module_name: hir_module.module_name.clone(),
        ..Module::default()
    };

    module.canonical_module_path = if hir_module.package_name.is_empty()
        || hir_module.package_name == hir_module.module_name
    {
        hir_module.module_name.clone()
    } else {
        format!("{}::{}", hir_module.package_name, hir_module.module_name)
    };

    module.imports = hir_module
        .imports
        .iter()
        .map(|import| import.module_path.clone())
        .collect();

    for hir_function in &hir_module.functions {
        let function = lower_function(hir_function);
        module.functions.push(function);
    }

    for hir_blueprint in &hir_module.blueprints {
        module.blueprints.push(lower_blueprint_record(hir_blueprint));
        let function = lower_blueprint_function(hir_blueprint);
        module.functions.push(function);
    }

    debug!(
        "lowered module '{}' with {} functions",
        module.canonical_module_path,
        module.functions.len()
    );

    module
}

fn lower_function(hir_function: &hir::Function) -> Function {
    let mut function = Function::new(&hir_function.name);
    function.is_blueprint_constructor = hir_function.is_blueprint_constructor;
    function.is_blueprint_destructor = hir_function.is_blueprint_destructor;
    function.blueprint_name = hir_function.blueprint_name.clone();

    let mut details: Vec<String> = Vec::new();

    if !hir_function.modifiers.is_empty() {
        details.push(join_list(&hir_function.modifiers, "modifiers:"));
    }

    if hir_function.is_interrupt_handler {
        details.push("attr interruptHandler".to_string());
    }
    if hir_function.is_bare_function {
        details.push("attr bareFunction".to_string());
    }
    if hir_function.is_page_aligned {
        details.push("attr pageAligned".to_string());
    }
    if let Some(section_name) = &hir_function.section_name {
        details.push(format!("section {section_name}"));
    }
    if let Some(alignment) = hir_function.alignment_bytes {
        details.push(format!("aligned {alignment}"));
    }
    if let Some(identifier) = hir_function.system_request_id {
        details.push(format!("systemRequest {identifier}"));
    }
    if let Some(intrinsic_name) = &hir_function.intrinsic_name {
        details.push(format!("intrinsic {intrinsic_name}"));
    }
    if !hir_function.kernel_markers.is_empty() {
        details.push(join_list(&hir_function.kernel_markers, "kernelMarkers:"));
    }

    if hir_function.has_return_type {
        function.has_return_type = true;
        function.return_type = hir_function.return_type.clone();
        function.return_is_live = hir_function.return_is_live_value;
        let mut detail = format!("return {}", function.return_type.canonical_text());
        if hir_function.return_is_live_value {
            detail.push_str(" [live]");
        }
        details.push(detail);
    }

    for parameter in &hir_function.parameters {
        function.parameters.push(Parameter {
            ty: parameter.ty.clone(),
            name: parameter.name.clone(),
            is_live: parameter.is_live_value,
            default_value: parameter.default_value.clone(),
            requires_explicit_value: parameter.requires_explicit_value,
        });

        let mut detail = format!(
            "param {} {}",
            parameter.ty.canonical_text(),
            parameter.name
        );
        if parameter.is_live_value {
            detail.push_str(" [live]");
        }
        if let Some(default_value) = &parameter.default_value {
            detail.push_str(&format!(" default={default_value}"));
        }
        if parameter.requires_explicit_value {
            detail.push_str(" required");
        }
        details.push(detail);
    }

    let entry = function.append_block("entry");
    for detail in details {
        entry.append_instruction(InstructionKind::Unary).detail = detail;
    }
    entry.append_instruction(InstructionKind::Return).detail = "function".to_string();

    function
}

fn lower_blueprint_record(hir_blueprint: &hir::Blueprint) -> Blueprint {
    Blueprint {
        name: hir_blueprint.name.clone(),
        modifiers: hir_blueprint.modifiers.clone(),
        is_packed: hir_blueprint.is_packed,
        alignment_bytes: hir_blueprint.alignment_bytes,
        fields: hir_blueprint
            .fields
            .iter()
            .map(|field| BlueprintField {
                name: field.name.clone(),
                ty: field.ty.clone(),
                is_live: field.is_live_value,
                bit_width: field.bit_width,
                alignment_bytes: field.alignment_bytes,
            })
            .collect(),
    }
}

fn lower_blueprint_function(hir_blueprint: &hir::Blueprint) -> Function {
    let mut function = Function::new(format!("blueprint.{}", hir_blueprint.name));

    let mut details: Vec<String> = Vec::new();
    if !hir_blueprint.modifiers.is_empty() {
        details.push(join_list(&hir_blueprint.modifiers, "modifiers:"));
    }
    if hir_blueprint.is_packed {
        details.push("attr packed".to_string());
    }
    if let Some(alignment) = hir_blueprint.alignment_bytes {
        details.push(format!("aligned {alignment}"));
    }

    for field in &hir_blueprint.fields {
        let mut detail = format!("field {} {}", field.ty.canonical_text(), field.name);
        if field.is_live_value {
            detail.push_str(" [live]");
        }
        if let Some(bit_width) = field.bit_width {
            detail.push_str(&format!(" bits={bit_width}"));
        }
        if let Some(alignment) = field.alignment_bytes {
            detail.push_str(&format!(" align={alignment}"));
        }
        details.push(detail);
    }

    let entry = function.append_block("entry");
    for detail in details {
        entry.append_instruction(InstructionKind::Unary).detail = detail;
    }
    entry.append_instruction(InstructionKind::Return).detail = "blueprint".to_string();

    function
}
