//! Lowering behaviour end to end: source through lexer, parser, and
//! binder into MIR.

use bolt_compiler_hir::{bind_unit, Module as HirModule};
use bolt_compiler_mir::{lower_from_hir, verify, InstructionKind};
use bolt_compiler_parser::parse_source;

fn build_hir(source: &str) -> HirModule {
    let parsed = parse_source(source, "lowering-test");
    assert!(
        parsed.diagnostics.is_empty(),
        "parser diagnostics present: {:?}",
        parsed.diagnostics
    );
    let bound = bind_unit(&parsed.unit, "lowering-test");
    assert!(
        bound.diagnostics.is_empty(),
        "binder diagnostics present: {:?}",
        bound.diagnostics
    );
    bound.module
}

#[test]
fn emits_function_details() {
    let source = r#"package demo.tests; module demo.tests;

[aligned(32)]
[systemRequest(identifier=3)]
public live integer32 function demoFunc(live integer32 value) {
    return value;
}
"#;

    let hir_module = build_hir(source);
    let mir_module = lower_from_hir(&hir_module);
    assert!(verify(&mir_module));

    assert_eq!(mir_module.functions.len(), 1);
    let function = &mir_module.functions[0];
    assert_eq!(function.blocks.len(), 1);
    let block = &function.blocks[0];
    assert_eq!(block.instructions.len(), 6);

    assert_eq!(block.instructions[0].kind, InstructionKind::Unary);
    assert_eq!(block.instructions[0].detail, "modifiers: public");
    assert_eq!(block.instructions[1].detail, "aligned 32");
    assert_eq!(block.instructions[2].detail, "systemRequest 3");
    assert_eq!(block.instructions[3].detail, "return integer [live]");
    assert_eq!(block.instructions[4].detail, "param integer value [live]");

    let terminator = block.instructions.last().unwrap();
    assert_eq!(terminator.kind, InstructionKind::Return);
    assert_eq!(terminator.detail, "function");
}

#[test]
fn emits_blueprint_details() {
    let source = r#"package demo.tests; module demo.tests;

[packed]
[aligned(64)]
public blueprint Timer {
    live integer32 start;
    [bits(8)] integer32 mode;
    [aligned(16)] [bits(4)] integer32 priority;
}
"#;

    let hir_module = build_hir(source);
    let mir_module = lower_from_hir(&hir_module);
    assert!(verify(&mir_module));

    assert_eq!(mir_module.functions.len(), 1);
    let function = &mir_module.functions[0];
    assert_eq!(function.name, "blueprint.Timer");
    let block = &function.blocks[0];
    assert_eq!(block.instructions.len(), 7);

    assert_eq!(block.instructions[0].detail, "modifiers: public");
    assert_eq!(block.instructions[1].detail, "attr packed");
    assert_eq!(block.instructions[2].detail, "aligned 64");
    assert_eq!(block.instructions[3].detail, "field integer start [live]");
    assert_eq!(block.instructions[4].detail, "field integer mode bits=8");
    assert_eq!(
        block.instructions[5].detail,
        "field integer priority bits=4 align=16"
    );

    let terminator = block.instructions.last().unwrap();
    assert_eq!(terminator.kind, InstructionKind::Return);
    assert_eq!(terminator.detail, "blueprint");

    // The structural record survives alongside the synthetic function.
    assert_eq!(mir_module.blueprints.len(), 1);
    let blueprint = &mir_module.blueprints[0];
    assert_eq!(blueprint.name, "Timer");
    assert!(blueprint.is_packed);
    assert_eq!(blueprint.alignment_bytes, Some(64));
    assert_eq!(blueprint.fields.len(), 3);
    assert_eq!(blueprint.fields[1].bit_width, Some(8));
}

#[test]
fn emits_link_function_and_blueprints() {
    let source = r#"package demo.tests; module demo.tests;

public blueprint FirstBlueprint {
    integer firstField;
}

public blueprint SecondBlueprint {
    integer secondField;
}

public link integer function staticFunctionTest(integer value) {
    return value;
}
"#;

    let hir_module = build_hir(source);
    let mir_module = lower_from_hir(&hir_module);
    assert!(verify(&mir_module));

    assert_eq!(mir_module.functions.len(), 3);

    let function = &mir_module.functions[0];
    assert_eq!(function.name, "staticFunctionTest");
    let block = &function.blocks[0];
    assert_eq!(block.instructions.len(), 4);
    assert_eq!(block.instructions[0].detail, "modifiers: public link");
    assert_eq!(block.instructions[1].detail, "return integer");
    assert_eq!(block.instructions[2].detail, "param integer value");
    assert_eq!(block.instructions[3].detail, "function");
    assert_eq!(block.instructions[3].kind, InstructionKind::Return);

    let first = &mir_module.functions[1];
    assert_eq!(first.name, "blueprint.FirstBlueprint");
    let first_block = &first.blocks[0];
    assert_eq!(first_block.instructions[0].detail, "modifiers: public");
    assert_eq!(first_block.instructions[1].detail, "field integer firstField");
    assert_eq!(
        first_block.instructions.last().unwrap().kind,
        InstructionKind::Return
    );

    let second = &mir_module.functions[2];
    assert_eq!(second.name, "blueprint.SecondBlueprint");
    let second_block = &second.blocks[0];
    assert_eq!(second_block.instructions[1].detail, "field integer secondField");
}

#[test]
fn constructor_metadata_reaches_parameter_details() {
    let source = r#"package demo.tests; module demo.tests;

public blueprint Widget {
    integer value;
}

public void function Widget(integer value) {}
"#;

    let hir_module = build_hir(source);
    let mir_module = lower_from_hir(&hir_module);

    let constructor = mir_module.find_function("Widget").unwrap();
    assert!(constructor.is_blueprint_constructor);
    assert_eq!(constructor.blueprint_name.as_deref(), Some("Widget"));
    assert_eq!(constructor.parameters.len(), 1);
    assert_eq!(
        constructor.parameters[0].default_value.as_deref(),
        Some("0")
    );

    let block = &constructor.blocks[0];
    assert!(block
        .instructions
        .iter()
        .any(|inst| inst.detail == "param integer value default=0"));
}

#[test]
fn canonical_module_path_derivation() {
    let same = build_hir("package demo; module demo;\n");
    assert_eq!(lower_from_hir(&same).canonical_module_path, "demo");

    let nested = build_hir("package demo; module app;\n");
    assert_eq!(lower_from_hir(&nested).canonical_module_path, "demo::app");
}

#[test]
fn lowering_is_pure() {
    let source = r#"package demo.tests; module demo.tests;

public integer function alpha() {
    return 0;
}
"#;

    let hir_module = build_hir(source);
    let first = lower_from_hir(&hir_module);
    let second = lower_from_hir(&hir_module);
    assert_eq!(first, second);
}

#[test]
fn imports_are_carried_onto_the_module() {
    let source = r#"package demo.tests; module demo.tests;
import demo.alpha;
import demo.beta;
"#;

    let hir_module = build_hir(source);
    let mir_module = lower_from_hir(&hir_module);
    assert_eq!(
        mir_module.imports,
        vec!["demo.alpha".to_string(), "demo.beta".to_string()]
    );
}
