//! Canonical-form determinism over the full front end.

use bolt_compiler_hir::bind_unit;
use bolt_compiler_mir::{canonical_hash, canonical_print, lower_from_hir, Module};
use bolt_compiler_parser::parse_source;

fn build_mir(source: &str) -> Module {
    let parsed = parse_source(source, "canonical-test");
    assert!(parsed.diagnostics.is_empty());
    let bound = bind_unit(&parsed.unit, "canonical-test");
    assert!(bound.diagnostics.is_empty());
    lower_from_hir(&bound.module)
}

const SOURCE: &str = r#"package demo.tests; module demo.tests;

public integer function alpha() {
    return 0;
}

public integer function beta(integer value) {
    return value;
}
"#;

#[test]
fn produces_deterministic_output() {
    let mir_module = build_mir(SOURCE);

    let canonical = canonical_print(&mir_module);
    let expected = "\
module demo.tests
package demo.tests
canonical demo.tests
function alpha
  block 0 entry
    inst 0 7 modifiers: public
    inst 1 7 return integer
    inst 2 1 function
function beta
  block 0 entry
    inst 0 7 modifiers: public
    inst 1 7 return integer
    inst 2 7 param integer value
    inst 3 1 function
";
    assert_eq!(canonical, expected);

    // Hash is stable across calls on the same module.
    assert_eq!(canonical_hash(&mir_module), canonical_hash(&mir_module));
}

#[test]
fn equal_sources_hash_equal() {
    let first = build_mir(SOURCE);
    let second = build_mir(SOURCE);
    assert_eq!(canonical_print(&first), canonical_print(&second));
    assert_eq!(canonical_hash(&first), canonical_hash(&second));
}

#[test]
fn different_modules_render_differently() {
    let first = build_mir(SOURCE);
    let second = build_mir(
        "package demo.tests; module demo.tests;\n\npublic integer function alpha() {\n    return 1;\n}\n\npublic void function gamma() {}\n",
    );
    assert_ne!(canonical_print(&first), canonical_print(&second));
}
