//! Canonical form: deterministic printing and the 64-bit module hash.
//!
//! The canonical print is the byte-stable rendering downstream caches
//! key on: functions in ascending name order, blocks in ascending id
//! order (ties broken by name), instructions in source order as
//! `inst <index> <kind> <detail>`. The hash is FNV-1a 64 over the
//! canonical print's UTF-8 bytes; both are pure functions of the module.

use std::fmt::Write;

use itertools::Itertools;

use crate::{BasicBlock, Function, Module};

fn sorted_functions(module: &Module) -> Vec<&Function> {
    module
        .functions
        .iter()
        .sorted_by(|a, b| a.name.cmp(&b.name))
        .collect()
}

fn sorted_blocks(function: &Function) -> Vec<&BasicBlock> {
    function
        .blocks
        .iter()
        .sorted_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)))
        .collect()
}

/// Renders the canonical text of a module. Exactly one trailing newline
/// per line, no trailing spaces.
pub fn canonical_print(module: &Module) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "module {}", module.module_name);
    if !module.package_name.is_empty() {
        let _ = writeln!(out, "package {}", module.package_name);
    }
    if !module.canonical_module_path.is_empty() {
        let _ = writeln!(out, "canonical {}", module.canonical_module_path);
    }

    for function in sorted_functions(module) {
        let _ = writeln!(out, "function {}", function.name);

        for block in sorted_blocks(function) {
            let _ = writeln!(out, "  block {} {}", block.id.index(), block.name);

            for (index, instruction) in block.instructions.iter().enumerate() {
                if instruction.detail.is_empty() {
                    let _ = writeln!(out, "    inst {} {}", index, instruction.kind.ordinal());
                } else {
                    let _ = writeln!(
                        out,
                        "    inst {} {} {}",
                        index,
                        instruction.kind.ordinal(),
                        instruction.detail
                    );
                }
            }
        }
    }

    out
}

const FNV_OFFSET: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// FNV-1a 64 over the canonical print. Equal canonical strings yield
/// equal hashes.
pub fn canonical_hash(module: &Module) -> u64 {
    let canonical = canonical_print(module);
    let mut hash = FNV_OFFSET;
    for byte in canonical.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
