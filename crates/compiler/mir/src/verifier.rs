//! Structural verifier.
//!
//! Pass/fail only, no diagnostics: every function needs at least one
//! block, the first block must be named `entry`, and every block must be
//! non-empty and end in a terminator.

use crate::Module;

pub fn verify(module: &Module) -> bool {
    for function in &module.functions {
        if function.blocks.is_empty() {
            return false;
        }

        for block in &function.blocks {
            match block.instructions.last() {
                None => return false,
                Some(instruction) if !instruction.kind.is_terminator() => return false,
                Some(_) => {}
            }
        }

        if function.blocks[0].name != "entry" {
            return false;
        }
    }

    true
}
