//! # Bolt Mid-level Intermediate Representation (MIR)
//!
//! This crate defines the control-flow-graph IR the front end lowers
//! into, together with the analyses and passes that run over it.
//!
//! ## Architecture
//!
//! ```text
//! Module
//!   functions: Vec<Function>
//!
//! Function
//!   blocks: Vec<BasicBlock>     first block is the "entry" block
//!
//! BasicBlock
//!   instructions: Vec<Instruction>   last instruction is the terminator
//! ```
//!
//! ## Determinism
//!
//! Everything observable is deterministic: CFG successor/predecessor
//! lists, dominator-tree children, and dominance frontiers are sorted by
//! block id, and the canonical print (the input to the 64-bit module
//! hash) orders functions by name and blocks by id. Re-running any stage
//! over equal input yields byte-identical output.

pub mod analysis;
pub mod basic_block;
pub mod builder;
pub mod canonical;
pub mod function;
pub mod instruction;
pub mod lowering;
pub mod module;
pub mod passes;
pub mod printer;
pub mod value;
pub mod verifier;

pub use basic_block::BasicBlock;
pub use canonical::{canonical_hash, canonical_print};
pub use function::{Function, Parameter};
pub use instruction::{Instruction, InstructionKind};
pub use lowering::lower_from_hir;
pub use module::{Blueprint, BlueprintField, Module, ResolvedImport};
pub use printer::print_module;
pub use value::{Operand, Value, ValueKind};
pub use verifier::verify;

index_vec::define_index_type! {
    /// Identifier of a basic block within a function.
    pub struct BasicBlockId = u32;
    DEFAULT = BasicBlockId::from_raw(0);
}

index_vec::define_index_type! {
    /// Identifier of a value (temporary, parameter, constant, global)
    /// within a function.
    pub struct ValueId = u32;
    DEFAULT = ValueId::from_raw(0);
}
