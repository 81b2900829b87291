//! Basic blocks: straight-line instruction runs ended by a terminator.

use crate::{BasicBlockId, Instruction};

/// A basic block. The terminator is, by convention, the last
/// instruction; the verifier enforces that it is a `Return`, `Branch`,
/// or `CondBranch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicBlock {
    pub id: BasicBlockId,
    pub name: String,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(id: BasicBlockId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            instructions: Vec::new(),
        }
    }

    /// The block's terminator, when the block is non-empty.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Phi instructions sit at the front of a block; this is the index
    /// of the first non-phi instruction.
    pub fn phi_count(&self) -> usize {
        self.instructions
            .iter()
            .position(|instruction| !instruction.is_phi())
            .unwrap_or(self.instructions.len())
    }
}
