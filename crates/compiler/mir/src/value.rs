//! Values and operands flowing through MIR instructions.

use crate::{BasicBlockId, ValueId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValueKind {
    #[default]
    Temporary,
    Parameter,
    Constant,
    Global,
}

/// A named value. A temporary's `id` is unique within its function
/// before SSA construction; the rename pass keeps the pre-SSA identity
/// reachable through `Instruction::original_temporary_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value {
    pub kind: ValueKind,
    pub id: ValueId,
    pub name: String,
}

impl Value {
    pub fn new(kind: ValueKind, id: ValueId, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
        }
    }

    pub fn temporary(id: ValueId, name: impl Into<String>) -> Self {
        Self::new(ValueKind::Temporary, id, name)
    }

    pub const fn is_temporary(&self) -> bool {
        matches!(self.kind, ValueKind::Temporary)
    }
}

/// An instruction input. `predecessor_block_id` is set only on phi
/// operands, naming the edge the value arrives on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operand {
    pub value: Value,
    pub predecessor_block_id: Option<BasicBlockId>,
}

impl Operand {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            predecessor_block_id: None,
        }
    }

    pub fn phi_input(value: Value, predecessor: BasicBlockId) -> Self {
        Self {
            value,
            predecessor_block_id: Some(predecessor),
        }
    }
}
