//! Function-level MIR: the CFG of basic blocks plus the signature
//! metadata lowering copies over from HIR.

use bolt_compiler_hir::TypeReference;

use crate::BasicBlock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    pub ty: TypeReference,
    pub name: String,
    pub is_live: bool,
    pub default_value: Option<String>,
    pub requires_explicit_value: bool,
}

impl Parameter {
    pub const fn has_default_value(&self) -> bool {
        self.default_value.is_some()
    }
}

/// One function's control flow graph. The first block is the entry and
/// is named `"entry"`; `next_block_id`/`next_value_id` hand out fresh
/// ids for blocks and temporaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub has_return_type: bool,
    pub return_type: TypeReference,
    pub return_is_live: bool,
    pub blocks: Vec<BasicBlock>,
    pub next_block_id: u32,
    pub next_value_id: u32,
    pub is_blueprint_constructor: bool,
    pub is_blueprint_destructor: bool,
    pub blueprint_name: Option<String>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The entry block, when any block exists.
    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn find_block(&self, id: crate::BasicBlockId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|block| block.id == id)
    }
}
