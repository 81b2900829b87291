//! Construction helpers for MIR nodes.

use crate::{
    BasicBlock, BasicBlockId, Blueprint, Function, Instruction, InstructionKind, Module, Value,
    ValueId, ValueKind,
};

impl Module {
    /// Appends a fresh function and returns it for population.
    pub fn create_function(&mut self, name: &str) -> &mut Function {
        self.functions.push(Function::new(name));
        self.functions.last_mut().expect("function just pushed")
    }

    /// Appends a fresh blueprint record.
    pub fn create_blueprint(&mut self, name: &str) -> &mut Blueprint {
        self.blueprints.push(Blueprint {
            name: name.to_string(),
            ..Blueprint::default()
        });
        self.blueprints.last_mut().expect("blueprint just pushed")
    }
}

impl Function {
    /// Appends a block with the next free id. An empty name becomes
    /// `block<id>`.
    pub fn append_block(&mut self, name: &str) -> &mut BasicBlock {
        let id = BasicBlockId::from_raw(self.next_block_id);
        self.next_block_id += 1;
        let block_name = if name.is_empty() {
            format!("block{}", id.index())
        } else {
            name.to_string()
        };
        self.blocks.push(BasicBlock::new(id, block_name));
        self.blocks.last_mut().expect("block just pushed")
    }

    /// Allocates a fresh temporary. An empty name becomes `t<id>`.
    pub fn make_temporary(&mut self, name: &str) -> Value {
        let id = ValueId::from_raw(self.next_value_id);
        self.next_value_id += 1;
        let value_name = if name.is_empty() {
            format!("t{}", id.index())
        } else {
            name.to_string()
        };
        Value::new(ValueKind::Temporary, id, value_name)
    }
}

impl BasicBlock {
    /// Appends an instruction of `kind` and returns it for population.
    pub fn append_instruction(&mut self, kind: InstructionKind) -> &mut Instruction {
        self.instructions.push(Instruction::new(kind));
        self.instructions.last_mut().expect("instruction just pushed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ids_and_names_are_sequential() {
        let mut function = Function::new("demo");
        let first = function.append_block("entry").id;
        let second = function.append_block("").id;
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(function.blocks[1].name, "block1");
        assert_eq!(function.next_block_id, 2);
    }

    #[test]
    fn temporaries_default_their_names() {
        let mut function = Function::new("demo");
        let named = function.make_temporary("x");
        let unnamed = function.make_temporary("");
        assert_eq!(named.name, "x");
        assert_eq!(unnamed.name, "t1");
        assert_eq!(unnamed.id.index(), 1);
    }

    #[test]
    fn instructions_append_in_order() {
        let mut function = Function::new("demo");
        let block = function.append_block("entry");
        block.append_instruction(InstructionKind::Unary).detail = "first".to_string();
        block.append_instruction(InstructionKind::Return).detail = "function".to_string();
        assert_eq!(block.instructions.len(), 2);
        assert!(block.terminator().unwrap().is_terminator());
    }
}
