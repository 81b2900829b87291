//! Control-flow graph construction.

use rustc_hash::FxHashMap;

use crate::{BasicBlockId, Function};

/// Successor and predecessor edges of one block. Both lists are
/// deduplicated and sorted by block id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFlowGraphNode {
    pub block: BasicBlockId,
    pub successors: Vec<BasicBlockId>,
    pub predecessors: Vec<BasicBlockId>,
}

#[derive(Debug, Clone, Default)]
pub struct ControlFlowGraph {
    pub nodes: Vec<ControlFlowGraphNode>,
    index_by_id: FxHashMap<BasicBlockId, usize>,
}

impl ControlFlowGraph {
    pub fn find_node(&self, block_id: BasicBlockId) -> Option<&ControlFlowGraphNode> {
        self.index_by_id
            .get(&block_id)
            .map(|&index| &self.nodes[index])
    }
}

fn append_unique(list: &mut Vec<BasicBlockId>, block_id: BasicBlockId) {
    if !list.contains(&block_id) {
        list.push(block_id);
    }
}

/// Builds the CFG for a function. Successors are read from each block's
/// terminator; edges to unknown block ids are dropped.
pub fn build_control_flow_graph(function: &Function) -> ControlFlowGraph {
    let mut graph = ControlFlowGraph::default();

    for block in &function.blocks {
        graph.index_by_id.insert(block.id, graph.nodes.len());
        graph.nodes.push(ControlFlowGraphNode {
            block: block.id,
            successors: Vec::new(),
            predecessors: Vec::new(),
        });
    }

    for (index, block) in function.blocks.iter().enumerate() {
        let Some(terminator) = block.instructions.last() else {
            continue;
        };
        for &successor_id in &terminator.successors {
            if graph.index_by_id.contains_key(&successor_id) {
                append_unique(&mut graph.nodes[index].successors, successor_id);
            }
        }
        graph.nodes[index].successors.sort_unstable();
    }

    for index in 0..graph.nodes.len() {
        let block_id = graph.nodes[index].block;
        let successors = graph.nodes[index].successors.clone();
        for successor_id in successors {
            let successor_index = graph.index_by_id[&successor_id];
            append_unique(&mut graph.nodes[successor_index].predecessors, block_id);
        }
    }

    for node in &mut graph.nodes {
        node.predecessors.sort_unstable();
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BasicBlockId, Function, InstructionKind};

    fn diamond() -> Function {
        let mut function = Function::new("diamond");
        let entry = function.append_block("entry");
        let cond = entry.append_instruction(InstructionKind::CondBranch);
        cond.successors = vec![BasicBlockId::from_raw(1), BasicBlockId::from_raw(2)];

        let then_block = function.append_block("then");
        then_block
            .append_instruction(InstructionKind::Branch)
            .successors = vec![BasicBlockId::from_raw(3)];

        let else_block = function.append_block("else");
        else_block
            .append_instruction(InstructionKind::Branch)
            .successors = vec![BasicBlockId::from_raw(3)];

        let merge = function.append_block("merge");
        merge.append_instruction(InstructionKind::Return);

        function
    }

    #[test]
    fn diamond_edges_are_sorted_and_deduplicated() {
        let function = diamond();
        let graph = build_control_flow_graph(&function);

        let entry = graph.find_node(BasicBlockId::from_raw(0)).unwrap();
        assert_eq!(
            entry.successors,
            vec![BasicBlockId::from_raw(1), BasicBlockId::from_raw(2)]
        );
        assert!(entry.predecessors.is_empty());

        let merge = graph.find_node(BasicBlockId::from_raw(3)).unwrap();
        assert!(merge.successors.is_empty());
        assert_eq!(
            merge.predecessors,
            vec![BasicBlockId::from_raw(1), BasicBlockId::from_raw(2)]
        );
    }

    #[test]
    fn duplicate_successor_entries_collapse() {
        let mut function = Function::new("dup");
        let entry = function.append_block("entry");
        entry
            .append_instruction(InstructionKind::CondBranch)
            .successors = vec![BasicBlockId::from_raw(1), BasicBlockId::from_raw(1)];
        function
            .append_block("next")
            .append_instruction(InstructionKind::Return);

        let graph = build_control_flow_graph(&function);
        let entry_node = graph.find_node(BasicBlockId::from_raw(0)).unwrap();
        assert_eq!(entry_node.successors, vec![BasicBlockId::from_raw(1)]);
        let next_node = graph.find_node(BasicBlockId::from_raw(1)).unwrap();
        assert_eq!(next_node.predecessors, vec![BasicBlockId::from_raw(0)]);
    }

    #[test]
    fn edges_to_unknown_blocks_are_dropped() {
        let mut function = Function::new("dangling");
        let entry = function.append_block("entry");
        entry.append_instruction(InstructionKind::Branch).successors =
            vec![BasicBlockId::from_raw(7)];

        let graph = build_control_flow_graph(&function);
        assert!(graph
            .find_node(BasicBlockId::from_raw(0))
            .unwrap()
            .successors
            .is_empty());
    }
}
