//! Dominator tree and dominance frontiers.
//!
//! The dominator sets are solved iteratively over a bit matrix indexed
//! by block position: `dom(entry) = {entry}`, and for every other block
//! `dom(b) = {b} ∪ ⋂ dom(p)` over its predecessors. Blocks unreachable
//! from entry keep `dom(b) = {b}` and have no immediate dominator. The
//! frontier walk follows Cytron et al.: for each join block, every
//! predecessor runs up the immediate-dominator chain, collecting the
//! join into each frontier it passes.

use rustc_hash::FxHashMap;

use crate::analysis::build_control_flow_graph;
use crate::{BasicBlockId, Function};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DominatorTreeNode {
    pub block: BasicBlockId,
    /// Every dominator of this block (including itself), sorted by id.
    pub dominators: Vec<BasicBlockId>,
    pub immediate_dominator: Option<BasicBlockId>,
    /// Dominator-tree children, sorted by id.
    pub children: Vec<BasicBlockId>,
}

#[derive(Debug, Clone, Default)]
pub struct DominatorTree {
    pub nodes: Vec<DominatorTreeNode>,
    index_by_id: FxHashMap<BasicBlockId, usize>,
}

impl DominatorTree {
    pub fn find_node(&self, block_id: BasicBlockId) -> Option<&DominatorTreeNode> {
        self.index_by_id
            .get(&block_id)
            .map(|&index| &self.nodes[index])
    }

    /// Whether `dominator_id` dominates `block_id`.
    pub fn dominates(&self, dominator_id: BasicBlockId, block_id: BasicBlockId) -> bool {
        self.find_node(block_id)
            .is_some_and(|node| node.dominators.contains(&dominator_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DominanceFrontierNode {
    pub block: BasicBlockId,
    /// The dominance frontier, deduplicated and sorted by id.
    pub frontier: Vec<BasicBlockId>,
}

#[derive(Debug, Clone, Default)]
pub struct DominanceFrontier {
    pub nodes: Vec<DominanceFrontierNode>,
    index_by_id: FxHashMap<BasicBlockId, usize>,
}

impl DominanceFrontier {
    pub fn find_node(&self, block_id: BasicBlockId) -> Option<&DominanceFrontierNode> {
        self.index_by_id
            .get(&block_id)
            .map(|&index| &self.nodes[index])
    }
}

type DominatorMatrix = Vec<Vec<bool>>;

fn predecessor_indices(
    predecessors: &[BasicBlockId],
    index_by_id: &FxHashMap<BasicBlockId, usize>,
) -> Vec<usize> {
    predecessors
        .iter()
        .filter_map(|id| index_by_id.get(id).copied())
        .collect()
}

fn compute_dominator_matrix(
    function: &Function,
    predecessors_by_index: &[Vec<usize>],
) -> DominatorMatrix {
    let block_count = function.blocks.len();
    let mut matrix: DominatorMatrix = vec![vec![false; block_count]; block_count];
    if block_count == 0 {
        return matrix;
    }

    for index in 0..block_count {
        if index == 0 || predecessors_by_index[index].is_empty() {
            matrix[index][index] = true;
        } else {
            matrix[index].iter_mut().for_each(|bit| *bit = true);
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for index in 1..block_count {
            let predecessors = &predecessors_by_index[index];

            let mut new_dominators = if predecessors.is_empty() {
                let mut only_self = vec![false; block_count];
                only_self[index] = true;
                only_self
            } else {
                let mut intersection = vec![true; block_count];
                for &predecessor_index in predecessors {
                    for candidate in 0..block_count {
                        intersection[candidate] =
                            intersection[candidate] && matrix[predecessor_index][candidate];
                    }
                }
                intersection
            };
            new_dominators[index] = true;

            if new_dominators != matrix[index] {
                matrix[index] = new_dominators;
                changed = true;
            }
        }
    }

    matrix
}

fn immediate_dominator_index(matrix: &DominatorMatrix, block_index: usize) -> Option<usize> {
    if block_index == 0 {
        return None;
    }

    let dominator_row = &matrix[block_index];
    for candidate in 0..dominator_row.len() {
        if !dominator_row[candidate] || candidate == block_index {
            continue;
        }

        // The immediate dominator is dominated by every other dominator.
        let dominated_by_all_others = (0..dominator_row.len()).all(|other| {
            other == candidate
                || other == block_index
                || !dominator_row[other]
                || matrix[candidate][other]
        });

        if dominated_by_all_others {
            return Some(candidate);
        }
    }

    None
}

/// Builds the dominator tree for a function.
pub fn build_dominator_tree(function: &Function) -> DominatorTree {
    let mut tree = DominatorTree::default();
    for block in &function.blocks {
        tree.index_by_id.insert(block.id, tree.nodes.len());
        tree.nodes.push(DominatorTreeNode {
            block: block.id,
            ..DominatorTreeNode::default()
        });
    }

    if function.blocks.is_empty() {
        return tree;
    }

    let cfg = build_control_flow_graph(function);
    let predecessors_by_index: Vec<Vec<usize>> = function
        .blocks
        .iter()
        .map(|block| {
            cfg.find_node(block.id)
                .map(|node| predecessor_indices(&node.predecessors, &tree.index_by_id))
                .unwrap_or_default()
        })
        .collect();

    let matrix = compute_dominator_matrix(function, &predecessors_by_index);

    for (block_index, node) in tree.nodes.iter_mut().enumerate() {
        node.dominators = matrix[block_index]
            .iter()
            .enumerate()
            .filter(|(_, &bit)| bit)
            .map(|(candidate, _)| function.blocks[candidate].id)
            .collect();
        node.dominators.sort_unstable();
    }

    for block_index in 0..function.blocks.len() {
        if let Some(parent_index) = immediate_dominator_index(&matrix, block_index) {
            let parent_id = function.blocks[parent_index].id;
            let block_id = function.blocks[block_index].id;
            tree.nodes[block_index].immediate_dominator = Some(parent_id);
            tree.nodes[parent_index].children.push(block_id);
        }
    }

    for node in &mut tree.nodes {
        node.children.sort_unstable();
    }

    tree
}

/// Builds dominance frontiers from a function and its dominator tree.
pub fn build_dominance_frontier(function: &Function, tree: &DominatorTree) -> DominanceFrontier {
    let mut frontiers = DominanceFrontier::default();
    for block in &function.blocks {
        frontiers.index_by_id.insert(block.id, frontiers.nodes.len());
        frontiers.nodes.push(DominanceFrontierNode {
            block: block.id,
            frontier: Vec::new(),
        });
    }

    if function.blocks.is_empty() {
        return frontiers;
    }

    let cfg = build_control_flow_graph(function);

    for block in &function.blocks {
        let Some(cfg_node) = cfg.find_node(block.id) else {
            continue;
        };
        if cfg_node.predecessors.len() < 2 {
            continue;
        }

        let join_idom = tree
            .find_node(block.id)
            .and_then(|node| node.immediate_dominator);

        for &predecessor in &cfg_node.predecessors {
            let mut runner = Some(predecessor);
            while let Some(runner_id) = runner {
                if Some(runner_id) == join_idom {
                    break;
                }
                let Some(&runner_index) = frontiers.index_by_id.get(&runner_id) else {
                    break;
                };
                let frontier = &mut frontiers.nodes[runner_index].frontier;
                if !frontier.contains(&block.id) {
                    frontier.push(block.id);
                }
                runner = tree
                    .find_node(runner_id)
                    .and_then(|node| node.immediate_dominator);
            }
        }
    }

    for node in &mut frontiers.nodes {
        node.frontier.sort_unstable();
    }

    frontiers
}
