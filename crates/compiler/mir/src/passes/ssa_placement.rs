//! Phi placement by iterated dominance frontier.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::analysis::DominanceFrontier;
use crate::BasicBlockId;

/// Computes the blocks needing a phi for a variable defined in
/// `definition_blocks`.
///
/// Worklist closure of the frontier relation: a frontier block both
/// receives a phi and becomes a defining block for further iteration.
/// Each block enters each set at most once, which bounds the loop. The
/// result is sorted by block id.
pub fn compute_phi_placement(
    frontiers: &DominanceFrontier,
    definition_blocks: &[BasicBlockId],
) -> Vec<BasicBlockId> {
    let mut phi_blocks: Vec<BasicBlockId> = Vec::new();

    if frontiers.nodes.is_empty() || definition_blocks.is_empty() {
        return phi_blocks;
    }

    let mut definition_set: FxHashSet<BasicBlockId> = FxHashSet::default();
    let mut queued: FxHashSet<BasicBlockId> = FxHashSet::default();
    let mut worklist: VecDeque<BasicBlockId> = VecDeque::new();

    for &block_id in definition_blocks {
        if definition_set.insert(block_id) {
            queued.insert(block_id);
            worklist.push_back(block_id);
        }
    }

    let mut phi_set: FxHashSet<BasicBlockId> = FxHashSet::default();

    while let Some(block_id) = worklist.pop_front() {
        let Some(node) = frontiers.find_node(block_id) else {
            continue;
        };

        for &frontier_block in &node.frontier {
            if phi_set.insert(frontier_block) {
                phi_blocks.push(frontier_block);

                if !definition_set.contains(&frontier_block) && queued.insert(frontier_block) {
                    worklist.push_back(frontier_block);
                }
            }
        }
    }

    phi_blocks.sort_unstable();
    phi_blocks
}
