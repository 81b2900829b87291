//! SSA construction: phi insertion followed by a dominator-tree rename.
//!
//! The pre-SSA temporary id is the variable identity. Every renamed
//! definition keeps it in `original_temporary_id`, and the per-variable
//! rename stacks are keyed by it; variables with distinct pre-SSA ids
//! are never collapsed even when their names coincide.

use std::collections::BTreeMap;
use std::fmt;

use bolt_compiler_diagnostics::DiagnosticCode;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::analysis::{
    build_control_flow_graph, build_dominance_frontier, build_dominator_tree, ControlFlowGraph,
    DominanceFrontier, DominatorTree,
};
use crate::passes::compute_phi_placement;
use crate::{
    BasicBlockId, Function, Instruction, InstructionKind, Module, Operand, Value, ValueId,
};

/// A structural SSA violation, reported against a function rather than a
/// source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsaDiagnostic {
    pub code: DiagnosticCode,
    pub function_name: String,
    pub detail: String,
}

impl fmt::Display for SsaDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} function '{}': {}",
            self.code, self.function_name, self.detail
        )
    }
}

#[derive(Debug, Clone)]
struct PhiRecord {
    variable_id: ValueId,
    instruction_index: usize,
}

fn infer_base_name(value: &Value) -> String {
    if value.name.is_empty() {
        format!("t{}", value.id.index())
    } else {
        value.name.clone()
    }
}

fn insert_phi_nodes(
    function: &mut Function,
    frontiers: &DominanceFrontier,
    definition_blocks: &BTreeMap<ValueId, Vec<BasicBlockId>>,
    variables: &FxHashMap<ValueId, String>,
) -> FxHashMap<BasicBlockId, Vec<PhiRecord>> {
    let mut phi_by_block: FxHashMap<BasicBlockId, Vec<PhiRecord>> = FxHashMap::default();

    for (&variable_id, blocks) in definition_blocks {
        for block_id in compute_phi_placement(frontiers, blocks) {
            phi_by_block.entry(block_id).or_default().push(PhiRecord {
                variable_id,
                instruction_index: 0,
            });
        }
    }

    for (block_id, records) in &mut phi_by_block {
        records.sort_by_key(|record| record.variable_id);

        let Some(block) = function.blocks.iter_mut().find(|block| block.id == *block_id) else {
            continue;
        };

        let mut phi_instructions = Vec::with_capacity(records.len());
        for (index, record) in records.iter_mut().enumerate() {
            let mut phi = Instruction::new(InstructionKind::Phi);
            phi.original_temporary_id = Some(record.variable_id);
            if let Some(base_name) = variables.get(&record.variable_id) {
                phi.result = Some(Value::temporary(record.variable_id, base_name.clone()));
                phi.detail = format!("phi {base_name}");
            }
            record.instruction_index = index;
            phi_instructions.push(phi);
        }

        block.instructions.splice(0..0, phi_instructions);
    }

    phi_by_block
}

struct RenameContext<'a> {
    function: &'a mut Function,
    block_positions: FxHashMap<BasicBlockId, usize>,
    stacks: FxHashMap<ValueId, Vec<Value>>,
    counters: FxHashMap<ValueId, u32>,
    variables: &'a FxHashMap<ValueId, String>,
    phi_by_block: &'a FxHashMap<BasicBlockId, Vec<PhiRecord>>,
    diagnostics: &'a mut Vec<SsaDiagnostic>,
    visited: FxHashSet<BasicBlockId>,
    success: bool,
}

impl RenameContext<'_> {
    fn report(&mut self, code: DiagnosticCode, detail: String) {
        self.diagnostics.push(SsaDiagnostic {
            code,
            function_name: self.function.name.clone(),
            detail,
        });
        self.success = false;
    }

    fn top_of_stack(&self, variable_id: ValueId) -> Option<Value> {
        self.stacks
            .get(&variable_id)
            .and_then(|stack| stack.last())
            .cloned()
    }

    /// Allocates the next version of a variable: the zero-th version
    /// keeps the base name, later ones append `.k`.
    fn create_version(&mut self, variable_id: ValueId) -> Value {
        let variables = self.variables;
        let id = ValueId::from_raw(self.function.next_value_id);
        self.function.next_value_id += 1;

        match variables.get(&variable_id) {
            None => Value::temporary(id, format!("t{}", id.index())),
            Some(base_name) => {
                let counter = self.counters.entry(variable_id).or_insert(0);
                let version = *counter;
                *counter += 1;
                let name = if version > 0 {
                    format!("{base_name}.{version}")
                } else {
                    base_name.clone()
                };
                Value::temporary(id, name)
            }
        }
    }

    fn rename_block(
        &mut self,
        cfg: &ControlFlowGraph,
        tree: &DominatorTree,
        block_id: BasicBlockId,
    ) {
        if !self.visited.insert(block_id) {
            return;
        }
        let Some(&position) = self.block_positions.get(&block_id) else {
            return;
        };

        let block_name = self.function.blocks[position].name.clone();
        let mut pushed: Vec<ValueId> = Vec::new();

        // Phi results first: they define before any ordinary instruction
        // in the block executes.
        if let Some(records) = self.phi_by_block.get(&block_id) {
            for record in records {
                let value = self.create_version(record.variable_id);
                let instruction =
                    &mut self.function.blocks[position].instructions[record.instruction_index];
                if instruction.detail.is_empty() {
                    instruction.detail = "phi".to_string();
                } else {
                    instruction.detail.push_str(&format!(" -> {}", value.name));
                }
                instruction.result = Some(value.clone());
                self.stacks
                    .entry(record.variable_id)
                    .or_default()
                    .push(value);
                pushed.push(record.variable_id);
            }
        }

        let instruction_count = self.function.blocks[position].instructions.len();
        for instruction_index in 0..instruction_count {
            if self.function.blocks[position].instructions[instruction_index].is_phi() {
                continue;
            }

            let operand_count =
                self.function.blocks[position].instructions[instruction_index].operands.len();
            for operand_index in 0..operand_count {
                let original_id = {
                    let operand = &self.function.blocks[position].instructions[instruction_index]
                        .operands[operand_index];
                    if operand.value.is_temporary() {
                        Some(operand.value.id)
                    } else {
                        None
                    }
                };
                let Some(original_id) = original_id else {
                    continue;
                };

                match self.top_of_stack(original_id) {
                    Some(value) => {
                        self.function.blocks[position].instructions[instruction_index].operands
                            [operand_index]
                            .value = value;
                    }
                    None => {
                        self.report(
                            DiagnosticCode::UseBeforeDefinition,
                            format!(
                                "temporary value '{}' used before definition in block {}",
                                original_id.index(),
                                block_name
                            ),
                        );
                    }
                }
            }

            let result_id = {
                let instruction =
                    &self.function.blocks[position].instructions[instruction_index];
                instruction
                    .result
                    .as_ref()
                    .filter(|result| result.is_temporary())
                    .map(|result| result.id)
            };
            if let Some(original_id) = result_id {
                let value = self.create_version(original_id);
                let instruction =
                    &mut self.function.blocks[position].instructions[instruction_index];
                instruction.original_temporary_id = Some(original_id);
                instruction.result = Some(value.clone());
                self.stacks.entry(original_id).or_default().push(value);
                pushed.push(original_id);
            }
        }

        // Feed the current versions into every successor phi, one
        // operand per incoming edge.
        if let Some(cfg_node) = cfg.find_node(block_id) {
            for &successor_id in &cfg_node.successors {
                let Some(records) = self.phi_by_block.get(&successor_id) else {
                    continue;
                };
                let Some(&successor_position) = self.block_positions.get(&successor_id) else {
                    continue;
                };

                for record in records {
                    let Some(value) = self.top_of_stack(record.variable_id) else {
                        let successor_name =
                            self.function.blocks[successor_position].name.clone();
                        self.report(
                            DiagnosticCode::MissingPhiInput,
                            format!(
                                "missing definition for phi input of temporary '{}' on edge from block {} to block {}",
                                record.variable_id.index(),
                                block_name,
                                successor_name
                            ),
                        );
                        continue;
                    };

                    let phi = &mut self.function.blocks[successor_position].instructions
                        [record.instruction_index];
                    let already_present = phi
                        .operands
                        .iter()
                        .any(|operand| operand.predecessor_block_id == Some(block_id));
                    if !already_present {
                        phi.operands.push(Operand::phi_input(value, block_id));
                    }
                }
            }
        }

        let children = tree
            .find_node(block_id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.rename_block(cfg, tree, child);
        }

        for variable_id in pushed.into_iter().rev() {
            if let Some(stack) = self.stacks.get_mut(&variable_id) {
                stack.pop();
            }
        }
    }
}

/// Converts one function to SSA form in place. Returns false when a use
/// before definition or a missing phi input was found; diagnostics are
/// appended in discovery order.
pub fn convert_function_to_ssa(
    function: &mut Function,
    diagnostics: &mut Vec<SsaDiagnostic>,
) -> bool {
    if function.blocks.is_empty() {
        return true;
    }

    let cfg = build_control_flow_graph(function);
    let tree = build_dominator_tree(function);
    let frontiers = build_dominance_frontier(function, &tree);

    let mut definition_blocks: BTreeMap<ValueId, Vec<BasicBlockId>> = BTreeMap::new();
    let mut variables: FxHashMap<ValueId, String> = FxHashMap::default();

    for block in &mut function.blocks {
        for instruction in &mut block.instructions {
            let Some(result) = instruction.result.as_ref() else {
                continue;
            };
            if !result.is_temporary() {
                continue;
            }

            let variable_id = result.id;
            instruction.original_temporary_id = Some(variable_id);
            let blocks = definition_blocks.entry(variable_id).or_default();
            if !blocks.contains(&block.id) {
                blocks.push(block.id);
            }
            variables
                .entry(variable_id)
                .or_insert_with(|| infer_base_name(result));
        }
    }

    let phi_by_block = insert_phi_nodes(function, &frontiers, &definition_blocks, &variables);

    let mut roots: Vec<BasicBlockId> = tree
        .nodes
        .iter()
        .filter(|node| node.immediate_dominator.is_none())
        .map(|node| node.block)
        .collect();
    roots.sort_unstable();

    let block_positions: FxHashMap<BasicBlockId, usize> = function
        .blocks
        .iter()
        .enumerate()
        .map(|(position, block)| (block.id, position))
        .collect();

    debug!(
        "converting '{}' to SSA: {} variables, {} phi blocks",
        function.name,
        variables.len(),
        phi_by_block.len()
    );

    let mut context = RenameContext {
        function,
        block_positions,
        stacks: FxHashMap::default(),
        counters: FxHashMap::default(),
        variables: &variables,
        phi_by_block: &phi_by_block,
        diagnostics,
        visited: FxHashSet::default(),
        success: true,
    };

    for root in roots {
        context.rename_block(&cfg, &tree, root);
    }

    context.success
}

/// Converts every function of a module to SSA form.
pub fn convert_to_ssa(module: &mut Module, diagnostics: &mut Vec<SsaDiagnostic>) -> bool {
    let mut success = true;
    for function in &mut module.functions {
        if !convert_function_to_ssa(function, diagnostics) {
            success = false;
        }
    }
    success
}
