//! Structural checks on Live-qualified functions.
//!
//! A function with a Live parameter or Live return must demonstrably
//! reach a `Return`: it needs a concrete return type for a Live return,
//! at least one block, a `Return` instruction somewhere, and properly
//! terminated non-empty blocks. The pass only diagnoses; it never
//! mutates the module.

use std::fmt;

use bolt_compiler_diagnostics::DiagnosticCode;

use crate::{Function, InstructionKind, Module};

/// A Live invariant violation, reported against a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveDiagnostic {
    pub code: DiagnosticCode,
    pub function_name: String,
    pub detail: String,
}

impl fmt::Display for LiveDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} function '{}': {}",
            self.code, self.function_name, self.detail
        )
    }
}

fn has_return_instruction(function: &Function) -> bool {
    function.blocks.iter().any(|block| {
        block
            .instructions
            .iter()
            .any(|instruction| instruction.kind == InstructionKind::Return)
    })
}

fn has_live_parameters(function: &Function) -> bool {
    function.parameters.iter().any(|parameter| parameter.is_live)
}

fn report(
    function: &Function,
    code: DiagnosticCode,
    detail: &str,
    diagnostics: &mut Vec<LiveDiagnostic>,
) {
    diagnostics.push(LiveDiagnostic {
        code,
        function_name: function.name.clone(),
        detail: detail.to_string(),
    });
}

/// Checks every Live-qualified function of a module. Returns false when
/// any check failed; diagnostics are appended in check order.
pub fn enforce_live(module: &Module, diagnostics: &mut Vec<LiveDiagnostic>) -> bool {
    let mut success = true;

    for function in &module.functions {
        let live_return = function.return_is_live;
        let live_parameters = has_live_parameters(function);

        if !live_return && !live_parameters {
            continue;
        }

        if live_return && !function.has_return_type {
            report(
                function,
                DiagnosticCode::LiveReturnWithoutType,
                "Live return declared without a concrete return type.",
                diagnostics,
            );
            success = false;
        }

        if function.blocks.is_empty() {
            report(
                function,
                DiagnosticCode::LiveFunctionWithoutBlocks,
                "Live-qualified function has no basic blocks.",
                diagnostics,
            );
            success = false;
            continue;
        }

        if !has_return_instruction(function) {
            report(
                function,
                DiagnosticCode::LiveFunctionWithoutReturn,
                "Live-qualified function is missing a return instruction.",
                diagnostics,
            );
            success = false;
        }

        for block in &function.blocks {
            match block.terminator() {
                None => {
                    report(
                        function,
                        DiagnosticCode::LiveEmptyBlock,
                        "Live-qualified function contains an empty basic block.",
                        diagnostics,
                    );
                    success = false;
                }
                Some(terminator) if !terminator.is_terminator() => {
                    report(
                        function,
                        DiagnosticCode::LiveBlockMissingTerminator,
                        "Live-qualified blocks must terminate with return or branch instructions.",
                        diagnostics,
                    );
                    success = false;
                }
                Some(_) => {}
            }
        }
    }

    success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BasicBlock, BasicBlockId, Instruction, InstructionKind, Parameter};

    fn live_parameter(name: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            is_live: true,
            ..Parameter::default()
        }
    }

    #[test]
    fn accepts_functions_without_live_markers() {
        let mut module = Module::new();
        let function = module.create_function("plain");
        function.append_block("entry");

        let mut diagnostics = Vec::new();
        assert!(enforce_live(&module, &mut diagnostics));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn rejects_live_function_without_return() {
        let mut module = Module::new();
        let function = module.create_function("demo");
        function.parameters.push(live_parameter("value"));
        function
            .blocks
            .push(BasicBlock::new(BasicBlockId::from_raw(0), "entry"));

        let mut diagnostics = Vec::new();
        assert!(!enforce_live(&module, &mut diagnostics));
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics[0].code,
            DiagnosticCode::LiveFunctionWithoutReturn
        );
        assert_eq!(diagnostics[0].function_name, "demo");
        assert!(diagnostics[0].detail.contains("missing a return instruction"));
        assert_eq!(diagnostics[1].code, DiagnosticCode::LiveEmptyBlock);
        assert!(diagnostics[1].detail.contains("empty basic block"));
    }

    #[test]
    fn rejects_live_return_without_type() {
        let mut module = Module::new();
        let function = module.create_function("requiresType");
        function.return_is_live = true;
        let entry = function.append_block("entry");
        entry.append_instruction(InstructionKind::Return);

        let mut diagnostics = Vec::new();
        assert!(!enforce_live(&module, &mut diagnostics));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::LiveReturnWithoutType);
        assert_eq!(diagnostics[0].function_name, "requiresType");
        assert!(diagnostics[0]
            .detail
            .contains("return declared without a concrete return type"));
    }

    #[test]
    fn rejects_live_function_without_blocks() {
        let mut module = Module::new();
        let function = module.create_function("noBlocks");
        function.return_is_live = true;
        function.has_return_type = true;

        let mut diagnostics = Vec::new();
        assert!(!enforce_live(&module, &mut diagnostics));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            DiagnosticCode::LiveFunctionWithoutBlocks
        );
        assert!(diagnostics[0].detail.contains("no basic blocks"));
    }

    #[test]
    fn rejects_live_block_missing_terminator() {
        let mut module = Module::new();
        let function = module.create_function("misordered");
        function.parameters.push(live_parameter("value"));

        let entry = function.append_block("entry");
        entry.append_instruction(InstructionKind::Return);
        entry.instructions.push(Instruction::new(InstructionKind::Nop));

        let mut diagnostics = Vec::new();
        assert!(!enforce_live(&module, &mut diagnostics));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].code,
            DiagnosticCode::LiveBlockMissingTerminator
        );
        assert!(diagnostics[0]
            .detail
            .contains("must terminate with return or branch"));
    }

    #[test]
    fn pass_does_not_mutate_the_module() {
        let mut module = Module::new();
        let function = module.create_function("demo");
        function.parameters.push(live_parameter("value"));
        function
            .blocks
            .push(BasicBlock::new(BasicBlockId::from_raw(0), "entry"));

        let before = module.clone();
        let mut diagnostics = Vec::new();
        enforce_live(&module, &mut diagnostics);
        assert_eq!(module, before);
    }
}
