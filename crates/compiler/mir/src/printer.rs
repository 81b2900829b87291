//! Human-oriented MIR dump.
//!
//! Unlike the canonical print, this rendering favours readability:
//! imports and resolution results are listed, instruction details appear
//! as `//` comments, and terminator successors as arrows.

use std::fmt::Write;

use crate::Module;

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

pub fn print_module(module: &Module) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "module {}", module.module_name);
    if !module.package_name.is_empty() {
        let _ = writeln!(out, "package {}", module.package_name);
    }
    if !module.canonical_module_path.is_empty() {
        let _ = writeln!(out, "canonical {}", module.canonical_module_path);
    }

    if !module.imports.is_empty() {
        indent(&mut out, 1);
        let _ = writeln!(out, "imports ({})", module.imports.len());
        for import_name in &module.imports {
            indent(&mut out, 2);
            let _ = writeln!(out, "{import_name}");
        }
    }

    if !module.resolved_imports.is_empty() {
        indent(&mut out, 1);
        let _ = writeln!(out, "resolvedImports ({})", module.resolved_imports.len());
        for entry in &module.resolved_imports {
            indent(&mut out, 2);
            out.push_str(&entry.module_path);
            if let Some(canonical) = &entry.canonical_module_path {
                let _ = write!(out, " [{canonical}]");
            }
            if let Some(file_path) = &entry.file_path {
                let _ = write!(out, " -> {file_path}");
            }
            out.push('\n');
        }
    }

    for function in &module.functions {
        indent(&mut out, 1);
        let _ = writeln!(out, "function {} {{", function.name);

        for block in &function.blocks {
            indent(&mut out, 2);
            let _ = writeln!(out, "{} (#{}) {{", block.name, block.id.index());

            for instruction in &block.instructions {
                indent(&mut out, 3);
                let _ = write!(out, "{}", instruction.kind.ordinal());
                if !instruction.detail.is_empty() {
                    let _ = write!(out, " // {}", instruction.detail);
                }
                if !instruction.successors.is_empty() {
                    out.push_str(" ->");
                    for (index, successor) in instruction.successors.iter().enumerate() {
                        out.push(if index == 0 { ' ' } else { ',' });
                        let _ = write!(out, "{}", successor.index());
                    }
                }
                out.push('\n');
            }

            indent(&mut out, 2);
            out.push_str("}\n");
        }

        indent(&mut out, 1);
        out.push_str("}\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BasicBlockId, InstructionKind, ResolvedImport};

    #[test]
    fn prints_header_imports_and_blocks() {
        let mut module = Module {
            package_name: "demo".to_string(),
            module_name: "demo.app".to_string(),
            canonical_module_path: "demo::demo.app".to_string(),
            imports: vec!["demo.utils.core".to_string()],
            ..Module::default()
        };
        module.resolved_imports.push(ResolvedImport {
            module_path: "demo.utils.core".to_string(),
            canonical_module_path: Some("demo::utils::core".to_string()),
            file_path: Some("demo/utils/core.bolt".to_string()),
        });

        let function = module.create_function("main");
        let entry = function.append_block("entry");
        entry.append_instruction(InstructionKind::Branch).successors =
            vec![BasicBlockId::from_raw(1)];
        function
            .append_block("tail")
            .append_instruction(InstructionKind::Return)
            .detail = "function".to_string();

        let printed = print_module(&module);
        assert!(printed.starts_with("module demo.app\n"));
        assert!(printed.contains("imports (1)"));
        assert!(printed.contains("demo.utils.core [demo::utils::core] -> demo/utils/core.bolt"));
        assert!(printed.contains("entry (#0) {"));
        assert!(printed.contains("3 -> 1"));
        assert!(printed.contains("1 // function"));
    }
}
