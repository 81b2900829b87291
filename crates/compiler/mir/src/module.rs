//! Module-level MIR: functions, blueprint records, and the import
//! summary carried for downstream consumers.

use bolt_compiler_hir::TypeReference;

use crate::Function;

/// Resolution summary for one import, mirrored from the import
/// resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedImport {
    pub module_path: String,
    pub canonical_module_path: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintField {
    pub name: String,
    pub ty: TypeReference,
    pub is_live: bool,
    pub bit_width: Option<u32>,
    pub alignment_bytes: Option<u64>,
}

/// Structural record of a blueprint, kept alongside the synthetic
/// `blueprint.<Name>` function the lowering emits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blueprint {
    pub name: String,
    pub modifiers: Vec<String>,
    pub is_packed: bool,
    pub alignment_bytes: Option<u64>,
    pub fields: Vec<BlueprintField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub package_name: String,
    pub module_name: String,
    pub canonical_module_path: String,
    pub imports: Vec<String>,
    pub resolved_imports: Vec<ResolvedImport>,
    pub functions: Vec<Function>,
    pub blueprints: Vec<Blueprint>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }
}
