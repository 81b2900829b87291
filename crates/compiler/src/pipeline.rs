//! The per-unit compilation pipeline.

use std::path::Path;

use bolt_compiler_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollection, SourceSpan};
use bolt_compiler_hir::{bind_unit, ImportResolution, ImportResolver, ModuleLocator};
use bolt_compiler_mir::passes::{
    convert_to_ssa, enforce_live, LiveDiagnostic, SsaDiagnostic,
};
use bolt_compiler_mir::{canonical_hash, canonical_print, lower_from_hir, verify, ResolvedImport};
use bolt_compiler_parser::{lex, parse_tokens, CompilationUnit};
use thiserror::Error;
use tracing::{debug, warn};

/// Infrastructure failures around the pipeline (the pipeline itself
/// never errors; it diagnoses).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read source file '{path}': {source}")]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a compilation produced, stage by stage. A stage that did
/// not run (because an earlier stage recorded errors) leaves its
/// artifact `None`.
#[derive(Debug, Default)]
pub struct CompilationOutput {
    pub module_name: String,
    pub unit: Option<CompilationUnit>,
    pub hir: Option<bolt_compiler_hir::Module>,
    pub resolved_imports: Option<Vec<ImportResolution>>,
    pub mir: Option<bolt_compiler_mir::Module>,
    pub verified: bool,
    pub canonical: Option<String>,
    pub canonical_hash: Option<u64>,
    /// Span-carrying diagnostics from lexing through import resolution,
    /// in pipeline order.
    pub diagnostics: DiagnosticCollection,
    /// Function-level diagnostics from the Live enforcement pass.
    pub live_diagnostics: Vec<LiveDiagnostic>,
    /// Function-level diagnostics from SSA construction.
    pub ssa_diagnostics: Vec<SsaDiagnostic>,
}

impl CompilationOutput {
    /// Whether anything along the pipeline should fail the unit.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
            || !self.live_diagnostics.is_empty()
            || !self.ssa_diagnostics.is_empty()
            || (self.mir.is_some() && !self.verified)
    }
}

/// Runs the full pipeline over one source text.
///
/// The locator, when provided, resolves the unit's imports; without one
/// they stay `Pending` and later tooling may resolve them.
pub fn compile_source(
    source: &str,
    module_name: &str,
    locator: Option<&ModuleLocator>,
) -> CompilationOutput {
    let mut output = CompilationOutput {
        module_name: module_name.to_string(),
        ..CompilationOutput::default()
    };

    let lexed = lex(source, module_name);
    output.diagnostics.extend(lexed.diagnostics.clone());
    if output.diagnostics.has_errors() {
        warn!(module = module_name, "stopping after lexing");
        return output;
    }

    let parsed = parse_tokens(&lexed.tokens, module_name);
    output.diagnostics.extend(parsed.diagnostics.clone());
    output.unit = Some(parsed.unit.clone());
    if output.diagnostics.has_errors() {
        warn!(module = module_name, "stopping after parsing");
        return output;
    }

    let bound = bind_unit(&parsed.unit, module_name);
    output.diagnostics.extend(bound.diagnostics.clone());
    output.hir = Some(bound.module.clone());
    if output.diagnostics.has_errors() {
        warn!(module = module_name, "stopping after binding");
        return output;
    }

    let mut resolver = ImportResolver::new();
    if let Some(locator) = locator {
        resolver.set_module_locator(locator);
    }
    let resolution = resolver.resolve(&bound.module);
    output.diagnostics.extend(resolution.diagnostics.clone());
    output.resolved_imports = Some(resolution.imports.clone());
    if output.diagnostics.has_errors() {
        warn!(module = module_name, "stopping after import resolution");
        return output;
    }

    let mut mir_module = lower_from_hir(&bound.module);
    mir_module.resolved_imports = resolution
        .imports
        .iter()
        .map(|entry| ResolvedImport {
            module_path: entry.module_path.clone(),
            canonical_module_path: entry.canonical_module_path.clone(),
            file_path: entry.resolved_file_path.clone(),
        })
        .collect();

    if !enforce_live(&mir_module, &mut output.live_diagnostics) {
        output.diagnostics.add(Diagnostic::new(
            DiagnosticCode::LiveEnforcementFailed,
            format!("Live enforcement failed for module '{module_name}'."),
            SourceSpan::default(),
        ));
        output.mir = Some(mir_module);
        warn!(module = module_name, "live enforcement failed");
        return output;
    }

    if !convert_to_ssa(&mut mir_module, &mut output.ssa_diagnostics) {
        output.diagnostics.add(Diagnostic::new(
            DiagnosticCode::SsaConversionFailed,
            format!(
                "SSA conversion failed for module '{}'.",
                mir_module.canonical_module_path
            ),
            SourceSpan::default(),
        ));
        output.mir = Some(mir_module);
        warn!(module = module_name, "SSA conversion failed");
        return output;
    }

    output.verified = verify(&mir_module);
    if output.verified {
        output.canonical = Some(canonical_print(&mir_module));
        output.canonical_hash = Some(canonical_hash(&mir_module));
    }
    output.mir = Some(mir_module);

    debug!(
        module = module_name,
        verified = output.verified,
        "pipeline finished"
    );

    output
}

/// Reads a file and compiles it; the module label is the file stem.
pub fn compile_file(
    path: &Path,
    locator: Option<&ModuleLocator>,
) -> Result<CompilationOutput, PipelineError> {
    let source = std::fs::read_to_string(path).map_err(|source| PipelineError::ReadSource {
        path: path.display().to_string(),
        source,
    })?;
    let module_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("module");
    Ok(compile_source(&source, module_name, locator))
}
