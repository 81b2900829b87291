//! Classifies a module's imports against the module locator.

use bolt_compiler_diagnostics::{Diagnostic, DiagnosticCode};

use crate::module::{Import, Module};
use crate::module_locator::{normalize_path, ModuleLocator};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportStatus {
    /// No locator was supplied; a later stage may resolve the import.
    #[default]
    Pending,
    Resolved,
    NotFound,
    SelfImport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResolution {
    pub module_path: String,
    pub status: ImportStatus,
    pub canonical_module_path: Option<String>,
    pub resolved_file_path: Option<String>,
}

/// Ordered resolution results (one per import) plus diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResolutionOutput {
    pub imports: Vec<ImportResolution>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
pub struct ImportResolver<'a> {
    locator: Option<&'a ModuleLocator>,
}

impl<'a> ImportResolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locator(locator: &'a ModuleLocator) -> Self {
        Self {
            locator: Some(locator),
        }
    }

    pub fn set_module_locator(&mut self, locator: &'a ModuleLocator) {
        self.locator = Some(locator);
    }

    pub fn resolve(&self, module: &Module) -> ImportResolutionOutput {
        let mut output = ImportResolutionOutput::default();

        let canonical_module_path =
            if !module.package_name.is_empty() && module.package_name != module.module_name {
                format!("{}::{}", module.package_name, module.module_name)
            } else {
                module.module_name.clone()
            };

        for import_decl in &module.imports {
            let mut entry = ImportResolution {
                module_path: import_decl.module_path.clone(),
                ..ImportResolution::default()
            };

            if import_decl.module_path == module.module_name
                || import_decl.module_path == module.package_name
                || import_decl.module_path == canonical_module_path
            {
                entry.status = ImportStatus::SelfImport;
                output.diagnostics.push(self_import(import_decl, module));
            } else if let Some(locator) = self.locator {
                match locator.locate(&import_decl.module_path) {
                    Some(located) => {
                        entry.status = ImportStatus::Resolved;
                        entry.canonical_module_path = Some(located.canonical_path);
                        entry.resolved_file_path =
                            Some(normalize_path(&located.file_path).display().to_string());
                    }
                    None => {
                        entry.status = ImportStatus::NotFound;
                        output.diagnostics.push(missing_import(import_decl));
                    }
                }
            }

            output.imports.push(entry);
        }

        output
    }
}

fn self_import(import_decl: &Import, module: &Module) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::SelfImport,
        format!(
            "Module '{}' cannot import itself ('{}').",
            module.module_name, import_decl.module_path
        ),
        import_decl.span,
    )
}

fn missing_import(import_decl: &Import) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::ImportNotFound,
        format!("Import '{}' could not be resolved.", import_decl.module_path),
        import_decl.span,
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use bolt_compiler_diagnostics::{SourceLocation, SourceSpan};

    use super::*;

    fn span(line: u32, column: u32) -> SourceSpan {
        SourceSpan::at(SourceLocation::new(line, column))
    }

    fn module_with_import(package: &str, name: &str, import_path: &str) -> Module {
        Module {
            package_name: package.to_string(),
            module_name: name.to_string(),
            imports: vec![Import {
                module_path: import_path.to_string(),
                span: span(3, 1),
            }],
            ..Module::default()
        }
    }

    #[test]
    fn self_import_produces_diagnostic() {
        let module = module_with_import("demo.tests", "demo.tests", "demo.tests");

        let resolver = ImportResolver::new();
        let output = resolver.resolve(&module);

        assert_eq!(output.imports.len(), 1);
        assert_eq!(output.imports[0].status, ImportStatus::SelfImport);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].code, DiagnosticCode::SelfImport);
    }

    #[test]
    fn package_qualified_self_import_is_caught() {
        let module = module_with_import("demo", "tests", "demo::tests");

        let resolver = ImportResolver::new();
        let output = resolver.resolve(&module);
        assert_eq!(output.imports[0].status, ImportStatus::SelfImport);
    }

    #[test]
    fn pending_without_locator() {
        let module = module_with_import("demo.tests", "demo.tests", "demo.utils.core");

        let resolver = ImportResolver::new();
        let output = resolver.resolve(&module);

        assert_eq!(output.imports[0].status, ImportStatus::Pending);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn resolved_when_module_registered() {
        let module = module_with_import("demo.tests", "demo.tests", "demo.utils.core");

        let mut locator = ModuleLocator::new();
        locator.register_module(
            "demo.utils.core",
            PathBuf::from("/bolt/demo/utils/core.bolt"),
        );

        let resolver = ImportResolver::with_locator(&locator);
        let output = resolver.resolve(&module);

        assert_eq!(output.imports.len(), 1);
        let resolved = &output.imports[0];
        assert_eq!(resolved.status, ImportStatus::Resolved);
        assert_eq!(
            resolved.canonical_module_path.as_deref(),
            Some("demo.utils.core")
        );
        assert!(resolved
            .resolved_file_path
            .as_deref()
            .unwrap()
            .contains("demo"));
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn missing_import_emits_diagnostic() {
        let module = module_with_import("demo.tests", "demo.tests", "demo.unknown.module");

        let locator = ModuleLocator::new();
        let resolver = ImportResolver::with_locator(&locator);
        let output = resolver.resolve(&module);

        assert_eq!(output.imports[0].status, ImportStatus::NotFound);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].code, DiagnosticCode::ImportNotFound);
    }

    #[test]
    fn result_order_matches_input_order() {
        let mut module = module_with_import("demo", "alpha", "demo::alpha");
        module.imports.push(Import {
            module_path: "demo.beta".to_string(),
            span: span(4, 1),
        });

        let resolver = ImportResolver::new();
        let output = resolver.resolve(&module);
        assert_eq!(output.imports.len(), 2);
        assert_eq!(output.imports[0].module_path, "demo::alpha");
        assert_eq!(output.imports[0].status, ImportStatus::SelfImport);
        assert_eq!(output.imports[1].module_path, "demo.beta");
        assert_eq!(output.imports[1].status, ImportStatus::Pending);
    }
}
