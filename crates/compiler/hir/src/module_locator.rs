//! Maps canonical module paths to source files.
//!
//! A canonical path is a `::`-separated identifier sequence; a module
//! whose canonical path contains no `.` also answers to the dotted alias
//! (`demo.utils.core`). Modules are either registered explicitly (the
//! pipeline registers every compiled unit) or discovered by scanning the
//! configured import roots for `.bolt` files.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use bolt_compiler_diagnostics::{Diagnostic, DiagnosticCode, SourceSpan};
use tracing::debug;

/// A successful lookup: the canonical path and the file backing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocatorResult {
    pub canonical_path: String,
    pub file_path: PathBuf,
}

/// A non-fatal problem encountered during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocatorIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Two files claiming the same canonical path; the first registration
/// wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocatorDuplicate {
    pub canonical_path: String,
    pub existing_path: PathBuf,
    pub duplicate_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleLocatorDiscoveryResult {
    pub discovered_modules: Vec<ModuleLocatorResult>,
    pub duplicates: Vec<ModuleLocatorDuplicate>,
    pub issues: Vec<ModuleLocatorIssue>,
}

impl ModuleLocatorDiscoveryResult {
    /// Renders issues and duplicates as diagnostics. Discovery findings
    /// carry no source span, so the reports anchor at the file start.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for issue in &self.issues {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::ModuleLocatorIssue,
                format!("{}: {}", issue.message, issue.path.display()),
                SourceSpan::default(),
            ));
        }
        for duplicate in &self.duplicates {
            diagnostics.push(Diagnostic::new(
                DiagnosticCode::ModuleLocatorDuplicate,
                format!(
                    "module '{}' resolves to both '{}' and '{}'",
                    duplicate.canonical_path,
                    duplicate.existing_path.display(),
                    duplicate.duplicate_path.display()
                ),
                SourceSpan::default(),
            ));
        }
        diagnostics
    }
}

#[derive(Debug, Default)]
pub struct ModuleLocator {
    search_roots: Vec<PathBuf>,
    registered_modules: HashMap<String, PathBuf>,
    aliases: HashMap<String, String>,
}

/// Lexical normalisation: resolves `.` and `..` components without
/// touching the filesystem.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(Component::ParentDir);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// `a::b::c` (or `a.b.c`) to `a/b/c.bolt`.
fn module_path_to_relative_path(canonical_path: &str) -> PathBuf {
    let mut relative = PathBuf::new();
    for segment in canonical_path
        .split(|ch| ch == ':' || ch == '.')
        .filter(|segment| !segment.is_empty())
    {
        relative.push(segment);
    }
    relative.set_extension("bolt");
    relative
}

/// Derives the canonical path for a discovered file, or `None` when the
/// relative path cannot name a module (wrong extension, dot segments,
/// rooted paths).
fn relative_path_to_canonical_path(relative_path: &Path) -> Option<String> {
    if relative_path.as_os_str().is_empty() {
        return None;
    }

    let normalized = normalize_path(relative_path);
    if normalized.has_root() {
        return None;
    }
    if normalized.extension().and_then(|ext| ext.to_str()) != Some("bolt") {
        return None;
    }

    let stem = normalized.with_extension("");
    let mut parts = Vec::new();
    for component in stem.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str()?;
                if part.is_empty() || part == "." || part == ".." {
                    return None;
                }
                parts.push(part.to_string());
            }
            _ => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("::"))
}

fn canonical_to_dotted(canonical_path: &str) -> String {
    canonical_path.replace("::", ".")
}

impl ModuleLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ordered import roots used by discovery and fallback
    /// lookup. Roots are normalised lexically.
    pub fn set_search_roots(&mut self, roots: Vec<PathBuf>) {
        self.search_roots = roots.iter().map(|root| normalize_path(root)).collect();
    }

    /// Registers a module explicitly, overwriting any previous file for
    /// the same canonical path.
    pub fn register_module(&mut self, canonical_path: impl Into<String>, file_path: PathBuf) {
        let canonical_path = canonical_path.into();
        if canonical_path.is_empty() || file_path.as_os_str().is_empty() {
            return;
        }
        let normalized = normalize_path(&file_path);
        self.register_canonical(canonical_path, normalized);
    }

    /// Scans every search root for `.bolt` files and registers them.
    /// Unreadable subtrees are skipped, never fatal.
    pub fn discover_modules(&mut self) -> ModuleLocatorDiscoveryResult {
        let mut result = ModuleLocatorDiscoveryResult::default();
        let roots = self.search_roots.clone();

        for root in &roots {
            if root.as_os_str().is_empty() {
                continue;
            }

            if !root.exists() {
                result.issues.push(ModuleLocatorIssue {
                    path: root.clone(),
                    message: "import root does not exist".to_string(),
                });
                continue;
            }

            if !root.is_dir() {
                result.issues.push(ModuleLocatorIssue {
                    path: root.clone(),
                    message: "import root is not a directory".to_string(),
                });
                continue;
            }

            for entry in walkdir::WalkDir::new(root) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(error) => {
                        // Permission-denied subtrees are skipped, not fatal.
                        debug!(root = %root.display(), %error, "skipping unreadable entry");
                        continue;
                    }
                };

                if !entry.file_type().is_file() {
                    continue;
                }
                if entry.path().extension().and_then(|ext| ext.to_str()) != Some("bolt") {
                    continue;
                }

                let relative_path = match entry.path().strip_prefix(root) {
                    Ok(relative) => relative.to_path_buf(),
                    Err(_) => {
                        result.issues.push(ModuleLocatorIssue {
                            path: entry.path().to_path_buf(),
                            message: "failed to compute module path relative to import root"
                                .to_string(),
                        });
                        continue;
                    }
                };

                let Some(canonical) = relative_path_to_canonical_path(&relative_path) else {
                    result.issues.push(ModuleLocatorIssue {
                        path: entry.path().to_path_buf(),
                        message: "could not derive canonical module path".to_string(),
                    });
                    continue;
                };

                let normalized = normalize_path(entry.path());
                if let Some(existing) = self.registered_modules.get(&canonical) {
                    if normalize_path(existing) != normalized {
                        result.duplicates.push(ModuleLocatorDuplicate {
                            canonical_path: canonical,
                            existing_path: existing.clone(),
                            duplicate_path: normalized,
                        });
                    }
                    continue;
                }

                self.register_canonical(canonical.clone(), normalized.clone());
                result.discovered_modules.push(ModuleLocatorResult {
                    canonical_path: canonical,
                    file_path: normalized,
                });
            }
        }

        debug!(
            discovered = result.discovered_modules.len(),
            duplicates = result.duplicates.len(),
            issues = result.issues.len(),
            "module discovery finished"
        );

        result
    }

    /// Resolves a canonical (or dotted) path: registered modules first,
    /// then aliases, then a direct probe under each search root.
    pub fn locate(&self, canonical_path: &str) -> Option<ModuleLocatorResult> {
        if canonical_path.is_empty() {
            return None;
        }

        if let Some(file_path) = self.registered_modules.get(canonical_path) {
            return Some(ModuleLocatorResult {
                canonical_path: canonical_path.to_string(),
                file_path: file_path.clone(),
            });
        }

        if let Some(canonical) = self.aliases.get(canonical_path) {
            if let Some(file_path) = self.registered_modules.get(canonical) {
                return Some(ModuleLocatorResult {
                    canonical_path: canonical.clone(),
                    file_path: file_path.clone(),
                });
            }
        }

        self.locate_in_roots(canonical_path)
    }

    fn locate_in_roots(&self, canonical_path: &str) -> Option<ModuleLocatorResult> {
        if self.search_roots.is_empty() {
            return None;
        }

        let relative = module_path_to_relative_path(canonical_path);
        for root in &self.search_roots {
            let candidate = root.join(&relative);
            if candidate.exists() {
                return Some(ModuleLocatorResult {
                    canonical_path: canonical_path.to_string(),
                    file_path: candidate,
                });
            }
        }

        None
    }

    fn register_canonical(&mut self, canonical_path: String, file_path: PathBuf) {
        self.register_dotted_alias(&canonical_path);
        self.registered_modules.insert(canonical_path, file_path);
    }

    fn register_dotted_alias(&mut self, canonical_path: &str) {
        // Components containing '.' would make the alias ambiguous.
        if canonical_path.contains('.') {
            return;
        }
        let dotted = canonical_to_dotted(canonical_path);
        if dotted == canonical_path {
            return;
        }
        self.aliases
            .entry(dotted)
            .or_insert_with(|| canonical_path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_module(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "// synthetic module\n").unwrap();
        path
    }

    #[test]
    fn discovers_modules_from_search_roots() {
        let temp = TempDir::new().unwrap();
        let module_path = write_module(temp.path(), "demo/utils/core.bolt");

        let mut locator = ModuleLocator::new();
        locator.set_search_roots(vec![temp.path().to_path_buf()]);
        let discovery = locator.discover_modules();

        assert_eq!(discovery.discovered_modules.len(), 1);
        assert_eq!(
            discovery.discovered_modules[0].canonical_path,
            "demo::utils::core"
        );
        assert_eq!(
            normalize_path(&discovery.discovered_modules[0].file_path),
            normalize_path(&module_path)
        );
        assert!(discovery.duplicates.is_empty());
        assert!(discovery.issues.is_empty());

        let by_canonical = locator.locate("demo::utils::core").unwrap();
        assert_eq!(normalize_path(&by_canonical.file_path), normalize_path(&module_path));

        let by_dotted = locator.locate("demo.utils.core").unwrap();
        assert_eq!(by_dotted.canonical_path, "demo::utils::core");
        assert_eq!(normalize_path(&by_dotted.file_path), normalize_path(&module_path));
    }

    #[test]
    fn reports_duplicate_modules_across_roots_first_wins() {
        let first_root = TempDir::new().unwrap();
        let second_root = TempDir::new().unwrap();
        let first_module = write_module(first_root.path(), "demo/utils/core.bolt");
        let second_module = write_module(second_root.path(), "demo/utils/core.bolt");

        let mut locator = ModuleLocator::new();
        locator.set_search_roots(vec![
            first_root.path().to_path_buf(),
            second_root.path().to_path_buf(),
        ]);
        let discovery = locator.discover_modules();

        assert_eq!(discovery.discovered_modules.len(), 1);
        assert_eq!(discovery.duplicates.len(), 1);
        let duplicate = &discovery.duplicates[0];
        assert_eq!(duplicate.canonical_path, "demo::utils::core");
        assert_eq!(
            normalize_path(&duplicate.existing_path),
            normalize_path(&first_module)
        );
        assert_eq!(
            normalize_path(&duplicate.duplicate_path),
            normalize_path(&second_module)
        );

        let located = locator.locate("demo::utils::core").unwrap();
        assert_eq!(normalize_path(&located.file_path), normalize_path(&first_module));
    }

    #[test]
    fn reports_invalid_import_roots() {
        let base = TempDir::new().unwrap();
        let missing_root = base.path().join("missing");
        let file_root = base.path().join("not-a-directory.bolt");
        fs::write(&file_root, "// not a directory\n").unwrap();

        let mut locator = ModuleLocator::new();
        locator.set_search_roots(vec![missing_root, file_root]);
        let discovery = locator.discover_modules();

        assert!(discovery.discovered_modules.is_empty());
        assert!(discovery.duplicates.is_empty());
        assert_eq!(discovery.issues.len(), 2);
        assert!(discovery
            .issues
            .iter()
            .any(|issue| issue.message.contains("does not exist")));
        assert!(discovery
            .issues
            .iter()
            .any(|issue| issue.message.contains("not a directory")));

        let diagnostics = discovery.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|d| d.code == DiagnosticCode::ModuleLocatorIssue));
    }

    #[test]
    fn duplicate_discovery_renders_e2226() {
        let first_root = TempDir::new().unwrap();
        let second_root = TempDir::new().unwrap();
        write_module(first_root.path(), "demo/core.bolt");
        write_module(second_root.path(), "demo/core.bolt");

        let mut locator = ModuleLocator::new();
        locator.set_search_roots(vec![
            first_root.path().to_path_buf(),
            second_root.path().to_path_buf(),
        ]);
        let discovery = locator.discover_modules();
        let diagnostics = discovery.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::ModuleLocatorDuplicate);
        assert!(diagnostics[0].message.contains("demo::core"));
    }

    #[test]
    fn explicit_registration_wins_without_discovery() {
        let mut locator = ModuleLocator::new();
        locator.register_module("demo.utils.core", PathBuf::from("/bolt/demo/utils/core.bolt"));

        let located = locator.locate("demo.utils.core").unwrap();
        assert_eq!(located.canonical_path, "demo.utils.core");
        assert_eq!(
            located.file_path,
            PathBuf::from("/bolt/demo/utils/core.bolt")
        );
    }

    #[test]
    fn falls_back_to_root_probe_for_unregistered_paths() {
        let temp = TempDir::new().unwrap();
        write_module(temp.path(), "demo/extras/tools.bolt");

        let mut locator = ModuleLocator::new();
        locator.set_search_roots(vec![temp.path().to_path_buf()]);

        // Never discovered, but a direct probe finds the file.
        let located = locator.locate("demo::extras::tools").unwrap();
        assert!(located.file_path.ends_with("demo/extras/tools.bolt"));
        let dotted = locator.locate("demo.extras.tools").unwrap();
        assert!(dotted.file_path.ends_with("demo/extras/tools.bolt"));
    }

    #[test]
    fn non_bolt_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        write_module(temp.path(), "demo/core.bolt");
        fs::write(temp.path().join("README.md"), "docs\n").unwrap();

        let mut locator = ModuleLocator::new();
        locator.set_search_roots(vec![temp.path().to_path_buf()]);
        let discovery = locator.discover_modules();
        assert_eq!(discovery.discovered_modules.len(), 1);
        assert!(discovery.issues.is_empty());
    }
}
