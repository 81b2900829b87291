//! # Bolt compiler pipeline
//!
//! The facade over the compilation stages: lex → parse → bind → resolve
//! imports → lower to MIR → enforce Live → convert to SSA → verify →
//! canonicalise. Each stage accumulates diagnostics instead of failing;
//! errors in one stage stop the unit from progressing, but every stage
//! that ran leaves its artifact on the [`CompilationOutput`].

mod pipeline;

pub use pipeline::{compile_file, compile_source, CompilationOutput, PipelineError};

pub use bolt_compiler_diagnostics as diagnostics;
pub use bolt_compiler_hir as hir;
pub use bolt_compiler_mir as mir;
pub use bolt_compiler_parser as parser;
