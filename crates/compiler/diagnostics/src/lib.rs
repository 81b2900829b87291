//! # Diagnostic System for the Bolt Compiler
//!
//! Shared diagnostic infrastructure for every stage of the pipeline:
//! source locations and spans, stable `BOLT-E####`/`BOLT-W####` codes,
//! the `Diagnostic` record itself, and rendering helpers.

mod diagnostics;
pub mod reporting;

pub use diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticCollection, DiagnosticSeverity, SourceLocation,
    SourceSpan,
};
