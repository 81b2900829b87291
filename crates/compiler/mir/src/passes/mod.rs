//! MIR passes: SSA construction and the Live structural check.

pub mod live_enforcement;
pub mod ssa_conversion;
pub mod ssa_placement;

pub use live_enforcement::{enforce_live, LiveDiagnostic};
pub use ssa_conversion::{convert_function_to_ssa, convert_to_ssa, SsaDiagnostic};
pub use ssa_placement::compute_phi_placement;
