//! Probing solvers: simple slopes, Johnson-Neyman intervals and FDR adjustment.

mod context;
mod fdr;
mod johnson_neyman;
mod simple_slopes;

pub use fdr::{CriticalValueAdjuster, FdrAdjustment, FdrCorrector};
pub use johnson_neyman::{solve_boundaries, Boundaries, JohnsonNeymanSolver, SlopeLine};
pub use simple_slopes::{SimpleSlope, SimpleSlopesEngine, SimpleSlopesResult};
