//! Orchestration: single-provider runs, side-by-side comparison and the
//! hybrid structured-plus-narrative report.

mod comparison;

pub use comparison::{AnalysisRun, ComparisonEngine, HybridReport};
