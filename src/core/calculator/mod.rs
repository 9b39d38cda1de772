pub mod classify;
pub mod gaps;
pub mod staleness;

pub use gaps::{AnalyzerParams, analyze};
