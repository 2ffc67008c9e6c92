//! Entry-point for the brick partition optimizer.
//!
//! Cuts an `N1×N2×N3` grid into `P` rectangular bricks. Every factorization
//! `i·j·k = P` is sized, scored and screened by load balance, communication
//! surface, then brick shape and sweep length; the survivor fixes each rank's
//! extent, global head offset and neighbors.

pub mod candidate;
pub mod enumerate;
pub mod error;
pub mod optimizer;
pub mod ranking;
pub mod report;
pub mod score;

pub use candidate::{Candidate, axis_extent, axis_sizing};
pub use enumerate::{check_fixed_division, enumerate_divisions};
pub use error::PartitionError;
pub use optimizer::{Decomposition, PartitionOptimizer, SubdomainInfo, decompose, head_offsets};
pub use ranking::{Criterion, RankingTrace, StageRecord, rank_candidates};
pub use report::{DiagnosticSink, NullSink, ReportEvent, TextReport};
pub use score::{ScoreEntry, score_extent};

#[cfg(test)]
mod tests;
