//! Partitioning errors for brick-decomp

use thiserror::Error;

/// Errors from candidate enumeration, scoring and topology construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// No factorization of the process count fits the grid.
    #[error("no process grid of {procs} ranks fits a {grid:?} grid")]
    NoCandidates { procs: usize, grid: [usize; 3] },
    /// A caller-supplied process grid violates the size constraints.
    #[error("fixed division {division:?} is infeasible for {procs} ranks on a {grid:?} grid")]
    InvalidDivision {
        division: [usize; 3],
        procs: usize,
        grid: [usize; 3],
    },
    /// Configuration values outside their domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A rank id outside `0..procs`.
    #[error("rank {rank} out of range for {procs} processes")]
    RankOutOfRange { rank: usize, procs: usize },
    /// Could not reserve memory for a work array.
    #[error("failed to allocate {count} {what}")]
    Allocation { what: &'static str, count: usize },
    /// A computed decomposition broke one of its structural invariants.
    #[error("decomposition invariant violated: {0}")]
    Invariant(String),
}
