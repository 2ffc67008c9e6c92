//! Configuration inputs for the decomposition and the halo exchange.
//!
//! Nothing here is parsed by the crate itself: callers build these structs
//! directly or deserialize them from whatever format they already use.

use serde::{Deserialize, Serialize};

use crate::algs::exchange::ExchangeError;
use crate::partitioning::PartitionError;
use crate::topology::N_DIRECTIONS;

/// Largest message tag every MPI implementation must accept (`MPI_TAG_UB`).
pub const MAX_TAG: u16 = 32767;

/// Where field samples live on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GridType {
    /// Samples at cell centres; every cell belongs to exactly one brick.
    #[default]
    Cell,
    /// Samples at vertices; bricks share the boundary plane with their neighbor.
    Node,
}

impl GridType {
    /// Points a brick shares with its plus-side neighbor along one axis.
    pub fn shared_points(self) -> usize {
        match self {
            GridType::Cell => 0,
            GridType::Node => 1,
        }
    }
}

/// Which criterion the third ranking stage applies first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RankingPreference {
    /// Prefer bricks close to a cube (`sc_hex` ascending), then sweep length.
    #[default]
    Cubical,
    /// Prefer long axis-0 sweeps (`sc_len` descending), then cubical shape.
    VectorLength,
}

/// How the process grid is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DivisionMode {
    /// Enumerate every factorization and rank them.
    #[default]
    Search,
    /// Use the caller's process grid as-is.
    Fixed([usize; 3]),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Global cell count per axis.
    pub grid: [usize; 3],
    /// Total number of ranks.
    pub procs: usize,
    /// This process's rank.
    pub rank: usize,
    pub mode: DivisionMode,
    pub preference: RankingPreference,
    pub grid_type: GridType,
    /// The single rank allowed to write diagnostics.
    pub report_rank: usize,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            grid: [1, 1, 1],
            procs: 1,
            rank: 0,
            mode: DivisionMode::Search,
            preference: RankingPreference::Cubical,
            grid_type: GridType::Cell,
            report_rank: 0,
        }
    }
}

impl DecompositionConfig {
    pub fn new(grid: [usize; 3], procs: usize, rank: usize) -> Self {
        Self {
            grid,
            procs,
            rank,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), PartitionError> {
        if self.grid.iter().any(|&n| n == 0) {
            return Err(PartitionError::InvalidConfig(format!(
                "grid size must be positive on every axis, got {:?}",
                self.grid
            )));
        }
        if self.procs == 0 {
            return Err(PartitionError::InvalidConfig(
                "process count must be positive".into(),
            ));
        }
        if self.rank >= self.procs {
            return Err(PartitionError::RankOutOfRange {
                rank: self.rank,
                procs: self.procs,
            });
        }
        if self.report_rank >= self.procs {
            return Err(PartitionError::RankOutOfRange {
                rank: self.report_rank,
                procs: self.procs,
            });
        }
        Ok(())
    }

    /// True on the rank that owns the diagnostic sink.
    pub fn is_reporter(&self) -> bool {
        self.rank == self.report_rank
    }
}

/// Per-field exchange parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaloConfig {
    /// Allocated ghost layers on each side.
    pub ghost_width: usize,
    /// Values per grid point (1 for scalars, 3 for vectors).
    pub components: usize,
    /// Also exchange the 12 edge and 8 corner neighbors.
    pub diagonal: bool,
    /// First message tag; direction `n` uses `tag_base + n`.
    pub tag_base: u16,
}

impl Default for HaloConfig {
    fn default() -> Self {
        Self {
            ghost_width: 1,
            components: 1,
            diagonal: false,
            tag_base: 0x4800,
        }
    }
}

impl HaloConfig {
    pub fn validate(&self) -> Result<(), ExchangeError> {
        if self.ghost_width == 0 {
            return Err(ExchangeError::InvalidLayout(
                "ghost width must be at least 1".into(),
            ));
        }
        if self.components == 0 {
            return Err(ExchangeError::InvalidLayout(
                "component count must be at least 1".into(),
            ));
        }
        if usize::from(self.tag_base) + N_DIRECTIONS > usize::from(MAX_TAG) {
            return Err(ExchangeError::InvalidLayout(format!(
                "tag base {:#x} leaves no room for {N_DIRECTIONS} direction tags below {MAX_TAG}",
                self.tag_base
            )));
        }
        Ok(())
    }
}
