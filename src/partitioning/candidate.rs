//! One factorization of the process count and its scores.

use itertools::{Itertools, MinMaxResult, iproduct};
use serde::{Deserialize, Serialize};

use super::error::PartitionError;
use super::score::{ScoreEntry, score_extent};
use crate::config::GridType;

/// Base brick length and remainder for `len` cells split into `parts`.
///
/// The first `remainder` bricks get `base` cells and the rest `base − 1`;
/// with no remainder every brick gets `base`.
pub fn axis_sizing(len: usize, parts: usize) -> (usize, usize) {
    (len.div_ceil(parts), len % parts)
}

/// Cell count of the brick at process coordinate `coord`.
pub fn axis_extent(base: usize, remainder: usize, coord: usize) -> usize {
    if remainder == 0 || coord < remainder {
        base
    } else {
        base - 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Ranks per axis.
    pub division: [usize; 3],
    pub base: [usize; 3],
    pub remainder: [usize; 3],
    /// One entry per rank, axis 0 fastest.
    pub scores: Vec<ScoreEntry>,
    /// `sc_vol`: (max volume − min volume) / max volume.
    pub imbalance: f64,
    /// `sc_com`: sum of all brick surfaces.
    pub surface: u64,
    /// `sc_len`: longest axis-0 extent.
    pub sweep_length: usize,
    /// `sc_hex`: sum of all cubical deviations.
    pub cubical: u128,
    /// Position in enumeration order.
    pub original_index: usize,
}

impl Candidate {
    /// Sizes and scores every brick of `division` over `grid`.
    pub fn build(
        division: [usize; 3],
        grid: [usize; 3],
        grid_type: GridType,
        original_index: usize,
    ) -> Result<Self, PartitionError> {
        let mut base = [0; 3];
        let mut remainder = [0; 3];
        for axis in 0..3 {
            (base[axis], remainder[axis]) = axis_sizing(grid[axis], division[axis]);
        }

        let n_ranks = division.iter().product::<usize>();
        let mut scores = Vec::new();
        scores
            .try_reserve_exact(n_ranks)
            .map_err(|_| PartitionError::Allocation {
                what: "score entries",
                count: n_ranks,
            })?;

        let shared = grid_type.shared_points();
        for (k, j, i) in iproduct!(0..division[2], 0..division[1], 0..division[0]) {
            let coord = [i, j, k];
            let extent: [usize; 3] =
                std::array::from_fn(|a| axis_extent(base[a], remainder[a], coord[a]) + shared);
            scores.push(score_extent(extent));
        }

        let mut cand = Self {
            division,
            base,
            remainder,
            scores,
            imbalance: 0.0,
            surface: 0,
            sweep_length: 0,
            cubical: 0,
            original_index,
        };
        cand.evaluate();
        Ok(cand)
    }

    /// Recomputes the four aggregate scores from `scores`.
    pub fn evaluate(&mut self) {
        self.imbalance = match self.scores.iter().map(ScoreEntry::volume).minmax() {
            MinMaxResult::NoElements => 0.0,
            MinMaxResult::OneElement(_) => 0.0,
            MinMaxResult::MinMax(min, max) => (max - min) as f64 / max as f64,
        };
        self.surface = self.scores.iter().map(|s| s.surface).sum();
        self.sweep_length = self
            .scores
            .iter()
            .map(|s| s.extent[0])
            .max()
            .unwrap_or(0);
        self.cubical = self.scores.iter().map(|s| s.cubical).sum();
    }

    pub fn n_ranks(&self) -> usize {
        self.scores.len()
    }
}
