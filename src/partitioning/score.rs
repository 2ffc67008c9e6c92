//! Per-brick geometric metrics.

use serde::{Deserialize, Serialize};

/// Geometry of one rank's brick within a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Local cell (or node) count per axis.
    pub extent: [usize; 3],
    /// `2·(s0·s1 + s1·s2 + s2·s0)`.
    pub surface: u64,
    /// Distance from a cube: with face areas sorted `a ≥ b ≥ c`,
    /// `(a−b)² + (c−b)²`.
    pub cubical: u128,
}

impl ScoreEntry {
    pub fn volume(&self) -> u64 {
        self.extent.iter().map(|&s| s as u64).product()
    }
}

/// Scores a brick of the given extent.
pub fn score_extent(extent: [usize; 3]) -> ScoreEntry {
    let [d0, d1, d2] = extent.map(|s| s as u64);
    let mut faces = [d1 * d2, d2 * d0, d0 * d1];
    let surface = 2 * faces.iter().sum::<u64>();

    faces.sort_unstable_by(|a, b| b.cmp(a));
    let [a, b, c] = faces.map(u128::from);
    let cubical = (a - b) * (a - b) + (b - c) * (b - c);

    ScoreEntry {
        extent,
        surface,
        cubical,
    }
}
