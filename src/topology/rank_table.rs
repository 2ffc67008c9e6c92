//! Padded process-grid → rank lookup.
//!
//! ```text
//! coord |  -1  |  0  |  1  | ... | D-1 |  D   |
//!         halo  <------ interior ------>  halo
//! ```
//! The halo layer holds [`NO_NEIGHBOR`]; there is no periodic wraparound.

use serde::{Deserialize, Serialize};

use super::direction::{DIRECTIONS, Direction, N_DIRECTIONS, N_FACES};

/// Linear rank id as stored in neighbor tables; negative means "no peer".
pub type RankId = i32;

/// Physical domain boundary: nothing to exchange with.
pub const NO_NEIGHBOR: RankId = -1;

/// Neighbor rank per direction, indexed like [`DIRECTIONS`].
pub type Neighborhood = [RankId; N_DIRECTIONS];

/// `Some(rank)` for a real neighbor, `None` for the sentinel.
pub fn peer(id: RankId) -> Option<usize> {
    usize::try_from(id).ok()
}

/// Linear rank of process coordinate `c`, axis 0 fastest.
pub fn linear_rank(c: [usize; 3], dims: [usize; 3]) -> usize {
    c[0] + dims[0] * (c[1] + dims[1] * c[2])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTopology {
    dims: [usize; 3],
    table: Vec<RankId>,
}

impl RankTopology {
    /// Builds the padded table for a `dims` process grid.
    pub fn new(dims: [usize; 3]) -> Self {
        let padded = dims.map(|d| d + 2);
        let mut table = vec![NO_NEIGHBOR; padded.iter().product()];
        let mut rank: RankId = 0;
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    table[(i + 1) + padded[0] * ((j + 1) + padded[1] * (k + 1))] = rank;
                    rank += 1;
                }
            }
        }
        Self { dims, table }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn n_ranks(&self) -> usize {
        self.dims.iter().product()
    }

    /// Rank at a signed process coordinate; [`NO_NEIGHBOR`] outside the grid.
    pub fn rank_at(&self, c: [isize; 3]) -> RankId {
        let mut p = [0usize; 3];
        for axis in 0..3 {
            // one padding layer; anything further out is also off-grid
            match usize::try_from(c[axis] + 1) {
                Ok(v) if v < self.dims[axis] + 2 => p[axis] = v,
                _ => return NO_NEIGHBOR,
            }
        }
        let padded = self.dims.map(|d| d + 2);
        self.table[p[0] + padded[0] * (p[1] + padded[1] * p[2])]
    }

    pub fn coords_of(&self, rank: usize) -> Option<[usize; 3]> {
        if rank >= self.n_ranks() {
            return None;
        }
        let [d0, d1, _] = self.dims;
        Some([rank % d0, (rank / d0) % d1, rank / (d0 * d1)])
    }

    pub fn neighbor(&self, rank: usize, dir: Direction) -> RankId {
        match self.coords_of(rank) {
            Some(c) => self.rank_at(std::array::from_fn(|a| {
                c[a] as isize + isize::from(dir.offset[a])
            })),
            None => NO_NEIGHBOR,
        }
    }

    /// X−, X+, Y−, Y+, Z−, Z+.
    pub fn face_neighbors(&self, rank: usize) -> [RankId; N_FACES] {
        std::array::from_fn(|n| self.neighbor(rank, DIRECTIONS[n]))
    }

    /// All 26 neighbors, faces first.
    pub fn neighborhood(&self, rank: usize) -> Neighborhood {
        std::array::from_fn(|n| self.neighbor(rank, DIRECTIONS[n]))
    }
}
