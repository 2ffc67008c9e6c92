//! Process-grid topology: neighbor directions and the rank lookup table.

pub mod direction;
pub mod rank_table;

pub use direction::{DIRECTIONS, Direction, DirectionKind, N_DIRECTIONS, N_FACES, Side};
pub use rank_table::{NO_NEIGHBOR, Neighborhood, RankId, RankTopology, linear_rank, peer};
