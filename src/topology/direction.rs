//! The 26 neighbor directions of a brick.
//!
//! Faces come first in the order X−, X+, Y−, Y+, Z−, Z+, then the 12 edges
//! and the 8 corners. A direction's position in [`DIRECTIONS`] is its index,
//! which also fixes its request slots and message tag in the exchange.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Minus,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionKind {
    Face,
    Edge,
    Corner,
}

/// Unit offset to a neighboring brick, each component in `{−1, 0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub offset: [i8; 3],
}

const fn d(x: i8, y: i8, z: i8) -> Direction {
    Direction { offset: [x, y, z] }
}

pub const N_FACES: usize = 6;
pub const N_EDGES: usize = 12;
pub const N_CORNERS: usize = 8;
pub const N_DIRECTIONS: usize = N_FACES + N_EDGES + N_CORNERS;

const_assert_eq!(N_DIRECTIONS, 26);

pub static DIRECTIONS: [Direction; N_DIRECTIONS] = [
    // faces
    d(-1, 0, 0),
    d(1, 0, 0),
    d(0, -1, 0),
    d(0, 1, 0),
    d(0, 0, -1),
    d(0, 0, 1),
    // edges along Z
    d(-1, -1, 0),
    d(1, -1, 0),
    d(-1, 1, 0),
    d(1, 1, 0),
    // edges along X
    d(0, -1, -1),
    d(0, 1, -1),
    d(0, -1, 1),
    d(0, 1, 1),
    // edges along Y
    d(-1, 0, -1),
    d(1, 0, -1),
    d(-1, 0, 1),
    d(1, 0, 1),
    // corners
    d(-1, -1, -1),
    d(1, -1, -1),
    d(-1, 1, -1),
    d(1, 1, -1),
    d(-1, -1, 1),
    d(1, -1, 1),
    d(-1, 1, 1),
    d(1, 1, 1),
];

impl Direction {
    /// The face direction on `side` of `axis`.
    pub fn face(axis: usize, side: Side) -> Direction {
        DIRECTIONS[2 * axis + usize::from(side == Side::Plus)]
    }

    pub fn index(self) -> usize {
        DIRECTIONS
            .iter()
            .position(|&x| x == self)
            .unwrap_or(usize::MAX)
    }

    pub fn opposite(self) -> Direction {
        Direction {
            offset: self.offset.map(|o| -o),
        }
    }

    pub fn kind(self) -> DirectionKind {
        match self.offset.iter().filter(|&&o| o != 0).count() {
            1 => DirectionKind::Face,
            2 => DirectionKind::Edge,
            _ => DirectionKind::Corner,
        }
    }

    /// Side taken along `axis`, or `None` if the direction is tangential to it.
    pub fn side(self, axis: usize) -> Option<Side> {
        match self.offset[axis] {
            -1 => Some(Side::Minus),
            1 => Some(Side::Plus),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_is_complete_and_grouped() {
        let set: HashSet<_> = DIRECTIONS.iter().collect();
        assert_eq!(set.len(), N_DIRECTIONS);
        assert!(DIRECTIONS[..N_FACES].iter().all(|d| d.kind() == DirectionKind::Face));
        assert!(
            DIRECTIONS[N_FACES..N_FACES + N_EDGES]
                .iter()
                .all(|d| d.kind() == DirectionKind::Edge)
        );
        assert!(
            DIRECTIONS[N_FACES + N_EDGES..]
                .iter()
                .all(|d| d.kind() == DirectionKind::Corner)
        );
    }

    #[test]
    fn opposite_is_in_table_and_involutive() {
        for (n, dir) in DIRECTIONS.iter().enumerate() {
            assert_eq!(dir.index(), n);
            let opp = dir.opposite();
            assert_ne!(opp.index(), usize::MAX);
            assert_eq!(opp.opposite(), *dir);
            assert_eq!(opp.kind(), dir.kind());
        }
    }

    #[test]
    fn faces_by_axis_and_side() {
        assert_eq!(Direction::face(0, Side::Minus).offset, [-1, 0, 0]);
        assert_eq!(Direction::face(1, Side::Plus).offset, [0, 1, 0]);
        assert_eq!(Direction::face(2, Side::Plus).index(), 5);
        assert_eq!(Direction::face(2, Side::Minus).side(2), Some(Side::Minus));
        assert_eq!(Direction::face(2, Side::Minus).side(0), None);
    }
}
