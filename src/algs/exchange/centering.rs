//! Which planes a brick ships to, and accepts from, a neighbor.
//!
//! ```text
//!        0  1  2  3  4  5  6  7
//! cell   0  1  2  3  0  1  2  3      cells are exclusive per brick
//!      |--+--+--+--|--+--+--+--|
//! node 0  1  2  3  4                 node 4 of the left brick is
//!                  0  1  2  3  4     node 0 of the right brick
//! ```
//! A node brick therefore skips its shared boundary plane when sending.

use std::ops::Range;

use crate::config::GridType;
use crate::topology::Side;

pub trait Centering: Send + Sync + std::fmt::Debug {
    fn grid_type(&self) -> GridType;

    /// Interior planes sent to the neighbor on `side` of an axis with `n` points.
    fn send_planes(&self, n: usize, width: usize, side: Side) -> Range<isize>;

    /// Ghost planes filled from the neighbor on `side`.
    fn recv_planes(&self, n: usize, width: usize, side: Side) -> Range<isize> {
        let (n, w) = (n as isize, width as isize);
        match side {
            Side::Minus => -w..0,
            Side::Plus => n..n + w,
        }
    }

    /// Planes owned exclusively along an axis with `n` points.
    fn owned(&self, n: usize) -> usize {
        n - self.grid_type().shared_points()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CellCentered;

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeCentered;

impl Centering for CellCentered {
    fn grid_type(&self) -> GridType {
        GridType::Cell
    }

    fn send_planes(&self, n: usize, width: usize, side: Side) -> Range<isize> {
        let (n, w) = (n as isize, width as isize);
        match side {
            Side::Minus => 0..w,
            Side::Plus => n - w..n,
        }
    }
}

impl Centering for NodeCentered {
    fn grid_type(&self) -> GridType {
        GridType::Node
    }

    fn send_planes(&self, n: usize, width: usize, side: Side) -> Range<isize> {
        let (n, w) = (n as isize, width as isize);
        match side {
            Side::Minus => 1..w + 1,
            Side::Plus => n - 1 - w..n - 1,
        }
    }
}

/// Strategy for `grid_type`, chosen once per exchange.
pub fn centering_for(grid_type: GridType) -> &'static dyn Centering {
    match grid_type {
        GridType::Cell => &CellCentered,
        GridType::Node => &NodeCentered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_slabs() {
        let c = centering_for(GridType::Cell);
        assert_eq!(c.send_planes(8, 2, Side::Minus), 0..2);
        assert_eq!(c.send_planes(8, 2, Side::Plus), 6..8);
        assert_eq!(c.recv_planes(8, 2, Side::Minus), -2..0);
        assert_eq!(c.recv_planes(8, 2, Side::Plus), 8..10);
        assert_eq!(c.owned(8), 8);
    }

    #[test]
    fn node_slabs_skip_shared_plane() {
        let c = centering_for(GridType::Node);
        // 5 nodes: 0 and 4 are shared with the neighbors
        assert_eq!(c.send_planes(5, 1, Side::Minus), 1..2);
        assert_eq!(c.send_planes(5, 1, Side::Plus), 3..4);
        assert_eq!(c.send_planes(5, 2, Side::Plus), 2..4);
        assert_eq!(c.recv_planes(5, 2, Side::Plus), 5..7);
        assert_eq!(c.owned(5), 4);
        assert_eq!(c.grid_type(), GridType::Node);
    }
}
