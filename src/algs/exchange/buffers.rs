//! Per-direction send/receive staging buffers and slab packing.

use std::ops::Range;

use bytemuck::Pod;
use itertools::iproduct;

use super::centering::Centering;
use super::error::ExchangeError;
use super::layout::FieldLayout;
use crate::topology::{DIRECTIONS, Direction, N_DIRECTIONS, N_FACES};

/// Index ranges of the slab exchanged toward `dir`, on the sending or the
/// receiving side, for a communicated width `w`.
pub fn slab(
    layout: &FieldLayout,
    centering: &dyn Centering,
    dir: Direction,
    w: usize,
    sending: bool,
) -> [Range<isize>; 3] {
    std::array::from_fn(|axis| {
        let n = layout.extent[axis];
        match dir.side(axis) {
            None => 0..n as isize,
            Some(side) if sending => centering.send_planes(n, w, side),
            Some(side) => centering.recv_planes(n, w, side),
        }
    })
}

/// Elements in one message toward `dir` at width `w`.
pub fn message_len(layout: &FieldLayout, dir: Direction, w: usize) -> usize {
    (0..3)
        .map(|axis| match dir.offset[axis] {
            0 => layout.extent[axis],
            _ => w,
        })
        .product::<usize>()
        * layout.components
}

/// Staging storage indexed by direction; sized once for the full ghost width.
#[derive(Debug)]
pub struct HaloBuffers<T> {
    send: Vec<Vec<T>>,
    recv: Vec<Vec<T>>,
}

fn zeroed_buffer<T: Pod>(len: usize) -> Result<Vec<T>, ExchangeError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| ExchangeError::Allocation {
        what: "halo buffer elements",
        count: len,
    })?;
    v.resize(len, T::zeroed());
    Ok(v)
}

impl<T: Pod> HaloBuffers<T> {
    /// Face pairs always; edge and corner pairs only when `diagonal`.
    pub fn allocate(layout: &FieldLayout, diagonal: bool) -> Result<Self, ExchangeError> {
        let used = if diagonal { N_DIRECTIONS } else { N_FACES };
        let mut send = Vec::with_capacity(N_DIRECTIONS);
        let mut recv = Vec::with_capacity(N_DIRECTIONS);
        for (n, &dir) in DIRECTIONS.iter().enumerate() {
            let cap = if n < used {
                message_len(layout, dir, layout.ghost)
            } else {
                0
            };
            send.push(zeroed_buffer(cap)?);
            recv.push(zeroed_buffer(cap)?);
        }
        log::debug!(
            "halo buffers for extent {:?}: {} elements per side",
            layout.extent,
            send.iter().map(Vec::len).sum::<usize>()
        );
        Ok(Self { send, recv })
    }

    pub fn capacity(&self, dir: Direction) -> usize {
        self.send[dir.index()].len()
    }

    /// Copies the interior slab toward `dir` into its send buffer and returns
    /// the filled prefix.
    pub fn pack(
        &mut self,
        dir: Direction,
        field: &[T],
        layout: &FieldLayout,
        centering: &dyn Centering,
        w: usize,
    ) -> &[T] {
        let [ri, rj, rk] = slab(layout, centering, dir, w, true);
        let len = message_len(layout, dir, w);
        let buf = &mut self.send[dir.index()][..len];
        let points = iproduct!(0..layout.components, rk, rj, ri);
        for (slot, (c, k, j, i)) in buf.iter_mut().zip(points) {
            *slot = field[layout.index(c, i, j, k)];
        }
        buf
    }

    /// Receive buffer for the ghost region on side `dir`, trimmed to width `w`.
    pub fn recv_mut(&mut self, dir: Direction, layout: &FieldLayout, w: usize) -> &mut [T] {
        let len = message_len(layout, dir, w);
        &mut self.recv[dir.index()][..len]
    }

    /// Scatters the receive buffer of `dir` into the ghost region on that side.
    pub fn unpack(
        &self,
        dir: Direction,
        field: &mut [T],
        layout: &FieldLayout,
        centering: &dyn Centering,
        w: usize,
    ) {
        let [ri, rj, rk] = slab(layout, centering, dir, w, false);
        let len = message_len(layout, dir, w);
        let buf = &self.recv[dir.index()][..len];
        let points = iproduct!(0..layout.components, rk, rj, ri);
        for (&v, (c, k, j, i)) in buf.iter().zip(points) {
            field[layout.index(c, i, j, k)] = v;
        }
    }
}
