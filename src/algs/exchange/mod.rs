//! Ghost-layer exchange between neighboring bricks.
//!
//! [`HaloExchange::initiate`] packs the interior slab facing every real
//! neighbor and posts a receive, then a send, per direction.
//! [`HaloExchange::complete`] waits on the requests one group at a time
//! (X faces, Y faces, Z faces, then edges and corners when enabled) and
//! unpacks a group's ghosts only after all of its requests finished.
//!
//! Direction `n` owns request slots `2n` (send) and `2n + 1` (receive), so
//! each face axis holds four contiguous slots, edges 24 and corners 16.

pub mod buffers;
pub mod centering;
pub mod error;
pub mod layout;

use std::ops::Range;

use bytemuck::Pod;

pub use buffers::{HaloBuffers, message_len, slab};
pub use centering::{CellCentered, Centering, NodeCentered, centering_for};
pub use error::ExchangeError;
pub use layout::FieldLayout;

use crate::algs::communicator::{CommError, Communicator, Wait};
use crate::config::{GridType, HaloConfig};
use crate::partitioning::Decomposition;
use crate::topology::{DIRECTIONS, N_DIRECTIONS, N_FACES, Neighborhood, peer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    InFlight,
    /// The last completion failed; outstanding requests were abandoned.
    Failed,
}

/// Requests awaited and unpacked together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Axis(usize),
    Edges,
    Corners,
}

impl Group {
    pub fn name(self) -> &'static str {
        match self {
            Group::Axis(0) => "x faces",
            Group::Axis(1) => "y faces",
            Group::Axis(_) => "z faces",
            Group::Edges => "edges",
            Group::Corners => "corners",
        }
    }

    /// Directions (indices into [`DIRECTIONS`]) in this group.
    pub fn directions(self) -> Range<usize> {
        match self {
            Group::Axis(a) => 2 * a..2 * a + 2,
            Group::Edges => 6..18,
            Group::Corners => 18..26,
        }
    }

    /// Request slots owned by this group.
    pub fn slots(self) -> Range<usize> {
        let d = self.directions();
        2 * d.start..2 * d.end
    }

    fn all(diagonal: bool) -> &'static [Group] {
        const FACES: [Group; 3] = [Group::Axis(0), Group::Axis(1), Group::Axis(2)];
        const FULL: [Group; 5] = [
            Group::Axis(0),
            Group::Axis(1),
            Group::Axis(2),
            Group::Edges,
            Group::Corners,
        ];
        if diagonal { &FULL } else { &FACES }
    }
}

/// One slot of the request table.
enum Request<C: Communicator> {
    /// Boundary side or unused slot; completes at once.
    Null,
    Send(C::SendHandle),
    Recv { handle: C::RecvHandle, peer: usize },
}

impl<C: Communicator> Request<C> {
    /// Completes the request; receives yield the sending peer and payload.
    fn wait(self) -> Result<Option<(usize, Vec<u8>)>, CommError> {
        match self {
            Request::Null => Ok(None),
            Request::Send(h) => h.wait().map(|_| None),
            Request::Recv { handle, peer } => match handle.wait()? {
                Some(bytes) => Ok(Some((peer, bytes))),
                None => Err(CommError::NoData { peer }),
            },
        }
    }
}

/// Persistent exchange plan for one field layout on one rank.
pub struct HaloExchange<T, C: Communicator> {
    comm: C,
    layout: FieldLayout,
    centering: &'static dyn Centering,
    neighbors: Neighborhood,
    diagonal: bool,
    tag_base: u16,
    buffers: HaloBuffers<T>,
    requests: Vec<Request<C>>,
    state: ExchangeState,
    width: usize,
}

impl<T: Pod, C: Communicator> HaloExchange<T, C> {
    pub fn new(
        comm: C,
        extent: [usize; 3],
        grid_type: GridType,
        neighbors: Neighborhood,
        cfg: &HaloConfig,
    ) -> Result<Self, ExchangeError> {
        cfg.validate()?;
        let layout = FieldLayout::new(extent, cfg.ghost_width, cfg.components)?;
        let size = comm.size();
        if let Some(bad) = neighbors.iter().find(|&&id| peer(id).is_some_and(|p| p >= size)) {
            return Err(ExchangeError::InvalidLayout(format!(
                "neighbor rank {bad} outside a communicator of {size} ranks"
            )));
        }
        let buffers = HaloBuffers::allocate(&layout, cfg.diagonal)?;
        let n_slots = 2 * if cfg.diagonal { N_DIRECTIONS } else { N_FACES };
        let requests = std::iter::repeat_with(|| Request::Null)
            .take(n_slots)
            .collect();
        Ok(Self {
            comm,
            layout,
            centering: centering_for(grid_type),
            neighbors,
            diagonal: cfg.diagonal,
            tag_base: cfg.tag_base,
            buffers,
            requests,
            state: ExchangeState::Idle,
            width: 0,
        })
    }

    /// Plan for the brick `comm.rank()` owns in `decomp`.
    pub fn from_decomposition(
        comm: C,
        decomp: &Decomposition,
        cfg: &HaloConfig,
    ) -> Result<Self, ExchangeError> {
        if comm.size() != decomp.n_ranks() {
            return Err(ExchangeError::InvalidLayout(format!(
                "communicator has {} ranks, decomposition {}",
                comm.size(),
                decomp.n_ranks()
            )));
        }
        let rank = comm.rank();
        let local = decomp
            .local(rank)
            .map_err(|e| ExchangeError::InvalidLayout(e.to_string()))?;
        let extent = local.extent;
        let neighbors = decomp.neighborhood(rank);
        Self::new(comm, extent, decomp.grid_type, neighbors, cfg)
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    pub fn neighbors(&self) -> &Neighborhood {
        &self.neighbors
    }

    pub fn communicator(&self) -> &C {
        &self.comm
    }

    /// Largest width each call may communicate: the ghost width, capped by
    /// the owned planes of every axis that has a neighbor.
    pub fn max_width(&self) -> usize {
        (0..3)
            .filter(|&axis| {
                self.neighbors[2 * axis..2 * axis + 2]
                    .iter()
                    .any(|&id| peer(id).is_some())
            })
            .map(|axis| self.centering.owned(self.layout.extent[axis]))
            .fold(self.layout.ghost, usize::min)
    }

    fn check_field(&self, len: usize) -> Result<(), ExchangeError> {
        let expected = self.layout.len();
        if len != expected {
            return Err(ExchangeError::FieldLength { expected, got: len });
        }
        Ok(())
    }

    /// Packs and posts every message of one exchange of `width` ghost layers.
    pub fn initiate(&mut self, field: &[T], width: usize) -> Result<(), ExchangeError> {
        if self.state == ExchangeState::InFlight {
            return Err(ExchangeError::AlreadyInFlight);
        }
        self.check_field(field.len())?;
        let limit = self.max_width();
        if width == 0 || width > limit {
            return Err(ExchangeError::GhostWidth {
                requested: width,
                limit,
            });
        }

        let elem = std::mem::size_of::<T>();
        for &group in Group::all(self.diagonal) {
            for n in group.directions() {
                let Some(p) = peer(self.neighbors[n]) else {
                    continue;
                };
                let dir = DIRECTIONS[n];
                let recv_tag = self.tag_base + dir.opposite().index() as u16;
                let send_tag = self.tag_base + n as u16;
                let len = message_len(&self.layout, dir, width);

                let handle = self.comm.irecv(p, recv_tag, len * elem);
                self.requests[2 * n + 1] = Request::Recv { handle, peer: p };

                let payload = self
                    .buffers
                    .pack(dir, field, &self.layout, self.centering, width);
                let handle = self.comm.isend(p, send_tag, bytemuck::cast_slice(payload));
                self.requests[2 * n] = Request::Send(handle);
                log::trace!(
                    "rank {}: {:?} <-> {p}, {len} elements, tags {send_tag:#x}/{recv_tag:#x}",
                    self.comm.rank(),
                    dir.offset
                );
            }
        }
        self.width = width;
        self.state = ExchangeState::InFlight;
        Ok(())
    }

    /// Waits on each group in turn and fills the ghost layers of `field`.
    pub fn complete(&mut self, field: &mut [T]) -> Result<(), ExchangeError> {
        if self.state != ExchangeState::InFlight {
            return Err(ExchangeError::NotInitiated);
        }
        self.check_field(field.len())?;

        for &group in Group::all(self.diagonal) {
            if let Err(source) = self.wait_group(group) {
                log::warn!(
                    "rank {}: exchange failed on {}: {source}",
                    self.comm.rank(),
                    group.name()
                );
                self.abandon();
                return Err(ExchangeError::Transport {
                    group: group.name(),
                    source,
                });
            }
            for n in group.directions() {
                if peer(self.neighbors[n]).is_some() {
                    self.buffers.unpack(
                        DIRECTIONS[n],
                        field,
                        &self.layout,
                        self.centering,
                        self.width,
                    );
                }
            }
            log::debug!("rank {}: {} unpacked", self.comm.rank(), group.name());
        }
        self.state = ExchangeState::Idle;
        Ok(())
    }

    /// [`initiate`](Self::initiate) followed by [`complete`](Self::complete).
    pub fn exchange(&mut self, field: &mut [T], width: usize) -> Result<(), ExchangeError> {
        self.initiate(field, width)?;
        self.complete(field)
    }

    fn wait_group(&mut self, group: Group) -> Result<(), CommError> {
        for slot in group.slots() {
            let request = std::mem::replace(&mut self.requests[slot], Request::Null);
            if let Some((peer, bytes)) = request.wait()? {
                let dir = DIRECTIONS[slot / 2];
                let dst = bytemuck::cast_slice_mut::<T, u8>(
                    self.buffers.recv_mut(dir, &self.layout, self.width),
                );
                // transports are not trusted to honor the posted length
                if bytes.len() != dst.len() {
                    return Err(CommError::SizeMismatch {
                        peer,
                        tag: self.tag_base + dir.opposite().index() as u16,
                        expected: dst.len(),
                        got: bytes.len(),
                    });
                }
                dst.copy_from_slice(&bytes);
            }
        }
        Ok(())
    }

    /// Drops the request table after a failure. Handles still in flight are
    /// leaked rather than cancelled: some transports refuse to drop them.
    fn abandon(&mut self) {
        for slot in self.requests.iter_mut() {
            std::mem::forget(std::mem::replace(slot, Request::Null));
        }
        self.state = ExchangeState::Failed;
    }
}

impl<T, C: Communicator> Drop for HaloExchange<T, C> {
    fn drop(&mut self) {
        if self.state == ExchangeState::InFlight {
            log::warn!("halo exchange dropped with requests in flight");
            for slot in self.requests.iter_mut() {
                std::mem::forget(std::mem::replace(slot, Request::Null));
            }
        }
    }
}
