//! Thin façade over intra-process (threads) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! Every handle is waitable but issuing one never blocks; the halo exchange
//! calls `.wait()` before it trusts that a receive buffer is filled.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;
use static_assertions::assert_impl_all;
use thiserror::Error;

/// Transport-level failures, reported when a handle is waited on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommError {
    #[error("peer {peer} is outside a communicator of {size} ranks")]
    InvalidPeer { peer: usize, size: usize },
    #[error("message from rank {peer} (tag {tag:#x}) has {got} bytes, expected {expected}")]
    SizeMismatch {
        peer: usize,
        tag: u16,
        expected: usize,
        got: usize,
    },
    #[error("no message from rank {peer} (tag {tag:#x}) within {waited:?}")]
    Timeout {
        peer: usize,
        tag: u16,
        waited: Duration,
    },
    #[error("receive from rank {peer} completed without data")]
    NoData { peer: usize },
    #[error("transport initialization failed: {0}")]
    Init(String),
}

/// Non-blocking point-to-point interface.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    /// Posts a receive of exactly `len` bytes.
    fn irecv(&self, peer: usize, tag: u16, len: usize) -> Self::RecvHandle;

    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn is_no_comm(&self) -> bool {
        false
    }
}

/// Anything that can be waited on.
pub trait Wait {
    /// Blocks until completion; receives yield their payload.
    fn wait(self) -> Result<Option<Vec<u8>>, CommError>;
}

impl Wait for () {
    fn wait(self) -> Result<Option<Vec<u8>>, CommError> {
        Ok(None)
    }
}

/// Single-rank communicator: every operation completes at once with no data.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _len: usize) {}

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn is_no_comm(&self) -> bool {
        true
    }
}

// --- LocalComm: ranks as threads of one process ---
type Key = (usize, usize, u16); // (src, dst, tag)
type Mailbox = DashMap<Key, VecDeque<Bytes>>;

/// One rank of an in-process group; messages are FIFO per (src, dst, tag).
#[derive(Clone, Debug)]
pub struct LocalComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
    recv_timeout: Option<Duration>,
}

assert_impl_all!(LocalComm: Send, Sync, Clone);

impl LocalComm {
    /// `size` connected ranks sharing one mailbox.
    pub fn group(size: usize) -> Vec<LocalComm> {
        let mailbox = Arc::new(Mailbox::new());
        (0..size)
            .map(|rank| LocalComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
                recv_timeout: None,
            })
            .collect()
    }

    /// Fails receives that see no message within `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }
}

pub struct LocalSendHandle {
    error: Option<CommError>,
}

impl Wait for LocalSendHandle {
    fn wait(self) -> Result<Option<Vec<u8>>, CommError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}

pub struct LocalRecvHandle {
    mailbox: Arc<Mailbox>,
    key: Key,
    len: usize,
    size: usize,
    timeout: Option<Duration>,
}

impl LocalRecvHandle {
    fn try_take(&self) -> Option<Bytes> {
        self.mailbox.get_mut(&self.key)?.pop_front()
    }
}

impl Wait for LocalRecvHandle {
    fn wait(self) -> Result<Option<Vec<u8>>, CommError> {
        let (peer, _, tag) = self.key;
        if peer >= self.size {
            return Err(CommError::InvalidPeer {
                peer,
                size: self.size,
            });
        }
        let start = Instant::now();
        loop {
            if let Some(bytes) = self.try_take() {
                if bytes.len() != self.len {
                    return Err(CommError::SizeMismatch {
                        peer,
                        tag,
                        expected: self.len,
                        got: bytes.len(),
                    });
                }
                return Ok(Some(bytes.to_vec()));
            }
            if let Some(limit) = self.timeout {
                if start.elapsed() >= limit {
                    return Err(CommError::Timeout {
                        peer,
                        tag,
                        waited: limit,
                    });
                }
            }
            std::thread::yield_now();
        }
    }
}

impl Communicator for LocalComm {
    type SendHandle = LocalSendHandle;
    type RecvHandle = LocalRecvHandle;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        if peer >= self.size {
            return LocalSendHandle {
                error: Some(CommError::InvalidPeer {
                    peer,
                    size: self.size,
                }),
            };
        }
        self.mailbox
            .entry((self.rank, peer, tag))
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
        LocalSendHandle { error: None }
    }

    fn irecv(&self, peer: usize, tag: u16, len: usize) -> Self::RecvHandle {
        LocalRecvHandle {
            mailbox: Arc::clone(&self.mailbox),
            key: (peer, self.rank, tag),
            len,
            size: self.size,
            timeout: self.recv_timeout,
        }
    }

    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use mpi::datatype::Equivalence;
    use mpi::environment::Universe;
    use mpi::request::{Request, StaticScope};
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    /// World communicator; MPI is finalized when the last clone is dropped.
    #[derive(Clone)]
    pub struct MpiComm {
        universe: Arc<Universe>,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, CommError> {
            let universe = mpi::initialize()
                .ok_or_else(|| CommError::Init("MPI was already initialized".into()))?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                universe: Arc::new(universe),
                rank,
                size,
            })
        }

        pub fn world(&self) -> SimpleCommunicator {
            self.universe.world()
        }
    }

    /// In-flight request over a heap buffer it owns until completion.
    pub struct MpiHandle {
        request: Option<Request<'static, [u8], StaticScope>>,
        buf: *mut [u8],
        peer: usize,
        tag: u16,
        receive: bool,
    }

    impl Wait for MpiHandle {
        fn wait(mut self) -> Result<Option<Vec<u8>>, CommError> {
            let Some(request) = self.request.take() else {
                return Err(CommError::NoData { peer: self.peer });
            };
            let status = request.wait();
            // SAFETY: the request borrowing `buf` has completed and been consumed.
            let owned = unsafe { Box::from_raw(self.buf) };
            if !self.receive {
                return Ok(None);
            }
            let got = status.count(u8::equivalent_datatype()) as usize;
            if got != owned.len() {
                return Err(CommError::SizeMismatch {
                    peer: self.peer,
                    tag: self.tag,
                    expected: owned.len(),
                    got,
                });
            }
            Ok(Some(owned.into_vec()))
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = MpiHandle;
        type RecvHandle = MpiHandle;

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> MpiHandle {
            let raw = Box::into_raw(buf.to_vec().into_boxed_slice());
            // SAFETY: `raw` stays allocated until `wait` reclaims it.
            let data: &'static [u8] = unsafe { &*raw };
            let request = self
                .world()
                .process_at_rank(peer as i32)
                .immediate_send_with_tag(StaticScope, data, i32::from(tag));
            MpiHandle {
                request: Some(request),
                buf: raw,
                peer,
                tag,
                receive: false,
            }
        }

        fn irecv(&self, peer: usize, tag: u16, len: usize) -> MpiHandle {
            let raw = Box::into_raw(vec![0u8; len].into_boxed_slice());
            // SAFETY: as above; nothing else touches the buffer until `wait`.
            let data: &'static mut [u8] = unsafe { &mut *raw };
            let request = self
                .world()
                .process_at_rank(peer as i32)
                .immediate_receive_into_with_tag(StaticScope, data, i32::from(tag));
            MpiHandle {
                request: Some(request),
                buf: raw,
                peer,
                tag,
                receive: true,
            }
        }

        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.size
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::{MpiComm, MpiHandle};
