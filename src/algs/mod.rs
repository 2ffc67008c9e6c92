//! Message passing and the halo exchange built on it.

pub mod communicator;
pub mod exchange;

pub use communicator::{CommError, Communicator, LocalComm, NoComm, Wait};
#[cfg(feature = "mpi-support")]
pub use communicator::MpiComm;
pub use exchange::{ExchangeError, ExchangeState, FieldLayout, HaloExchange};
