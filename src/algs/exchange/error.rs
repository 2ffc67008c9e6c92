//! Halo-exchange errors.

use thiserror::Error;

use crate::algs::communicator::CommError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Extents, ghost width or component count unusable for an exchange.
    #[error("invalid field layout: {0}")]
    InvalidLayout(String),
    /// The field slice does not match the layout.
    #[error("field has {got} elements, layout needs {expected}")]
    FieldLength { expected: usize, got: usize },
    /// Ghost layers requested per call outside `1..=limit`.
    #[error("cannot communicate {requested} ghost layers (at most {limit})")]
    GhostWidth { requested: usize, limit: usize },
    #[error("failed to allocate {count} {what}")]
    Allocation { what: &'static str, count: usize },
    #[error("an exchange is already in flight")]
    AlreadyInFlight,
    #[error("no exchange has been initiated")]
    NotInitiated,
    /// A request in `group` failed to complete; the exchange was abandoned.
    #[error("transport failure while waiting on {group}: {source}")]
    Transport {
        group: &'static str,
        #[source]
        source: CommError,
    },
}
