#![cfg_attr(docsrs, feature(doc_cfg))]
//! # brick-decomp
//!
//! Block decomposition of structured 3-D grids for distributed stencil codes.
//!
//! ## Features
//! - A deterministic partition optimizer that splits an `N1×N2×N3` grid into
//!   `P` rectangular bricks, screening every process-grid factorization by
//!   load balance, communication surface, brick shape and sweep length
//! - A padded rank table with face, edge and corner neighbor lookup
//! - Non-blocking ghost-layer exchange for node- or cell-centered fields,
//!   face-only or across all 26 neighbors
//! - Pluggable transports: single rank, in-process threads, and MPI
//!   (`mpi-support`)
//!
//! ## Determinism
//!
//! Every rank runs the optimizer on identical inputs and derives the same
//! partition without communicating. Only the configured report rank writes
//! diagnostics.
//!
//! ```
//! use brick_decomp::prelude::*;
//!
//! let cfg = DecompositionConfig::new([8, 8, 8], 4, 0);
//! let decomp = decompose(&cfg).unwrap();
//! assert_eq!(decomp.division, [1, 2, 2]);
//!
//! let mut hx = HaloExchange::<f64, _>::from_decomposition(
//!     NoComm,
//!     &decompose(&DecompositionConfig::new([8, 8, 8], 1, 0)).unwrap(),
//!     &HaloConfig::default(),
//! )
//! .unwrap();
//! let mut field = vec![0.0; hx.layout().len()];
//! hx.exchange(&mut field, 1).unwrap();
//! ```

pub mod algs;
pub mod config;
pub mod debug_invariants;
pub mod partitioning;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, LocalComm, NoComm, Wait};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::exchange::{ExchangeError, ExchangeState, FieldLayout, HaloExchange};
    pub use crate::config::{
        DecompositionConfig, DivisionMode, GridType, HaloConfig, RankingPreference,
    };
    pub use crate::partitioning::{
        Decomposition, DiagnosticSink, PartitionError, PartitionOptimizer, SubdomainInfo,
        TextReport, decompose,
    };
    pub use crate::topology::{Direction, NO_NEIGHBOR, RankId, RankTopology};
}
