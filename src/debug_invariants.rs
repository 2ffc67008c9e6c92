//! Structural self-checks for computed decompositions.

use crate::partitioning::PartitionError;

/// Types that can re-verify their own structural invariants.
pub trait DebugInvariants {
    /// Returns the first violated invariant, if any.
    fn validate_invariants(&self) -> Result<(), PartitionError>;
}

/// Checks `$obj` and panics with `$ctx` on failure, in debug builds or with
/// the `strict-invariants` / `check-invariants` features.
#[macro_export]
macro_rules! debug_invariants {
    ($obj:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $crate::debug_invariants::DebugInvariants::validate_invariants(&$obj) {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
