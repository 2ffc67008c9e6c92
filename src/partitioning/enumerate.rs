//! Enumeration of process-grid factorizations.

use super::error::PartitionError;

/// Every `[i, j, k]` with `i·j·k == procs` and each count within its axis
/// length, ordered by `k` then `j` ascending.
pub fn enumerate_divisions(procs: usize, grid: [usize; 3]) -> Vec<[usize; 3]> {
    let mut out = Vec::new();
    for k in (1..=procs.min(grid[2])).filter(|k| procs % k == 0) {
        let rest = procs / k;
        for j in (1..=rest.min(grid[1])).filter(|j| rest % j == 0) {
            let i = rest / j;
            if i <= grid[0] {
                out.push([i, j, k]);
            }
        }
    }
    out
}

/// Checks a caller-supplied process grid.
pub fn check_fixed_division(
    division: [usize; 3],
    procs: usize,
    grid: [usize; 3],
) -> Result<(), PartitionError> {
    let fits = division.iter().zip(&grid).all(|(&d, &n)| d >= 1 && d <= n);
    if fits && division.iter().product::<usize>() == procs {
        Ok(())
    } else {
        Err(PartitionError::InvalidDivision {
            division,
            procs,
            grid,
        })
    }
}
