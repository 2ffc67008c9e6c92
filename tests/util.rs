#![allow(dead_code)]
use std::time::Duration;

use brick_decomp::algs::communicator::LocalComm;
use brick_decomp::algs::exchange::FieldLayout;
use brick_decomp::partitioning::Decomposition;

/// Value never produced by [`global_value`]; marks untouched points.
pub const UNSET: f64 = -1.0;

/// Runs `body` once per rank of an in-process group, each on its own thread,
/// and returns the results in rank order.
pub fn run_ranks<R, F>(n: usize, timeout: Option<Duration>, body: F) -> Vec<R>
where
    R: Send,
    F: Fn(LocalComm) -> R + Sync,
{
    let comms = LocalComm::group(n);
    std::thread::scope(|s| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|c| {
                let c = match timeout {
                    Some(t) => c.with_timeout(t),
                    None => c,
                };
                let body = &body;
                s.spawn(move || body(c))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}

/// Distinct value for component `c` at global point `g`.
pub fn global_value(c: usize, g: [isize; 3]) -> f64 {
    (c as isize * 1_000_000 + g[2] * 10_000 + g[1] * 100 + g[0]) as f64
}

/// Field with owned points set from their global position and ghosts unset.
pub fn seeded_field(layout: &FieldLayout, origin: [usize; 3]) -> Vec<f64> {
    let mut f = vec![UNSET; layout.len()];
    let [nx, ny, nz] = layout.extent.map(|n| n as isize);
    for c in 0..layout.components {
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let g = global(origin, [i, j, k]);
                    f[layout.index(c, i, j, k)] = global_value(c, g);
                }
            }
        }
    }
    f
}

pub fn global(origin: [usize; 3], local: [isize; 3]) -> [isize; 3] {
    std::array::from_fn(|a| origin[a] as isize + local[a])
}

/// Checks every ghost point within `width` of the brick: points that map
/// inside the global grid and are reachable through the exchanged
/// directions hold the owner's value, all others are still [`UNSET`].
pub fn assert_ghosts(
    decomp: &Decomposition,
    rank: usize,
    layout: &FieldLayout,
    field: &[f64],
    width: usize,
    diagonal: bool,
) {
    let origin = decomp.origin(rank).expect("rank in range");
    let global_extent = decomp.coverage();
    let n = layout.extent.map(|n| n as isize);
    let g = layout.ghost as isize;
    let w = width as isize;
    for c in 0..layout.components {
        for k in -g..n[2] + g {
            for j in -g..n[1] + g {
                for i in -g..n[0] + g {
                    let local = [i, j, k];
                    let outside: Vec<usize> = (0..3)
                        .filter(|&a| local[a] < 0 || local[a] >= n[a])
                        .collect();
                    if outside.is_empty() {
                        continue;
                    }
                    let pos = global(origin, local);
                    let within_width = outside
                        .iter()
                        .all(|&a| local[a] >= -w && local[a] < n[a] + w);
                    let in_grid = (0..3).all(|a| pos[a] >= 0 && pos[a] < global_extent[a] as isize);
                    let routed = outside.len() == 1 || diagonal;
                    let want = if within_width && in_grid && routed {
                        global_value(c, pos)
                    } else {
                        UNSET
                    };
                    let got = field[layout.index(c, i, j, k)];
                    assert_eq!(
                        got, want,
                        "rank {rank} component {c} ghost {local:?} (global {pos:?})"
                    );
                }
            }
        }
    }
}
