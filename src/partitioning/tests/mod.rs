use super::*;

use crate::config::{DecompositionConfig, DivisionMode, GridType};
use crate::topology::NO_NEIGHBOR;

#[test]
fn four_ranks_on_cube() {
    let d = decompose(&DecompositionConfig::new([8, 8, 8], 4, 0)).unwrap();
    // [2,2,1], [2,1,2] and [1,2,2] tie on balance, surface and shape;
    // the sweep-length stage keeps the one that leaves X whole.
    assert_eq!(d.division, [1, 2, 2]);
    assert_eq!(d.winner, 4);
    assert!(!d.trace.exhausted_ties);
    let survivors: Vec<_> = d.trace.stages.iter().map(|s| s.survivors).collect();
    assert_eq!(survivors, vec![6, 3, 3, 1]);
    assert_eq!(d.coverage(), [8, 8, 8]);
    for sd in &d.subdomains {
        assert_eq!(sd.extent, [8, 4, 4]);
    }
    assert_eq!(d.subdomains[0].neighbors, [NO_NEIGHBOR, NO_NEIGHBOR, NO_NEIGHBOR, 1, NO_NEIGHBOR, 2]);
    assert_eq!(d.subdomains[3].neighbors, [NO_NEIGHBOR, NO_NEIGHBOR, 2, NO_NEIGHBOR, 1, NO_NEIGHBOR]);
    assert_eq!(d.subdomains[3].head, [0, 4, 4]);
}

#[test]
fn vector_length_preference_reorders_stages() {
    let d = decompose(&DecompositionConfig {
        preference: crate::config::RankingPreference::VectorLength,
        ..DecompositionConfig::new([8, 8, 8], 4, 0)
    })
    .unwrap();
    assert_eq!(d.division, [1, 2, 2]);
    assert_eq!(d.trace.stages.len(), 3);
    assert_eq!(d.trace.stages[2].criterion, Criterion::VectorLength);
    assert_eq!(d.trace.stages[2].order, vec![4, 1, 3]);
}

#[test]
fn uneven_grid_balances_volume_first() {
    let d = decompose(&DecompositionConfig::new([10, 4, 4], 2, 0)).unwrap();
    // [2,1,1] splits 10 evenly; [1,2,1] and [1,1,2] also do, but cut a larger face.
    assert_eq!(d.division, [2, 1, 1]);
    assert_eq!(d.trace.stages[0].survivors, 3);
    assert_eq!(d.trace.stages[1].survivors, 1);
}

#[test]
fn node_grid_shares_boundary_points() {
    let d = decompose(&DecompositionConfig {
        grid_type: GridType::Node,
        mode: DivisionMode::Fixed([3, 1, 1]),
        ..DecompositionConfig::new([10, 2, 2], 3, 0)
    })
    .unwrap();
    let ext: Vec<_> = d.subdomains.iter().map(|s| s.extent[0]).collect();
    let heads: Vec<_> = d.subdomains.iter().map(|s| s.head[0]).collect();
    assert_eq!(ext, vec![5, 4, 4]);
    assert_eq!(heads, vec![0, 5, 9]);
    for r in 1..3 {
        assert_eq!(heads[r], heads[r - 1] + ext[r - 1]);
    }
    let origins: Vec<_> = (0..3).map(|r| d.origin(r).unwrap()[0]).collect();
    assert_eq!(origins, vec![0, 4, 7]);
    assert_eq!(d.coverage(), [11, 3, 3]);
}
