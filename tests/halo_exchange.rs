mod util;
use util::*;

use brick_decomp::prelude::*;

fn decomposition(grid: [usize; 3], procs: usize, grid_type: GridType) -> Decomposition {
    decompose(&DecompositionConfig {
        grid_type,
        ..DecompositionConfig::new(grid, procs, 0)
    })
    .unwrap()
}

/// Decomposes, exchanges once on every rank and checks all ghosts.
fn exchange_and_check(decomp: &Decomposition, cfg: HaloConfig, width: usize) {
    run_ranks(decomp.n_ranks(), None, |comm| {
        let rank = comm.rank();
        let mut hx = HaloExchange::<f64, _>::from_decomposition(comm, decomp, &cfg).unwrap();
        let layout = *hx.layout();
        let mut field = seeded_field(&layout, decomp.origin(rank).unwrap());
        hx.exchange(&mut field, width).unwrap();
        assert_eq!(hx.state(), ExchangeState::Idle);
        assert_ghosts(decomp, rank, &layout, &field, width, cfg.diagonal);
    });
}

#[test]
fn four_ranks_face_exchange() {
    let d = decomposition([8, 8, 8], 4, GridType::Cell);
    assert_eq!(d.division, [1, 2, 2]);
    exchange_and_check(&d, HaloConfig::default(), 1);
}

#[test]
fn eight_ranks_full_neighborhood_two_components() {
    let d = decomposition([6, 6, 6], 8, GridType::Cell);
    assert_eq!(d.division, [2, 2, 2]);
    let cfg = HaloConfig {
        ghost_width: 2,
        components: 2,
        diagonal: true,
        ..Default::default()
    };
    exchange_and_check(&d, cfg, 2);
}

#[test]
fn uneven_cell_grid_with_diagonals() {
    let d = decomposition([10, 7, 5], 6, GridType::Cell);
    let cfg = HaloConfig {
        diagonal: true,
        ..Default::default()
    };
    exchange_and_check(&d, cfg, 1);
}

#[test]
fn node_grid_skips_shared_plane() {
    let d = decomposition([8, 6, 6], 4, GridType::Node);
    let cfg = HaloConfig {
        diagonal: true,
        ..Default::default()
    };
    exchange_and_check(&d, cfg, 1);
}

#[test]
fn node_grid_two_layers() {
    let d = decomposition([12, 4, 4], 3, GridType::Node);
    let cfg = HaloConfig {
        ghost_width: 2,
        ..Default::default()
    };
    exchange_and_check(&d, cfg, 2);
}

#[test]
fn narrower_width_leaves_outer_ghosts() {
    let d = decomposition([8, 8, 4], 2, GridType::Cell);
    let cfg = HaloConfig {
        ghost_width: 3,
        diagonal: true,
        ..Default::default()
    };
    exchange_and_check(&d, cfg, 1);
}

#[test]
fn plan_is_reused_across_timesteps() {
    let d = decomposition([6, 6, 2], 4, GridType::Cell);
    let cfg = HaloConfig::default();
    run_ranks(d.n_ranks(), None, |comm| {
        let rank = comm.rank();
        let mut hx = HaloExchange::<f64, _>::from_decomposition(comm, &d, &cfg).unwrap();
        let layout = *hx.layout();
        let origin = d.origin(rank).unwrap();
        for _step in 0..3 {
            let mut field = seeded_field(&layout, origin);
            hx.initiate(&field, 1).unwrap();
            assert_eq!(hx.state(), ExchangeState::InFlight);
            hx.complete(&mut field).unwrap();
            assert_ghosts(&d, rank, &layout, &field, 1, false);
        }
    });
}

#[test]
fn single_rank_has_nothing_to_exchange() {
    let d = decomposition([5, 5, 5], 1, GridType::Node);
    let cfg = HaloConfig {
        diagonal: true,
        ..Default::default()
    };
    let mut hx = HaloExchange::<f64, _>::from_decomposition(NoComm, &d, &cfg).unwrap();
    let layout = *hx.layout();
    let mut field = seeded_field(&layout, [0, 0, 0]);
    hx.exchange(&mut field, 1).unwrap();
    assert_ghosts(&d, 0, &layout, &field, 1, true);
}

#[test]
fn integer_fields_are_exchanged_bytewise() {
    let d = decomposition([4, 2, 2], 2, GridType::Cell);
    assert_eq!(d.division, [2, 1, 1]);
    let cfg = HaloConfig::default();
    let ghosts = run_ranks(2, None, |comm| {
        let rank = comm.rank();
        let mut hx = HaloExchange::<u16, _>::from_decomposition(comm, &d, &cfg).unwrap();
        let layout = *hx.layout();
        let mut field = vec![0u16; layout.len()];
        for k in 0..2 {
            for j in 0..2 {
                for i in 0..2 {
                    field[layout.index(0, i, j, k)] = (rank as u16 + 1) * 100 + (j * 10 + k) as u16;
                }
            }
        }
        hx.exchange(&mut field, 1).unwrap();
        let ghost_i = if rank == 0 { 2 } else { -1 };
        field[layout.index(0, ghost_i, 1, 1)]
    });
    assert_eq!(ghosts, vec![211, 111]);
}

#[test]
fn mismatched_layout_is_rejected() {
    let d = decomposition([8, 8, 8], 4, GridType::Cell);
    let err = HaloExchange::<f64, _>::from_decomposition(NoComm, &d, &HaloConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, ExchangeError::InvalidLayout(_)));
}
