//! Search for the best process grid and the per-rank layout it implies.
//!
//! The pipeline is pure and identical on every rank: enumerate → score →
//! rank → topology. Only the configured reporting rank talks to the
//! diagnostic sink.

use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::enumerate::{check_fixed_division, enumerate_divisions};
use super::error::PartitionError;
use super::ranking::{RankingTrace, rank_candidates};
use super::report::{DiagnosticSink, ReportEvent};
use crate::config::{DecompositionConfig, DivisionMode, GridType};
use crate::debug_invariants::DebugInvariants;
use crate::topology::{
    DIRECTIONS, N_FACES, NO_NEIGHBOR, Neighborhood, RankId, RankTopology, linear_rank, peer,
};

/// Layout of one rank's brick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainInfo {
    pub extent: [usize; 3],
    /// Prefix sum of the extents of the bricks before this one on each axis.
    /// On node grids this counts shared boundary nodes once per brick; see
    /// [`Decomposition::origin`] for the global node index.
    pub head: [usize; 3],
    /// X−, X+, Y−, Y+, Z−, Z+; [`NO_NEIGHBOR`] on the domain boundary.
    pub neighbors: [RankId; N_FACES],
}

/// The chosen partition, identical on every rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub grid: [usize; 3],
    pub division: [usize; 3],
    pub grid_type: GridType,
    /// Indexed by rank.
    pub subdomains: Vec<SubdomainInfo>,
    pub topology: RankTopology,
    /// Enumeration index of the winning candidate.
    pub winner: usize,
    /// How many candidates were scored.
    pub candidates: usize,
    pub trace: RankingTrace,
}

/// Offsets by prefix sum along each axis: `head[c] = head[c−1] + extent[c−1]`
/// for both grid types.
pub fn head_offsets(division: [usize; 3], extents: &[[usize; 3]]) -> Vec<[usize; 3]> {
    let mut heads = vec![[0usize; 3]; extents.len()];
    for rank in 0..extents.len() {
        let c = [
            rank % division[0],
            (rank / division[0]) % division[1],
            rank / (division[0] * division[1]),
        ];
        for axis in 0..3 {
            if c[axis] > 0 {
                let mut prev = c;
                prev[axis] -= 1;
                let p = linear_rank(prev, division);
                heads[rank][axis] = heads[p][axis] + extents[p][axis];
            }
        }
    }
    heads
}

impl Decomposition {
    /// Lays out every rank of `winner`.
    pub fn from_candidate(
        winner: &Candidate,
        grid: [usize; 3],
        grid_type: GridType,
        candidates: usize,
        trace: RankingTrace,
    ) -> Result<Self, PartitionError> {
        let topology = RankTopology::new(winner.division);
        let extents: Vec<[usize; 3]> = winner.scores.iter().map(|s| s.extent).collect();
        let heads = head_offsets(winner.division, &extents);

        let mut subdomains = Vec::new();
        subdomains
            .try_reserve_exact(extents.len())
            .map_err(|_| PartitionError::Allocation {
                what: "subdomain records",
                count: extents.len(),
            })?;
        for (rank, (&extent, &head)) in extents.iter().zip(&heads).enumerate() {
            subdomains.push(SubdomainInfo {
                extent,
                head,
                neighbors: topology.face_neighbors(rank),
            });
        }

        Ok(Self {
            grid,
            division: winner.division,
            grid_type,
            subdomains,
            topology,
            winner: winner.original_index,
            candidates,
            trace,
        })
    }

    pub fn n_ranks(&self) -> usize {
        self.subdomains.len()
    }

    pub fn local(&self, rank: usize) -> Result<&SubdomainInfo, PartitionError> {
        self.subdomains
            .get(rank)
            .ok_or(PartitionError::RankOutOfRange {
                rank,
                procs: self.n_ranks(),
            })
    }

    /// All 26 neighbors of `rank`, faces first.
    pub fn neighborhood(&self, rank: usize) -> Neighborhood {
        self.topology.neighborhood(rank)
    }

    /// Global index of `rank`'s first point per axis. Equal to `head` on cell
    /// grids; on node grids each brick before this one shares its last node
    /// with the next, so that node is subtracted once per preceding brick.
    pub fn origin(&self, rank: usize) -> Result<[usize; 3], PartitionError> {
        let sd = self.local(rank)?;
        let coord = self
            .topology
            .coords_of(rank)
            .ok_or(PartitionError::RankOutOfRange {
                rank,
                procs: self.n_ranks(),
            })?;
        let shared = self.grid_type.shared_points();
        Ok(std::array::from_fn(|axis| sd.head[axis] - coord[axis] * shared))
    }

    /// Distinct global points spanned along each axis: the cell count for
    /// cell grids, the cell count plus one for node grids.
    pub fn coverage(&self) -> [usize; 3] {
        let shared = self.grid_type.shared_points();
        std::array::from_fn(|axis| {
            let sum: usize = (0..self.division[axis])
                .map(|c| {
                    let mut coord = [0; 3];
                    coord[axis] = c;
                    self.subdomains[linear_rank(coord, self.division)].extent[axis]
                })
                .sum();
            sum - shared * (self.division[axis] - 1)
        })
    }
}

impl DebugInvariants for Decomposition {
    fn validate_invariants(&self) -> Result<(), PartitionError> {
        let n = self.division.iter().product::<usize>();
        if self.subdomains.len() != n || self.topology.n_ranks() != n {
            return Err(PartitionError::Invariant(format!(
                "division {:?} implies {} ranks, found {} subdomains",
                self.division,
                n,
                self.subdomains.len()
            )));
        }
        let shared = self.grid_type.shared_points();
        let expect = self.grid.map(|g| g + shared);
        if self.coverage() != expect {
            return Err(PartitionError::Invariant(format!(
                "bricks cover {:?}, expected {:?}",
                self.coverage(),
                expect
            )));
        }
        for (rank, sd) in self.subdomains.iter().enumerate() {
            if sd.extent.iter().any(|&e| e <= shared) {
                return Err(PartitionError::Invariant(format!(
                    "rank {rank} has empty extent {:?}",
                    sd.extent
                )));
            }
            for (face, &nbr) in sd.neighbors.iter().enumerate() {
                let Some(m) = peer(nbr) else { continue };
                let dir = DIRECTIONS[face];
                let back = self.subdomains[m].neighbors[dir.opposite().index()];
                if back != rank as RankId {
                    return Err(PartitionError::Invariant(format!(
                        "rank {rank} sees {m} across face {face}, which sees {back}"
                    )));
                }
                let axis = face / 2;
                if dir.offset[axis] > 0 {
                    let next = self.subdomains[m].head[axis];
                    if sd.head[axis] + sd.extent[axis] != next {
                        return Err(PartitionError::Invariant(format!(
                            "rank {rank} ends at {} on axis {axis} but rank {m} starts at {next}",
                            sd.head[axis] + sd.extent[axis]
                        )));
                    }
                }
            }
            for axis in 0..3 {
                if sd.neighbors[2 * axis] == NO_NEIGHBOR && sd.head[axis] != 0 {
                    return Err(PartitionError::Invariant(format!(
                        "rank {rank} is first on axis {axis} but starts at {}",
                        sd.head[axis]
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Finds the process grid and builds the decomposition.
pub struct PartitionOptimizer<'s> {
    cfg: DecompositionConfig,
    sink: Option<&'s mut dyn DiagnosticSink>,
}

impl<'s> PartitionOptimizer<'s> {
    pub fn new(cfg: DecompositionConfig) -> Result<Self, PartitionError> {
        cfg.validate()?;
        Ok(Self { cfg, sink: None })
    }

    /// Attaches a diagnostic sink; it is only fed on the reporting rank.
    pub fn with_report(mut self, sink: &'s mut dyn DiagnosticSink) -> Self {
        if self.cfg.is_reporter() {
            self.sink = Some(sink);
        }
        self
    }

    pub fn config(&self) -> &DecompositionConfig {
        &self.cfg
    }

    /// Enumerated (or fixed) candidates, each fully scored, in enumeration order.
    pub fn candidates(&self) -> Result<Vec<Candidate>, PartitionError> {
        let DecompositionConfig {
            grid,
            procs,
            grid_type,
            ..
        } = self.cfg;
        let divisions = match self.cfg.mode {
            DivisionMode::Search => enumerate_divisions(procs, grid),
            DivisionMode::Fixed(division) => {
                check_fixed_division(division, procs, grid)?;
                vec![division]
            }
        };
        if divisions.is_empty() {
            return Err(PartitionError::NoCandidates { procs, grid });
        }
        log::debug!("{} division candidates for {:?}", divisions.len(), grid);

        let mut cands = Vec::new();
        cands
            .try_reserve_exact(divisions.len())
            .map_err(|_| PartitionError::Allocation {
                what: "candidates",
                count: divisions.len(),
            })?;

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            let built: Vec<Result<Candidate, PartitionError>> = divisions
                .par_iter()
                .enumerate()
                .map(|(n, &div)| Candidate::build(div, grid, grid_type, n))
                .collect();
            for cand in built {
                cands.push(cand?);
            }
        }
        #[cfg(not(feature = "rayon"))]
        for (n, &div) in divisions.iter().enumerate() {
            cands.push(Candidate::build(div, grid, grid_type, n)?);
        }

        Ok(cands)
    }

    /// Runs the whole search.
    pub fn run(mut self) -> Result<Decomposition, PartitionError> {
        let mut cands = self.candidates()?;
        let n_cands = cands.len();

        self.emit(&ReportEvent::Candidates {
            grid: self.cfg.grid,
            candidates: &cands,
        });
        self.emit(&ReportEvent::Scores { candidates: &cands });

        let trace = match self.cfg.mode {
            DivisionMode::Fixed(_) => RankingTrace::default(),
            DivisionMode::Search => {
                let trace = rank_candidates(&mut cands, self.cfg.preference);
                for (n, record) in trace.stages.iter().enumerate() {
                    self.emit(&ReportEvent::Stage {
                        number: n + 1,
                        record,
                        candidates: &cands,
                    });
                }
                trace
            }
        };

        if trace.exhausted_ties && self.cfg.is_reporter() {
            log::warn!(
                "{} candidates tied after all screening stages; taking the first",
                trace.survivors()
            );
        }
        self.emit(&ReportEvent::Winner {
            candidate: &cands[0],
            exhausted_ties: trace.exhausted_ties,
        });

        let decomp =
            Decomposition::from_candidate(&cands[0], self.cfg.grid, self.cfg.grid_type, n_cands, trace)?;
        drop(cands);
        crate::debug_invariants!(decomp, "decomposition");

        self.emit(&ReportEvent::Subdomains {
            division: decomp.division,
            subdomains: &decomp.subdomains,
        });
        if self.cfg.is_reporter() {
            log::info!(
                "global division {:?} chosen from {} candidates (original index {})",
                decomp.division,
                n_cands,
                decomp.winner
            );
        }
        Ok(decomp)
    }

    fn emit(&mut self, event: &ReportEvent<'_>) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = sink.record(event) {
            log::warn!("diagnostic report failed, disabling further output: {e}");
            self.sink = None;
        }
    }
}

/// Convenience wrapper: validate, search and lay out without diagnostics.
pub fn decompose(cfg: &DecompositionConfig) -> Result<Decomposition, PartitionError> {
    PartitionOptimizer::new(cfg.clone())?.run()
}
