//! Four-stage lexicographic screening of candidates.
//!
//! Each stage stable-sorts the current survivors by one criterion and keeps
//! the prefix tied with the best value. Stages run only while more than one
//! candidate remains. If ties survive all four stages the first candidate is
//! taken as-is and `exhausted_ties` is set.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use crate::config::RankingPreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    /// `sc_vol` ascending.
    Volume,
    /// `sc_com` ascending.
    Communication,
    /// `sc_hex` ascending.
    Cubical,
    /// `sc_len` descending.
    VectorLength,
}

impl Criterion {
    /// The four stages in the order a preference applies them.
    pub fn pipeline(preference: RankingPreference) -> [Criterion; 4] {
        match preference {
            RankingPreference::Cubical => [
                Criterion::Volume,
                Criterion::Communication,
                Criterion::Cubical,
                Criterion::VectorLength,
            ],
            RankingPreference::VectorLength => [
                Criterion::Volume,
                Criterion::Communication,
                Criterion::VectorLength,
                Criterion::Cubical,
            ],
        }
    }

    /// Better candidates order first.
    pub fn compare(self, a: &Candidate, b: &Candidate) -> Ordering {
        match self {
            Criterion::Volume => a.imbalance.total_cmp(&b.imbalance),
            Criterion::Communication => a.surface.cmp(&b.surface),
            Criterion::Cubical => a.cubical.cmp(&b.cubical),
            Criterion::VectorLength => b.sweep_length.cmp(&a.sweep_length),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Criterion::Volume => "volume balance",
            Criterion::Communication => "amount of communication",
            Criterion::Cubical => "cubical shape",
            Criterion::VectorLength => "vector length in X",
        }
    }
}

/// Outcome of one executed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub criterion: Criterion,
    /// Size of the tied prefix kept by this stage.
    pub survivors: usize,
    /// `original_index` of every candidate the stage sorted, in sorted order.
    pub order: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingTrace {
    pub stages: Vec<StageRecord>,
    /// More than one candidate survived the last stage.
    pub exhausted_ties: bool,
}

impl RankingTrace {
    /// Candidates still in the running after the last executed stage.
    pub fn survivors(&self) -> usize {
        self.stages.last().map_or(0, |s| s.survivors)
    }
}

/// Stable-sorts `cands` by `criterion` and returns the length of the prefix
/// tied with the first element.
pub fn screen(cands: &mut [Candidate], criterion: Criterion) -> usize {
    cands.sort_by(|a, b| criterion.compare(a, b));
    match cands.split_first() {
        None => 0,
        Some((best, rest)) => {
            1 + rest
                .iter()
                .take_while(|c| criterion.compare(best, c) == Ordering::Equal)
                .count()
        }
    }
}

/// Runs the screening pipeline in place; the winner ends up at `cands[0]`.
pub fn rank_candidates(cands: &mut [Candidate], preference: RankingPreference) -> RankingTrace {
    let mut trace = RankingTrace::default();
    let mut live = cands.len();
    for criterion in Criterion::pipeline(preference) {
        if live <= 1 && !trace.stages.is_empty() {
            break;
        }
        let slice = &mut cands[..live];
        let survivors = screen(slice, criterion);
        log::debug!(
            "screening by {}: {} of {} candidates remain",
            criterion.label(),
            survivors,
            live
        );
        trace.stages.push(StageRecord {
            criterion,
            survivors,
            order: slice.iter().map(|c| c.original_index).collect(),
        });
        live = survivors;
    }
    trace.exhausted_ties = live > 1;
    trace
}
