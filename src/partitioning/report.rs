//! Advisory diagnostics for the partition search.
//!
//! The optimizer pushes [`ReportEvent`]s into a [`DiagnosticSink`] on the
//! reporting rank only. Sinks never influence the computed partition: an
//! I/O error is logged and reporting stops for the rest of the run.

use std::io::{self, Write};

use super::candidate::Candidate;
use super::optimizer::SubdomainInfo;
use super::ranking::{Criterion, StageRecord};

#[derive(Debug, Clone, Copy)]
pub enum ReportEvent<'a> {
    /// Enumerated candidates, in enumeration order.
    Candidates {
        grid: [usize; 3],
        candidates: &'a [Candidate],
    },
    /// Aggregate scores, in enumeration order.
    Scores { candidates: &'a [Candidate] },
    /// One screening stage; `number` starts at 1.
    Stage {
        number: usize,
        record: &'a StageRecord,
        candidates: &'a [Candidate],
    },
    Winner {
        candidate: &'a Candidate,
        exhausted_ties: bool,
    },
    /// Per-rank extents, heads and face neighbors of the chosen division.
    Subdomains {
        division: [usize; 3],
        subdomains: &'a [SubdomainInfo],
    },
}

pub trait DiagnosticSink {
    fn record(&mut self, event: &ReportEvent<'_>) -> io::Result<()>;
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _event: &ReportEvent<'_>) -> io::Result<()> {
        Ok(())
    }
}

/// Column-formatted text report written to any [`Write`].
#[derive(Debug)]
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn stage_value(criterion: Criterion, c: &Candidate) -> String {
        match criterion {
            Criterion::Volume => format!("{:8.3}", c.imbalance),
            Criterion::Communication => format!("{:12}", c.surface),
            Criterion::Cubical => format!("{:12}", c.cubical),
            Criterion::VectorLength => format!("{:8}", c.sweep_length),
        }
    }
}

impl<W: Write> DiagnosticSink for TextReport<W> {
    fn record(&mut self, event: &ReportEvent<'_>) -> io::Result<()> {
        let out = &mut self.out;
        match *event {
            ReportEvent::Candidates { grid, candidates } => {
                writeln!(out, "G_size = {:5} {:5} {:5}", grid[0], grid[1], grid[2])?;
                writeln!(out, "Number of division candidates = {}", candidates.len())?;
                writeln!(out)?;
                writeln!(out, " No : div_x div_y div_z : default size(x,y,z) :   mod(x,y,z)")?;
                for c in candidates {
                    writeln!(
                        out,
                        "{:3} : {:5} {:5} {:5} :   {:5} {:5} {:5} : {:4} {:4} {:4}",
                        c.original_index,
                        c.division[0],
                        c.division[1],
                        c.division[2],
                        c.base[0],
                        c.base[1],
                        c.base[2],
                        c.remainder[0],
                        c.remainder[1],
                        c.remainder[2]
                    )?;
                }
            }
            ReportEvent::Scores { candidates } => {
                writeln!(out)?;
                writeln!(out, " No :  Balance      surface   length       cubical")?;
                for c in candidates {
                    writeln!(
                        out,
                        "{:3} : {:8.3} {:12} {:8} {:13}",
                        c.original_index, c.imbalance, c.surface, c.sweep_length, c.cubical
                    )?;
                }
            }
            ReportEvent::Stage {
                number,
                record,
                candidates,
            } => {
                writeln!(out)?;
                writeln!(out, "Screening {} by {}", number, record.criterion.label())?;
                writeln!(out, " No :        value  org_index")?;
                for (pos, &idx) in record.order.iter().enumerate() {
                    if let Some(c) = candidates.iter().find(|c| c.original_index == idx) {
                        writeln!(
                            out,
                            "{:3} : {:>12} {:10}",
                            pos,
                            Self::stage_value(record.criterion, c),
                            idx
                        )?;
                    }
                }
                writeln!(out, "Number of candidates after stage {} = {}", number, record.survivors)?;
            }
            ReportEvent::Winner {
                candidate,
                exhausted_ties,
            } => {
                writeln!(out)?;
                if exhausted_ties {
                    writeln!(out, "More than one candidate remains; choosing the first.")?;
                }
                writeln!(out, "========================")?;
                writeln!(
                    out,
                    "Global division = {} {} {} : Original index = {}",
                    candidate.division[0],
                    candidate.division[1],
                    candidate.division[2],
                    candidate.original_index
                )?;
            }
            ReportEvent::Subdomains {
                division,
                subdomains,
            } => {
                writeln!(out)?;
                writeln!(
                    out,
                    "    Rank :    sz_X    sz_Y    sz_Z :    hd_X    hd_Y    hd_Z   (division {:?})",
                    division
                )?;
                for (r, s) in subdomains.iter().enumerate() {
                    writeln!(
                        out,
                        "{:8} : {:7} {:7} {:7} : {:7} {:7} {:7}",
                        r, s.extent[0], s.extent[1], s.extent[2], s.head[0], s.head[1], s.head[2]
                    )?;
                }
                writeln!(out)?;
                writeln!(out, "    Rank :  X_minus   X_plus  Y_minus   Y_plus  Z_minus   Z_plus")?;
                for (r, s) in subdomains.iter().enumerate() {
                    let n = s.neighbors;
                    writeln!(
                        out,
                        "{:8} : {:8} {:8} {:8} {:8} {:8} {:8}",
                        r, n[0], n[1], n[2], n[3], n[4], n[5]
                    )?;
                }
            }
        }
        out.flush()
    }
}
