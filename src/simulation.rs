use std::io::{BufRead, Write};

use log::{debug, info};

use crate::error::{PagerError, Result, SimulationError};
use crate::io::{TraceEvent, TraceHeader, TraceReader};
use crate::pager::Pager;
use crate::policy::ReplacementPolicy;
use crate::report::{FaultSummary, Notice};
use crate::translation::TranslationResult;

/// Trace values wider than the platform's index type can never be in range
#[inline]
fn to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// A pager paired with the replacement policy chosen for the run
#[derive(Debug)]
pub struct Simulation {
    pager: Pager,
    policy: ReplacementPolicy,
}

impl Simulation {
    pub fn new(header: &TraceHeader, policy: ReplacementPolicy) -> Result<Self, PagerError> {
        let pager = Pager::from_header(header)?;
        info!(
            "simulating {} pages x {} processes over {} frames (2^{} units/page) with {}",
            header.pages, header.processes, header.frames, header.page_shift, policy
        );
        Ok(Simulation { pager, policy })
    }

    pub fn with_pager(pager: Pager, policy: ReplacementPolicy) -> Self {
        Simulation { pager, policy }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Apply one trace event. For references, returns how the reference was
    /// classified; a fault has already been resolved when this returns.
    pub fn step(&mut self, event: TraceEvent) -> Result<Option<TranslationResult>, PagerError> {
        match event {
            TraceEvent::Allocate { pid, page, access } => {
                self.pager.allocate_page(to_index(pid), to_index(page), access);
                Ok(None)
            }
            TraceEvent::Reference {
                pid,
                address,
                access,
            } => {
                let pid = to_index(pid);
                let result = self.pager.check_logical_address(pid, address, access);
                if result.is_fault() {
                    let frame = self.policy.select_victim_frame(&mut self.pager);
                    self.pager.claim_frame(pid, address, frame)?;
                }
                Ok(Some(result))
            }
        }
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.pager.drain_notices()
    }

    pub fn summary(&self) -> FaultSummary {
        self.pager.summary()
    }
}

/// Replay a whole trace, writing notices as they happen and the summary at the end.
///
/// Allocation errors go to `err`, every other notice and the summary to `out`.
/// A malformed line stops the run with everything before it already reported,
/// and no summary is written.
pub fn run<R, O, E>(
    mut trace: TraceReader<R>,
    policy: ReplacementPolicy,
    out: &mut O,
    err: &mut E,
) -> Result<FaultSummary>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    let header = trace.read_header()?;
    let mut sim = Simulation::new(&header, policy)?;

    while let Some(event) = trace.next_event()? {
        sim.step(event)?;
        for notice in sim.drain_notices() {
            let sink: &mut dyn Write = if notice.is_error() { &mut *err } else { &mut *out };
            writeln!(sink, "{}", notice).map_err(SimulationError::Output)?;
        }
    }

    let summary = sim.summary();
    writeln!(out, "{}", summary).map_err(SimulationError::Output)?;
    out.flush().map_err(SimulationError::Output)?;
    debug!("trace finished after {} lines", trace.line_number());
    Ok(summary)
}
