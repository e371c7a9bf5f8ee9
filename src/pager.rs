use log::{debug, trace};

use crate::constants::ADDRESS_BITS;
use crate::error::PagerError;
use crate::io::TraceHeader;
use crate::memory::{Frame, PageFlags, PageTableEntry, PageTables, Resident};
use crate::report::{FaultSummary, Notice};
use crate::translation::{LogicalAddress, TranslationResult};

/// Rotating cursors owned by the replacement policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicyCursors {
    /// Last frame handed out by FIFO once memory is full
    pub fifo: usize,
    /// Where the Second-Chance clock hand starts its next sweep
    pub second_chance: usize,
}

/// The whole simulated memory system: frame table, page tables, counters.
///
/// One pager per run. Every operation takes it by exclusive reference.
#[derive(Debug)]
pub struct Pager {
    num_pages: usize,
    num_frames: usize,
    page_shift: u32,
    free_frames: usize,

    frames: Vec<Frame>,
    page_tables: PageTables,

    reference_count: u64,
    fault_count: u64,
    discarded_count: u64,
    written_count: u64,

    pub(crate) cursors: PolicyCursors,
    notices: Vec<Notice>,
}

impl Pager {
    /// Create a pager for `num_pages` logical pages per process, `num_frames`
    /// physical frames, pages of `2^page_shift` units and `num_procs` processes.
    pub fn new(
        num_pages: usize,
        num_frames: usize,
        page_shift: u32,
        num_procs: usize,
    ) -> Result<Self, PagerError> {
        if num_frames == 0 {
            return Err(PagerError::NoFrames);
        }
        if page_shift >= ADDRESS_BITS {
            return Err(PagerError::PageShiftTooLarge(page_shift as u64));
        }

        let mut frames = Vec::new();
        frames
            .try_reserve_exact(num_frames)
            .map_err(|_| PagerError::OutOfMemory)?;
        frames.resize(num_frames, Frame::default());
        let page_tables = PageTables::new(num_procs, num_pages)?;

        debug!(
            "pager ready: {} pages x {} processes, {} frames, page size 2^{}",
            num_pages, num_procs, num_frames, page_shift
        );

        Ok(Pager {
            num_pages,
            num_frames,
            page_shift,
            free_frames: num_frames,
            frames,
            page_tables,
            reference_count: 0,
            fault_count: 0,
            discarded_count: 0,
            written_count: 0,
            cursors: PolicyCursors::default(),
            notices: Vec::new(),
        })
    }

    /// Create a pager from the geometry in a trace header
    pub fn from_header(header: &TraceHeader) -> Result<Self, PagerError> {
        let page_shift = u32::try_from(header.page_shift)
            .ok()
            .filter(|&shift| shift < ADDRESS_BITS)
            .ok_or(PagerError::PageShiftTooLarge(header.page_shift))?;
        let num_pages = usize::try_from(header.pages).map_err(|_| PagerError::OutOfMemory)?;
        let num_frames = usize::try_from(header.frames).map_err(|_| PagerError::OutOfMemory)?;
        let num_procs = usize::try_from(header.processes).map_err(|_| PagerError::OutOfMemory)?;

        Self::new(num_pages, num_frames, page_shift, num_procs)
    }

    // =========================================================================
    // Page Table Store
    // =========================================================================

    /// Grant `access` on page `page` of process `pid`.
    ///
    /// Out-of-range requests queue a notice and change nothing.
    pub fn allocate_page(&mut self, pid: usize, page: usize, access: PageFlags) {
        match self.page_tables.allocate(pid, page, access) {
            Ok(()) => trace!("allocated page {} of process {} as {}", page, pid, access),
            Err(PagerError::InvalidPid(pid)) => {
                debug!("allocation for unknown process {}", pid);
                self.notices.push(Notice::InvalidPid { pid });
            }
            Err(e) => {
                debug!("allocation rejected: {}", e);
                self.notices.push(Notice::InvalidPage { page });
            }
        }
    }

    // =========================================================================
    // Address translation / fault detection
    // =========================================================================

    /// Check a reference of `access` to `logical_addr` by process `pid`.
    ///
    /// A valid reference sets REFERENCED (and DIRTY for writes) and counts
    /// towards the reference total whether or not the page is resident.
    pub fn check_logical_address(
        &mut self,
        pid: usize,
        logical_addr: u64,
        access: PageFlags,
    ) -> TranslationResult {
        let la = LogicalAddress::from_raw(logical_addr, self.page_shift);

        if pid >= self.page_tables.processes() {
            debug!("reference from unknown process {}", pid);
            self.notices.push(Notice::UnknownProcess { pid });
            return TranslationResult::InvalidPage;
        }
        let page = match la.page_index().filter(|&p| p < self.num_pages) {
            Some(page) => page,
            None => {
                debug!("process {} referenced {} beyond logical memory", pid, la);
                self.notices.push(Notice::NoSuchPage { pid, page: la.page });
                return TranslationResult::InvalidPage;
            }
        };

        let Some(entry) = self.page_tables.get_mut(pid, page) else {
            return TranslationResult::InvalidPage;
        };

        // an entry never allocated has no access bits, so report it as such
        // rather than as a privilege violation
        if !entry.is_allocated() {
            self.notices.push(Notice::Unallocated { pid, page });
            return TranslationResult::InvalidPage;
        }

        let requested = access.access();
        if requested.is_empty() || !entry.flags.contains(requested) {
            self.notices.push(Notice::AccessDenied {
                pid,
                page,
                allowed: entry.flags.access(),
                requested,
            });
            return TranslationResult::InvalidPage;
        }

        entry.touch(requested);
        self.reference_count += 1;

        if !entry.is_valid() {
            self.fault_count += 1;
            debug!(
                "page fault #{}: process {} page {} ({})",
                self.fault_count, pid, page, requested
            );
            return TranslationResult::PageFault;
        }

        let frame = entry.frame;
        self.frames[frame].last_touched = self.reference_count;
        trace!("hit: process {} page {} in frame {}", pid, page, frame);
        TranslationResult::ValidPage
    }

    // =========================================================================
    // Frame claim / eviction
    // =========================================================================

    /// Bring the page holding `logical_addr` of process `pid` into frame `frame`,
    /// evicting whatever lives there now.
    pub fn claim_frame(&mut self, pid: usize, logical_addr: u64, frame: usize) -> Result<(), PagerError> {
        let la = LogicalAddress::from_raw(logical_addr, self.page_shift);
        if frame >= self.num_frames {
            return Err(PagerError::FrameOutOfRange {
                frame,
                frames: self.num_frames,
            });
        }
        if pid >= self.page_tables.processes() {
            return Err(PagerError::InvalidPid(pid));
        }
        let page = la
            .page_index()
            .filter(|&p| p < self.num_pages)
            .ok_or(PagerError::InvalidPage(la.page_index().unwrap_or(usize::MAX)))?;

        if let Some(entry) = self.page_tables.get(pid, page) {
            if entry.is_valid() && entry.frame != frame {
                return Err(PagerError::AlreadyResident {
                    pid,
                    page,
                    frame: entry.frame,
                });
            }
        }

        match self.frames[frame].resident {
            Some(old) => self.evict(frame, old),
            None => self.free_frames -= 1,
        }

        self.notices.push(Notice::PagedIn { pid, page, frame });
        debug!("process {} page {} -> frame {}", pid, page, frame);

        let slot = &mut self.frames[frame];
        slot.resident = Some(Resident { pid, page });
        slot.last_touched = self.reference_count;

        if let Some(entry) = self.page_tables.get_mut(pid, page) {
            entry.frame = frame;
            entry.flags |= PageFlags::VALID;
        }
        Ok(())
    }

    fn evict(&mut self, frame: usize, old: Resident) {
        self.notices.push(Notice::Evicted {
            pid: old.pid,
            page: old.page,
            frame,
        });

        let Some(entry) = self.page_tables.get_mut(old.pid, old.page) else {
            return;
        };
        if entry.is_dirty() {
            self.written_count += 1;
            self.notices.push(Notice::WrittenToSwap);
            debug!("evict frame {}: process {} page {} written", frame, old.pid, old.page);
        } else {
            self.discarded_count += 1;
            self.notices.push(Notice::Discarded);
            debug!("evict frame {}: process {} page {} discarded", frame, old.pid, old.page);
        }
        entry.invalidate();
    }

    // =========================================================================
    // Reporting and inspection
    // =========================================================================

    pub fn summary(&self) -> FaultSummary {
        FaultSummary {
            references: self.reference_count,
            faults: self.fault_count,
            discarded: self.discarded_count,
            written: self.written_count,
        }
    }

    /// Take every notice queued since the last call, oldest first
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    #[inline]
    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    #[inline]
    pub fn num_processes(&self) -> usize {
        self.page_tables.processes()
    }

    #[inline]
    pub fn page_shift(&self) -> u32 {
        self.page_shift
    }

    #[inline]
    pub fn free_frames(&self) -> usize {
        self.free_frames
    }

    #[inline]
    pub fn reference_count(&self) -> u64 {
        self.reference_count
    }

    pub fn cursors(&self) -> PolicyCursors {
        self.cursors
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, frame: usize) -> Option<&Frame> {
        self.frames.get(frame)
    }

    pub fn page_entry(&self, pid: usize, page: usize) -> Option<&PageTableEntry> {
        self.page_tables.get(pid, page)
    }

    /// Page table entry of whatever page lives in `frame`
    pub fn resident_entry(&self, frame: usize) -> Option<&PageTableEntry> {
        let resident = self.frames.get(frame)?.resident?;
        self.page_tables.get(resident.pid, resident.page)
    }

    pub(crate) fn resident_entry_mut(&mut self, frame: usize) -> Option<&mut PageTableEntry> {
        let resident = self.frames.get(frame)?.resident?;
        self.page_tables.get_mut(resident.pid, resident.page)
    }
}
