use std::fmt;

use crate::constants::SUMMARY_DIVIDER;
use crate::memory::PageFlags;

/// A line of console output produced by the pager.
///
/// The pager never prints; it queues notices and the driver decides where they go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Allocation named a process outside the trace header's process count
    InvalidPid { pid: usize },
    /// Allocation named a page outside the logical address space
    InvalidPage { page: usize },
    /// Reference from a process outside the trace header's process count
    UnknownProcess { pid: usize },
    /// Reference to a page number beyond the logical address space
    NoSuchPage { pid: usize, page: u64 },
    /// Reference to a page the process never allocated
    Unallocated { pid: usize, page: usize },
    /// Reference whose access is not granted by the page
    AccessDenied {
        pid: usize,
        page: usize,
        allowed: PageFlags,
        requested: PageFlags,
    },
    Evicted { pid: usize, page: usize, frame: usize },
    WrittenToSwap,
    Discarded,
    PagedIn { pid: usize, page: usize, frame: usize },
}

impl Notice {
    /// Allocation bound violations go to standard error, everything else to standard output
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::InvalidPid { .. } | Notice::InvalidPage { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::InvalidPid { pid } => write!(f, "Invalid PID: {}", pid),
            Notice::InvalidPage { page } => write!(f, "Invalid page: {}", page),
            Notice::UnknownProcess { pid } => {
                write!(f, "Process {} does not exist", pid)
            }
            Notice::NoSuchPage { pid, page } => write!(
                f,
                "Process {} attempted to access page {} which is outside of logical memory",
                pid, page
            ),
            Notice::Unallocated { pid, page } => write!(
                f,
                "Process {} attempted to access page {} which has not been allocated",
                pid, page
            ),
            Notice::AccessDenied {
                pid,
                page,
                allowed,
                requested,
            } => write!(
                f,
                "Process {} attempted to {} page {} but that page can only be {}",
                pid,
                requested.describe_requested(),
                page,
                allowed.describe_allowed()
            ),
            Notice::Evicted { pid, page, frame } => write!(
                f,
                "Page {} of process {} is selected to be paged out of frame {}",
                page, pid, frame
            ),
            Notice::WrittenToSwap => {
                write!(f, "It has been modified so it will be written to the swap space")
            }
            Notice::Discarded => write!(f, "It has not been modified so it will be discarded"),
            Notice::PagedIn { pid, page, frame } => write!(
                f,
                "Page {} of process {} was paged into frame {}",
                page, pid, frame
            ),
        }
    }
}

/// Aggregate fault statistics for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultSummary {
    pub references: u64,
    pub faults: u64,
    pub discarded: u64,
    pub written: u64,
}

impl FaultSummary {
    /// Faults per reference. A run without references reports 0.
    pub fn fault_rate(&self) -> f64 {
        if self.references == 0 {
            return 0.0;
        }
        self.faults as f64 / self.references as f64
    }
}

impl fmt::Display for FaultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", SUMMARY_DIVIDER)?;
        writeln!(f, "Page Fault Rate: {:.6}", self.fault_rate())?;
        writeln!(f, "Total Page Faults: {}", self.faults)?;
        writeln!(
            f,
            "Total Page Faults Evicting and Discarding a Frame: {}",
            self.discarded
        )?;
        write!(
            f,
            "Total Page Faults Evicting and Writing a Frame: {}",
            self.written
        )
    }
}
