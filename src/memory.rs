use std::fmt;

use bitflags::bitflags;

use crate::constants;
use crate::error::PagerError;

bitflags! {
    /// Flags carried by every page table entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct PageFlags: u8 {
        const READ = constants::READ;
        const WRITE = constants::WRITE;
        const EXECUTE = constants::EXECUTE;
        const ALLOCATED = constants::ALLOCATED;
        const DIRTY = constants::DIRTY;
        const VALID = constants::VALID;
        const REFERENCED = constants::REFERENCED;

        /// The privilege bits a process can be granted
        const ACCESS = constants::READ | constants::WRITE | constants::EXECUTE;
        /// The bits that describe residency and are dropped on eviction
        const RESIDENCY = constants::VALID | constants::REFERENCED | constants::DIRTY;
    }
}

impl PageFlags {
    /// Only the READ/WRITE/EXECUTE part of the flags
    #[inline]
    pub fn access(self) -> PageFlags {
        self & PageFlags::ACCESS
    }

    /// Describe the access bits as the verbs used in denial messages,
    /// e.g. "read or written".
    pub fn describe_allowed(self) -> String {
        let mut verbs = Vec::new();
        if self.contains(PageFlags::READ) {
            verbs.push("read");
        }
        if self.contains(PageFlags::WRITE) {
            verbs.push("written");
        }
        if self.contains(PageFlags::EXECUTE) {
            verbs.push("executed");
        }
        verbs.join(" or ")
    }

    /// Describe a requested access, e.g. "read from" or "write to"
    pub fn describe_requested(self) -> &'static str {
        if self.contains(PageFlags::READ) {
            "read from"
        } else if self.contains(PageFlags::WRITE) {
            "write to"
        } else if self.contains(PageFlags::EXECUTE) {
            "execute"
        } else {
            "access"
        }
    }
}

impl fmt::Display for PageFlags {
    /// Prints the access bits in `rwx` order, `-` for missing bits
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |flag: PageFlags, c: char| if self.contains(flag) { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            bit(PageFlags::READ, 'r'),
            bit(PageFlags::WRITE, 'w'),
            bit(PageFlags::EXECUTE, 'x')
        )
    }
}

/// One page of one process. `frame` is only meaningful while VALID is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTableEntry {
    pub flags: PageFlags,
    pub frame: usize,
}

impl PageTableEntry {
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.flags.contains(PageFlags::ALLOCATED)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.flags.contains(PageFlags::VALID)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.flags.contains(PageFlags::DIRTY)
    }

    #[inline]
    pub fn is_referenced(&self) -> bool {
        self.flags.contains(PageFlags::REFERENCED)
    }

    /// Record an access: REFERENCED always, DIRTY when the access writes
    pub fn touch(&mut self, access: PageFlags) {
        self.flags |= PageFlags::REFERENCED;
        if access.contains(PageFlags::WRITE) {
            self.flags |= PageFlags::DIRTY;
        }
    }

    /// Drop residency. Access rights and ALLOCATED survive.
    pub fn invalidate(&mut self) {
        self.flags.remove(PageFlags::RESIDENCY);
    }
}

/// The (process, page) pair living in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resident {
    pub pid: usize,
    pub page: usize,
}

/// Physical frame descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub resident: Option<Resident>,
    /// Reference counter value at the last touch or claim, used by LRU
    pub last_touched: u64,
}

impl Frame {
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.resident.is_some()
    }
}

/// Per-process page tables, sized once and never freed during a run
#[derive(Debug)]
pub struct PageTables {
    tables: Vec<Vec<PageTableEntry>>,
    pages_per_process: usize,
}

impl PageTables {
    /// Allocate `processes` tables of `pages_per_process` zeroed entries each.
    ///
    /// Allocation failure is reported instead of aborting, since the sizes come
    /// straight from an untrusted trace header.
    pub fn new(processes: usize, pages_per_process: usize) -> Result<Self, PagerError> {
        let mut tables = Vec::new();
        tables
            .try_reserve_exact(processes)
            .map_err(|_| PagerError::OutOfMemory)?;
        for _ in 0..processes {
            let mut table = Vec::new();
            table
                .try_reserve_exact(pages_per_process)
                .map_err(|_| PagerError::OutOfMemory)?;
            table.resize(pages_per_process, PageTableEntry::default());
            tables.push(table);
        }
        Ok(PageTables {
            tables,
            pages_per_process,
        })
    }

    #[inline]
    pub fn processes(&self) -> usize {
        self.tables.len()
    }

    #[inline]
    pub fn pages_per_process(&self) -> usize {
        self.pages_per_process
    }

    /// Set the access bits of an entry and mark it ALLOCATED.
    ///
    /// Re-allocating only overwrites the access bits; residency flags and the
    /// frame binding are left untouched.
    pub fn allocate(&mut self, pid: usize, page: usize, access: PageFlags) -> Result<(), PagerError> {
        if pid >= self.processes() {
            return Err(PagerError::InvalidPid(pid));
        }
        if page >= self.pages_per_process {
            return Err(PagerError::InvalidPage(page));
        }
        let entry = &mut self.tables[pid][page];
        entry.flags = (entry.flags - PageFlags::ACCESS) | access.access() | PageFlags::ALLOCATED;
        Ok(())
    }

    pub fn get(&self, pid: usize, page: usize) -> Option<&PageTableEntry> {
        self.tables.get(pid)?.get(page)
    }

    pub fn get_mut(&mut self, pid: usize, page: usize) -> Option<&mut PageTableEntry> {
        self.tables.get_mut(pid)?.get_mut(page)
    }
}
