use crate::constants::ADDRESS_BITS;

/// A logical address split into its page number and offset for a given page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalAddress {
    pub raw: u64,
    pub page: u64,
    pub offset: u64,
}

impl LogicalAddress {
    /// Decompose a raw address for pages of `2^page_shift` addressable units
    pub fn from_raw(raw: u64, page_shift: u32) -> Self {
        debug_assert!(page_shift < ADDRESS_BITS);
        let page = raw >> page_shift;
        let offset = raw & ((1u64 << page_shift) - 1);

        LogicalAddress { raw, page, offset }
    }

    /// The page number as a table index, `None` if it does not fit in `usize`
    #[inline]
    pub fn page_index(&self) -> Option<usize> {
        usize::try_from(self.page).ok()
    }
}

impl std::fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LA({:#x}) = (page={}, offset={})",
            self.raw, self.page, self.offset
        )
    }
}

/// Outcome of checking a memory reference against the page tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationResult {
    /// Privilege violation, unallocated page, or a page outside the address space
    InvalidPage,
    /// The page is resident; the reference completed
    ValidPage,
    /// The page is allocated but not resident; a frame must be claimed
    PageFault,
}

impl TranslationResult {
    /// Status code in the classic -1 / 0 / 1 convention
    pub fn to_code(&self) -> i32 {
        match self {
            TranslationResult::InvalidPage => -1,
            TranslationResult::ValidPage => 0,
            TranslationResult::PageFault => 1,
        }
    }

    #[inline]
    pub fn is_fault(&self) -> bool {
        matches!(self, TranslationResult::PageFault)
    }
}
