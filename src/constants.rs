// access bits, set once at allocation time
pub const READ: u8 = 0x01;
pub const WRITE: u8 = 0x02;
pub const EXECUTE: u8 = 0x04;

// status bits maintained by the pager
pub const ALLOCATED: u8 = 0x08;
pub const DIRTY: u8 = 0x10;
pub const VALID: u8 = 0x20;
pub const REFERENCED: u8 = 0x40;

/// Logical addresses are 64 bits wide, so the page-size exponent must be below this.
pub const ADDRESS_BITS: u32 = u64::BITS;

pub const SUMMARY_DIVIDER: &str = "----------------------------------------";

pub const POLICY_NAMES: [&str; 3] = ["FIFO", "SC", "LRU"];
