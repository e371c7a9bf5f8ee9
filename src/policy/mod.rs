//! Victim frame selection.
//!
//! Every policy hands out never-used frames in ascending order while any are
//! left, and only then applies its own replacement rule. A policy only moves
//! its own cursor in the pager (Second-Chance also clears REFERENCED bits);
//! frame occupancy is changed by `Pager::claim_frame` alone.

pub mod fifo;
pub mod lru;
pub mod second_chance;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::pager::Pager;

/// Page replacement algorithm, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ReplacementPolicy {
    /// First-in first-out
    #[value(name = "FIFO")]
    Fifo,
    /// Second chance (clock)
    #[value(name = "SC")]
    SecondChance,
    /// Least recently used
    #[value(name = "LRU")]
    Lru,
}

impl ReplacementPolicy {
    /// Pick the frame the next `claim_frame` should use
    pub fn select_victim_frame(self, pager: &mut Pager) -> usize {
        match self {
            ReplacementPolicy::Fifo => fifo::select_victim_frame(pager),
            ReplacementPolicy::SecondChance => second_chance::select_victim_frame(pager),
            ReplacementPolicy::Lru => lru::select_victim_frame(pager),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReplacementPolicy::Fifo => "FIFO",
            ReplacementPolicy::SecondChance => "SC",
            ReplacementPolicy::Lru => "LRU",
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a valid page replacement algorithm", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for ReplacementPolicy {
    type Err = UnknownPolicy;

    /// Names are matched exactly and case-sensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIFO" => Ok(ReplacementPolicy::Fifo),
            "SC" => Ok(ReplacementPolicy::SecondChance),
            "LRU" => Ok(ReplacementPolicy::Lru),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// The lowest never-used frame, if physical memory is not full yet.
///
/// Frames are only ever claimed through this path until memory fills up, so
/// the used frames are always exactly `0..num_frames - free_frames`.
pub fn next_free_frame(pager: &Pager) -> Option<usize> {
    match pager.free_frames() {
        0 => None,
        free => Some(pager.num_frames() - free),
    }
}
