pub mod constants;
pub mod error;
pub mod io;
pub mod memory;
pub mod pager;
pub mod policy;
pub mod report;
pub mod simulation;
pub mod translation;

// Re-export commonly used items for convenience
pub use error::{PagerError, SimulationError, TraceError};
pub use memory::PageFlags;
pub use pager::Pager;
pub use policy::ReplacementPolicy;
pub use report::{FaultSummary, Notice};
pub use translation::{LogicalAddress, TranslationResult};
