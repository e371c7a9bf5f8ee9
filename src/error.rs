use std::io;

use thiserror::Error;

/// Errors raised by the pager's own bookkeeping
#[derive(Error, Debug)]
pub enum PagerError {
    #[error("physical memory must have at least one frame")]
    NoFrames,

    #[error("page size of 2^{0} does not fit in a 64-bit logical address")]
    PageShiftTooLarge(u64),

    #[error("unable to allocate the page tables and frame table")]
    OutOfMemory,

    #[error("Invalid PID: {0}")]
    InvalidPid(usize),

    #[error("Invalid page: {0}")]
    InvalidPage(usize),

    #[error("frame {frame} is out of range (physical memory has {frames} frames)")]
    FrameOutOfRange { frame: usize, frames: usize },

    #[error("page {page} of process {pid} is already resident in frame {frame}")]
    AlreadyResident { pid: usize, page: usize, frame: usize },
}

/// Errors raised while reading a trace
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] io::Error),

    #[error("invalid first line of data, trace is empty")]
    MissingHeader,

    #[error(
        "invalid first line of data, must be 4 base-10 unsigned integers separated by whitespace: {text}"
    )]
    MalformedHeader { line: usize, text: String },

    #[error("invalid data on line {line}: {text}")]
    MalformedLine { line: usize, text: String },
}

/// Errors that abort a simulation run
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Pager(#[from] PagerError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("failed to write simulation output: {0}")]
    Output(#[source] io::Error),
}

pub type Result<T, E = SimulationError> = std::result::Result<T, E>;
