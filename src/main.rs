//! Pager Simulator - Main Entry Point
//!
//! Usage: pager-sim [OPTIONS] <trace_file> <POLICY>
//!
//! Arguments:
//!   trace_file - Trace of page allocations and memory references
//!   POLICY     - Page replacement algorithm: FIFO, SC or LRU
//!
//! Options:
//!   -v, --verbose  Log simulation details to stderr (repeat for more)
//!   -h, --help     Print help information

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{LevelFilter, info};

use pager_sim::ReplacementPolicy;
use pager_sim::constants::POLICY_NAMES;
use pager_sim::io::TraceReader;
use pager_sim::simulation;

/// Command-line configuration
#[derive(Parser, Debug)]
#[command(
    name = "pager-sim",
    version,
    about = "Demand-paging simulator - replays a page trace against a page replacement algorithm"
)]
struct Config {
    /// Trace file: a header line followed by allocation and reference lines
    trace_file: PathBuf,

    /// Page replacement algorithm
    #[arg(value_enum)]
    policy: ReplacementPolicy,

    /// Log simulation details to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let config = parse_args();
    init_logging(config.verbose);

    // Run the simulation and handle any errors
    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn print_usage(program: &str) {
    println!("usage: {} input_file [{}]", program, POLICY_NAMES.join("|"));
}

fn parse_args() -> Config {
    let args: Vec<OsString> = env::args_os().collect();

    if args.len() <= 1 {
        let program = args
            .first()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
        print_usage(&program);
        process::exit(0);
    }

    match Config::try_parse_from(&args) {
        Ok(config) => config,
        Err(e) => {
            // --help and --version are reported through the error path too
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    }
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    match verbose {
        0 if env::var_os("RUST_LOG").is_some() => {}
        0 => {
            builder.filter_level(LevelFilter::Warn);
        }
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.format_timestamp(None).init();
}

/// Main logic separated from main() for cleaner error handling
fn run(config: &Config) -> Result<()> {
    let trace = TraceReader::open(&config.trace_file).with_context(|| {
        format!(
            "the file {} could not be opened",
            config.trace_file.display()
        )
    })?;

    info!(
        "replaying {} with {}",
        config.trace_file.display(),
        config.policy
    );

    let stdout = io::stdout();
    let stderr = io::stderr();
    let summary = simulation::run(trace, config.policy, &mut stdout.lock(), &mut stderr.lock())
        .with_context(|| format!("simulation of {} failed", config.trace_file.display()))?;

    info!(
        "{} references, {} faults ({} discarded, {} written)",
        summary.references, summary.faults, summary.discarded, summary.written
    );
    Ok(())
}
