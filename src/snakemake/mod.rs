//! Snakemake invocation - rule files, process execution and output checks

mod outcome;
mod runner;

pub use outcome::{OutputState, OutputStatus, RunOutcome};
pub use runner::{RuleRunner, RunnerSettings, SnakemakeRunner};
