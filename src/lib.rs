//! Snakewrap - typed calls of snakemake-wrappers
//!
//! A wrapper call is bound against a catalog definition, rendered into a
//! Snakemake rule block and either returned as text or run through the
//! `snakemake` command line.

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod invocation;
pub mod rule;
pub mod snakemake;
pub mod wrappers;

pub use error::{Result, SnakewrapError};
