//! CLI module for snakewrap - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
