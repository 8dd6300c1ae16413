//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - list: list catalog wrappers
//! - show: show one wrapper's slots and params
//! - run: render a rule for a wrapper and run it (or print it)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Snakewrap - render and run snakemake-wrapper rules from the command line
#[derive(Parser, Debug)]
#[command(name = "snakewrap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available wrappers
    List {
        /// Show only wrappers of this tool (bwa, samtools, ...)
        #[arg(short, long)]
        tool: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a wrapper's inputs, outputs and params
    Show {
        /// Wrapper name, e.g. samtools/sort
        wrapper: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a rule for a wrapper and run it
    Run(RunArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Wrapper name, e.g. samtools/sort
    pub wrapper: String,

    /// Input path, optionally prefixed with its slot: [SLOT=]PATH
    #[arg(short, long = "input", value_name = "[SLOT=]PATH")]
    pub inputs: Vec<String>,

    /// Output path, optionally prefixed with its slot: [SLOT=]PATH
    #[arg(short, long = "output", value_name = "[SLOT=]PATH")]
    pub outputs: Vec<String>,

    /// Wrapper param
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Threads for the rule
    #[arg(short, long)]
    pub threads: Option<u32>,

    /// Log file for the rule
    #[arg(long)]
    pub log: Option<String>,

    /// Rule name instead of the one derived from the wrapper
    #[arg(long)]
    pub name: Option<String>,

    /// Print the rule without running it
    #[arg(long)]
    pub print_only: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    impl Commands {
        fn run_args(&self) -> Option<&RunArgs> {
            match self {
                Commands::Run(args) => Some(args),
                _ => None,
            }
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["snakewrap"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["snakewrap", "-v", "list"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["snakewrap", "list", "-c", "/path/to/config.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
    }

    #[test]
    fn test_list() {
        let cli = Cli::try_parse_from(["snakewrap", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List { tool: None, json: false }));
    }

    #[test]
    fn test_list_with_tool_json() {
        let cli = Cli::try_parse_from(["snakewrap", "list", "--tool", "samtools", "--json"]).unwrap();
        match cli.command {
            Commands::List { tool, json } => {
                assert_eq!(tool.as_deref(), Some("samtools"));
                assert!(json);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_show() {
        let cli = Cli::try_parse_from(["snakewrap", "show", "bwa/mem"]).unwrap();
        match cli.command {
            Commands::Show { wrapper, json } => {
                assert_eq!(wrapper, "bwa/mem");
                assert!(!json);
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_show_requires_wrapper() {
        assert!(Cli::try_parse_from(["snakewrap", "show"]).is_err());
    }

    #[test]
    fn test_run_full() {
        let cli = Cli::try_parse_from([
            "snakewrap",
            "run",
            "samtools/sort",
            "-i",
            "mapped/a.bam",
            "-o",
            "sorted/a.bam",
            "-p",
            "extra=-m 4G",
            "-t",
            "4",
            "--log",
            "logs/sort.log",
            "--name",
            "sort_a",
            "--print-only",
        ])
        .unwrap();
        let args = cli.command.run_args().unwrap();
        assert_eq!(args.wrapper, "samtools/sort");
        assert_eq!(args.inputs, vec!["mapped/a.bam"]);
        assert_eq!(args.outputs, vec!["sorted/a.bam"]);
        assert_eq!(args.params, vec!["extra=-m 4G"]);
        assert_eq!(args.threads, Some(4));
        assert_eq!(args.log.as_deref(), Some("logs/sort.log"));
        assert_eq!(args.name.as_deref(), Some("sort_a"));
        assert!(args.print_only);
        assert!(!args.json);
    }

    #[test]
    fn test_run_repeated_slots() {
        let cli = Cli::try_parse_from([
            "snakewrap",
            "run",
            "bwa/mem",
            "--input",
            "reads=a_1.fq",
            "--input",
            "reads=a_2.fq",
            "-i",
            "idx=genome.fa.bwt",
            "-o",
            "a.bam",
        ])
        .unwrap();
        let args = cli.command.run_args().unwrap();
        assert_eq!(args.inputs, vec!["reads=a_1.fq", "reads=a_2.fq", "idx=genome.fa.bwt"]);
    }

    #[test]
    fn test_run_rejects_bad_threads() {
        assert!(Cli::try_parse_from(["snakewrap", "run", "fastqc", "-t", "many"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
