use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;

use cli::Cli;
use cli::commands::{Commands, RunArgs};
use snakewrap::catalog::WrapperDef;
use snakewrap::config::Config;
use snakewrap::executor::{Execution, Executor};
use snakewrap::invocation::Invocation;
use snakewrap::snakemake::{OutputState, RunOutcome, SnakemakeRunner};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snakewrap")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("snakewrap.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let executor = Executor::from_config(config).context("Failed to load wrapper catalog")?;

    match &cli.command {
        Commands::List { tool, json } => handle_list_command(&executor, tool.as_deref(), *json),
        Commands::Show { wrapper, json } => handle_show_command(&executor, wrapper, *json),
        Commands::Run(args) => handle_run_command(&executor, args, cli.is_verbose()).await,
    }
}

fn handle_list_command(executor: &Executor<SnakemakeRunner>, tool: Option<&str>, json: bool) -> Result<()> {
    info!("Listing wrappers - tool: {:?}", tool);
    let defs: Vec<&WrapperDef> = match tool {
        Some(tool) => executor.catalog().by_tool(tool),
        None => executor.catalog().all().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&defs)?);
        return Ok(());
    }

    if defs.is_empty() {
        println!("{}", "No wrappers found".yellow());
        return Ok(());
    }
    let width = defs.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for def in defs {
        println!("{}  {}", format!("{:width$}", def.name, width = width).cyan(), def.description);
    }
    Ok(())
}

fn handle_show_command(executor: &Executor<SnakemakeRunner>, wrapper: &str, json: bool) -> Result<()> {
    info!("Showing wrapper: {}", wrapper);
    let def = executor.catalog().require(wrapper)?;

    if json {
        println!("{}", serde_json::to_string_pretty(def)?);
        return Ok(());
    }

    println!("{} {}", def.name.green().bold(), def.description);
    println!("  {} {}", "wrapper:".cyan(), def.wrapper_path());
    if def.threaded {
        println!("  {} yes", "threaded:".cyan());
    }
    for (label, slots) in [("input:", &def.input), ("output:", &def.output)] {
        println!("  {}", label.cyan());
        for slot in slots {
            let mut flags = Vec::new();
            if slot.positional {
                flags.push("positional");
            }
            if !slot.required {
                flags.push("optional");
            }
            if slot.multiple {
                flags.push("multiple");
            }
            if slot.directory {
                flags.push("directory");
            }
            println!("    {} [{}] {}", slot.name, flags.join(", "), slot.description);
        }
    }
    if !def.params.is_empty() {
        println!("  {}", "params:".cyan());
        for param in &def.params {
            let default = param
                .default
                .as_ref()
                .map(|v| format!(" = {}", v.to_python()))
                .unwrap_or_default();
            let required = if param.required { " (required)" } else { "" };
            println!(
                "    {}: {}{}{} {}",
                param.name, param.kind, default, required, param.description
            );
        }
    }
    Ok(())
}

fn build_invocation(def: &WrapperDef, args: &RunArgs) -> Result<Invocation> {
    let mut call = Invocation::from_args(def, &args.inputs, &args.outputs, &args.params)?;
    if let Some(threads) = args.threads {
        call = call.threads(threads);
    }
    if let Some(log) = &args.log {
        call = call.log(log.clone());
    }
    if let Some(name) = &args.name {
        call = call.name(name.clone());
    }
    Ok(call)
}

async fn handle_run_command(executor: &Executor<SnakemakeRunner>, args: &RunArgs, verbose: bool) -> Result<()> {
    info!("Running wrapper: {} (print_only: {})", args.wrapper, args.print_only);
    let def = executor.catalog().require(&args.wrapper)?;
    let call = build_invocation(def, args)?;

    let execution = executor.execute(&call, args.print_only).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&execution)?);
    }

    match execution {
        Execution::Printed { rule } => {
            if !args.json {
                print!("{}", rule);
            }
            Ok(())
        }
        Execution::Completed(outcome) => {
            if !args.json {
                print_outcome(&outcome, verbose);
            }
            outcome.ensure_success()?;
            Ok(())
        }
    }
}

fn print_outcome(outcome: &RunOutcome, verbose: bool) {
    if verbose {
        println!("{} {}", "Command:".cyan(), outcome.command.join(" "));
    }
    if let Some(rule_file) = &outcome.rule_file {
        println!("{} {}", "Rule file:".cyan(), rule_file.display());
    }
    if !outcome.stdout.is_empty() {
        print!("{}", outcome.stdout);
    }
    if !outcome.stderr.is_empty() {
        eprint!("{}", outcome.stderr);
    }
    for output in &outcome.outputs {
        let state = match output.state {
            OutputState::Present(bytes) => format!("present ({} bytes)", bytes).green(),
            OutputState::Empty => "empty".yellow(),
            OutputState::Missing => "missing".red(),
        };
        println!("  {} {}", output.path.display(), state);
    }
    match outcome.exit_code {
        Some(0) => println!("{}", "Runner finished".green()),
        Some(code) => println!("{} exit code {}", "Runner failed:".red(), code),
        None => println!("{}", "Runner terminated by signal".red()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
