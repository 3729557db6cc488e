//! HabitStake CLI - administrative interface to the commitment cycle core
//!
//! This CLI lets operators and developers:
//! - Generate the hidden reward schedule for a contract
//! - Run what-if simulations against explicit days or named presets
//! - List the available simulation presets

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use commands::{generate, presets, simulate};
pub use error::{CliError, CliResult};

/// HabitStake CLI application
#[derive(Parser)]
#[command(name = "habitstake")]
#[command(about = "HabitStake - commitment contract reward schedules and simulations", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Generate the reward schedule for a contract
    Generate(generate::GenerateArgs),

    /// Replay a reward schedule against a completion set
    Simulate(simulate::SimulateArgs),

    /// List simulation presets
    Presets,
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Logs go to stderr so structured output stays parseable
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    match cli.command {
        Commands::Generate(args) => generate::execute(args, cli.output),
        Commands::Simulate(args) => simulate::execute(args, cli.output),
        Commands::Presets => presets::execute(cli.output),
    }
}
