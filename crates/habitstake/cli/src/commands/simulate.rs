//! What-if simulation of a reward schedule

use clap::Args;
use colored::Colorize;
use habitstake_core::{
    format_minor, simulate, CompletionSet, Preset, RewardScheduleGenerator, SimulationResult,
};
use serde::Serialize;
use tracing::debug;

use super::{parse_days, ContractArgs};
use crate::error::CliResult;
use crate::output::{print_structured, OutputFormat};

/// Arguments for `habitstake simulate`
#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub contract: ContractArgs,

    /// Completed days, comma separated (e.g. 2,5,8)
    #[arg(long, conflicts_with = "preset", required_unless_present = "preset")]
    pub days: Option<String>,

    /// Named completion pattern (see `habitstake presets`)
    #[arg(short, long, value_parser = parse_preset)]
    pub preset: Option<Preset>,
}

fn parse_preset(input: &str) -> Result<Preset, String> {
    input.parse::<Preset>().map_err(|e| e.to_string())
}

#[derive(Serialize)]
struct SimulationReport<'a> {
    seed: &'a str,
    duration: u32,
    deposit_minor: u64,
    completion: String,
    #[serde(flatten)]
    result: &'a SimulationResult,
}

/// Execute simulate command
pub fn execute(args: SimulateArgs, format: OutputFormat) -> CliResult<()> {
    let contract = args.contract;
    contract.check()?;

    let (completion, label) = match (args.preset, args.days) {
        (Some(preset), _) => (CompletionSet::from(preset), preset.to_string()),
        (None, Some(days)) => {
            let days = parse_days(&days)?;
            let label = format!("{} explicit days", days.len());
            (CompletionSet::from(days), label)
        }
        (None, None) => (CompletionSet::Days(Vec::new()), "no days".to_string()),
    };

    let schedule =
        RewardScheduleGenerator::new().generate(&contract.seed, contract.duration, contract.deposit);
    let result = simulate(&schedule, completion);
    debug!(
        seed = %schedule.seed,
        completion = %label,
        recovered = result.total_recovered_minor,
        "Simulation complete"
    );

    let report = SimulationReport {
        seed: &schedule.seed,
        duration: schedule.duration,
        deposit_minor: schedule.deposit_minor,
        completion: label,
        result: &result,
    };
    if print_structured(&report, format)? {
        return Ok(());
    }

    println!("{}", format!("Simulation: {}", report.seed).bold().cyan());
    println!("{}", "=".repeat(56));
    println!("  {:<14} {} days", "Duration:".bold(), report.duration);
    println!("  {:<14} {}", "Deposit:".bold(), format_minor(report.deposit_minor));
    println!("  {:<14} {}", "Completion:".bold(), report.completion);
    println!();
    println!(
        "  {:>5}  {:>4}  {:>12}  {:>12}  {:>12}",
        "Day".bold(),
        "Done".bold(),
        "Reward".bold(),
        "Recovered".bold(),
        "Forfeited".bold()
    );
    println!("  {}", "-".repeat(53).dimmed());
    for row in &result.day_breakdown {
        let done = if row.completed { "✓".green() } else { "✗".red() };
        let reward = if row.has_reward {
            format_minor(row.reward_minor)
        } else {
            "-".to_string()
        };
        println!(
            "  {:>5}  {:>4}  {:>12}  {:>12}  {:>12}",
            row.day,
            done,
            reward,
            format_minor(row.recovered_minor).green(),
            format_minor(row.forfeited_minor).red()
        );
    }
    println!("  {}", "-".repeat(53).dimmed());
    println!(
        "  {:<14} {}",
        "Recovered:".bold(),
        format_minor(result.total_recovered_minor).green().bold()
    );
    println!(
        "  {:<14} {}",
        "Forfeited:".bold(),
        format_minor(result.total_forfeited_minor).red().bold()
    );

    Ok(())
}
