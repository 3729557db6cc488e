//! Reward schedule generation

use clap::Args;
use colored::Colorize;
use habitstake_core::{format_minor, RewardScheduleGenerator};
use tracing::debug;

use super::ContractArgs;
use crate::error::CliResult;
use crate::output::{print_structured, OutputFormat};

/// Arguments for `habitstake generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub contract: ContractArgs,
}

/// Execute generate command
pub fn execute(args: GenerateArgs, format: OutputFormat) -> CliResult<()> {
    let contract = args.contract;
    contract.check()?;

    let schedule =
        RewardScheduleGenerator::new().generate(&contract.seed, contract.duration, contract.deposit);
    debug!(seed = %schedule.seed, reward_days = schedule.reward_day_count, "Schedule generated");

    if print_structured(&schedule, format)? {
        return Ok(());
    }

    println!("{}", format!("Reward schedule: {}", schedule.seed).bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {:<14} {} days", "Duration:".bold(), schedule.duration);
    println!("  {:<14} {}", "Deposit:".bold(), format_minor(schedule.deposit_minor));
    println!("  {:<14} {}", "Reward days:".bold(), schedule.reward_day_count);
    println!();
    println!("  {:>5}  {:>12}  {:>7}", "Day".bold(), "Reward".bold(), "Share".bold());
    println!("  {}", "-".repeat(28).dimmed());
    for day in 1..=schedule.duration {
        match schedule.reward_for(day) {
            Some(amount) => {
                let share = if schedule.deposit_minor == 0 {
                    0.0
                } else {
                    amount as f64 * 100.0 / schedule.deposit_minor as f64
                };
                println!(
                    "  {:>5}  {:>12}  {:>6.1}%",
                    day,
                    format_minor(amount).green(),
                    share
                );
            }
            None => println!("  {:>5}  {:>12}  {:>7}", day, "-".dimmed(), ""),
        }
    }
    println!("  {}", "-".repeat(28).dimmed());
    println!("  {:>5}  {:>12}", "Total".bold(), format_minor(schedule.total_minor()).bold());

    Ok(())
}
