//! CLI command implementations

pub mod generate;
pub mod presets;
pub mod simulate;

use clap::Args;
use habitstake_core::{Clock, ContractLimits, ContractTerms, SystemClock};

use crate::error::{CliError, CliResult};

/// Contract parameters shared by schedule-producing commands.
#[derive(Args, Debug, Clone)]
pub struct ContractArgs {
    /// Schedule seed (the contract id)
    #[arg(short, long)]
    pub seed: String,

    /// Cycle length in days
    #[arg(short, long, default_value = "14")]
    pub duration: u32,

    /// Deposit in major units, at most two decimals (e.g. 100 or 49.99)
    #[arg(long, value_parser = parse_amount)]
    pub deposit: u64,

    /// Skip the product's duration and deposit range checks
    #[arg(long)]
    pub no_limits: bool,
}

impl ContractArgs {
    /// Range-check the arguments unless `--no-limits` was given.
    pub fn check(&self) -> CliResult<()> {
        if self.no_limits {
            return Ok(());
        }
        ContractTerms::new(
            self.seed.as_str(),
            "",
            SystemClock.today(),
            self.duration,
            self.deposit,
        )
        .validate(&ContractLimits::default())?;
        Ok(())
    }
}

/// Parse a decimal major-unit amount into minor units without going through floats.
pub fn parse_amount(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let (whole, frac) = match input.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (input, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{input}' is not a non-negative amount"));
    }
    if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{input}' must have at most two decimal places"));
    }
    let whole: u64 = whole
        .parse()
        .map_err(|_| format!("'{input}' is too large"))?;
    let cents: u64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().map_err(|e| e.to_string())? * 10,
        _ => frac.parse::<u64>().map_err(|e| e.to_string())?,
    };
    whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(|| format!("'{input}' is too large"))
}

/// Parse a comma-separated day list such as `2,5,8`.
pub fn parse_days(input: &str) -> CliResult<Vec<u32>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .map_err(|_| CliError::InvalidArgument(format!("'{part}' is not a day number")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amounts() {
        assert_eq!(parse_amount("100"), Ok(10_000));
        assert_eq!(parse_amount("100.5"), Ok(10_050));
        assert_eq!(parse_amount("49.99"), Ok(4_999));
        assert_eq!(parse_amount("0.07"), Ok(7));
    }

    #[test]
    fn rejects_bad_amounts() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("1.234").is_err());
        assert!(parse_amount(".5").is_err());
        assert!(parse_amount("12a").is_err());
        assert!(parse_amount("184467440737095517").is_err());
    }

    #[test]
    fn parses_day_lists() {
        assert_eq!(parse_days("2,5, 8").unwrap(), vec![2, 5, 8]);
        assert_eq!(parse_days("").unwrap(), Vec::<u32>::new());
        assert!(parse_days("2,x").is_err());
    }

    #[test]
    fn limits_can_be_skipped() {
        let args = ContractArgs {
            seed: "c".into(),
            duration: 3,
            deposit: 10_000,
            no_limits: false,
        };
        assert!(args.check().is_err());
        assert!(ContractArgs { no_limits: true, ..args }.check().is_ok());
    }
}
