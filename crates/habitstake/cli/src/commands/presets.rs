//! Simulation preset listing

use colored::Colorize;
use habitstake_core::Preset;
use serde::Serialize;

use crate::error::CliResult;
use crate::output::{print_structured, OutputFormat};

#[derive(Serialize)]
struct PresetInfo {
    name: &'static str,
    description: &'static str,
}

/// Execute presets command
pub fn execute(format: OutputFormat) -> CliResult<()> {
    let presets: Vec<PresetInfo> = Preset::ALL
        .iter()
        .map(|preset| PresetInfo {
            name: preset.name(),
            description: preset.description(),
        })
        .collect();

    if print_structured(&presets, format)? {
        return Ok(());
    }

    println!("{}", "Simulation presets".bold().cyan());
    println!("{}", "=".repeat(50));
    for preset in &presets {
        println!("  {:<18} {}", preset.name.bold().yellow(), preset.description.dimmed());
    }
    Ok(())
}
