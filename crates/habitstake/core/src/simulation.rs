//! What-if replay of a reward schedule against a set of completed days.
//!
//! Used both to explain "what happened" at the end of a cycle and for
//! administrative analysis. Every reward day is classified as either
//! recovered or forfeited, so the two totals always add up to the deposit.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CycleError;
use crate::rng::{SeedPurpose, SeededRandom};
use crate::types::RewardSchedule;

/// Named completion patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Every day completed
    Perfect,
    /// No day completed
    MissAll,
    /// Days 6 and 7 of every 7-day block skipped (day 1 is a Monday)
    WeekendSkipper,
    /// A seeded 80% of days, independent of the schedule's own stream
    #[serde(rename = "random-80")]
    Random80,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Perfect,
        Preset::MissAll,
        Preset::WeekendSkipper,
        Preset::Random80,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Perfect => "perfect",
            Preset::MissAll => "miss-all",
            Preset::WeekendSkipper => "weekend-skipper",
            Preset::Random80 => "random-80",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Perfect => "every day completed",
            Preset::MissAll => "no day completed",
            Preset::WeekendSkipper => "days 6 and 7 of each week skipped",
            Preset::Random80 => "a seeded 80% of days completed",
        }
    }

    /// Completed days this preset produces for `schedule`, ascending.
    pub fn completed_days(&self, schedule: &RewardSchedule) -> Vec<u32> {
        let duration = schedule.duration;
        match self {
            Preset::Perfect => (1..=duration).collect(),
            Preset::MissAll => vec![],
            Preset::WeekendSkipper => (1..=duration)
                .filter(|day| !matches!((day - 1) % 7 + 1, 6 | 7))
                .collect(),
            Preset::Random80 => {
                let mut rng = SeededRandom::for_purpose(&schedule.seed, SeedPurpose::Simulation);
                let mut days: Vec<u32> = (1..=duration).collect();
                rng.shuffle(&mut days);
                let take = (0.8 * duration as f64).round() as usize;
                let mut picked: Vec<u32> = days.into_iter().take(take).collect();
                picked.sort_unstable();
                picked
            }
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = CycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| CycleError::UnknownPreset(s.to_string()))
    }
}

/// Input to a simulation: explicit days or a preset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionSet {
    Days(Vec<u32>),
    Preset(Preset),
}

impl From<Preset> for CompletionSet {
    fn from(preset: Preset) -> Self {
        CompletionSet::Preset(preset)
    }
}

impl From<Vec<u32>> for CompletionSet {
    fn from(days: Vec<u32>) -> Self {
        CompletionSet::Days(days)
    }
}

/// Outcome of one day in a simulation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBreakdown {
    pub day: u32,
    pub has_reward: bool,
    pub reward_minor: u64,
    pub completed: bool,
    pub recovered_minor: u64,
    pub forfeited_minor: u64,
}

/// Result of replaying a schedule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_recovered_minor: u64,
    pub total_forfeited_minor: u64,
    /// Completed days within the cycle, ascending and unique
    pub completed_days: Vec<u32>,
    pub day_breakdown: Vec<DayBreakdown>,
}

/// Replay `schedule` against `completion`.
///
/// Explicit days outside `1..=duration` are ignored.
pub fn simulate(schedule: &RewardSchedule, completion: impl Into<CompletionSet>) -> SimulationResult {
    let completed: BTreeSet<u32> = match completion.into() {
        CompletionSet::Days(days) => days
            .into_iter()
            .filter(|day| (1..=schedule.duration).contains(day))
            .collect(),
        CompletionSet::Preset(preset) => preset.completed_days(schedule).into_iter().collect(),
    };

    let day_breakdown: Vec<DayBreakdown> = (1..=schedule.duration)
        .map(|day| {
            let reward = schedule.reward_for(day);
            let reward_minor = reward.unwrap_or(0);
            let is_completed = completed.contains(&day);
            DayBreakdown {
                day,
                has_reward: reward.is_some(),
                reward_minor,
                completed: is_completed,
                recovered_minor: if is_completed { reward_minor } else { 0 },
                forfeited_minor: if is_completed { 0 } else { reward_minor },
            }
        })
        .collect();

    let total_recovered_minor = day_breakdown.iter().map(|d| d.recovered_minor).sum();
    let total_forfeited_minor = day_breakdown.iter().map(|d| d.forfeited_minor).sum();

    debug!(
        seed = %schedule.seed,
        completed = completed.len(),
        recovered = total_recovered_minor,
        forfeited = total_forfeited_minor,
        "Schedule simulated"
    );

    SimulationResult {
        total_recovered_minor,
        total_forfeited_minor,
        completed_days: completed.into_iter().collect(),
        day_breakdown,
    }
}
