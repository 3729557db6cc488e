//! Tunable constants for schedule generation, contract validation and the
//! day state machine. Defaults are the product values.

use serde::{Deserialize, Serialize};

/// Shape of the hidden reward schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Lower bound on reward days, as a fraction of the duration (floored, at least 1)
    pub min_reward_day_fraction: f64,
    /// Upper bound on reward days, as a fraction of the duration (floored)
    pub max_reward_day_fraction: f64,
    /// Smallest share of the deposit a reward day may carry
    pub min_slot_share: f64,
    /// Largest share of the deposit a reward day may carry
    pub max_slot_share: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            min_reward_day_fraction: 0.2,
            max_reward_day_fraction: 0.85,
            min_slot_share: 0.02,
            max_slot_share: 0.8,
        }
    }
}

impl ScheduleConfig {
    /// Inclusive range of reward day counts for a cycle of `duration` days.
    ///
    /// For degenerate durations where the upper bound falls below the lower
    /// one, the lower bound is returned for both ends.
    pub fn reward_day_bounds(&self, duration: u32) -> (u32, u32) {
        let min = ((self.min_reward_day_fraction * duration as f64).floor() as u32).max(1);
        let max = (self.max_reward_day_fraction * duration as f64).floor() as u32;
        (min, max.max(min))
    }

    /// Per-slot floor in minor units.
    pub fn min_slot_minor(&self, deposit_minor: u64) -> u64 {
        (self.min_slot_share * deposit_minor as f64).round() as u64
    }

    /// Per-slot cap in minor units.
    pub fn max_slot_minor(&self, deposit_minor: u64) -> u64 {
        (self.max_slot_share * deposit_minor as f64).round() as u64
    }
}

/// Ranges a contract must fall in before a schedule is generated for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractLimits {
    pub min_duration_days: u32,
    pub max_duration_days: u32,
    /// Minimum deposit in minor units
    pub min_deposit_minor: u64,
    /// Maximum deposit in minor units
    pub max_deposit_minor: u64,
}

impl Default for ContractLimits {
    fn default() -> Self {
        Self {
            min_duration_days: 7,
            max_duration_days: 30,
            min_deposit_minor: 100,       // $1
            max_deposit_minor: 1_000_000, // $10,000
        }
    }
}

/// Behaviour of the commitment cycle state machine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Number of most recent past days that reconciliation leaves unresolved
    /// so external activity verification can still complete them.
    ///
    /// 0 finalizes every past day as soon as the day number advances.
    pub verification_grace_days: u32,
}

impl CycleConfig {
    pub fn with_grace_days(days: u32) -> Self {
        Self {
            verification_grace_days: days,
        }
    }
}
