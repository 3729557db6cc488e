use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ContractLimits, ScheduleConfig};
use crate::error::{CycleError, Result};
use crate::schedule::generate_with_config;

/// One earmarked day and the share of the deposit it releases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSlot {
    /// Day number, 1-based
    pub day: u32,
    /// Reward in minor units (cents)
    pub amount_minor: u64,
}

/// The hidden reward schedule for one contract.
///
/// A pure function of `(seed, duration, deposit_minor)`; never mutated after
/// generation. Rewards are sorted by day and sum exactly to the deposit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSchedule {
    pub seed: String,
    pub duration: u32,
    /// Deposit in minor units (cents)
    pub deposit_minor: u64,
    pub reward_day_count: u32,
    pub rewards: Vec<RewardSlot>,
}

impl RewardSchedule {
    /// Reward for `day`, if it is a reward day.
    pub fn reward_for(&self, day: u32) -> Option<u64> {
        self.rewards
            .binary_search_by_key(&day, |slot| slot.day)
            .ok()
            .map(|idx| self.rewards[idx].amount_minor)
    }

    pub fn is_reward_day(&self, day: u32) -> bool {
        self.reward_for(day).is_some()
    }

    /// Reward for `day`, or 0 for ordinary days.
    pub fn reward_or_zero(&self, day: u32) -> u64 {
        self.reward_for(day).unwrap_or(0)
    }

    /// Sum of all reward amounts. Equals `deposit_minor` for generated schedules.
    pub fn total_minor(&self) -> u64 {
        self.rewards.iter().map(|slot| slot.amount_minor).sum()
    }

    /// Reward days in ascending order.
    pub fn reward_days(&self) -> Vec<u32> {
        self.rewards.iter().map(|slot| slot.day).collect()
    }
}

/// Terms of a commitment contract as agreed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTerms {
    /// Unique contract identifier; doubles as the schedule seed
    pub contract_id: String,
    /// Free-form description of the habit
    pub habit: String,
    /// Local calendar date of day 1
    pub start_date: NaiveDate,
    pub duration_days: u32,
    /// Deposit in minor units (cents)
    pub deposit_minor: u64,
}

impl ContractTerms {
    pub fn new(
        contract_id: impl Into<String>,
        habit: impl Into<String>,
        start_date: NaiveDate,
        duration_days: u32,
        deposit_minor: u64,
    ) -> Self {
        Self {
            contract_id: contract_id.into(),
            habit: habit.into(),
            start_date,
            duration_days,
            deposit_minor,
        }
    }

    /// Range-check the terms. The generator itself never validates.
    pub fn validate(&self, limits: &ContractLimits) -> Result<()> {
        if self.contract_id.trim().is_empty() {
            return Err(CycleError::EmptyContractId);
        }
        if !(limits.min_duration_days..=limits.max_duration_days).contains(&self.duration_days) {
            return Err(CycleError::DurationOutOfRange {
                days: self.duration_days,
                min: limits.min_duration_days,
                max: limits.max_duration_days,
            });
        }
        if !(limits.min_deposit_minor..=limits.max_deposit_minor).contains(&self.deposit_minor) {
            return Err(CycleError::DepositOutOfRange {
                amount_minor: self.deposit_minor,
                min: limits.min_deposit_minor,
                max: limits.max_deposit_minor,
            });
        }
        Ok(())
    }

    /// Regenerate this contract's reward schedule, seeded by the contract id.
    pub fn schedule(&self, config: &ScheduleConfig) -> RewardSchedule {
        generate_with_config(&self.contract_id, self.duration_days, self.deposit_minor, config)
    }

    /// Calendar date of the last day of the cycle.
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + chrono::Duration::days(self.duration_days.saturating_sub(1) as i64)
    }
}

/// Resolution of a single day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Not yet resolved by the user or by reconciliation
    #[default]
    Unresolved,
    Completed,
    Missed,
}

impl DayStatus {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, DayStatus::Unresolved)
    }
}

/// State of one contract day.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlot {
    pub status: DayStatus,
    /// When the status was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    /// Reward captured at completion time; only present on completed days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_minor: Option<u64>,
    /// Whether the outcome has been shown to the user. Older records without
    /// the field load as unrevealed.
    #[serde(default)]
    pub revealed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revealed_at: Option<DateTime<Utc>>,
}

/// Render minor units as a major-unit decimal string, e.g. `1505` -> `"15.05"`.
pub fn format_minor(amount_minor: u64) -> String {
    format!("{}.{:02}", amount_minor / 100, amount_minor % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> RewardSchedule {
        RewardSchedule {
            seed: "sample".into(),
            duration: 14,
            deposit_minor: 10_000,
            reward_day_count: 5,
            rewards: vec![
                RewardSlot { day: 2, amount_minor: 1_500 },
                RewardSlot { day: 5, amount_minor: 2_500 },
                RewardSlot { day: 8, amount_minor: 2_000 },
                RewardSlot { day: 11, amount_minor: 3_000 },
                RewardSlot { day: 14, amount_minor: 1_000 },
            ],
        }
    }

    fn terms(duration: u32, deposit: u64) -> ContractTerms {
        ContractTerms::new(
            "contract-123",
            "run 5k",
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            duration,
            deposit,
        )
    }

    #[test]
    fn reward_lookup() {
        let schedule = sample_schedule();
        assert_eq!(schedule.reward_for(5), Some(2_500));
        assert_eq!(schedule.reward_for(6), None);
        assert_eq!(schedule.reward_or_zero(6), 0);
        assert!(schedule.is_reward_day(14));
        assert_eq!(schedule.total_minor(), 10_000);
        assert_eq!(schedule.reward_days(), vec![2, 5, 8, 11, 14]);
    }

    #[test]
    fn validate_accepts_product_ranges() {
        let limits = ContractLimits::default();
        assert!(terms(7, 100).validate(&limits).is_ok());
        assert!(terms(30, 1_000_000).validate(&limits).is_ok());
    }

    #[test]
    fn validate_rejects_short_duration() {
        let err = terms(6, 5_000).validate(&ContractLimits::default()).unwrap_err();
        assert!(matches!(err, CycleError::DurationOutOfRange { days: 6, .. }));
    }

    #[test]
    fn validate_rejects_large_deposit() {
        let err = terms(14, 2_000_000)
            .validate(&ContractLimits::default())
            .unwrap_err();
        assert!(matches!(err, CycleError::DepositOutOfRange { .. }));
    }

    #[test]
    fn validate_rejects_blank_id() {
        let mut t = terms(14, 5_000);
        t.contract_id = "  ".into();
        assert!(matches!(
            t.validate(&ContractLimits::default()),
            Err(CycleError::EmptyContractId)
        ));
    }

    #[test]
    fn end_date_is_inclusive() {
        let t = terms(14, 5_000);
        assert_eq!(t.end_date(), NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn schedule_is_seeded_by_contract_id() {
        let t = terms(14, 10_000);
        let cfg = ScheduleConfig::default();
        assert_eq!(t.schedule(&cfg), t.schedule(&cfg));
        assert_eq!(t.schedule(&cfg).seed, "contract-123");
    }

    #[test]
    fn legacy_slot_without_revealed_loads_unrevealed() {
        let slot: DaySlot = serde_json::from_str(r#"{"status":"missed"}"#).unwrap();
        assert_eq!(slot.status, DayStatus::Missed);
        assert!(!slot.revealed);
    }

    #[test]
    fn format_minor_pads_cents() {
        assert_eq!(format_minor(1_505), "15.05");
        assert_eq!(format_minor(7), "0.07");
        assert_eq!(format_minor(10_000), "100.00");
    }
}
