use tracing::{debug, warn};

use crate::config::ScheduleConfig;
use crate::rng::{SeedPurpose, SeededRandom};
use crate::types::{RewardSchedule, RewardSlot};

/// Reward schedule generator.
///
/// Picks a seeded number of reward days, chooses which days they are, and
/// splits the deposit across them in integer minor units so the amounts sum
/// exactly to the deposit. The generator performs no validation: callers
/// range-check with [`ContractTerms::validate`](crate::ContractTerms::validate)
/// first, and out-of-range input still yields a self-consistent schedule.
pub struct RewardScheduleGenerator {
    config: ScheduleConfig,
}

impl RewardScheduleGenerator {
    /// Create a generator with the product configuration.
    pub fn new() -> Self {
        Self {
            config: ScheduleConfig::default(),
        }
    }

    /// Create with custom configuration.
    pub fn with_config(config: ScheduleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Generate the schedule for `(seed, duration, deposit_minor)`.
    pub fn generate(&self, seed: &str, duration: u32, deposit_minor: u64) -> RewardSchedule {
        let mut rng = SeededRandom::for_purpose(seed, SeedPurpose::Schedule);

        let (min_days, max_days) = self.config.reward_day_bounds(duration);
        let reward_day_count = rng.next_int(min_days, max_days).min(duration.max(1));

        let mut days: Vec<u32> = (1..=duration).collect();
        rng.shuffle(&mut days);
        let mut reward_days: Vec<u32> = days.into_iter().take(reward_day_count as usize).collect();
        reward_days.sort_unstable();

        let amounts = self.distribute(&mut rng, deposit_minor, reward_days.len());

        let rewards: Vec<RewardSlot> = reward_days
            .into_iter()
            .zip(amounts)
            .map(|(day, amount_minor)| RewardSlot { day, amount_minor })
            .collect();

        debug!(
            seed,
            duration,
            deposit_minor,
            reward_days = rewards.len(),
            "Reward schedule generated"
        );

        RewardSchedule {
            seed: seed.to_string(),
            duration,
            deposit_minor,
            reward_day_count: rewards.len() as u32,
            rewards,
        }
    }

    /// Split `deposit_minor` across `count` slots.
    ///
    /// Every slot starts at the floor share; the remainder is handed out by
    /// seeded weight, left to right, never past the cap. Whatever rounding
    /// leaves over goes to the last slot, then to any slot with headroom in
    /// index order. A single slot takes the whole deposit.
    fn distribute(&self, rng: &mut SeededRandom, deposit_minor: u64, count: usize) -> Vec<u64> {
        match count {
            0 => return vec![],
            1 => return vec![deposit_minor],
            _ => {}
        }

        let n = count as u64;
        let mut min_minor = self.config.min_slot_minor(deposit_minor);
        let max_minor = self.config.max_slot_minor(deposit_minor);

        // Too many slots for the floor: lower the floor so the sum stays exact.
        if min_minor.saturating_mul(n) > deposit_minor {
            warn!(
                deposit_minor,
                slots = count,
                floor = min_minor,
                "Per-slot floor exceeds deposit; clamping floor"
            );
            min_minor = deposit_minor / n;
        }

        let mut amounts = vec![min_minor; count];
        let mut remaining = deposit_minor - min_minor * n;
        if remaining == 0 {
            return amounts;
        }

        let weights: Vec<f64> = (0..count).map(|_| rng.next_float()).collect();
        let total_weight: f64 = weights.iter().sum();
        let pool = remaining;

        if total_weight > 0.0 {
            for (amount, weight) in amounts.iter_mut().zip(&weights) {
                let share = (weight / total_weight * pool as f64).floor() as u64;
                let headroom = max_minor.saturating_sub(*amount);
                let add = share.min(headroom).min(remaining);
                *amount += add;
                remaining -= add;
            }
        }

        if remaining > 0 {
            let last = count - 1;
            let add = max_minor.saturating_sub(amounts[last]).min(remaining);
            amounts[last] += add;
            remaining -= add;
        }

        for amount in amounts.iter_mut() {
            if remaining == 0 {
                break;
            }
            let add = max_minor.saturating_sub(*amount).min(remaining);
            *amount += add;
            remaining -= add;
        }

        // Caps cannot absorb the deposit; the exact sum takes precedence.
        if remaining > 0 {
            warn!(
                deposit_minor,
                slots = count,
                overflow = remaining,
                "Reward caps saturated; assigning overflow to last slot"
            );
            amounts[count - 1] += remaining;
        }

        amounts
    }
}

impl Default for RewardScheduleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a schedule with the product configuration.
pub fn generate(seed: &str, duration: u32, deposit_minor: u64) -> RewardSchedule {
    RewardScheduleGenerator::new().generate(seed, duration, deposit_minor)
}

/// Generate a schedule with a custom configuration.
pub fn generate_with_config(
    seed: &str,
    duration: u32,
    deposit_minor: u64,
    config: &ScheduleConfig,
) -> RewardSchedule {
    RewardScheduleGenerator::with_config(config.clone()).generate(seed, duration, deposit_minor)
}
