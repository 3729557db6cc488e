//! Commitment cycle state machine.
//!
//! One [`CommitmentCycle`] exists per active contract per session. It owns a
//! dense slot per contract day; each slot moves `Unresolved → Completed` or
//! `Unresolved → Missed` exactly once, and independently `revealed: false →
//! true` exactly once.
//!
//! ```text
//!            complete_check_in / apply_verified_days
//!   Unresolved ───────────────────────────────────> Completed ─┐
//!       │                                                       │ mark_day_revealed
//!       │  mark_day_missed / auto_mark_missed_days              v
//!       └─────────────────────────────────────────> Missed ──> revealed
//! ```
//!
//! Mutators never fail. When a precondition does not hold they leave the
//! cycle untouched and report [`Transition::Ignored`] with the reason.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{CycleConfig, ScheduleConfig};
use crate::types::{ContractTerms, DaySlot, DayStatus, RewardSchedule};

/// Day number of `date` in a contract starting on `start`.
///
/// Day 1 is the start date; dates before the start map to 0.
pub fn day_number_for(start: NaiveDate, date: NaiveDate) -> u32 {
    let elapsed = date.signed_duration_since(start).num_days();
    if elapsed < 0 {
        0
    } else {
        u32::try_from(elapsed + 1).unwrap_or(u32::MAX)
    }
}

/// Calendar date of `day` in a contract starting on `start`.
pub fn date_for_day(start: NaiveDate, day: u32) -> NaiveDate {
    start + chrono::Duration::days(i64::from(day.max(1)) - 1)
}

/// Result of a mutator call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Applied,
    Ignored(IgnoredReason),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Why a mutator left the cycle unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoredReason {
    /// Today is before day 1
    NotStarted,
    /// Today is after the last contract day
    CycleEnded,
    /// The day already has a status
    AlreadyResolved,
    /// The day has no status yet, so there is nothing to reveal
    NotResolved,
    /// The day was revealed earlier
    AlreadyRevealed,
    /// The day number is outside the contract
    UnknownDay,
    /// Only today or still-open past days can be completed
    NotVerifiable,
}

/// What a reveal shows for one resolved day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealOutcome {
    pub day: u32,
    pub status: DayStatus,
    pub had_reward: bool,
    pub recovered_minor: u64,
    pub forfeited_minor: u64,
}

/// Point-in-time view of a cycle's progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub contract_id: String,
    pub current_day: u32,
    pub duration: u32,
    pub completed_days: u32,
    pub missed_days: u32,
    pub unresolved_days: u32,
    /// Completed share of resolved days, 0.0 when nothing is resolved
    pub completion_rate: f64,
    pub earned_minor: u64,
    pub forfeited_minor: u64,
    pub locked_minor: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub finished: bool,
}

/// Persistable form of a cycle. The schedule is not stored; it is
/// regenerated from the contract terms on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSnapshot {
    pub terms: ContractTerms,
    #[serde(default)]
    pub config: CycleConfig,
    pub days: Vec<DaySlot>,
}

/// Day-by-day state for one active contract.
#[derive(Clone, Debug)]
pub struct CommitmentCycle {
    terms: ContractTerms,
    schedule: RewardSchedule,
    config: CycleConfig,
    /// Index `day - 1`
    slots: Vec<DaySlot>,
}

impl CommitmentCycle {
    /// Create a cycle with every day unresolved. Does not reconcile.
    pub fn new(terms: ContractTerms, schedule: RewardSchedule, config: CycleConfig) -> Self {
        let slots = vec![DaySlot::default(); terms.duration_days as usize];
        Self {
            terms,
            schedule,
            config,
            slots,
        }
    }

    /// Create the cycle for a newly active contract and reconcile skipped days.
    pub fn initialize(
        terms: ContractTerms,
        schedule_config: &ScheduleConfig,
        config: CycleConfig,
        clock: &dyn Clock,
    ) -> Self {
        let schedule = terms.schedule(schedule_config);
        let mut cycle = Self::new(terms, schedule, config);
        cycle.auto_mark_missed_days(clock);
        cycle
    }

    /// Rebuild a stored cycle and reconcile days skipped since it was saved.
    pub fn restore(
        snapshot: CycleSnapshot,
        schedule_config: &ScheduleConfig,
        clock: &dyn Clock,
    ) -> Self {
        let schedule = snapshot.terms.schedule(schedule_config);
        let mut slots = snapshot.days;
        let duration = snapshot.terms.duration_days as usize;
        if slots.len() != duration {
            warn!(
                contract = %snapshot.terms.contract_id,
                stored_days = slots.len(),
                duration,
                "Stored day count does not match contract duration; resizing"
            );
        }
        slots.resize(duration, DaySlot::default());
        let mut cycle = Self {
            terms: snapshot.terms,
            schedule,
            config: snapshot.config,
            slots,
        };
        cycle.auto_mark_missed_days(clock);
        cycle
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            terms: self.terms.clone(),
            config: self.config.clone(),
            days: self.slots.clone(),
        }
    }

    pub fn terms(&self) -> &ContractTerms {
        &self.terms
    }

    pub fn schedule(&self) -> &RewardSchedule {
        &self.schedule
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    pub fn contract_id(&self) -> &str {
        &self.terms.contract_id
    }

    pub fn duration(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Slot for `day`, if the day is within the contract.
    pub fn day(&self, day: u32) -> Option<&DaySlot> {
        let idx = day.checked_sub(1)? as usize;
        self.slots.get(idx)
    }

    /// All slots with their day numbers, in day order.
    pub fn days(&self) -> impl Iterator<Item = (u32, &DaySlot)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| (idx as u32 + 1, slot))
    }

    fn slot_mut(&mut self, day: u32) -> Option<&mut DaySlot> {
        let idx = day.checked_sub(1)? as usize;
        self.slots.get_mut(idx)
    }

    /// Current day number: 0 before the start, may exceed the duration after
    /// the end. Always derived from the clock, never stored.
    pub fn current_day_number(&self, clock: &dyn Clock) -> u32 {
        day_number_for(self.terms.start_date, clock.today())
    }

    /// Whether every contract day is in the past.
    pub fn is_finished(&self, clock: &dyn Clock) -> bool {
        self.current_day_number(clock) > self.duration()
    }

    // --- Mutators ---

    /// Record today's habit as done.
    pub fn complete_check_in(&mut self, clock: &dyn Clock) -> Transition {
        let day = match self.today_in_cycle(clock) {
            Ok(day) => day,
            Err(reason) => return Transition::Ignored(reason),
        };
        self.resolve(day, DayStatus::Completed, clock)
    }

    /// Record today's habit as not done.
    pub fn mark_day_missed(&mut self, clock: &dyn Clock) -> Transition {
        let day = match self.today_in_cycle(clock) {
            Ok(day) => day,
            Err(reason) => return Transition::Ignored(reason),
        };
        self.resolve(day, DayStatus::Missed, clock)
    }

    /// Mark every unresolved day before today as missed, except the most
    /// recent `verification_grace_days`. Returns the days that were marked.
    pub fn auto_mark_missed_days(&mut self, clock: &dyn Clock) -> Vec<u32> {
        let current = self.current_day_number(clock);
        let cutoff = self.grace_cutoff(current);
        let last = cutoff.saturating_sub(1).min(self.duration());

        let mut marked = Vec::new();
        for day in 1..=last {
            if self.resolve(day, DayStatus::Missed, clock).is_applied() {
                marked.push(day);
            }
        }

        if !marked.is_empty() {
            info!(
                contract = %self.terms.contract_id,
                current_day = current,
                marked = marked.len(),
                "Backfilled skipped days as missed"
            );
        }
        marked
    }

    /// Expose a resolved day's outcome. Never touches any other day.
    pub fn mark_day_revealed(&mut self, day: u32, clock: &dyn Clock) -> Transition {
        let contract = self.terms.contract_id.clone();
        let Some(slot) = self.slot_mut(day) else {
            return Transition::Ignored(IgnoredReason::UnknownDay);
        };
        if !slot.status.is_resolved() {
            return Transition::Ignored(IgnoredReason::NotResolved);
        }
        if slot.revealed {
            return Transition::Ignored(IgnoredReason::AlreadyRevealed);
        }
        slot.revealed = true;
        slot.revealed_at = Some(clock.now());
        info!(contract = %contract, day, status = ?slot.status, "Day revealed");
        Transition::Applied
    }

    /// Feed externally verified days back through the normal write path.
    ///
    /// Today is completed via [`complete_check_in`](Self::complete_check_in);
    /// past days are completed only inside the verification grace window and
    /// only while still unresolved. Returns the days that changed.
    pub fn apply_verified_days(&mut self, days: &[u32], clock: &dyn Clock) -> Vec<u32> {
        let current = self.current_day_number(clock);
        let cutoff = self.grace_cutoff(current);
        let mut applied = Vec::new();
        for &day in days {
            let transition = if day == current {
                self.complete_check_in(clock)
            } else if day >= 1 && day >= cutoff && day < current {
                self.resolve(day, DayStatus::Completed, clock)
            } else {
                Transition::Ignored(IgnoredReason::NotVerifiable)
            };
            debug!(
                contract = %self.terms.contract_id,
                day,
                transition = ?transition,
                "Verified day applied"
            );
            if transition.is_applied() {
                applied.push(day);
            }
        }
        applied
    }

    /// First day that is still open for verification on `current`.
    fn grace_cutoff(&self, current: u32) -> u32 {
        current.saturating_sub(self.config.verification_grace_days)
    }

    fn today_in_cycle(&self, clock: &dyn Clock) -> Result<u32, IgnoredReason> {
        match self.current_day_number(clock) {
            0 => Err(IgnoredReason::NotStarted),
            day if day > self.duration() => Err(IgnoredReason::CycleEnded),
            day => Ok(day),
        }
    }

    /// Write-once status update. Completed days capture their reward here.
    fn resolve(&mut self, day: u32, status: DayStatus, clock: &dyn Clock) -> Transition {
        let reward = self.schedule.reward_or_zero(day);
        let contract = self.terms.contract_id.clone();
        let Some(slot) = self.slot_mut(day) else {
            return Transition::Ignored(IgnoredReason::UnknownDay);
        };
        if slot.status.is_resolved() {
            return Transition::Ignored(IgnoredReason::AlreadyResolved);
        }

        slot.status = status;
        slot.resolved_at = Some(clock.now());
        slot.reward_minor = match status {
            DayStatus::Completed => Some(reward),
            _ => None,
        };

        info!(contract = %contract, day, status = ?status, "Day resolved");
        Transition::Applied
    }

    // --- Derived queries ---

    /// Resolved days before `current_day` whose outcome is not yet shown.
    pub fn unrevealed_days(&self, current_day: u32) -> Vec<u32> {
        self.days()
            .filter(|(day, slot)| *day < current_day && slot.status.is_resolved() && !slot.revealed)
            .map(|(day, _)| day)
            .collect()
    }

    /// Days worth asking the activity feed about: today and the grace
    /// window, restricted to unrevealed days that can still be completed.
    pub fn verification_candidates(&self, clock: &dyn Clock) -> Vec<u32> {
        let current = self.current_day_number(clock);
        let cutoff = self.grace_cutoff(current);
        self.days()
            .filter(|(day, _)| *day >= cutoff && *day <= current)
            .filter(|(_, slot)| slot.status == DayStatus::Unresolved && !slot.revealed)
            .map(|(day, _)| day)
            .collect()
    }

    /// Rewards captured on completed days, revealed or not.
    pub fn total_earned(&self) -> u64 {
        self.slots
            .iter()
            .filter(|slot| slot.status == DayStatus::Completed)
            .filter_map(|slot| slot.reward_minor)
            .sum()
    }

    /// Scheduled rewards of missed days whose outcome has been shown.
    pub fn total_forfeited(&self) -> u64 {
        self.days()
            .filter(|(_, slot)| slot.status == DayStatus::Missed && slot.revealed)
            .map(|(day, _)| self.schedule.reward_or_zero(day))
            .sum()
    }

    /// Completed days in a row, counting back from the latest resolved day.
    pub fn current_streak(&self) -> u32 {
        let Some(latest) = self.slots.iter().rposition(|slot| slot.status.is_resolved()) else {
            return 0;
        };
        self.slots[..=latest]
            .iter()
            .rev()
            .take_while(|slot| slot.status == DayStatus::Completed)
            .count() as u32
    }

    /// Longest run of consecutive completed days.
    pub fn longest_streak(&self) -> u32 {
        let mut longest = 0;
        let mut run = 0;
        for slot in &self.slots {
            if slot.status == DayStatus::Completed {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }
        longest
    }

    /// Deposit value not yet earned or shown as forfeited.
    pub fn locked_amount(&self) -> u64 {
        self.terms
            .deposit_minor
            .saturating_sub(self.total_earned())
            .saturating_sub(self.total_forfeited())
    }

    /// What revealing `day` shows, if the day is resolved.
    pub fn reveal_outcome(&self, day: u32) -> Option<RevealOutcome> {
        let slot = self.day(day)?;
        let scheduled = self.schedule.reward_for(day);
        match slot.status {
            DayStatus::Unresolved => None,
            DayStatus::Completed => Some(RevealOutcome {
                day,
                status: slot.status,
                had_reward: scheduled.is_some(),
                recovered_minor: slot.reward_minor.unwrap_or(0),
                forfeited_minor: 0,
            }),
            DayStatus::Missed => Some(RevealOutcome {
                day,
                status: slot.status,
                had_reward: scheduled.is_some(),
                recovered_minor: 0,
                forfeited_minor: scheduled.unwrap_or(0),
            }),
        }
    }

    pub fn summary(&self, clock: &dyn Clock) -> CycleSummary {
        let count = |status: DayStatus| self.slots.iter().filter(|s| s.status == status).count() as u32;
        let completed_days = count(DayStatus::Completed);
        let missed_days = count(DayStatus::Missed);
        let resolved = completed_days + missed_days;

        CycleSummary {
            contract_id: self.terms.contract_id.clone(),
            current_day: self.current_day_number(clock),
            duration: self.duration(),
            completed_days,
            missed_days,
            unresolved_days: self.duration() - resolved,
            completion_rate: if resolved == 0 {
                0.0
            } else {
                completed_days as f64 / resolved as f64
            },
            earned_minor: self.total_earned(),
            forfeited_minor: self.total_forfeited(),
            locked_minor: self.locked_amount(),
            current_streak: self.current_streak(),
            longest_streak: self.longest_streak(),
            finished: self.is_finished(clock),
        }
    }
}
