//! Property tests: the day state machine keeps statuses write-once, reveals
//! monotonic, and every past day resolved, under arbitrary call sequences.

use chrono::NaiveDate;
use habitstake_core::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Op {
    CheckIn,
    Miss,
    Reveal(u32),
    Reconcile,
    /// Move the clock forward by 0..=3 days
    Advance(i64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::CheckIn),
        1 => Just(Op::Miss),
        2 => (0u32..35).prop_map(Op::Reveal),
        1 => Just(Op::Reconcile),
        3 => (0i64..=3).prop_map(Op::Advance),
    ]
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn new_cycle(duration: u32, clock: &FixedClock) -> CommitmentCycle {
    CommitmentCycle::initialize(
        ContractTerms::new("prop-contract", "walk", start(), duration, 10_000),
        &ScheduleConfig::default(),
        CycleConfig::default(),
        clock,
    )
}

/// Apply an op and reconcile, the way a session resumes each day.
fn apply(cycle: &mut CommitmentCycle, clock: &mut FixedClock, op: &Op) {
    match op {
        Op::CheckIn => {
            cycle.complete_check_in(clock);
        }
        Op::Miss => {
            cycle.mark_day_missed(clock);
        }
        Op::Reveal(day) => {
            cycle.mark_day_revealed(*day, clock);
        }
        Op::Reconcile => {
            cycle.auto_mark_missed_days(clock);
        }
        Op::Advance(days) => {
            clock.advance_days(*days);
            cycle.auto_mark_missed_days(clock);
        }
    }
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Once resolved, a day's status and captured reward never change; once
    /// revealed, it stays revealed with the same timestamp.
    #[test]
    fn status_write_once_and_reveal_monotonic(
        duration in 7u32..=30,
        ops in prop::collection::vec(arb_op(), 1..80),
    ) {
        let mut clock = FixedClock::on(start());
        let mut cycle = new_cycle(duration, &clock);

        for op in &ops {
            let before = cycle.snapshot();
            apply(&mut cycle, &mut clock, op);
            let after = cycle.snapshot();

            for (old, new) in before.days.iter().zip(&after.days) {
                if old.status.is_resolved() {
                    prop_assert_eq!(old.status, new.status);
                    prop_assert_eq!(old.reward_minor, new.reward_minor);
                    prop_assert_eq!(old.resolved_at, new.resolved_at);
                }
                if old.revealed {
                    prop_assert!(new.revealed);
                    prop_assert_eq!(old.revealed_at, new.revealed_at);
                }
            }
        }
    }

    /// After reconciliation every day before today has a status.
    #[test]
    fn past_days_are_always_resolved(
        duration in 7u32..=30,
        ops in prop::collection::vec(arb_op(), 1..80),
    ) {
        let mut clock = FixedClock::on(start());
        let mut cycle = new_cycle(duration, &clock);

        for op in &ops {
            apply(&mut cycle, &mut clock, op);
            let current = cycle.current_day_number(&clock);
            for (day, slot) in cycle.days() {
                if day < current {
                    prop_assert!(slot.status.is_resolved(), "day {} unresolved on day {}", day, current);
                }
            }
        }
    }

    /// Unrevealed days are strictly in the past, and the money adds up.
    #[test]
    fn derived_queries_are_consistent(
        duration in 7u32..=30,
        ops in prop::collection::vec(arb_op(), 1..80),
    ) {
        let mut clock = FixedClock::on(start());
        let mut cycle = new_cycle(duration, &clock);

        for op in &ops {
            apply(&mut cycle, &mut clock, op);
        }

        let current = cycle.current_day_number(&clock);
        prop_assert!(cycle.unrevealed_days(current).iter().all(|d| *d < current));

        let earned = cycle.total_earned();
        let forfeited = cycle.total_forfeited();
        prop_assert!(earned + forfeited <= 10_000);
        prop_assert_eq!(cycle.locked_amount(), 10_000 - earned - forfeited);
        prop_assert!(cycle.current_streak() <= cycle.longest_streak());
    }

    /// Revealing everything at the end accounts for the whole deposit.
    #[test]
    fn fully_revealed_cycle_matches_simulation(
        duration in 7u32..=30,
        ops in prop::collection::vec(arb_op(), 1..80),
    ) {
        let mut clock = FixedClock::on(start());
        let mut cycle = new_cycle(duration, &clock);
        for op in &ops {
            apply(&mut cycle, &mut clock, op);
        }

        clock.advance_days(i64::from(duration) + 1);
        cycle.auto_mark_missed_days(&clock);
        for day in 1..=duration {
            cycle.mark_day_revealed(day, &clock);
        }

        let completed: Vec<u32> = cycle
            .days()
            .filter(|(_, slot)| slot.status == DayStatus::Completed)
            .map(|(day, _)| day)
            .collect();
        let simulated = simulate(cycle.schedule(), completed);

        prop_assert_eq!(cycle.locked_amount(), 0);
        prop_assert_eq!(cycle.total_earned(), simulated.total_recovered_minor);
        prop_assert_eq!(cycle.total_forfeited(), simulated.total_forfeited_minor);
    }
}

// ---------------------------------------------------------------------------
// Lifecycle walkthrough
// ---------------------------------------------------------------------------

#[test]
fn two_week_cycle_with_persistence() {
    let repo = CycleRepository::new(InMemoryStore::new());
    let mut clock = FixedClock::on(start());
    let terms = ContractTerms::new("contract-123", "journal", start(), 14, 10_000);
    terms.validate(&ContractLimits::default()).unwrap();

    let mut cycle = CommitmentCycle::initialize(
        terms,
        &ScheduleConfig::default(),
        CycleConfig::default(),
        &clock,
    );
    repo.activate(&cycle).unwrap();

    // Days 1-3 done, app closed on days 4-5, back on day 6.
    for _ in 0..3 {
        assert!(cycle.complete_check_in(&clock).is_applied());
        repo.save(&cycle).unwrap();
        clock.advance_days(1);
    }
    clock.advance_days(2);

    let mut cycle = repo.load_active(&clock).unwrap().unwrap();
    assert_eq!(cycle.current_day_number(&clock), 6);
    assert_eq!(cycle.day(4).unwrap().status, DayStatus::Missed);
    assert_eq!(cycle.day(5).unwrap().status, DayStatus::Missed);
    assert_eq!(cycle.unrevealed_days(6), vec![1, 2, 3, 4, 5]);

    // Reveal in order; forfeits only count once shown.
    let earned_before = cycle.total_earned();
    for day in cycle.unrevealed_days(6) {
        cycle.mark_day_revealed(day, &clock);
    }
    assert_eq!(cycle.total_earned(), earned_before);
    let expected_forfeit: u64 = [4, 5]
        .iter()
        .map(|d| cycle.schedule().reward_or_zero(*d))
        .sum();
    assert_eq!(cycle.total_forfeited(), expected_forfeit);
    assert_eq!(cycle.current_streak(), 0);
    assert_eq!(cycle.longest_streak(), 3);

    let summary = cycle.summary(&clock);
    assert_eq!(summary.completed_days, 3);
    assert_eq!(summary.missed_days, 2);
    assert_eq!(
        summary.locked_minor,
        10_000 - summary.earned_minor - summary.forfeited_minor
    );
}
