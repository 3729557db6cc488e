//! # habitstake-core
//!
//! Commitment cycle core for HabitStake. A user stakes a deposit against a
//! daily habit for a fixed cycle (7 to 30 days); a hidden, seeded reward schedule
//! earmarks some of those days to release fractions of the deposit.
//!
//! - **rng**: deterministic pseudo-random stream from a string seed
//! - **schedule**: pure generator of the hidden reward schedule
//! - **simulation**: replays a schedule against a completion set
//! - **cycle**: the per-contract, day-by-day check-in/reveal state machine
//! - **verification**: maps external activity records onto contract days
//! - **store**: key-value persistence collaborator and cycle repository
//!
//! ## Invariants
//!
//! - The schedule's rewards always sum to the deposit, to the cent.
//! - A day's status is write-once; its reveal flag is monotonic.
//! - Every day before the current day has a resolved status once the cycle is
//!   reconciled (outside the configured verification grace window).
//!
//! ```text
//!   seed ──> SeededRandom ──> generate() ──> RewardSchedule
//!                                               │
//!                   ┌───────────────────────────┼──────────────────┐
//!                   v                           v                  │
//!              simulate()               CommitmentCycle <── apply_verified_days()
//!                                               │                  ^
//!                                               v                  │
//!                                        CycleRepository   find_matching_days()
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod clock;
pub mod config;
pub mod cycle;
pub mod error;
pub mod rng;
pub mod schedule;
pub mod simulation;
pub mod store;
pub mod types;
pub mod verification;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ContractLimits, CycleConfig, ScheduleConfig};
pub use cycle::{
    date_for_day, day_number_for, CommitmentCycle, CycleSnapshot, CycleSummary, IgnoredReason,
    RevealOutcome, Transition,
};
pub use error::{CycleError, Result};
pub use rng::{SeedPurpose, SeededRandom};
pub use schedule::{generate, generate_with_config, RewardScheduleGenerator};
pub use simulation::{simulate, CompletionSet, DayBreakdown, Preset, SimulationResult};
pub use store::{CycleRepository, InMemoryStore, KeyValueStore, StoreError};
pub use types::{format_minor, ContractTerms, DaySlot, DayStatus, RewardSchedule, RewardSlot};
pub use verification::{
    find_matching_days, ActivityFeed, ActivityRecord, ActivityVerifier, FeedError,
    VerificationOutcome,
};
