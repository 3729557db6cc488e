//! Retroactive verification from an external activity feed.
//!
//! The matcher is pure: it maps dated activity records onto contract day
//! numbers and nothing else. Matched days reach the cycle only through
//! [`CommitmentCycle::apply_verified_days`], so each day keeps a single
//! writer. Verification is advisory; feed failures come back as a tagged
//! outcome and never block a manual check-in.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::cycle::{date_for_day, CommitmentCycle};

/// One activity as reported by the external feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    /// Activity kind, e.g. "Run" or "Walk"
    #[serde(rename = "type")]
    pub activity_type: String,
    /// RFC 3339 timestamp in the athlete's local offset
    pub start_timestamp: String,
}

impl ActivityRecord {
    pub fn new(
        id: impl Into<String>,
        activity_type: impl Into<String>,
        start_timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            activity_type: activity_type.into(),
            start_timestamp: start_timestamp.into(),
        }
    }

    /// Local calendar date the activity started on.
    ///
    /// Offset timestamps use the date in their own offset; naive timestamps
    /// and bare dates are taken as already local.
    pub fn local_date(&self) -> Option<NaiveDate> {
        let ts = self.start_timestamp.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.date());
        }
        NaiveDate::parse_from_str(ts, "%Y-%m-%d").ok()
    }
}

/// Contract days among `days_to_check` with at least one allowed activity.
///
/// Callers must pass only currently unrevealed days. Type comparison is
/// case-insensitive. Records with unreadable timestamps are skipped. The
/// result is ascending and unique.
pub fn find_matching_days<S: AsRef<str>>(
    activities: &[ActivityRecord],
    allowed_types: &[S],
    contract_start: NaiveDate,
    days_to_check: &[u32],
) -> Vec<u32> {
    let allowed: BTreeSet<String> = allowed_types
        .iter()
        .map(|t| t.as_ref().to_lowercase())
        .collect();

    let mut by_date: BTreeMap<NaiveDate, Vec<&ActivityRecord>> = BTreeMap::new();
    for activity in activities {
        match activity.local_date() {
            Some(date) => by_date.entry(date).or_default().push(activity),
            None => warn!(
                activity = %activity.id,
                timestamp = %activity.start_timestamp,
                "Skipping activity with unreadable timestamp"
            ),
        }
    }

    let matched: BTreeSet<u32> = days_to_check
        .iter()
        .copied()
        .filter(|&day| day >= 1)
        .filter(|&day| {
            by_date
                .get(&date_for_day(contract_start, day))
                .is_some_and(|records| {
                    records
                        .iter()
                        .any(|r| allowed.contains(&r.activity_type.to_lowercase()))
                })
        })
        .collect();

    debug!(
        activities = activities.len(),
        checked = days_to_check.len(),
        matched = matched.len(),
        "Activity matching complete"
    );

    matched.into_iter().collect()
}

/// Failure reported by the activity feed client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("activity feed not authorized")]
    Unauthorized,

    #[error("activity feed unreachable: {0}")]
    Network(String),

    #[error("activity feed returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Source of activity records between two local dates, inclusive.
///
/// Authentication, retries and token refresh belong to the implementor.
pub trait ActivityFeed {
    fn fetch(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ActivityRecord>, FeedError>;
}

/// Result of a verification pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationOutcome {
    /// Nothing left to verify
    NoCandidates,
    /// The feed answered but no candidate day had an allowed activity
    NoMatches,
    /// Candidate days with an allowed activity, and those the cycle accepted
    Matched { days: Vec<u32>, applied: Vec<u32> },
    /// The feed could not be read; the cycle is unchanged
    FeedUnavailable { reason: String },
}

/// Runs the feed → matcher → cycle loop for one contract.
pub struct ActivityVerifier<F> {
    feed: F,
    allowed_types: Vec<String>,
}

impl<F: ActivityFeed> ActivityVerifier<F> {
    pub fn new<I, S>(feed: F, allowed_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feed,
            allowed_types: allowed_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    /// Verify the cycle's candidate days and apply any matches.
    pub fn verify(&self, cycle: &mut CommitmentCycle, clock: &dyn Clock) -> VerificationOutcome {
        let candidates = cycle.verification_candidates(clock);
        let (Some(&first), Some(&last)) = (candidates.first(), candidates.last()) else {
            return VerificationOutcome::NoCandidates;
        };

        let start = cycle.terms().start_date;
        let activities = match self
            .feed
            .fetch(date_for_day(start, first), date_for_day(start, last))
        {
            Ok(activities) => activities,
            Err(err) => {
                warn!(contract = %cycle.contract_id(), error = %err, "Activity feed unavailable");
                return VerificationOutcome::FeedUnavailable {
                    reason: err.to_string(),
                };
            }
        };

        let days = find_matching_days(&activities, self.allowed_types.as_slice(), start, &candidates);
        if days.is_empty() {
            return VerificationOutcome::NoMatches;
        }

        let applied = cycle.apply_verified_days(&days, clock);
        VerificationOutcome::Matched { days, applied }
    }
}
