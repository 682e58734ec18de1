//! The mining cycle: a fixed-duration countdown after which a flat reward
//! can be claimed.
//!
//! A cycle is either idle or active. `start` moves it to active, `claim`
//! moves it back to idle once the end time has passed. Cycles repeat
//! without limit.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningCycle {
    pub active: bool,
    pub started_at: Option<DateTime<Utc>>,
    /// Always `started_at + duration` while `started_at` is set.
    pub ends_at: Option<DateTime<Utc>>,
    pub last_claim_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of a cycle, for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiningStatus {
    pub active: bool,
    pub ends_at: Option<DateTime<Utc>>,
    pub remaining: TimeDelta,
    /// Elapsed share of the cycle, 0..=100.
    pub progress_percent: u8,
    pub claimable: bool,
    pub last_claim_at: Option<DateTime<Utc>>,
}

impl MiningCycle {
    /// Starts a new cycle. Returns `false` (and changes nothing) if one is
    /// already running.
    pub fn start(&mut self, now: DateTime<Utc>, duration: TimeDelta) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.started_at = Some(now);
        self.ends_at = Some(now + duration);
        true
    }

    #[must_use]
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        self.active && self.ends_at.is_some_and(|end| now >= end)
    }

    /// Closes the cycle if it is claimable. Returns `true` when the caller
    /// must credit the reward.
    pub fn claim(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_claimable(now) {
            return false;
        }
        self.active = false;
        self.started_at = None;
        self.ends_at = None;
        self.last_claim_at = Some(now);
        true
    }

    /// Deadline of the running cycle, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.ends_at.filter(|_| self.active)
    }

    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        match self.deadline() {
            Some(end) if end > now => end - now,
            _ => TimeDelta::zero(),
        }
    }

    #[must_use]
    pub fn progress_percent(&self, now: DateTime<Utc>) -> u8 {
        let (Some(start), Some(end)) = (self.started_at, self.deadline()) else {
            return 0;
        };
        let total = (end - start).num_milliseconds();
        if total <= 0 {
            return 100;
        }
        let elapsed = (now - start).num_milliseconds().clamp(0, total);
        // elapsed <= total, so the quotient fits in 0..=100.
        u8::try_from(elapsed * 100 / total).unwrap_or(100)
    }

    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> MiningStatus {
        MiningStatus {
            active: self.active,
            ends_at: self.deadline(),
            remaining: self.remaining(now),
            progress_percent: self.progress_percent(now),
            claimable: self.is_claimable(now),
            last_claim_at: self.last_claim_at,
        }
    }
}
