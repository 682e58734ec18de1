//! Tunable constants of the ledger.

use chrono::TimeDelta;

use crate::{Balances, Money, RateTable};

/// Rewards, bonuses, durations and rates used by the [`Engine`](crate::Engine).
///
/// `Default` returns the values the application has always shipped with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    pub mining_duration: TimeDelta,
    pub mining_reward: Money,
    pub referrer_bonus: Money,
    pub referred_bonus: Money,
    pub ad_reward: Money,
    /// How long a client must show an ad before asking for the reward. The
    /// engine does not enforce it.
    pub ad_watch_duration: TimeDelta,
    pub starting_balances: Balances,
    pub rates: RateTable,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            mining_duration: TimeDelta::hours(24),
            mining_reward: Money::from_minor(50_000_000),
            referrer_bonus: Money::from_units(1),
            referred_bonus: Money::from_minor(50_000_000),
            ad_reward: Money::from_minor(5_000_000),
            ad_watch_duration: TimeDelta::seconds(10),
            starting_balances: Balances::new(Money::ZERO, Money::from_units(1), Money::ZERO),
            rates: RateTable::default(),
        }
    }
}
