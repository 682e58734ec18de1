//! Fixed conversion rates between the three currencies.
//!
//! The default table reproduces the historical rates of the application.
//! Nothing checks that a configured table is cycle-consistent: overriding
//! one direction of a pair without the other makes round trips lossy (or
//! profitable), and that is accepted.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Currency, EngineError, Money, ResultEngine,
    money::{split_decimal, to_fixed_point},
};

/// Number of fractional digits of a [`Rate`].
pub const RATE_DIGITS: u32 = 9;

const RATE_SCALE: i128 = 10_i128.pow(RATE_DIGITS);

/// A strictly positive conversion factor with 9 fractional digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(i64);

impl Rate {
    /// Builds a rate from its fixed-point representation (`1.0` = `1_000_000_000`).
    pub fn from_scaled(scaled: i64) -> ResultEngine<Self> {
        if scaled <= 0 {
            return Err(EngineError::Validation(
                "rate must be greater than zero".to_string(),
            ));
        }
        Ok(Self(scaled))
    }

    /// Builds `numerator / denominator`, rounded to the nearest representable rate.
    pub fn ratio(numerator: i64, denominator: i64) -> ResultEngine<Self> {
        if denominator == 0 {
            return Err(EngineError::Validation("rate denominator is zero".to_string()));
        }
        let scaled = div_round(i128::from(numerator) * RATE_SCALE, i128::from(denominator));
        let scaled = i64::try_from(scaled)
            .map_err(|_| EngineError::Validation("rate too large".to_string()))?;
        Self::from_scaled(scaled)
    }

    #[must_use]
    pub const fn scaled(self) -> i64 {
        self.0
    }

    /// Converts `amount` with this rate, rounding half away from zero to the
    /// nearest minor unit.
    pub fn convert(self, amount: Money) -> ResultEngine<Money> {
        let product = i128::from(amount.minor()) * i128::from(self.0);
        let minor = div_round(product, RATE_SCALE);
        i64::try_from(minor)
            .map(Money::from_minor)
            .map_err(|_| EngineError::Validation("converted amount too large".to_string()))
    }
}

fn div_round(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) != (denominator < 0) {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / RATE_SCALE as i64;
        let mut frac = format!(
            "{:0width$}",
            self.0 % RATE_SCALE as i64,
            width = RATE_DIGITS as usize
        );
        while frac.len() > 1 && frac.ends_with('0') {
            frac.pop();
        }
        write!(f, "{units}.{frac}")
    }
}

impl FromStr for Rate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, int_part, frac_part) = split_decimal(s)?;
        if negative {
            return Err(EngineError::Validation(
                "rate must be greater than zero".to_string(),
            ));
        }
        Self::from_scaled(to_fixed_point(&int_part, &frac_part, RATE_DIGITS)?)
    }
}

/// Directed conversion rates, keyed by `(from, to)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<(Currency, Currency), Rate>,
}

impl RateTable {
    /// An empty table: every pair is unsupported.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rates: BTreeMap::new(),
        }
    }

    /// Sets (or replaces) the rate for `from -> to`.
    pub fn set(&mut self, from: Currency, to: Currency, rate: Rate) -> ResultEngine<()> {
        if from == to {
            return Err(EngineError::UnsupportedPair(format!(
                "cannot swap {from} for itself"
            )));
        }
        self.rates.insert((from, to), rate);
        Ok(())
    }

    /// Looks up the rate for `from -> to`.
    pub fn rate(&self, from: Currency, to: Currency) -> ResultEngine<Rate> {
        if from == to {
            return Err(EngineError::UnsupportedPair(format!(
                "cannot swap {from} for itself"
            )));
        }
        self.rates.get(&(from, to)).copied().ok_or_else(|| {
            EngineError::UnsupportedPair(format!("swapping {from} to {to} is not supported"))
        })
    }

    /// Iterates over all configured pairs in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, Currency, Rate)> + '_ {
        self.rates.iter().map(|(&(from, to), &rate)| (from, to, rate))
    }
}

impl Default for RateTable {
    /// The historical table: RangerAI/USDT at 2.62, USDT/BNB at 0.002 and
    /// BNB/USDT at 500, with the cross rates derived from those three.
    fn default() -> Self {
        // 2.62, 0.002 and 500 as exact ratios.
        const RANGER_USDT: (i64, i64) = (262, 100);
        const USDT_BNB: (i64, i64) = (2, 1000);
        const BNB_USDT: (i64, i64) = (500, 1);

        let pairs = [
            (Currency::RangerAi, Currency::Usdt, RANGER_USDT),
            (
                Currency::RangerAi,
                Currency::Bnb,
                (RANGER_USDT.0 * USDT_BNB.0, RANGER_USDT.1 * USDT_BNB.1),
            ),
            (Currency::Usdt, Currency::RangerAi, (RANGER_USDT.1, RANGER_USDT.0)),
            (Currency::Usdt, Currency::Bnb, USDT_BNB),
            (
                Currency::Bnb,
                Currency::RangerAi,
                (BNB_USDT.0 * RANGER_USDT.1, BNB_USDT.1 * RANGER_USDT.0),
            ),
            (Currency::Bnb, Currency::Usdt, BNB_USDT),
        ];

        let mut rates = BTreeMap::new();
        for (from, to, (num, den)) in pairs {
            // Constants above are all positive and well inside range.
            if let Ok(rate) = Rate::ratio(num, den) {
                rates.insert((from, to), rate);
            }
        }
        Self { rates }
    }
}
