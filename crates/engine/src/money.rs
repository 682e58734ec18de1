use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Number of fractional digits kept for every currency.
pub const MINOR_DIGITS: u32 = 8;

/// Minor units in one whole unit of any currency.
pub const MINOR_PER_UNIT: i64 = 10_i64.pow(MINOR_DIGITS);

/// Signed amount represented as an integer number of **minor units**
/// (1e-8 of a unit).
///
/// Use this type for **all** balances, rewards and bonuses to avoid
/// floating-point drift. The same precision is used for every currency; the
/// currency travels next to the amount, never inside it.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let reward = Money::from_minor(5_000_000);
/// assert_eq!(reward.to_string(), "0.05");
/// assert_eq!("0.05".parse::<Money>().unwrap(), reward);
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more than 8 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1_000_000_000);
/// assert_eq!("2,5".parse::<Money>().unwrap().minor(), 250_000_000);
/// assert!("0.000000001".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates a new amount from whole units.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * MINOR_PER_UNIT)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Formats the amount with exactly `digits` fractional digits, rounding
    /// half away from zero.
    #[must_use]
    pub fn to_fixed(self, digits: u8) -> String {
        let digits = u32::from(digits).min(MINOR_DIGITS);
        let step = 10_i128.pow(MINOR_DIGITS - digits);
        let abs = i128::from(self.0).abs();
        let rounded = (abs + step / 2) / step;
        let scale = 10_i128.pow(digits);
        let sign = if self.0 < 0 && rounded != 0 { "-" } else { "" };
        let units = rounded / scale;
        if digits == 0 {
            return format!("{sign}{units}");
        }
        let frac = rounded % scale;
        format!("{sign}{units}.{frac:0width$}", width = digits as usize)
    }
}

impl fmt::Display for Money {
    /// Full precision with trailing zeros trimmed, keeping at least two
    /// fractional digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / MINOR_PER_UNIT.unsigned_abs();
        let frac = abs % MINOR_PER_UNIT.unsigned_abs();
        let mut frac = format!("{frac:08}");
        while frac.len() > 2 && frac.ends_with('0') {
            frac.pop();
        }
        write!(f, "{sign}{units}.{frac}")
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

/// Splits a decimal string into `(negative, integer part, fraction part)`.
///
/// Shared by [`Money`] and [`Rate`](crate::Rate) parsing.
pub(crate) fn split_decimal(s: &str) -> Result<(bool, String, String), EngineError> {
    let invalid = || EngineError::Validation(format!("invalid amount: {s:?}"));

    let trimmed = s.trim();
    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let rest = rest.trim().replace(',', ".");
    if rest.is_empty() {
        return Err(EngineError::Validation("empty amount".to_string()));
    }

    let mut parts = rest.split('.');
    let int_part = parts.next().ok_or_else(invalid)?.to_string();
    let frac_part = parts.next().unwrap_or_default().to_string();
    if parts.next().is_some() {
        return Err(invalid());
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    Ok((negative, int_part, frac_part))
}

/// Combines integer and fraction digits into a fixed-point integer with
/// `scale_digits` fractional digits.
pub(crate) fn to_fixed_point(
    int_part: &str,
    frac_part: &str,
    scale_digits: u32,
) -> Result<i64, EngineError> {
    let overflow = || EngineError::Validation("amount too large".to_string());
    if frac_part.len() > scale_digits as usize {
        return Err(EngineError::Validation(format!(
            "too many decimals (max {scale_digits})"
        )));
    }

    let int_value: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| overflow())?
    };
    let frac_value: i64 = if frac_part.is_empty() {
        0
    } else {
        let padded = format!("{frac_part:0<width$}", width = scale_digits as usize);
        padded.parse().map_err(|_| overflow())?
    };

    int_value
        .checked_mul(10_i64.pow(scale_digits))
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(overflow)
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading
    /// `+`/`-`. Rejects more than 8 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, int_part, frac_part) = split_decimal(s)?;
        let value = to_fixed_point(&int_part, &frac_part, MINOR_DIGITS)?;
        Ok(Money(if negative { -value } else { value }))
    }
}

impl TryFrom<String> for Money {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
