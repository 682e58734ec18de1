//! The module contains `Account` and its balances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, ResultEngine};

/// The three balances of an account.
///
/// Balances never go below zero: every debit goes through [`Balances::debit`],
/// which refuses to overdraw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub ranger_ai: Money,
    pub usdt: Money,
    pub bnb: Money,
}

impl Balances {
    pub fn new(ranger_ai: Money, usdt: Money, bnb: Money) -> Self {
        Self {
            ranger_ai,
            usdt,
            bnb,
        }
    }

    #[must_use]
    pub fn get(&self, currency: Currency) -> Money {
        match currency {
            Currency::RangerAi => self.ranger_ai,
            Currency::Usdt => self.usdt,
            Currency::Bnb => self.bnb,
        }
    }

    fn slot_mut(&mut self, currency: Currency) -> &mut Money {
        match currency {
            Currency::RangerAi => &mut self.ranger_ai,
            Currency::Usdt => &mut self.usdt,
            Currency::Bnb => &mut self.bnb,
        }
    }

    /// Adds `amount` to the `currency` balance.
    pub fn credit(&mut self, currency: Currency, amount: Money) -> ResultEngine<()> {
        let slot = self.slot_mut(currency);
        *slot = slot
            .checked_add(amount)
            .ok_or_else(|| EngineError::Validation(format!("{currency} balance overflow")))?;
        Ok(())
    }

    /// Removes `amount` from the `currency` balance, failing if the balance
    /// is lower than `amount`.
    pub fn debit(&mut self, currency: Currency, amount: Money) -> ResultEngine<()> {
        let slot = self.slot_mut(currency);
        if *slot < amount {
            return Err(EngineError::InsufficientBalance(format!(
                "you have {} {currency}, need {amount}",
                slot.to_fixed(currency.display_digits())
            )));
        }
        *slot -= amount;
        Ok(())
    }
}

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// Email as entered at registration (trimmed). Lookups compare the
    /// normalized form, see [`crate::normalize_email`].
    pub email: String,
    /// PHC string produced by [`crate::password::hash_password`].
    pub password_hash: String,
    pub referral_code: String,
    /// The referral code given at registration, if any. Kept even when it
    /// did not match an account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    pub balances: Balances,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        email: String,
        password_hash: String,
        referral_code: String,
        referred_by: Option<String>,
        balances: Balances,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            referral_code,
            referred_by,
            balances,
            created_at,
        }
    }

    /// Returns `true` if this account registered with `code`.
    #[must_use]
    pub fn was_referred_by(&self, code: &str) -> bool {
        self.referred_by.as_deref() == Some(code)
    }
}
