use serde::{Deserialize, Serialize};

use crate::EngineError;

/// One of the three virtual currencies an account holds.
///
/// The serialized form is the canonical code (`RangerAI`, `USDT`, `BNB`) so
/// stored records and CLI input share the same spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "RangerAI")]
    RangerAi,
    #[serde(rename = "USDT")]
    Usdt,
    #[serde(rename = "BNB")]
    Bnb,
}

impl Currency {
    /// Every supported currency, in display order.
    pub const ALL: [Currency; 3] = [Currency::RangerAi, Currency::Usdt, Currency::Bnb];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::RangerAi => "RangerAI",
            Currency::Usdt => "USDT",
            Currency::Bnb => "BNB",
        }
    }

    /// Number of fraction digits shown to users.
    ///
    /// Storage always keeps the full [`Money`](crate::Money) precision; this is
    /// only a presentation hint (USDT reads as dollars and cents).
    #[must_use]
    pub const fn display_digits(self) -> u8 {
        match self {
            Currency::RangerAi | Currency::Bnb => 4,
            Currency::Usdt => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RANGERAI" | "RANGER_AI" | "RANGER" => Ok(Currency::RangerAi),
            "USDT" => Ok(Currency::Usdt),
            "BNB" => Ok(Currency::Bnb),
            other => Err(EngineError::Validation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

impl core::str::FromStr for Currency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::try_from(s)
    }
}
