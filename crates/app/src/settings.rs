//! Handles settings for the application. Configuration is read from
//! `settings.toml` (optional) and `RANGER__*` environment variables.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [database]
//! sqlite = "./ranger.db"   # or: database = "memory"
//!
//! [ledger]
//! mining_duration_secs = 86400
//! mining_reward = "0.5"
//!
//! [rates]
//! RangerAI_USDT = "2.62"
//! ```
use std::collections::BTreeMap;

use chrono::TimeDelta;
use config::{Config, ConfigError, Environment, File};
use engine::{Balances, Currency, LedgerConfig, Money, Rate};
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("./ranger.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

/// Ledger constants. Amounts are decimal strings so they keep full
/// precision; unset fields fall back to the engine defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub mining_duration_secs: Option<i64>,
    pub mining_reward: Option<String>,
    pub referrer_bonus: Option<String>,
    pub referred_bonus: Option<String>,
    pub ad_reward: Option<String>,
    pub ad_watch_duration_secs: Option<i64>,
    pub starting_ranger_ai: Option<String>,
    pub starting_usdt: Option<String>,
    pub starting_bnb: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub ledger: Ledger,
    /// `FROM_TO = "rate"` overrides, e.g. `RangerAI_USDT = "2.62"`.
    pub rates: BTreeMap<String, String>,
}

impl Settings {
    pub fn new(path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(path.is_some()))
            .add_source(Environment::with_prefix("RANGER").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Engine configuration: defaults overridden by whatever is set here.
    pub fn ledger_config(&self) -> Result<LedgerConfig> {
        let mut config = LedgerConfig::default();
        let ledger = &self.ledger;

        if let Some(secs) = ledger.mining_duration_secs {
            config.mining_duration = positive_duration("mining_duration_secs", secs)?;
        }
        if let Some(secs) = ledger.ad_watch_duration_secs {
            config.ad_watch_duration = positive_duration("ad_watch_duration_secs", secs)?;
        }

        let amount = |field: &str, value: &Option<String>, default: Money| -> Result<Money> {
            match value {
                Some(raw) => parse_amount(field, raw),
                None => Ok(default),
            }
        };
        config.mining_reward = amount("mining_reward", &ledger.mining_reward, config.mining_reward)?;
        config.referrer_bonus =
            amount("referrer_bonus", &ledger.referrer_bonus, config.referrer_bonus)?;
        config.referred_bonus =
            amount("referred_bonus", &ledger.referred_bonus, config.referred_bonus)?;
        config.ad_reward = amount("ad_reward", &ledger.ad_reward, config.ad_reward)?;

        let start = config.starting_balances;
        config.starting_balances = Balances::new(
            amount("starting_ranger_ai", &ledger.starting_ranger_ai, start.ranger_ai)?,
            amount("starting_usdt", &ledger.starting_usdt, start.usdt)?,
            amount("starting_bnb", &ledger.starting_bnb, start.bnb)?,
        );

        for (pair, raw) in &self.rates {
            let (from, to) = pair
                .split_once('_')
                .ok_or_else(|| AppError::Settings(format!("invalid rate key: {pair}")))?;
            let from = Currency::try_from(from)?;
            let to = Currency::try_from(to)?;
            let rate: Rate = raw
                .parse()
                .map_err(|err| AppError::Settings(format!("rates.{pair}: {err}")))?;
            config.rates.set(from, to, rate)?;
        }

        Ok(config)
    }
}

fn positive_duration(field: &str, secs: i64) -> Result<TimeDelta> {
    if secs <= 0 {
        return Err(AppError::Settings(format!("ledger.{field} must be > 0")));
    }
    TimeDelta::try_seconds(secs)
        .ok_or_else(|| AppError::Settings(format!("ledger.{field} is out of range")))
}

fn parse_amount(field: &str, raw: &str) -> Result<Money> {
    let value: Money = raw
        .parse()
        .map_err(|err| AppError::Settings(format!("ledger.{field}: {err}")))?;
    if value.is_negative() {
        return Err(AppError::Settings(format!("ledger.{field} must be >= 0")));
    }
    Ok(value)
}
