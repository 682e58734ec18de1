//! Session and ledger manager of the Ranger AI mining simulator.
//!
//! The [`Engine`] holds the logged-in [`Session`] and implements every
//! user-facing operation: registration with referral bonuses, login/logout,
//! the 24 h mining cycle, currency swaps and ad rewards. State is persisted
//! through a [`KeyValueStore`]; time comes from a [`Clock`].

pub use accounts::{Account, Balances};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LedgerConfig;
pub use currency::Currency;
pub use error::EngineError;
pub use mining::{MiningCycle, MiningStatus};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, SwapReceipt};
pub use rates::{Rate, RateTable};
pub use session::Session;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use timer::{MiningTimer, SharedEngine};
pub use util::normalize_email;

mod accounts;
mod clock;
mod config;
mod currency;
mod error;
mod mining;
mod money;
mod ops;
pub mod password;
mod rates;
mod session;
pub mod store;
mod timer;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
