use chrono::{DateTime, Utc};

use crate::{
    Account, Clock, LedgerConfig, MemoryStore, RateTable, ResultEngine, Session, SystemClock,
    store::{self, ACCOUNTS_KEY, CURRENT_SESSION_KEY, KeyValueStore, account_session_key},
};

mod auth;
mod mining;
mod referrals;
mod rewards;
mod swap;

pub use swap::SwapReceipt;

/// Session & ledger manager.
///
/// Owns the logged-in [`Session`] (if any) and mirrors every change to the
/// injected [`KeyValueStore`]. All mutations take `&mut self`; share it
/// behind a `tokio::sync::Mutex` when a [`MiningTimer`](crate::MiningTimer)
/// needs to reach it.
#[derive(Debug)]
pub struct Engine<S, C = SystemClock> {
    store: S,
    clock: C,
    config: LedgerConfig,
    session: Option<Session>,
}

impl Engine<MemoryStore, SystemClock> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<MemoryStore, SystemClock> {
        EngineBuilder::default()
    }
}

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    /// The logged-in session, if any.
    pub fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn rates(&self) -> &RateTable {
        &self.config.rates
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Every registered account, in registration order.
    pub async fn list_accounts(&self) -> ResultEngine<Vec<Account>> {
        Ok(store::load_json(&self.store, ACCOUNTS_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn save_accounts(&self, accounts: &[Account]) -> ResultEngine<()> {
        store::save_json(&self.store, ACCOUNTS_KEY, accounts).await
    }

    /// Writes `session` under the current-session key and its per-account
    /// key, then makes it the in-memory session.
    async fn establish(&mut self, session: Session) -> ResultEngine<()> {
        store::save_json(&self.store, CURRENT_SESSION_KEY, &session).await?;
        store::save_json(
            &self.store,
            &account_session_key(session.account.id),
            &session,
        )
        .await?;
        self.session = Some(session);
        Ok(())
    }

    /// Like [`Self::establish`], and also copies the session balances into
    /// the account collection when they changed.
    async fn commit(&mut self, session: Session) -> ResultEngine<()> {
        let changed = self
            .session
            .as_ref()
            .is_none_or(|current| current.account.balances != session.account.balances);
        if changed {
            let mut accounts = self.list_accounts().await?;
            if let Some(record) = accounts.iter_mut().find(|a| a.id == session.account.id) {
                record.balances = session.account.balances;
                self.save_accounts(&accounts).await?;
            } else {
                tracing::warn!(
                    account_id = %session.account.id,
                    "session account missing from the account collection"
                );
            }
        }
        self.establish(session).await
    }
}

/// The builder for `Engine`
pub struct EngineBuilder<S, C> {
    store: S,
    clock: C,
    config: LedgerConfig,
}

impl Default for EngineBuilder<MemoryStore, SystemClock> {
    fn default() -> Self {
        Self {
            store: MemoryStore::new(),
            clock: SystemClock,
            config: LedgerConfig::default(),
        }
    }
}

impl<S, C> EngineBuilder<S, C> {
    /// Pass the storage backend
    pub fn store<S2: KeyValueStore>(self, store: S2) -> EngineBuilder<S2, C> {
        EngineBuilder {
            store,
            clock: self.clock,
            config: self.config,
        }
    }

    /// Pass the time source
    pub fn clock<C2: Clock>(self, clock: C2) -> EngineBuilder<S, C2> {
        EngineBuilder {
            store: self.store,
            clock,
            config: self.config,
        }
    }

    /// Pass rewards, durations and rates
    pub fn config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }
}

impl<S: KeyValueStore, C: Clock> EngineBuilder<S, C> {
    /// Construct `Engine`, resuming the session persisted by a previous run.
    pub async fn build(self) -> ResultEngine<Engine<S, C>> {
        let session: Option<Session> =
            store::load_json(&self.store, CURRENT_SESSION_KEY).await?;
        if let Some(session) = &session {
            tracing::info!(email = %session.account.email, "resumed session");
        }
        Ok(Engine {
            store: self.store,
            clock: self.clock,
            config: self.config,
            session,
        })
    }
}
