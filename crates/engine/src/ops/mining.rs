use chrono::{DateTime, Utc};

use crate::{Clock, Currency, Money, MiningStatus, ResultEngine, store::KeyValueStore};

use super::Engine;

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    /// Starts a mining cycle for the logged-in account.
    ///
    /// Returns `false` without touching anything when nobody is logged in or
    /// a cycle is already running.
    pub async fn start_mining(&mut self) -> ResultEngine<bool> {
        let Some(mut session) = self.session.clone() else {
            return Ok(false);
        };
        let now = self.clock.now();
        if !session.mining.start(now, self.config.mining_duration) {
            return Ok(false);
        }
        tracing::info!(
            account_id = %session.account.id,
            ends_at = ?session.mining.ends_at,
            "mining started"
        );
        self.commit(session).await?;
        Ok(true)
    }

    /// Pays the mining reward if the running cycle has reached its end.
    ///
    /// Returns the credited amount, or `None` when there was nothing to
    /// claim (no session, idle cycle, or end not reached yet).
    pub async fn claim_rewards(&mut self) -> ResultEngine<Option<Money>> {
        let Some(mut session) = self.session.clone() else {
            return Ok(None);
        };
        let now = self.clock.now();
        if !session.mining.claim(now) {
            return Ok(None);
        }
        let reward = self.config.mining_reward;
        session.account.balances.credit(Currency::RangerAi, reward)?;
        tracing::info!(account_id = %session.account.id, %reward, "mining reward claimed");
        self.commit(session).await?;
        Ok(Some(reward))
    }

    /// End of the running cycle, if any.
    pub fn mining_deadline(&self) -> Option<DateTime<Utc>> {
        self.session.as_ref().and_then(|s| s.mining.deadline())
    }

    /// Progress of the logged-in account's cycle.
    pub fn mining_status(&self) -> Option<MiningStatus> {
        self.session
            .as_ref()
            .map(|s| s.mining.status(self.clock.now()))
    }
}
