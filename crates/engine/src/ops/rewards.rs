use crate::{Clock, Currency, EngineError, Money, ResultEngine, store::KeyValueStore};

use super::Engine;

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    /// Credits the ad reward to the logged-in account.
    ///
    /// The engine does not check that an ad was shown for
    /// `ad_watch_duration`; callers are trusted to have waited.
    pub async fn watch_ad_and_earn(&mut self) -> ResultEngine<Money> {
        let mut session = self.session.clone().ok_or(EngineError::NotLoggedIn)?;
        let reward = self.config.ad_reward;
        session.account.balances.credit(Currency::RangerAi, reward)?;
        tracing::info!(account_id = %session.account.id, %reward, "ad reward credited");
        self.commit(session).await?;
        Ok(reward)
    }
}
