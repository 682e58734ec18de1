use crate::{Account, Clock, ResultEngine, store::KeyValueStore};

use super::Engine;

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    /// Accounts that registered with `code`.
    pub async fn referrals_of(&self, code: &str) -> ResultEngine<Vec<Account>> {
        let code = code.trim();
        Ok(self
            .list_accounts()
            .await?
            .into_iter()
            .filter(|a| a.was_referred_by(code))
            .collect())
    }

    /// Accounts referred by the logged-in user. Empty when logged out.
    pub async fn my_referrals(&self) -> ResultEngine<Vec<Account>> {
        match &self.session {
            Some(session) => self.referrals_of(&session.account.referral_code).await,
            None => Ok(Vec::new()),
        }
    }
}
