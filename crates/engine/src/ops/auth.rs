use crate::{
    Account, Clock, Currency, EngineError, MiningCycle, ResultEngine, Session,
    password::{hash_password, validate_password, verify_password},
    store::{self, CURRENT_SESSION_KEY, KeyValueStore, account_session_key},
    util::{generate_referral_code, normalize_email, normalize_referral_code, validate_email},
};

use super::Engine;

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    /// Creates an account and logs it in.
    ///
    /// When `referral_code` matches an existing account, the referrer gets
    /// `referrer_bonus` and the new account `referred_bonus` (both RangerAI).
    /// A code that matches nobody is kept on the account but pays nothing.
    pub async fn register(
        &mut self,
        email: &str,
        raw_password: &str,
        referral_code: Option<&str>,
    ) -> ResultEngine<Account> {
        let email = validate_email(email)?;
        validate_password(raw_password)?;
        let referred_by = normalize_referral_code(referral_code);

        let mut accounts = self.list_accounts().await?;
        let key = normalize_email(&email);
        if accounts.iter().any(|a| normalize_email(&a.email) == key) {
            return Err(EngineError::Auth("email already registered".to_string()));
        }

        let code = loop {
            let candidate = generate_referral_code();
            if !accounts.iter().any(|a| a.referral_code == candidate) {
                break candidate;
            }
        };

        let mut account = Account::new(
            email,
            hash_password(raw_password)?,
            code,
            referred_by.clone(),
            self.config.starting_balances,
            self.clock.now(),
        );

        if let Some(referred_by) = &referred_by {
            match accounts
                .iter_mut()
                .find(|a| &a.referral_code == referred_by)
            {
                Some(referrer) => {
                    referrer
                        .balances
                        .credit(Currency::RangerAi, self.config.referrer_bonus)?;
                    account
                        .balances
                        .credit(Currency::RangerAi, self.config.referred_bonus)?;
                    tracing::info!(
                        referrer = %referrer.id,
                        referred = %account.id,
                        "referral bonus applied"
                    );
                }
                None => tracing::warn!(code = %referred_by, "referral code not found"),
            }
        }

        accounts.push(account.clone());
        self.save_accounts(&accounts).await?;
        tracing::info!(account_id = %account.id, "account registered");

        self.establish(Session::idle(account.clone())).await?;
        Ok(account)
    }

    /// Logs in and resumes the mining cycle saved for this account.
    pub async fn login(&mut self, email: &str, raw_password: &str) -> ResultEngine<Session> {
        let invalid = || EngineError::Auth("invalid email or password".to_string());

        let key = normalize_email(email);
        let account = self
            .list_accounts()
            .await?
            .into_iter()
            .find(|a| normalize_email(&a.email) == key)
            .ok_or_else(invalid)?;
        if !verify_password(raw_password, &account.password_hash) {
            return Err(invalid());
        }

        let snapshot: Option<Session> =
            store::load_json(&self.store, &account_session_key(account.id)).await?;
        let mining = snapshot.map(|s| s.mining).unwrap_or_else(MiningCycle::default);

        let session = Session::new(account, mining);
        self.establish(session.clone()).await?;
        tracing::info!(account_id = %session.account.id, "logged in");
        Ok(session)
    }

    /// Saves the session under its account key and forgets it. Does nothing
    /// when logged out.
    pub async fn logout(&mut self) -> ResultEngine<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        store::save_json(
            &self.store,
            &account_session_key(session.account.id),
            session,
        )
        .await?;
        self.store.remove(CURRENT_SESSION_KEY).await?;
        tracing::info!(account_id = %session.account.id, "logged out");
        self.session = None;
        Ok(())
    }
}
