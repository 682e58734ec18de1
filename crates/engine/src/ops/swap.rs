use crate::{
    Clock, Currency, EngineError, Money, Rate, ResultEngine, store::KeyValueStore,
};

use super::Engine;

/// Outcome of a successful swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapReceipt {
    pub from: Currency,
    pub to: Currency,
    pub debited: Money,
    pub credited: Money,
    pub rate: Rate,
}

impl<S: KeyValueStore, C: Clock> Engine<S, C> {
    /// Converts `amount` of `from` into `to` at the configured rate.
    ///
    /// Checks, in order: a session exists, `amount > 0`, the pair has a rate,
    /// the converted amount is at least one minor unit, the `from` balance
    /// covers `amount`. Nothing changes on failure.
    pub async fn swap_currency(
        &mut self,
        from: Currency,
        to: Currency,
        amount: Money,
    ) -> ResultEngine<SwapReceipt> {
        let mut session = self.session.clone().ok_or(EngineError::NotLoggedIn)?;
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "amount must be positive".to_string(),
            ));
        }
        let rate = self.config.rates.rate(from, to)?;
        let credited = rate.convert(amount)?;
        if !credited.is_positive() {
            return Err(EngineError::Validation(
                "amount too small to convert".to_string(),
            ));
        }

        session.account.balances.debit(from, amount)?;
        session.account.balances.credit(to, credited)?;

        tracing::info!(
            account_id = %session.account.id,
            %from,
            %to,
            %amount,
            %credited,
            "swap executed"
        );
        self.commit(session).await?;

        Ok(SwapReceipt {
            from,
            to,
            debited: amount,
            credited,
            rate,
        })
    }
}
