//! One-shot completion timer for the mining cycle.
//!
//! [`MiningTimer::arm`] spawns a task that sleeps until the running cycle's
//! deadline and then calls [`Engine::claim_rewards`]. Re-arming replaces the
//! previous task; [`MiningTimer::disarm`] and dropping the timer abort it.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{Clock, Engine, Money, ResultEngine, store::KeyValueStore};

/// An engine shared between the caller and the timer task.
pub type SharedEngine<S, C> = Arc<Mutex<Engine<S, C>>>;

#[derive(Debug, Default)]
pub struct MiningTimer {
    task: Option<JoinHandle<ResultEngine<Option<Money>>>>,
}

fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (deadline - now).to_std().unwrap_or(Duration::ZERO)
}

impl MiningTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the claim for the running cycle. Returns `false` (and leaves
    /// the timer disarmed) when no cycle is running.
    pub async fn arm<S, C>(&mut self, engine: &SharedEngine<S, C>) -> bool
    where
        S: KeyValueStore + 'static,
        C: Clock + 'static,
    {
        self.disarm();

        let wait = {
            let guard = engine.lock().await;
            match guard.mining_deadline() {
                Some(deadline) => until(deadline, guard.now()),
                None => return false,
            }
        };
        tracing::debug!(?wait, "mining timer armed");

        let engine = Arc::clone(engine);
        self.task = Some(tokio::spawn(async move {
            let mut wait = wait;
            loop {
                tokio::time::sleep(wait).await;
                let mut guard = engine.lock().await;
                if let Some(reward) = guard.claim_rewards().await? {
                    return Ok(Some(reward));
                }
                // The clock may lag the timer; wait again for what is left.
                match guard.mining_deadline() {
                    Some(deadline) => wait = until(deadline, guard.now()),
                    None => return Ok(None),
                }
            }
        }));
        true
    }

    /// Cancels the scheduled claim, if any.
    pub fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("mining timer disarmed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Waits for the scheduled claim and returns the credited reward.
    /// `None` when disarmed or when the cycle ended without a claim.
    pub async fn wait(&mut self) -> ResultEngine<Option<Money>> {
        let Some(task) = self.task.as_mut() else {
            return Ok(None);
        };
        // Borrow rather than take, so dropping this future mid-wait leaves
        // the task in place for `disarm`.
        let joined = task.await;
        self.task = None;
        match joined {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!("mining timer task stopped: {err}");
                Ok(None)
            }
        }
    }
}

impl Drop for MiningTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
