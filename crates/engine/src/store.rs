//! Persistent key-value storage used by the engine.
//!
//! The engine keeps three kinds of records, all JSON encoded:
//!
//! - [`ACCOUNTS_KEY`]: the array of every registered [`Account`](crate::Account).
//! - [`CURRENT_SESSION_KEY`]: the [`Session`](crate::Session) currently logged in.
//! - [`account_session_key`]: one session snapshot per account, kept across
//!   logouts so a running mining cycle can be resumed.
//!
//! Writes touching several keys are not atomic; a crash between two writes
//! can leave them out of step.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::ResultEngine;

mod sqlite;

pub use sqlite::SqliteStore;

pub const ACCOUNTS_KEY: &str = "ranger_ai_users_db";
pub const CURRENT_SESSION_KEY: &str = "ranger_ai_current_user_session";

/// Key of the per-account session snapshot.
#[must_use]
pub fn account_session_key(account_id: Uuid) -> String {
    format!("{CURRENT_SESSION_KEY}_{account_id}")
}

/// A durable string-to-string map.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = ResultEngine<Option<String>>> + Send;

    fn set(&self, key: &str, value: String) -> impl Future<Output = ResultEngine<()>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = ResultEngine<()>> + Send;
}

/// In-process store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> ResultEngine<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: String) -> ResultEngine<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> ResultEngine<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Reads and decodes a JSON record. A missing key is `Ok(None)`; a record
/// that does not decode is an error.
pub(crate) async fn load_json<S, T>(store: &S, key: &str) -> ResultEngine<Option<T>>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes and writes a JSON record.
pub(crate) async fn save_json<S, T>(store: &S, key: &str, value: &T) -> ResultEngine<()>
where
    S: KeyValueStore,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string(value)?;
    tracing::debug!(key, bytes = payload.len(), "writing record");
    store.set(key, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v1".to_string()).await.unwrap();
        store.set("k", "v2".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k").await.unwrap();
        assert!(store.is_empty());
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error() {
        let store = MemoryStore::new();
        store.set(ACCOUNTS_KEY, "not json".to_string()).await.unwrap();
        let loaded: ResultEngine<Option<Vec<u32>>> = load_json(&store, ACCOUNTS_KEY).await;
        assert!(matches!(loaded, Err(crate::EngineError::Serialization(_))));
    }

    #[test]
    fn per_account_key_extends_current_key() {
        let id = Uuid::nil();
        assert_eq!(
            account_session_key(id),
            "ranger_ai_current_user_session_00000000-0000-0000-0000-000000000000"
        );
    }
}
