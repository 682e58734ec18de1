use serde::{Deserialize, Serialize};

use crate::{Account, MiningCycle};

/// An account together with the state of its mining cycle.
///
/// This is what the engine holds for the logged-in user and what is
/// mirrored to storage, flattened into a single record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(flatten)]
    pub account: Account,
    #[serde(flatten)]
    pub mining: MiningCycle,
}

impl Session {
    pub fn new(account: Account, mining: MiningCycle) -> Self {
        Self { account, mining }
    }

    /// Starts a session for `account` with an idle cycle.
    pub fn idle(account: Account) -> Self {
        Self::new(account, MiningCycle::default())
    }
}
