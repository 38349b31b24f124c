use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::model::UserInfo;

mod file;

pub use file::FilePersistence;

/// Credentials and profile remembered between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PersistedAuthState {
    pub signed_in: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Expiration timestamp in seconds since the Unix epoch.
    pub expires_at: Option<i64>,
    pub user: Option<UserInfo>,
}

/// Storage backend for serialized authentication state.
///
/// `set(None)` clears whatever is stored.
pub trait AuthPersistence: Send + Sync {
    fn set(&self, state: Option<PersistedAuthState>) -> AuthResult<()>;
    fn get(&self) -> AuthResult<Option<PersistedAuthState>>;
}

#[derive(Default)]
pub struct InMemoryPersistence {
    state: Mutex<Option<PersistedAuthState>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthPersistence for InMemoryPersistence {
    fn set(&self, state: Option<PersistedAuthState>) -> AuthResult<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| AuthError::Persistence("in-memory state poisoned".into()))?;
        *guard = state;
        Ok(())
    }

    fn get(&self) -> AuthResult<Option<PersistedAuthState>> {
        self.state
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| AuthError::Persistence("in-memory state poisoned".into()))
    }
}
