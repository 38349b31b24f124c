use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::persistence::{AuthPersistence, PersistedAuthState};
use serde_json::{from_str as deserialize_state, to_string as serialize_state};

/// Keeps the auth state as a JSON file. A missing or empty file means
/// "nothing stored".
#[derive(Clone, Debug)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuthPersistence for FilePersistence {
    fn set(&self, state: Option<PersistedAuthState>) -> AuthResult<()> {
        let Some(state) = state else {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|err| {
                    AuthError::Persistence(format!("Failed to remove auth persistence file: {err}"))
                })?;
            }
            return Ok(());
        };

        let serialized = serialize_state(&state).map_err(|err| {
            AuthError::Persistence(format!("Failed to serialize auth state: {err}"))
        })?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                AuthError::Persistence(format!("Failed to create persistence directory: {err}"))
            })?;
        }
        fs::write(&self.path, serialized).map_err(|err| {
            AuthError::Persistence(format!("Failed to write auth persistence file: {err}"))
        })
    }

    fn get(&self) -> AuthResult<Option<PersistedAuthState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let buffer = fs::read_to_string(&self.path).map_err(|err| {
            AuthError::Persistence(format!("Failed to read auth persistence file: {err}"))
        })?;
        if buffer.trim().is_empty() {
            return Ok(None);
        }

        deserialize_state(&buffer).map(Some).map_err(|err| {
            AuthError::Persistence(format!("Failed to parse auth persistence payload: {err}"))
        })
    }
}
