use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::error::AuthError;
use crate::auth::Auth;
use crate::firestore::error::{
    internal_error, unauthenticated, unavailable, FirestoreError, FirestoreResult,
};
use crate::firestore::remote::datastore::{TokenProvider, TokenProviderArc};

/// Supplies Firestore requests with the signed-in user's ID token.
pub struct AuthTokenProvider {
    auth: Arc<Auth>,
    force_refresh: AtomicBool,
}

impl AuthTokenProvider {
    pub fn new(auth: Arc<Auth>) -> Self {
        Self {
            auth,
            force_refresh: AtomicBool::new(false),
        }
    }

    pub fn into_arc(self) -> TokenProviderArc {
        Arc::new(self)
    }
}

#[async_trait]
impl TokenProvider for AuthTokenProvider {
    async fn get_token(&self) -> FirestoreResult<Option<String>> {
        let force_refresh = self.force_refresh.swap(false, Ordering::SeqCst);
        let result = self.auth.get_token(force_refresh).await;
        if force_refresh && result.is_err() {
            // The rejected token must not be handed out again.
            self.force_refresh.store(true, Ordering::SeqCst);
        }
        result.map_err(map_auth_error)
    }

    /// The next request refreshes the token first.
    fn invalidate_token(&self) {
        self.force_refresh.store(true, Ordering::SeqCst);
    }
}

fn map_auth_error(error: AuthError) -> FirestoreError {
    match error {
        AuthError::InvalidCredential(message) => unauthenticated(message),
        AuthError::MissingToken(kind) => unauthenticated(format!("No {kind} available")),
        AuthError::Network(message) => unavailable(message),
        AuthError::Persistence(message) => internal_error(message),
    }
}

/// Wraps an `Auth` instance into a token provider arc.
pub fn auth_token_provider_arc(auth: Arc<Auth>) -> TokenProviderArc {
    AuthTokenProvider::new(auth).into_arc()
}
