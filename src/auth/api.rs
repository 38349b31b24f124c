use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::model::{
    DeleteAccountRequest, ErrorResponse, RefreshTokenRequest, RefreshTokenResponse,
    ResetPasswordRequest, ResetPasswordResponse, SendOobCodeRequest, SendOobCodeResponse,
    SignInWithPasswordRequest, SignInWithPasswordResponse, SignUpRequest, SignUpResponse,
    UpdateAccountRequest, UpdateAccountResponse, UserInfo,
};
use crate::auth::persistence::{AuthPersistence, InMemoryPersistence, PersistedAuthState};

pub(crate) const DEFAULT_IDENTITY_TOOLKIT_ENDPOINT: &str =
    "https://identitytoolkit.googleapis.com/v1";
pub(crate) const DEFAULT_SECURE_TOKEN_ENDPOINT: &str =
    "https://securetoken.googleapis.com/v1/token";

/// Tokens expiring within this many seconds are refreshed by `get_token`.
const TOKEN_REFRESH_TOLERANCE_SECS: i64 = 5 * 60;

/// Email/password and anonymous authentication against the Identity
/// Toolkit REST API.
///
/// Session state is cached in memory and written through to the configured
/// [`AuthPersistence`] whenever it changes.
pub struct Auth {
    api_key: String,
    identity_toolkit_endpoint: String,
    secure_token_endpoint: String,
    client: Client,
    persistence: Arc<dyn AuthPersistence>,
    state: Mutex<PersistedAuthState>,
}

pub struct AuthBuilder {
    api_key: String,
    identity_toolkit_endpoint: String,
    secure_token_endpoint: String,
    client: Option<Client>,
    persistence: Option<Arc<dyn AuthPersistence>>,
}

impl AuthBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            identity_toolkit_endpoint: DEFAULT_IDENTITY_TOOLKIT_ENDPOINT.to_string(),
            secure_token_endpoint: DEFAULT_SECURE_TOKEN_ENDPOINT.to_string(),
            client: None,
            persistence: None,
        }
    }

    pub fn with_identity_toolkit_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.identity_toolkit_endpoint = endpoint.into();
        self
    }

    pub fn with_secure_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.secure_token_endpoint = endpoint.into();
        self
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn AuthPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Restores any previously persisted session.
    pub fn build(self) -> AuthResult<Auth> {
        if self.api_key.trim().is_empty() {
            return Err(AuthError::InvalidCredential("Missing API key".into()));
        }
        let persistence = self
            .persistence
            .unwrap_or_else(|| Arc::new(InMemoryPersistence::new()));
        let restored = persistence.get()?.unwrap_or_default();

        Ok(Auth {
            api_key: self.api_key,
            identity_toolkit_endpoint: self.identity_toolkit_endpoint,
            secure_token_endpoint: self.secure_token_endpoint,
            client: self.client.unwrap_or_default(),
            persistence,
            state: Mutex::new(restored),
        })
    }
}

impl Auth {
    pub fn builder(api_key: impl Into<String>) -> AuthBuilder {
        AuthBuilder::new(api_key)
    }

    /// Creates an account. The new session is returned but not stored.
    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpResponse> {
        let request = SignUpRequest {
            email: Some(email.to_owned()),
            password: Some(password.to_owned()),
            return_secure_token: true,
        };
        self.execute_request("signUp", &request).await
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<SignInWithPasswordResponse> {
        let request = SignInWithPasswordRequest {
            email: email.to_owned(),
            password: password.to_owned(),
            return_secure_token: true,
        };
        let response: SignInWithPasswordResponse =
            self.execute_request("signInWithPassword", &request).await?;

        let user = UserInfo {
            display_name: response.display_name.clone(),
            profile_picture: response.profile_picture.clone(),
            email: response.email.clone(),
        };
        self.store(PersistedAuthState {
            signed_in: true,
            access_token: Some(response.id_token.clone()),
            refresh_token: Some(response.refresh_token.clone()),
            expires_at: expires_at(response.expires_in.as_deref())?,
            user: Some(user),
        })?;
        Ok(response)
    }

    pub async fn sign_in_anonymously(&self) -> AuthResult<SignUpResponse> {
        let request = SignUpRequest {
            return_secure_token: true,
            ..Default::default()
        };
        let response: SignUpResponse = self.execute_request("signUp", &request).await?;
        self.store(PersistedAuthState {
            signed_in: true,
            access_token: Some(response.id_token.clone()),
            refresh_token: Some(response.refresh_token.clone()),
            expires_at: expires_at(response.expires_in.as_deref())?,
            user: None,
        })?;
        Ok(response)
    }

    /// Exchanges a refresh token for a new ID token and stores the result.
    pub async fn refresh_token(&self, refresh_token: &str) -> AuthResult<RefreshTokenResponse> {
        let mut url = Url::parse(&self.secure_token_endpoint)
            .map_err(|err| AuthError::Network(err.to_string()))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        log::debug!("auth POST {}", url.path());

        let request = RefreshTokenRequest {
            grant_type: "refresh_token",
            refresh_token,
        };
        let response = self
            .client
            .post(url)
            .form(&request)
            .send()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))?;
        let response: RefreshTokenResponse = read_response(response).await?;

        let expires = expires_at(Some(&response.expires_in))?;
        self.update_state(|state| {
            // Firestore accepts the ID token, not the OAuth access token.
            state.access_token = Some(response.id_token.clone());
            state.refresh_token = Some(response.refresh_token.clone());
            state.expires_at = expires;
        })?;
        Ok(response)
    }

    /// Forgets the local session. Nothing is sent to the backend.
    pub fn sign_out(&self) {
        *self.lock_state() = PersistedAuthState::default();
        if let Err(err) = self.persistence.set(None) {
            log::warn!("failed to clear persisted auth state: {err}");
        }
    }

    pub async fn send_email_verification(&self, id_token: &str) -> AuthResult<SendOobCodeResponse> {
        let request = SendOobCodeRequest {
            request_type: "VERIFY_EMAIL",
            email: None,
            id_token: Some(id_token.to_owned()),
        };
        self.execute_request("sendOobCode", &request).await
    }

    pub async fn send_password_reset_email(&self, email: &str) -> AuthResult<SendOobCodeResponse> {
        let request = SendOobCodeRequest {
            request_type: "PASSWORD_RESET",
            email: Some(email.to_owned()),
            id_token: None,
        };
        self.execute_request("sendOobCode", &request).await
    }

    pub async fn confirm_password_reset(
        &self,
        oob_code: &str,
        new_password: &str,
    ) -> AuthResult<ResetPasswordResponse> {
        let request = ResetPasswordRequest {
            oob_code: oob_code.to_owned(),
            new_password: new_password.to_owned(),
        };
        self.execute_request("resetPassword", &request).await
    }

    pub async fn confirm_email_verification(
        &self,
        oob_code: &str,
    ) -> AuthResult<UpdateAccountResponse> {
        let request = UpdateAccountRequest {
            oob_code: Some(oob_code.to_owned()),
            ..Default::default()
        };
        self.execute_request("update", &request).await
    }

    pub async fn change_email(
        &self,
        id_token: &str,
        new_email: &str,
    ) -> AuthResult<UpdateAccountResponse> {
        let request = UpdateAccountRequest {
            id_token: Some(id_token.to_owned()),
            email: Some(new_email.to_owned()),
            ..Default::default()
        };
        self.execute_request("update", &request).await
    }

    /// Changing the password revokes old sessions, so any tokens returned
    /// replace the stored ones.
    pub async fn change_password(
        &self,
        id_token: &str,
        new_password: &str,
    ) -> AuthResult<UpdateAccountResponse> {
        let request = UpdateAccountRequest {
            id_token: Some(id_token.to_owned()),
            password: Some(new_password.to_owned()),
            return_secure_token: Some(true),
            ..Default::default()
        };
        let response: UpdateAccountResponse = self.execute_request("update", &request).await?;

        if let (Some(id_token), Some(refresh_token)) = (&response.id_token, &response.refresh_token)
        {
            let expires = expires_at(response.expires_in.as_deref())?;
            self.update_state(|state| {
                state.access_token = Some(id_token.clone());
                state.refresh_token = Some(refresh_token.clone());
                state.expires_at = expires;
            })?;
        }
        Ok(response)
    }

    pub async fn delete_account(&self, id_token: &str) -> AuthResult<()> {
        let request = DeleteAccountRequest {
            id_token: id_token.to_owned(),
        };
        let _: JsonValue = self.execute_request("delete", &request).await?;
        Ok(())
    }

    pub fn is_user_signed_in(&self) -> bool {
        self.lock_state().signed_in
    }

    /// A token without a known expiry counts as expired.
    pub fn is_token_expired(&self) -> bool {
        match self.lock_state().expires_at {
            Some(expires_at) => expires_at <= Utc::now().timestamp(),
            None => true,
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock_state().access_token.clone()
    }

    pub fn refresh_token_value(&self) -> Option<String> {
        self.lock_state().refresh_token.clone()
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.lock_state().user.clone()
    }

    /// Returns the ID token to send as bearer, refreshing it first when it
    /// is about to expire or `force_refresh` is set. `Ok(None)` when nobody
    /// is signed in.
    pub async fn get_token(&self, force_refresh: bool) -> AuthResult<Option<String>> {
        let (access_token, refresh_token, expires_at) = {
            let state = self.lock_state();
            (
                state.access_token.clone(),
                state.refresh_token.clone(),
                state.expires_at,
            )
        };
        let Some(access_token) = access_token else {
            return Ok(None);
        };

        let expiring = expires_at
            .map(|expires_at| expires_at - Utc::now().timestamp() <= TOKEN_REFRESH_TOLERANCE_SECS)
            .unwrap_or(true);
        if !force_refresh && !expiring {
            return Ok(Some(access_token));
        }

        let refresh_token = refresh_token.ok_or(AuthError::MissingToken("refresh token"))?;
        let response = self.refresh_token(&refresh_token).await?;
        Ok(Some(response.id_token))
    }

    async fn execute_request<TRequest, TResponse>(
        &self,
        operation: &str,
        request: &TRequest,
    ) -> AuthResult<TResponse>
    where
        TRequest: Serialize,
        TResponse: DeserializeOwned,
    {
        let url = self.endpoint_url(operation)?;
        log::debug!("auth POST accounts:{operation}");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))?;
        read_response(response).await
    }

    fn endpoint_url(&self, operation: &str) -> AuthResult<Url> {
        let endpoint = format!(
            "{}/accounts:{operation}",
            self.identity_toolkit_endpoint.trim_end_matches('/')
        );
        let mut url = Url::parse(&endpoint).map_err(|err| AuthError::Network(err.to_string()))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn lock_state(&self) -> MutexGuard<'_, PersistedAuthState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn store(&self, state: PersistedAuthState) -> AuthResult<()> {
        *self.lock_state() = state.clone();
        self.persistence.set(Some(state))
    }

    fn update_state(&self, update: impl FnOnce(&mut PersistedAuthState)) -> AuthResult<()> {
        let snapshot = {
            let mut state = self.lock_state();
            update(&mut state);
            state.clone()
        };
        self.persistence.set(Some(snapshot))
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> AuthResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| AuthError::Network(err.to_string()))?;
    if !status.is_success() {
        return Err(map_error(status, &body));
    }
    serde_json::from_str(&body).map_err(|err| AuthError::Network(err.to_string()))
}

fn map_error(status: StatusCode, body: &str) -> AuthError {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(message) = parsed.error.and_then(|error| error.message) {
            return AuthError::InvalidCredential(message);
        }
    }

    AuthError::Network(format!("Request failed with status {status}: {body}"))
}

fn expires_at(expires_in: Option<&str>) -> AuthResult<Option<i64>> {
    let Some(raw) = expires_in else {
        return Ok(None);
    };
    let seconds = raw.parse::<i64>().map_err(|err| {
        AuthError::InvalidCredential(format!("Invalid expiresIn value: {err}"))
    })?;
    Utc::now()
        .timestamp()
        .checked_add(seconds)
        .map(Some)
        .ok_or_else(|| {
            AuthError::InvalidCredential(format!("expiresIn value {raw} is out of range"))
        })
}
