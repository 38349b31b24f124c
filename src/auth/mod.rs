//! Firebase Authentication over the Identity Toolkit and Secure Token REST
//! APIs, plus the bridge that feeds its ID token to Firestore.

mod api;
mod error;
mod model;
mod persistence;
mod token_provider;

#[doc(inline)]
pub use api::{Auth, AuthBuilder};

#[doc(inline)]
pub use error::{AuthError, AuthResult};

#[doc(inline)]
pub use model::{
    DeleteAccountRequest, RefreshTokenResponse, ResetPasswordRequest, ResetPasswordResponse,
    SendOobCodeRequest, SendOobCodeResponse, SignInWithPasswordRequest,
    SignInWithPasswordResponse, SignUpRequest, SignUpResponse, UpdateAccountRequest,
    UpdateAccountResponse, UserInfo,
};

#[doc(inline)]
pub use persistence::{AuthPersistence, FilePersistence, InMemoryPersistence, PersistedAuthState};

#[doc(inline)]
pub use token_provider::{auth_token_provider_arc, AuthTokenProvider};
