use httpmock::MockServer;

use crate::auth::Auth;
use crate::firestore::Firestore;

/// Firestore handle for project `demo` whose requests go to `server`.
pub fn firestore_for(server: &MockServer) -> Firestore {
    Firestore::builder("demo")
        .with_emulator_host(server.address().to_string())
        .build()
        .expect("firestore for mock server")
}

/// Auth client with API key `test-key` whose requests go to `server`.
pub fn auth_for(server: &MockServer) -> Auth {
    Auth::builder("test-key")
        .with_identity_toolkit_endpoint(server.url("/v1"))
        .with_secure_token_endpoint(server.url("/v1/token"))
        .build()
        .expect("auth for mock server")
}
