use std::fmt;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request never produced a usable reply.
    Network(String),
    /// The backend rejected the request; carries its error message
    /// (e.g. `EMAIL_NOT_FOUND`).
    InvalidCredential(String),
    /// Reading or writing persisted credentials failed.
    Persistence(String),
    /// An operation needed a token that is not stored.
    MissingToken(&'static str),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Network(message) => write!(f, "Network error: {message}"),
            AuthError::InvalidCredential(message) => write!(f, "Invalid credential: {message}"),
            AuthError::Persistence(message) => write!(f, "Persistence error: {message}"),
            AuthError::MissingToken(kind) => write!(f, "No {kind} available"),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_backend_message() {
        let err = AuthError::InvalidCredential("EMAIL_NOT_FOUND".into());
        assert_eq!(err.to_string(), "Invalid credential: EMAIL_NOT_FOUND");
        assert_eq!(
            AuthError::MissingToken("refresh token").to_string(),
            "No refresh token available"
        );
    }
}
