//! Authentication error types.

use symposia_core::error::SymposiaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("account is pending activation")]
    AccountPendingActivation,

    #[error("session has expired or does not exist")]
    SessionInvalid,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for SymposiaError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::AccountPendingActivation
            | AuthError::SessionInvalid => SymposiaError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => SymposiaError::Crypto(msg),
        }
    }
}
