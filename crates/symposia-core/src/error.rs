//! Error types for the Symposia system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SymposiaError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Conference context missing or invalid")]
    ConferenceContext,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SymposiaResult<T> = Result<T, SymposiaError>;
