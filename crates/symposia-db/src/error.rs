//! Database-specific error types and conversions.

use symposia_core::error::SymposiaError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Row conversion failed: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated: {entity}")]
    Conflict { entity: String },
}

impl From<DbError> for SymposiaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => SymposiaError::NotFound { entity, id },
            DbError::Conflict { entity } => SymposiaError::AlreadyExists { entity },
            other => SymposiaError::Database(other.to_string()),
        }
    }
}
