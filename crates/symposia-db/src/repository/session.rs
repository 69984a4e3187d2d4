//! SurrealDB implementation of [`SessionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use symposia_core::error::SymposiaResult;
use symposia_core::models::session::{CreateSession, Session};
use symposia_core::repository::SessionRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{check_response, parse_uuid};

#[derive(Debug, SurrealValue)]
struct SessionRow {
    user_id: String,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    user_id: String,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

fn row_to_session(row: SessionRow, id: Uuid) -> Result<Session, DbError> {
    Ok(Session {
        id,
        user_id: parse_uuid(&row.user_id, "user")?,
        token_hash: row.token_hash,
        expires_at: row.expires_at,
        created_at: row.created_at,
    })
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = parse_uuid(&self.record_id, "session")?;
        Ok(Session {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> SymposiaResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('session', $id) SET \
                 user_id = $user_id, \
                 token_hash = $token_hash, \
                 expires_at = $expires_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("token_hash", input.token_hash))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response(result, "session")?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        Ok(row_to_session(row, id)?)
    }

    async fn find_valid_by_token_hash(&self, token_hash: &str) -> SymposiaResult<Session> {
        // Expiry is checked in the query: an expired session is
        // indistinguishable from an absent one.
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE token_hash = $token_hash \
                 AND expires_at > time::now()",
            )
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: "token".into(),
        })?;

        Ok(row.try_into_session()?)
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> SymposiaResult<()> {
        self.db
            .query("DELETE session WHERE token_hash = $token_hash")
            .bind(("token_hash", token_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_by_user(&self, user_id: Uuid) -> SymposiaResult<()> {
        self.db
            .query("DELETE session WHERE user_id = $user_id")
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_expired(&self) -> SymposiaResult<u64> {
        let mut result = self
            .db
            .query(
                "DELETE session WHERE expires_at <= time::now() \
                 RETURN BEFORE",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}
