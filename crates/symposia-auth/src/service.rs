//! Authentication service — login and logout orchestration.

use chrono::{Duration, Utc};
use symposia_core::error::{SymposiaError, SymposiaResult};
use symposia_core::models::session::CreateSession;
use symposia_core::models::user::UserStatus;
use symposia_core::repository::{SessionRepository, UserRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Raw opaque session token (returned to the client as the
    /// `session_id` cookie; never stored).
    pub session_token: String,
    /// Session ID.
    pub session_id: Uuid,
    /// The authenticated user.
    pub user_id: Uuid,
    /// Session expiry.
    pub expires_at: chrono::DateTime<Utc>,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: U,
    session_repo: S,
    config: AuthConfig,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(user_repo: U, session_repo: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    /// Authenticate a user with username/email + password and issue an
    /// opaque session token.
    pub async fn login(&self, input: LoginInput) -> SymposiaResult<LoginOutput> {
        // 1. Look up user — try username first, then email.
        let user = match self
            .user_repo
            .get_by_username(&input.username_or_email)
            .await
        {
            Ok(u) => u,
            Err(SymposiaError::NotFound { .. }) => self
                .user_repo
                .get_by_email(&input.username_or_email)
                .await
                .map_err(|_| AuthError::InvalidCredentials)?,
            Err(e) => return Err(e),
        };

        // 2. Verify password.
        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;

        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Check account status.
        match user.status {
            UserStatus::Active => {}
            UserStatus::Inactive => {
                return Err(AuthError::AccountInactive.into());
            }
            UserStatus::PendingActivation => {
                return Err(AuthError::AccountPendingActivation.into());
            }
        }

        // 4. Generate session token and persist its hash.
        let raw_token = token::generate_session_token();
        let token_hash = token::hash_session_token(&raw_token);
        let expires_at =
            Utc::now() + Duration::seconds(self.config.session_lifetime_secs as i64);

        let session = self
            .session_repo
            .create(CreateSession {
                user_id: user.id,
                token_hash,
                expires_at,
            })
            .await?;

        Ok(LoginOutput {
            session_token: raw_token,
            session_id: session.id,
            user_id: user.id,
            expires_at: session.expires_at,
        })
    }

    /// Invalidate the session behind a raw token (logout). A no-op for
    /// unknown tokens.
    pub async fn logout(&self, raw_token: &str) -> SymposiaResult<()> {
        let token_hash = token::hash_session_token(raw_token);
        self.session_repo.delete_by_token_hash(&token_hash).await
    }

    /// Revoke all sessions for a user (e.g. on password change).
    pub async fn logout_all(&self, user_id: Uuid) -> SymposiaResult<()> {
        self.session_repo.delete_by_user(user_id).await
    }

    /// Remove expired sessions; returns the number removed.
    pub async fn sweep_expired(&self) -> SymposiaResult<u64> {
        self.session_repo.delete_expired().await
    }
}
