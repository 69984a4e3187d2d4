//! User domain model.
//!
//! Users are platform-global: a single account can hold roles in any
//! number of conferences. Accounts are never physically deleted;
//! deactivation sets the status to `Inactive`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission::Feature;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Inactive,
    PendingActivation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub status: UserStatus,
    /// Platform-level feature flags (coarse, global capabilities).
    pub features: Vec<Feature>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub status: Option<UserStatus>,
    /// Replaces the full feature list when present.
    pub features: Option<Vec<Feature>>,
}
