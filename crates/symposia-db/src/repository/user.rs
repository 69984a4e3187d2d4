//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use symposia_core::error::SymposiaResult;
use symposia_core::models::user::{CreateUser, UpdateUser, User, UserStatus};
use symposia_core::permission::{DEFAULT_FEATURES, Feature};
use symposia_core::repository::UserRepository;
use symposia_core::validate;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{check_response, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    email: String,
    password_hash: String,
    status: String,
    features: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    username: String,
    email: String,
    password_hash: String,
    status: String,
    features: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<UserStatus, DbError> {
    match s {
        "active" => Ok(UserStatus::Active),
        "inactive" => Ok(UserStatus::Inactive),
        "pending_activation" => Ok(UserStatus::PendingActivation),
        other => Err(DbError::Decode(format!("unknown user status: {other}"))),
    }
}

fn status_to_string(s: &UserStatus) -> &'static str {
    match s {
        UserStatus::Active => "active",
        UserStatus::Inactive => "inactive",
        UserStatus::PendingActivation => "pending_activation",
    }
}

fn parse_features(raw: &[String]) -> Result<Vec<Feature>, DbError> {
    raw.iter()
        .map(|s| {
            s.parse::<Feature>()
                .map_err(|e| DbError::Decode(e.to_string()))
        })
        .collect()
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            status: parse_status(&self.status)?,
            features: parse_features(&self.features)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid(&self.record_id, "user")?;
        Ok(User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            status: parse_status(&self.status)?,
            features: parse_features(&self.features)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Decode(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Decode(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> SymposiaResult<User> {
        validate::validate_username(&input.username)?;
        validate::validate_email(&input.email)?;
        validate::validate_password(&input.password)?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let features: Vec<String> = DEFAULT_FEATURES
            .iter()
            .map(|f| f.as_str().to_string())
            .collect();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, email = $email, \
                 password_hash = $password_hash, \
                 status = $status, \
                 features = $features",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind(("status", "pending_activation".to_string()))
            .bind(("features", features))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response(result, "user")?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SymposiaResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_username(&self, username: &str) -> SymposiaResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE username = $username",
            )
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("username={username}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_email(&self, email: &str) -> SymposiaResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> SymposiaResult<User> {
        if let Some(ref username) = input.username {
            validate::validate_username(username)?;
        }
        if let Some(ref email) = input.email {
            validate::validate_email(email)?;
        }

        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.username.is_some() {
            sets.push("username = $username");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.features.is_some() {
            sets.push("features = $features");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(username) = input.username {
            builder = builder.bind(("username", username));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(ref status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(features) = input.features {
            let features: Vec<String> = features.iter().map(|f| f.as_str().to_string()).collect();
            builder = builder.bind(("features", features));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response(result, "user")?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn grant_features(&self, id: Uuid, features: &[Feature]) -> SymposiaResult<User> {
        let id_str = id.to_string();
        let new_features: Vec<String> = features.iter().map(|f| f.as_str().to_string()).collect();

        // array::union deduplicates, so repeated grants are idempotent.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 features = array::union(features, $new_features), \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("new_features", new_features))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn deactivate(&self, id: Uuid) -> SymposiaResult<()> {
        // Soft-delete: accounts are never physically removed.
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 status = 'inactive', updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}

/// Verify a password against an Argon2id hash.
///
/// Public for use by the auth layer.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, DbError> {
    use argon2::PasswordVerifier;

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| DbError::Decode(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DbError::Decode(format!("verify error: {e}"))),
    }
}
