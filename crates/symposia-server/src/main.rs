//! Symposia Server — application entry point.
//!
//! Wires the store, repositories, authentication service, and the
//! authorization gate. The HTTP surface mounts on top of these; every
//! conference-scoped route must consult the gate with the same
//! conference id it then passes to the accessor.

use std::env;

use symposia_auth::{AuthConfig, AuthService, AuthorizationGate};
use symposia_db::repository::{
    SurrealRoleAssignmentRepository, SurrealSessionRepository, SurrealUserRepository,
};
use symposia_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

fn db_config_from_env() -> DbConfig {
    let defaults = DbConfig::default();
    DbConfig {
        url: env::var("SYMPOSIA_DB_URL").unwrap_or(defaults.url),
        namespace: env::var("SYMPOSIA_DB_NAMESPACE").unwrap_or(defaults.namespace),
        database: env::var("SYMPOSIA_DB_DATABASE").unwrap_or(defaults.database),
        username: env::var("SYMPOSIA_DB_USERNAME").unwrap_or(defaults.username),
        password: env::var("SYMPOSIA_DB_PASSWORD").unwrap_or(defaults.password),
    }
}

fn auth_config_from_env() -> AuthConfig {
    let defaults = AuthConfig::default();
    AuthConfig {
        pepper: env::var("SYMPOSIA_PASSWORD_PEPPER").ok(),
        ..defaults
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("symposia=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Symposia server...");

    let db_config = db_config_from_env();
    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = symposia_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }

    let db = manager.client().clone();
    let auth_config = auth_config_from_env();

    let user_repo = match auth_config.pepper.clone() {
        Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper),
        None => SurrealUserRepository::new(db.clone()),
    };
    let session_repo = SurrealSessionRepository::new(db.clone());
    let assignment_repo = SurrealRoleAssignmentRepository::new(db.clone());

    let _auth = AuthService::new(user_repo.clone(), session_repo.clone(), auth_config);
    let _gate = AuthorizationGate::new(user_repo, session_repo, assignment_repo);

    tracing::info!("Repositories and authorization gate initialized");

    // TODO: mount the HTTP router over the gate and accessors
    // TODO: schedule the expired-session sweep

    tracing::info!("Symposia server stopped.");
}
