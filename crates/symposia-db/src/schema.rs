//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Every conference-scoped table
//! carries a mandatory `conference_id` field and an index leading
//! with it.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (platform scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['active', 'inactive', 'pending_activation'];
DEFINE FIELD features ON TABLE user TYPE array DEFAULT [];
DEFINE FIELD features.* ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Organizations (platform scope, single owner)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD slug ON TABLE organization TYPE string;
DEFINE FIELD description ON TABLE organization TYPE option<string>;
DEFINE FIELD owner_id ON TABLE organization TYPE string;
DEFINE FIELD settings ON TABLE organization TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_slug ON TABLE organization \
    COLUMNS slug UNIQUE;
DEFINE INDEX idx_organization_owner ON TABLE organization \
    COLUMNS owner_id;

-- =======================================================================
-- Conferences (the tenant boundary)
-- =======================================================================
DEFINE TABLE conference SCHEMAFULL;
DEFINE FIELD title ON TABLE conference TYPE string;
DEFINE FIELD slug ON TABLE conference TYPE string;
DEFINE FIELD description ON TABLE conference TYPE option<string>;
DEFINE FIELD location ON TABLE conference TYPE option<string>;
DEFINE FIELD start_date ON TABLE conference TYPE string;
DEFINE FIELD end_date ON TABLE conference TYPE string;
DEFINE FIELD submission_deadline ON TABLE conference \
    TYPE option<string>;
DEFINE FIELD organizer_id ON TABLE conference TYPE string;
DEFINE FIELD organization_id ON TABLE conference TYPE option<string>;
DEFINE FIELD status ON TABLE conference TYPE string \
    ASSERT $value IN ['draft', 'upcoming', 'ongoing', 'completed', \
    'cancelled'];
DEFINE FIELD created_at ON TABLE conference TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE conference TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_conference_slug ON TABLE conference \
    COLUMNS slug UNIQUE;
DEFINE INDEX idx_conference_status ON TABLE conference COLUMNS status;
DEFINE INDEX idx_conference_organizer ON TABLE conference \
    COLUMNS organizer_id;

-- =======================================================================
-- Role assignments (conference scope)
-- The record id is the composite key user:conference:role, so an
-- UPSERT on it is the atomic insert-or-update for the triple.
-- =======================================================================
DEFINE TABLE conference_role SCHEMAFULL;
DEFINE FIELD user_id ON TABLE conference_role TYPE string;
DEFINE FIELD conference_id ON TABLE conference_role TYPE string;
DEFINE FIELD role ON TABLE conference_role TYPE string \
    ASSERT $value IN ['organizer', 'reviewer', 'author', 'attendee'];
DEFINE FIELD permissions ON TABLE conference_role TYPE array \
    DEFAULT [];
DEFINE FIELD permissions.* ON TABLE conference_role TYPE string;
DEFINE FIELD created_at ON TABLE conference_role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE conference_role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_triple ON TABLE conference_role \
    COLUMNS user_id, conference_id, role UNIQUE;
DEFINE INDEX idx_role_conference ON TABLE conference_role \
    COLUMNS conference_id;
DEFINE INDEX idx_role_user ON TABLE conference_role COLUMNS user_id;

-- =======================================================================
-- Sessions (platform scope)
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_token ON TABLE session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_session_user ON TABLE session COLUMNS user_id;

-- =======================================================================
-- Abstracts (conference scope)
-- =======================================================================
DEFINE TABLE abstract SCHEMAFULL;
DEFINE FIELD conference_id ON TABLE abstract TYPE string;
DEFINE FIELD author_id ON TABLE abstract TYPE string;
DEFINE FIELD title ON TABLE abstract TYPE string;
DEFINE FIELD content ON TABLE abstract TYPE string;
DEFINE FIELD keywords ON TABLE abstract TYPE array DEFAULT [];
DEFINE FIELD keywords.* ON TABLE abstract TYPE string;
DEFINE FIELD status ON TABLE abstract TYPE string \
    ASSERT $value IN ['submitted', 'under_review', 'accepted', \
    'rejected'];
DEFINE FIELD created_at ON TABLE abstract TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE abstract TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_abstract_conference ON TABLE abstract \
    COLUMNS conference_id;
DEFINE INDEX idx_abstract_conference_author ON TABLE abstract \
    COLUMNS conference_id, author_id;
DEFINE INDEX idx_abstract_conference_status ON TABLE abstract \
    COLUMNS conference_id, status;

-- =======================================================================
-- Reviews (conference scope, one per reviewer per abstract)
-- =======================================================================
DEFINE TABLE review SCHEMAFULL;
DEFINE FIELD conference_id ON TABLE review TYPE string;
DEFINE FIELD abstract_id ON TABLE review TYPE string;
DEFINE FIELD reviewer_id ON TABLE review TYPE string;
DEFINE FIELD score ON TABLE review TYPE int;
DEFINE FIELD comments ON TABLE review TYPE option<string>;
DEFINE FIELD recommendation ON TABLE review TYPE string \
    ASSERT $value IN ['accept', 'revise', 'reject'];
DEFINE FIELD created_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_review_conference ON TABLE review \
    COLUMNS conference_id;
DEFINE INDEX idx_review_conference_abstract ON TABLE review \
    COLUMNS conference_id, abstract_id;
DEFINE INDEX idx_review_abstract_reviewer ON TABLE review \
    COLUMNS abstract_id, reviewer_id UNIQUE;

-- =======================================================================
-- Schedule items (conference scope)
-- =======================================================================
DEFINE TABLE schedule_item SCHEMAFULL;
DEFINE FIELD conference_id ON TABLE schedule_item TYPE string;
DEFINE FIELD title ON TABLE schedule_item TYPE string;
DEFINE FIELD description ON TABLE schedule_item TYPE option<string>;
DEFINE FIELD start_time ON TABLE schedule_item TYPE datetime;
DEFINE FIELD end_time ON TABLE schedule_item TYPE datetime;
DEFINE FIELD location ON TABLE schedule_item TYPE option<string>;
DEFINE FIELD speaker ON TABLE schedule_item TYPE option<string>;
DEFINE FIELD created_at ON TABLE schedule_item TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE schedule_item TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_schedule_conference_start ON TABLE schedule_item \
    COLUMNS conference_id, start_time;

-- =======================================================================
-- Conference settings (conference scope, one row per conference)
-- =======================================================================
DEFINE TABLE conference_settings SCHEMAFULL;
DEFINE FIELD conference_id ON TABLE conference_settings TYPE string;
DEFINE FIELD logo_url ON TABLE conference_settings TYPE option<string>;
DEFINE FIELD primary_color ON TABLE conference_settings TYPE string;
DEFINE FIELD secondary_color ON TABLE conference_settings TYPE string;
DEFINE FIELD custom_css ON TABLE conference_settings \
    TYPE option<string>;
DEFINE FIELD abstract_max_length ON TABLE conference_settings TYPE int \
    DEFAULT 5000;
DEFINE FIELD keywords_required ON TABLE conference_settings TYPE bool \
    DEFAULT false;
DEFINE FIELD custom_fields ON TABLE conference_settings \
    TYPE array DEFAULT [];
DEFINE FIELD enable_reviews ON TABLE conference_settings TYPE bool \
    DEFAULT true;
DEFINE FIELD enable_public_schedule ON TABLE conference_settings \
    TYPE bool DEFAULT true;
DEFINE FIELD enable_abstract_submission ON TABLE conference_settings \
    TYPE bool DEFAULT true;
DEFINE FIELD notification_email ON TABLE conference_settings \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE conference_settings TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE conference_settings TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_settings_conference ON TABLE conference_settings \
    COLUMNS conference_id UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
