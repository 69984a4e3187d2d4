//! Organization domain model.
//!
//! Organizations are an optional grouping layer above conferences. Each
//! has exactly one owner; a conference may belong to at most one
//! organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// URL-safe unique identifier, generated from the name.
    pub slug: String,
    pub description: Option<String>,
    /// The single owning user.
    pub owner_id: Uuid,
    /// Arbitrary organization-level settings.
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization. The slug is derived
/// from `name` and uniquified by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub settings: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub description: Option<String>,
    pub settings: Option<serde_json::Value>,
}
