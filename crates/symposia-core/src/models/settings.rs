//! Per-conference settings domain model.
//!
//! Exactly one settings row exists per conference, created on demand
//! with the defaults below merged over any provided overrides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PRIMARY_COLOR: &str = "#3b82f6";
pub const DEFAULT_SECONDARY_COLOR: &str = "#1e40af";
pub const DEFAULT_ABSTRACT_MAX_LENGTH: i64 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConferenceSettings {
    pub conference_id: Uuid,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub custom_css: Option<String>,
    pub abstract_max_length: i64,
    pub keywords_required: bool,
    /// Conference-defined extra submission fields.
    pub custom_fields: serde_json::Value,
    pub enable_reviews: bool,
    pub enable_public_schedule: bool,
    pub enable_abstract_submission: bool,
    pub notification_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Overrides applied on top of the defaults at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsInput {
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub custom_css: Option<String>,
    pub abstract_max_length: Option<i64>,
    pub keywords_required: Option<bool>,
    pub custom_fields: Option<serde_json::Value>,
    pub enable_reviews: Option<bool>,
    pub enable_public_schedule: Option<bool>,
    pub enable_abstract_submission: Option<bool>,
    pub notification_email: Option<String>,
}
