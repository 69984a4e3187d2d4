//! SurrealDB implementation of [`SettingsRepository`].
//!
//! One settings row per conference, keyed by the conference id itself
//! so the unique index and the record id agree.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use symposia_core::error::SymposiaResult;
use symposia_core::models::settings::{
    ConferenceSettings, DEFAULT_ABSTRACT_MAX_LENGTH, DEFAULT_PRIMARY_COLOR,
    DEFAULT_SECONDARY_COLOR, SettingsInput,
};
use symposia_core::repository::SettingsRepository;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{check_response, parse_uuid, require_conference};

#[derive(Debug, SurrealValue)]
struct SettingsRow {
    conference_id: String,
    logo_url: Option<String>,
    primary_color: String,
    secondary_color: String,
    custom_css: Option<String>,
    abstract_max_length: i64,
    keywords_required: bool,
    custom_fields: serde_json::Value,
    enable_reviews: bool,
    enable_public_schedule: bool,
    enable_abstract_submission: bool,
    notification_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SettingsRow {
    fn try_into_settings(self) -> Result<ConferenceSettings, DbError> {
        Ok(ConferenceSettings {
            conference_id: parse_uuid(&self.conference_id, "conference")?,
            logo_url: self.logo_url,
            primary_color: self.primary_color,
            secondary_color: self.secondary_color,
            custom_css: self.custom_css,
            abstract_max_length: self.abstract_max_length,
            keywords_required: self.keywords_required,
            custom_fields: self.custom_fields,
            enable_reviews: self.enable_reviews,
            enable_public_schedule: self.enable_public_schedule,
            enable_abstract_submission: self.enable_abstract_submission,
            notification_email: self.notification_email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the conference settings repository.
#[derive(Clone)]
pub struct SurrealSettingsRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSettingsRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SettingsRepository for SurrealSettingsRepository<C> {
    async fn create(
        &self,
        conference_id: Uuid,
        input: SettingsInput,
    ) -> SymposiaResult<ConferenceSettings> {
        require_conference(conference_id)?;

        let conference_id_str = conference_id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('conference_settings', $id) SET \
                 conference_id = $conference_id, \
                 logo_url = $logo_url, \
                 primary_color = $primary_color, \
                 secondary_color = $secondary_color, \
                 custom_css = $custom_css, \
                 abstract_max_length = $abstract_max_length, \
                 keywords_required = $keywords_required, \
                 custom_fields = $custom_fields, \
                 enable_reviews = $enable_reviews, \
                 enable_public_schedule = $enable_public_schedule, \
                 enable_abstract_submission = \
                 $enable_abstract_submission, \
                 notification_email = $notification_email",
            )
            .bind(("id", conference_id_str.clone()))
            .bind(("conference_id", conference_id_str.clone()))
            .bind(("logo_url", input.logo_url))
            .bind((
                "primary_color",
                input
                    .primary_color
                    .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
            ))
            .bind((
                "secondary_color",
                input
                    .secondary_color
                    .unwrap_or_else(|| DEFAULT_SECONDARY_COLOR.to_string()),
            ))
            .bind(("custom_css", input.custom_css))
            .bind((
                "abstract_max_length",
                input
                    .abstract_max_length
                    .unwrap_or(DEFAULT_ABSTRACT_MAX_LENGTH),
            ))
            .bind(("keywords_required", input.keywords_required.unwrap_or(false)))
            .bind((
                "custom_fields",
                input
                    .custom_fields
                    .unwrap_or(serde_json::Value::Array(Vec::new())),
            ))
            .bind(("enable_reviews", input.enable_reviews.unwrap_or(true)))
            .bind((
                "enable_public_schedule",
                input.enable_public_schedule.unwrap_or(true),
            ))
            .bind((
                "enable_abstract_submission",
                input.enable_abstract_submission.unwrap_or(true),
            ))
            .bind(("notification_email", input.notification_email))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response(result, "conference settings")?;

        let rows: Vec<SettingsRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "conference_settings".into(),
            id: conference_id_str,
        })?;

        Ok(row.try_into_settings()?)
    }

    async fn get(&self, conference_id: Uuid) -> SymposiaResult<ConferenceSettings> {
        require_conference(conference_id)?;

        let conference_id_str = conference_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM conference_settings \
                 WHERE conference_id = $conference_id",
            )
            .bind(("conference_id", conference_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SettingsRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "conference_settings".into(),
            id: conference_id_str,
        })?;

        Ok(row.try_into_settings()?)
    }

    async fn update(
        &self,
        conference_id: Uuid,
        input: SettingsInput,
    ) -> SymposiaResult<ConferenceSettings> {
        require_conference(conference_id)?;

        let conference_id_str = conference_id.to_string();

        let mut sets = Vec::new();
        if input.logo_url.is_some() {
            sets.push("logo_url = $logo_url");
        }
        if input.primary_color.is_some() {
            sets.push("primary_color = $primary_color");
        }
        if input.secondary_color.is_some() {
            sets.push("secondary_color = $secondary_color");
        }
        if input.custom_css.is_some() {
            sets.push("custom_css = $custom_css");
        }
        if input.abstract_max_length.is_some() {
            sets.push("abstract_max_length = $abstract_max_length");
        }
        if input.keywords_required.is_some() {
            sets.push("keywords_required = $keywords_required");
        }
        if input.custom_fields.is_some() {
            sets.push("custom_fields = $custom_fields");
        }
        if input.enable_reviews.is_some() {
            sets.push("enable_reviews = $enable_reviews");
        }
        if input.enable_public_schedule.is_some() {
            sets.push("enable_public_schedule = $enable_public_schedule");
        }
        if input.enable_abstract_submission.is_some() {
            sets.push("enable_abstract_submission = $enable_abstract_submission");
        }
        if input.notification_email.is_some() {
            sets.push("notification_email = $notification_email");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE conference_settings SET {} \
             WHERE conference_id = $conference_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("conference_id", conference_id_str.clone()));

        if let Some(logo_url) = input.logo_url {
            builder = builder.bind(("logo_url", logo_url));
        }
        if let Some(primary_color) = input.primary_color {
            builder = builder.bind(("primary_color", primary_color));
        }
        if let Some(secondary_color) = input.secondary_color {
            builder = builder.bind(("secondary_color", secondary_color));
        }
        if let Some(custom_css) = input.custom_css {
            builder = builder.bind(("custom_css", custom_css));
        }
        if let Some(abstract_max_length) = input.abstract_max_length {
            builder = builder.bind(("abstract_max_length", abstract_max_length));
        }
        if let Some(keywords_required) = input.keywords_required {
            builder = builder.bind(("keywords_required", keywords_required));
        }
        if let Some(custom_fields) = input.custom_fields {
            builder = builder.bind(("custom_fields", custom_fields));
        }
        if let Some(enable_reviews) = input.enable_reviews {
            builder = builder.bind(("enable_reviews", enable_reviews));
        }
        if let Some(enable_public_schedule) = input.enable_public_schedule {
            builder = builder.bind(("enable_public_schedule", enable_public_schedule));
        }
        if let Some(enable_abstract_submission) = input.enable_abstract_submission {
            builder = builder.bind((
                "enable_abstract_submission",
                enable_abstract_submission,
            ));
        }
        if let Some(notification_email) = input.notification_email {
            builder = builder.bind(("notification_email", notification_email));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response(result, "conference settings")?;

        let rows: Vec<SettingsRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "conference_settings".into(),
            id: conference_id_str,
        })?;

        Ok(row.try_into_settings()?)
    }
}
