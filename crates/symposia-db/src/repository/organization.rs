//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use symposia_core::error::SymposiaResult;
use symposia_core::models::organization::{
    CreateOrganization, Organization, UpdateOrganization,
};
use symposia_core::repository::OrganizationRepository;
use symposia_core::validate;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{check_response, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    slug: String,
    description: Option<String>,
    owner_id: String,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    slug: String,
    description: Option<String>,
    owner_id: String,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Result<Organization, DbError> {
        Ok(Organization {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            owner_id: parse_uuid(&self.owner_id, "owner")?,
            settings: self.settings,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = parse_uuid(&self.record_id, "organization")?;
        Ok(Organization {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            owner_id: parse_uuid(&self.owner_id, "owner")?,
            settings: self.settings,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM organization \
                 WHERE slug = $slug GROUP ALL",
            )
            .bind(("slug", slug.to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    /// Derive a unique slug from the name, suffixing `-N` on collision.
    async fn generate_unique_slug(&self, name: &str) -> Result<String, DbError> {
        let base = validate::slugify(name);
        let mut slug = base.clone();
        let mut counter = 1;
        while self.slug_exists(&slug).await? {
            slug = format!("{base}-{counter}");
            counter += 1;
        }
        Ok(slug)
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> SymposiaResult<Organization> {
        validate::validate_title(&input.name)?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let slug = self.generate_unique_slug(&input.name).await?;

        let settings = input
            .settings
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 name = $name, slug = $slug, description = $description, \
                 owner_id = $owner_id, settings = $settings",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", slug))
            .bind(("description", input.description))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("settings", settings))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response(result, "organization")?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SymposiaResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn get_by_slug(&self, slug: &str) -> SymposiaResult<Organization> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE slug = $slug",
            )
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_organization()?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> SymposiaResult<Vec<Organization>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE owner_id = $owner_id \
                 ORDER BY created_at DESC",
            )
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> SymposiaResult<Organization> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.settings.is_some() {
            sets.push("settings = $settings");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('organization', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(settings) = input.settings {
            builder = builder.bind(("settings", settings));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = check_response(result, "organization")?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn delete(&self, id: Uuid) -> SymposiaResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("DELETE type::record('organization', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "organization".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}
