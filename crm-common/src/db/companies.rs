//! Company rows (workspace partition)

use crate::time::{parse_storage, parse_storage_opt, to_storage};
use crate::{uuid_utils, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: Option<String>,
    /// Primary domain link; unique among live rows when non-null
    pub domain_name_primary_link_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Company {
    pub fn new(name: &str, domain: Option<&str>) -> Self {
        let now = crate::time::now();
        Self {
            id: uuid_utils::generate_string(),
            name: Some(name.to_string()),
            domain_name_primary_link_url: domain.map(str::to_string),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn from_row(row: &SqliteRow) -> Result<Self> {
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Self {
            id: row.get("id"),
            name: row.get("name"),
            domain_name_primary_link_url: row.get("domain_name_primary_link_url"),
            created_at: parse_storage(&created_at)?,
            updated_at: parse_storage(&updated_at)?,
            deleted_at: parse_storage_opt(row.get("deleted_at"))?,
        })
    }
}

pub async fn save_company(pool: &SqlitePool, company: &Company) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO company (id, name, domain_name_primary_link_url, created_at, updated_at, deleted_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&company.id)
    .bind(&company.name)
    .bind(&company.domain_name_primary_link_url)
    .bind(to_storage(company.created_at))
    .bind(to_storage(company.updated_at))
    .bind(company.deleted_at.map(to_storage))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn load_company(pool: &SqlitePool, id: &str) -> Result<Option<Company>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, domain_name_primary_link_url, created_at, updated_at, deleted_at
        FROM company
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(Company::from_row).transpose()
}

/// All companies, soft-deleted included, oldest first
pub async fn load_all_companies(pool: &SqlitePool) -> Result<Vec<Company>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, domain_name_primary_link_url, created_at, updated_at, deleted_at
        FROM company
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(Company::from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load_company() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::init::create_company_table(&pool).await.unwrap();

        let company = Company::new("Acme", Some("acme.com"));
        save_company(&pool, &company).await.expect("Failed to save company");

        let loaded = load_company(&pool, &company.id)
            .await
            .expect("Failed to load company")
            .expect("Company not found");

        assert_eq!(loaded.domain_name_primary_link_url.as_deref(), Some("acme.com"));
        assert_eq!(loaded.created_at, company.created_at);
        assert!(loaded.deleted_at.is_none());

        assert!(load_company(&pool, "missing").await.unwrap().is_none());
    }
}
