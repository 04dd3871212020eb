//! Person rows (workspace partition)

use crate::time::{parse_storage, parse_storage_opt, to_storage};
use crate::{uuid_utils, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name_first_name: Option<String>,
    pub name_last_name: Option<String>,
    /// `local@domain`; unique among live rows when non-null
    pub emails_primary_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Person {
    pub fn new(first_name: &str, last_name: &str, email: Option<&str>) -> Self {
        let now = crate::time::now();
        Self {
            id: uuid_utils::generate_string(),
            name_first_name: Some(first_name.to_string()),
            name_last_name: Some(last_name.to_string()),
            emails_primary_email: email.map(str::to_string),
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
            name_first_name: row.get("name_first_name"),
            name_last_name: row.get("name_last_name"),
            emails_primary_email: row.get("emails_primary_email"),
            created_at: parse_storage(&created_at)?,
            updated_at: parse_storage(&updated_at)?,
            deleted_at: parse_storage_opt(row.get("deleted_at"))?,
        })
    }
}

pub async fn save_person(pool: &SqlitePool, person: &Person) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO person (
            id, name_first_name, name_last_name, emails_primary_email,
            created_at, updated_at, deleted_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&person.id)
    .bind(&person.name_first_name)
    .bind(&person.name_last_name)
    .bind(&person.emails_primary_email)
    .bind(to_storage(person.created_at))
    .bind(to_storage(person.updated_at))
    .bind(person.deleted_at.map(to_storage))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn load_person(pool: &SqlitePool, id: &str) -> Result<Option<Person>> {
    let row = sqlx::query(
        r#"
        SELECT id, name_first_name, name_last_name, emails_primary_email,
               created_at, updated_at, deleted_at
        FROM person
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(Person::from_row).transpose()
}

/// All people, soft-deleted included, oldest first
pub async fn load_all_people(pool: &SqlitePool) -> Result<Vec<Person>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name_first_name, name_last_name, emails_primary_email,
               created_at, updated_at, deleted_at
        FROM person
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(Person::from_row).collect()
}
