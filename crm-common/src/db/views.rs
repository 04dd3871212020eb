//! View field and view sort rows (workspace partition)
//!
//! Both tables share the `(field_metadata_id, view_id)` ordering key: at most
//! one live row per pair.

use crate::time::{parse_storage, parse_storage_opt, to_storage};
use crate::{uuid_utils, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewField {
    pub id: String,
    pub field_metadata_id: String,
    pub view_id: String,
    pub position: f64,
    pub is_visible: bool,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ViewField {
    pub fn new(field_metadata_id: &str, view_id: &str, position: f64) -> Self {
        let now = crate::time::now();
        Self {
            id: uuid_utils::generate_string(),
            field_metadata_id: field_metadata_id.to_string(),
            view_id: view_id.to_string(),
            position,
            is_visible: true,
            size: 100,
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
            field_metadata_id: row.get("field_metadata_id"),
            view_id: row.get("view_id"),
            position: row.get("position"),
            is_visible: row.get::<i64, _>("is_visible") != 0,
            size: row.get("size"),
            created_at: parse_storage(&created_at)?,
            updated_at: parse_storage(&updated_at)?,
            deleted_at: parse_storage_opt(row.get("deleted_at"))?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSort {
    pub id: String,
    pub field_metadata_id: String,
    pub view_id: String,
    /// `asc` or `desc`
    pub direction: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ViewSort {
    pub fn new(field_metadata_id: &str, view_id: &str, direction: &str) -> Self {
        let now = crate::time::now();
        Self {
            id: uuid_utils::generate_string(),
            field_metadata_id: field_metadata_id.to_string(),
            view_id: view_id.to_string(),
            direction: direction.to_string(),
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
            field_metadata_id: row.get("field_metadata_id"),
            view_id: row.get("view_id"),
            direction: row.get("direction"),
            created_at: parse_storage(&created_at)?,
            updated_at: parse_storage(&updated_at)?,
            deleted_at: parse_storage_opt(row.get("deleted_at"))?,
        })
    }
}

pub async fn save_view_field(pool: &SqlitePool, field: &ViewField) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO view_field (
            id, field_metadata_id, view_id, position, is_visible, size,
            created_at, updated_at, deleted_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&field.id)
    .bind(&field.field_metadata_id)
    .bind(&field.view_id)
    .bind(field.position)
    .bind(field.is_visible as i64)
    .bind(field.size)
    .bind(to_storage(field.created_at))
    .bind(to_storage(field.updated_at))
    .bind(field.deleted_at.map(to_storage))
    .execute(pool)
    .await?;

    Ok(())
}

/// All view fields, soft-deleted included, oldest first
pub async fn load_all_view_fields(pool: &SqlitePool) -> Result<Vec<ViewField>> {
    let rows = sqlx::query(
        r#"
        SELECT id, field_metadata_id, view_id, position, is_visible, size,
               created_at, updated_at, deleted_at
        FROM view_field
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(ViewField::from_row).collect()
}

pub async fn save_view_sort(pool: &SqlitePool, sort: &ViewSort) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO view_sort (
            id, field_metadata_id, view_id, direction,
            created_at, updated_at, deleted_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&sort.id)
    .bind(&sort.field_metadata_id)
    .bind(&sort.view_id)
    .bind(&sort.direction)
    .bind(to_storage(sort.created_at))
    .bind(to_storage(sort.updated_at))
    .bind(sort.deleted_at.map(to_storage))
    .execute(pool)
    .await?;

    Ok(())
}

/// All view sorts, soft-deleted included, oldest first
pub async fn load_all_view_sorts(pool: &SqlitePool) -> Result<Vec<ViewSort>> {
    let rows = sqlx::query(
        r#"
        SELECT id, field_metadata_id, view_id, direction,
               created_at, updated_at, deleted_at
        FROM view_sort
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(ViewSort::from_row).collect()
}
