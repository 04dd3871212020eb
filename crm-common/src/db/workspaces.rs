//! Workspace registry (core database)

use crate::time::{parse_storage, parse_storage_opt, to_storage};
use crate::{uuid_utils, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use std::fmt;
use std::str::FromStr;

/// Workspace lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationStatus {
    PendingCreation,
    Active,
    Inactive,
    Suspended,
}

impl ActivationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationStatus::PendingCreation => "PENDING_CREATION",
            ActivationStatus::Active => "ACTIVE",
            ActivationStatus::Inactive => "INACTIVE",
            ActivationStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for ActivationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING_CREATION" => Ok(ActivationStatus::PendingCreation),
            "ACTIVE" => Ok(ActivationStatus::Active),
            "INACTIVE" => Ok(ActivationStatus::Inactive),
            "SUSPENDED" => Ok(ActivationStatus::Suspended),
            other => Err(Error::InvalidInput(format!(
                "Unknown activation status: {}",
                other
            ))),
        }
    }
}

/// Tenant record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub display_name: Option<String>,
    pub activation_status: ActivationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Workspace {
    pub fn new(display_name: &str, activation_status: ActivationStatus) -> Self {
        let now = crate::time::now();
        Self {
            id: uuid_utils::generate_string(),
            display_name: Some(display_name.to_string()),
            activation_status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Active workspaces are the only ones maintenance tools operate on
    pub fn is_active(&self) -> bool {
        self.activation_status == ActivationStatus::Active && self.deleted_at.is_none()
    }
}

pub async fn save_workspace(pool: &SqlitePool, workspace: &Workspace) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO workspace (id, display_name, activation_status, created_at, updated_at, deleted_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            display_name = excluded.display_name,
            activation_status = excluded.activation_status,
            updated_at = excluded.updated_at,
            deleted_at = excluded.deleted_at
        "#,
    )
    .bind(&workspace.id)
    .bind(&workspace.display_name)
    .bind(workspace.activation_status.as_str())
    .bind(to_storage(workspace.created_at))
    .bind(to_storage(workspace.updated_at))
    .bind(workspace.deleted_at.map(to_storage))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn load_workspace(pool: &SqlitePool, id: &str) -> Result<Option<Workspace>> {
    let row = sqlx::query(
        r#"
        SELECT id, display_name, activation_status, created_at, updated_at, deleted_at
        FROM workspace
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let status: String = row.get("activation_status");
            let created_at: String = row.get("created_at");
            let updated_at: String = row.get("updated_at");

            Ok(Some(Workspace {
                id: row.get("id"),
                display_name: row.get("display_name"),
                activation_status: status.parse()?,
                created_at: parse_storage(&created_at)?,
                updated_at: parse_storage(&updated_at)?,
                deleted_at: parse_storage_opt(row.get("deleted_at"))?,
            }))
        }
        None => Ok(None),
    }
}

/// Ids of active, non-deleted workspaces, oldest first
pub async fn list_active_workspace_ids(pool: &SqlitePool) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        r#"
        SELECT id
        FROM workspace
        WHERE activation_status = 'ACTIVE'
          AND deleted_at IS NULL
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
