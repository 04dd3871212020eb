//! Database initialization
//!
//! Two kinds of database exist under the root folder:
//! - the core database, holding the `workspace` registry
//! - one partition database per workspace, holding its CRM tables
//!
//! Every `create_*` function is idempotent (`CREATE TABLE IF NOT EXISTS`).

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the core database and its schema
pub async fn init_core_database(db_path: &Path) -> Result<SqlitePool> {
    let pool = open_or_create(db_path, 5).await?;

    create_workspace_table(&pool).await?;

    Ok(pool)
}

/// Open (creating if needed) a workspace partition database and its schema
pub async fn init_workspace_database(db_path: &Path) -> Result<SqlitePool> {
    let pool = open_or_create(db_path, 1).await?;

    init_workspace_schema(&pool).await?;

    Ok(pool)
}

/// Create all workspace partition tables
pub async fn init_workspace_schema(pool: &SqlitePool) -> Result<()> {
    create_company_table(pool).await?;
    create_person_table(pool).await?;
    create_view_field_table(pool).await?;
    create_view_sort_table(pool).await?;
    Ok(())
}

async fn open_or_create(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    Ok(pool)
}

pub async fn create_workspace_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workspace (
            id TEXT PRIMARY KEY,
            display_name TEXT,
            activation_status TEXT NOT NULL DEFAULT 'PENDING_CREATION',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Company table
///
/// No UNIQUE constraint on `domain_name_primary_link_url`: uniqueness among
/// live rows is maintained by the dedup tool.
pub async fn create_company_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS company (
            id TEXT PRIMARY KEY,
            name TEXT,
            domain_name_primary_link_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_company_domain ON company(domain_name_primary_link_url)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_person_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS person (
            id TEXT PRIMARY KEY,
            name_first_name TEXT,
            name_last_name TEXT,
            emails_primary_email TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_person_email ON person(emails_primary_email)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_view_field_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS view_field (
            id TEXT PRIMARY KEY,
            field_metadata_id TEXT NOT NULL,
            view_id TEXT NOT NULL,
            position REAL NOT NULL DEFAULT 0,
            is_visible INTEGER NOT NULL DEFAULT 1,
            size INTEGER NOT NULL DEFAULT 100,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_view_field_key ON view_field(field_metadata_id, view_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_view_sort_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS view_sort (
            id TEXT PRIMARY KEY,
            field_metadata_id TEXT NOT NULL,
            view_id TEXT NOT NULL,
            direction TEXT NOT NULL DEFAULT 'asc',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_view_sort_key ON view_sort(field_metadata_id, view_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
