//! Shared fixtures: a temporary root folder with a core database and one
//! partition database per workspace.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use crm_common::config::RootFolderInitializer;
use crm_common::db::init::{init_core_database, init_workspace_database};
use crm_common::db::workspaces::save_workspace;
use crm_common::db::{ActivationStatus, Company, Person, ViewField, ViewSort, Workspace};
use crm_dedup::db::SqliteTenantDataSource;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub struct Fixture {
    _temp: TempDir,
    pub layout: RootFolderInitializer,
    pub core: SqlitePool,
    workspaces_created: i64,
}

impl Fixture {
    pub async fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let layout = RootFolderInitializer::new(temp.path().to_path_buf());
        layout.ensure_directory_exists().unwrap();
        let core = init_core_database(&layout.core_database_path()).await.unwrap();

        Self {
            _temp: temp,
            layout,
            core,
            workspaces_created: 0,
        }
    }

    /// Register a workspace and create its partition database
    ///
    /// Workspaces are listed in creation order.
    pub async fn add_workspace(&mut self, name: &str, status: ActivationStatus) -> (String, SqlitePool) {
        let mut workspace = Workspace::new(name, status);
        workspace.created_at = at(0) + Duration::minutes(self.workspaces_created);
        workspace.updated_at = workspace.created_at;
        self.workspaces_created += 1;
        save_workspace(&self.core, &workspace).await.unwrap();

        let path = self.layout.workspace_database_path(&workspace.id).unwrap();
        let pool = init_workspace_database(&path).await.unwrap();
        (workspace.id, pool)
    }

    pub async fn add_active_workspace(&mut self, name: &str) -> (String, SqlitePool) {
        self.add_workspace(name, ActivationStatus::Active).await
    }

    pub fn data_source(&self) -> SqliteTenantDataSource {
        SqliteTenantDataSource::new(self.core.clone(), self.layout.clone())
    }
}

/// Fixed reference time minus `hours_ago`; larger values are older rows
pub fn at(hours_ago: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() - Duration::hours(hours_ago)
}

pub fn company(domain: Option<&str>, hours_ago: i64) -> Company {
    let mut company = Company::new("Acme", domain);
    company.created_at = at(hours_ago);
    company.updated_at = company.created_at;
    company
}

pub fn person(email: Option<&str>, hours_ago: i64) -> Person {
    let mut person = Person::new("Ada", "Lovelace", email);
    person.created_at = at(hours_ago);
    person.updated_at = person.created_at;
    person
}

pub fn view_field(field_metadata_id: &str, view_id: &str, hours_ago: i64) -> ViewField {
    let mut field = ViewField::new(field_metadata_id, view_id, 0.0);
    field.created_at = at(hours_ago);
    field.updated_at = field.created_at;
    field
}

pub fn view_sort(field_metadata_id: &str, view_id: &str, hours_ago: i64) -> ViewSort {
    let mut sort = ViewSort::new(field_metadata_id, view_id, "asc");
    sort.created_at = at(hours_ago);
    sort.updated_at = sort.created_at;
    sort
}

/// Largest number of live rows sharing one non-null, non-blank value of `column`
pub async fn max_live_group(pool: &SqlitePool, table: &str, columns: &str) -> i64 {
    let not_null = columns
        .split(", ")
        .map(|c| format!("{c} IS NOT NULL AND {c} <> ''"))
        .collect::<Vec<_>>()
        .join(" AND ");
    let sql = format!(
        "SELECT COALESCE(MAX(n), 0) FROM (SELECT COUNT(*) AS n FROM {table} \
         WHERE deleted_at IS NULL AND {not_null} GROUP BY {columns})"
    );
    sqlx::query_scalar(&sql).fetch_one(pool).await.unwrap()
}
