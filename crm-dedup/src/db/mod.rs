//! SQLite tenant data source
//!
//! The core database lists workspaces; each workspace's CRM tables live in
//! their own database file under the workspaces directory. Acquiring a
//! workspace opens a single-connection pool on its file; releasing closes it.

use crate::accessor::{ScopedRepository, TenantDataSource};
use crate::{Error, Result};
use async_trait::async_trait;
use crm_common::config::RootFolderInitializer;
use crm_common::db::workspaces::load_workspace;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

mod repository;
pub use repository::SqliteScopedRepository;

/// Connect to an existing core database
///
/// `mode=rw` never creates the file; callers check for it first to report a
/// wrong root folder clearly.
pub async fn connect_core(db_path: &Path) -> Result<SqlitePool> {
    let db_url = format!("sqlite://{}?mode=rw", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(&db_url)
        .await?;

    Ok(pool)
}

pub struct SqliteTenantDataSource {
    core: SqlitePool,
    layout: RootFolderInitializer,
    acquired: Mutex<HashMap<String, SqlitePool>>,
}

impl SqliteTenantDataSource {
    pub fn new(core: SqlitePool, layout: RootFolderInitializer) -> Self {
        Self {
            core,
            layout,
            acquired: Mutex::new(HashMap::new()),
        }
    }

    /// Workspaces currently held open
    pub async fn acquired_count(&self) -> usize {
        self.acquired.lock().await.len()
    }
}

#[async_trait]
impl TenantDataSource for SqliteTenantDataSource {
    async fn list_active_workspace_ids(&self) -> Result<Vec<String>> {
        let ids = crm_common::db::workspaces::list_active_workspace_ids(&self.core).await?;
        Ok(ids)
    }

    async fn acquire(&self, workspace_id: &str) -> Result<Box<dyn ScopedRepository>> {
        let mut acquired = self.acquired.lock().await;
        if acquired.contains_key(workspace_id) {
            return Err(Error::AlreadyAcquired(workspace_id.to_string()));
        }

        // Status may have changed since the active list was read
        let workspace = load_workspace(&self.core, workspace_id)
            .await?
            .ok_or_else(|| Error::WorkspaceNotFound(workspace_id.to_string()))?;
        if !workspace.is_active() {
            return Err(Error::WorkspaceInactive(format!(
                "{} ({})",
                workspace_id, workspace.activation_status
            )));
        }

        let db_path = self.layout.workspace_database_path(workspace_id)?;
        if !db_path.exists() {
            return Err(Error::WorkspaceNotFound(format!(
                "{} (no database at {})",
                workspace_id,
                db_path.display()
            )));
        }

        let db_url = format!("sqlite://{}?mode=rw", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await?;

        debug!(workspace_id, path = %db_path.display(), "Acquired workspace database");

        acquired.insert(workspace_id.to_string(), pool.clone());
        Ok(Box::new(SqliteScopedRepository::new(pool)))
    }

    async fn release(&self, workspace_id: &str) -> Result<()> {
        let pool = self.acquired.lock().await.remove(workspace_id);

        if let Some(pool) = pool {
            pool.close().await;
            info!(workspace_id, "Released workspace database");
        }

        Ok(())
    }
}
