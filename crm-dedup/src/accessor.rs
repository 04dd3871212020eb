//! Tenant data access seam
//!
//! The correction passes never touch connections directly. A
//! [`TenantDataSource`] hands out one [`ScopedRepository`] per workspace,
//! bound to that workspace's isolated partition, and is told when the pass
//! is done with it.

use crate::target::DedupTarget;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// A uniqueness-key value shared by several live rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    /// One value per key column, in `DedupTarget::key_columns` order
    pub values: Vec<String>,
    /// Live rows sharing the key
    pub count: i64,
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.values.as_slice() {
            [single] => f.write_str(single),
            values => write!(f, "({})", values.join(", ")),
        }
    }
}

/// A live row belonging to a duplicate group
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub id: String,
    pub key_values: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Entity access scoped to one workspace partition
#[async_trait]
pub trait ScopedRepository: Send + Sync {
    /// Group live rows by the target's key and count them
    ///
    /// Rows with a NULL key column (or blank, when the target ignores
    /// blanks) are excluded. Only groups with at least `min_count` rows are
    /// returned.
    async fn grouped_count(&self, target: &DedupTarget, min_count: i64) -> Result<Vec<DuplicateKey>>;

    /// Live rows matching `key`, newest `created_at` first, ties by id
    async fn find_live(&self, target: &DedupTarget, key: &DuplicateKey) -> Result<Vec<CandidateRow>>;

    /// Rewrite the target's value column on one live row
    async fn update_value(&self, target: &DedupTarget, id: &str, value: &str) -> Result<()>;

    /// Mark one live row deleted
    async fn soft_delete(&self, target: &DedupTarget, id: &str) -> Result<()>;
}

/// Factory of workspace-scoped repositories
#[async_trait]
pub trait TenantDataSource: Send + Sync {
    /// Ids of workspaces eligible for maintenance, in processing order
    async fn list_active_workspace_ids(&self) -> Result<Vec<String>>;

    /// Open the workspace partition for one pass
    async fn acquire(&self, workspace_id: &str) -> Result<Box<dyn ScopedRepository>>;

    /// Tear down whatever `acquire` opened
    ///
    /// Must succeed as a no-op when nothing is held for the workspace.
    async fn release(&self, workspace_id: &str) -> Result<()>;
}
