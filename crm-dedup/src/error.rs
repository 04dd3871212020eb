//! Error types for crm-dedup

use thiserror::Error;

/// Result type for dedup operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Query or update failed in a workspace partition or the core database
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// crm-common error (config, schema, stored value parsing)
    #[error("Common error: {0}")]
    Common(#[from] crm_common::Error),

    /// No partition database exists for the workspace
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    /// Registry no longer lists the workspace as active
    #[error("Workspace not active: {0}")]
    WorkspaceInactive(String),

    /// Workspace partition is already held by an in-flight pass
    #[error("Workspace already acquired: {0}")]
    AlreadyAcquired(String),

    /// An update matched no live row
    #[error("No live row {id} in {table}")]
    RowNotUpdated { table: &'static str, id: String },

    /// Remediation is not applicable to the target's key shape
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
