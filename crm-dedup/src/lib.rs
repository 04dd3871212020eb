//! crm-dedup library - workspace uniqueness repair
//!
//! Restores uniqueness invariants the storage layer does not enforce, one
//! workspace at a time:
//! - company primary domain
//! - person primary email
//! - view field `(field_metadata_id, view_id)`
//! - view sort `(field_metadata_id, view_id)`
//!
//! Every violation is logged; outside dry-run mode it is also repaired by
//! rewriting the value or soft-deleting the extra rows.

pub mod accessor;
pub mod db;
pub mod detector;
pub mod error;
pub mod orchestrator;
pub mod resolver;
pub mod summary;
pub mod target;

pub use accessor::{CandidateRow, DuplicateKey, ScopedRepository, TenantDataSource};
pub use error::{Error, Result};
pub use orchestrator::{run, Orchestrator, RunOptions};
pub use summary::{RunSummary, WorkspaceOutcome, WorkspaceState};
