//! Run outcome reporting

use crate::resolver::{Action, RemediationRecord};
use crate::target::EntityKind;
use crate::Result;
use serde::Serialize;
use std::path::Path;

/// Lifecycle of one workspace within a run
///
/// `Pending → Running → Completed | Failed`; resources are released after
/// either terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Counts for one entity pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub duplicate_groups: usize,
    pub renamed: usize,
    pub soft_deleted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceOutcome {
    pub workspace_id: String,
    pub state: WorkspaceState,
    pub resources_released: bool,
    /// Entity passes that ran to the end, in order
    pub passes: Vec<(EntityKind, EntityReport)>,
    pub records: Vec<RemediationRecord>,
}

impl WorkspaceOutcome {
    pub fn new(workspace_id: &str) -> Self {
        Self {
            workspace_id: workspace_id.to_string(),
            state: WorkspaceState::Pending,
            resources_released: false,
            passes: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Move to `new_state`, returning the previous state
    pub fn transition_to(&mut self, new_state: WorkspaceState) -> WorkspaceState {
        std::mem::replace(&mut self.state, new_state)
    }

    pub fn report_for(&self, entity: EntityKind) -> Option<&EntityReport> {
        self.passes
            .iter()
            .find(|(kind, _)| *kind == entity)
            .map(|(_, report)| report)
    }

    /// Rows remediated (or that would be, in dry-run mode)
    pub fn remediation_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.action != Action::Skip)
            .count()
    }
}

/// Result of one multi-workspace run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub workspaces: Vec<WorkspaceOutcome>,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            workspaces: Vec::new(),
        }
    }

    pub fn completed_count(&self) -> usize {
        self.count_in(WorkspaceState::Completed)
    }

    pub fn failed_count(&self) -> usize {
        self.count_in(WorkspaceState::Failed)
    }

    pub fn remediation_count(&self) -> usize {
        self.workspaces.iter().map(|w| w.remediation_count()).sum()
    }

    pub fn workspace(&self, workspace_id: &str) -> Option<&WorkspaceOutcome> {
        self.workspaces.iter().find(|w| w.workspace_id == workspace_id)
    }

    fn count_in(&self, state: WorkspaceState) -> usize {
        self.workspaces.iter().filter(|w| w.state == state).count()
    }

    /// Write the summary as pretty-printed JSON
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
