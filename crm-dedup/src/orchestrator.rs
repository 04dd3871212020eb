//! Multi-workspace correction run
//!
//! Workspaces are processed strictly one after another. Within a workspace
//! the entity passes run in [`CORRECTION_ORDER`], and within a pass the
//! duplicate groups are resolved one by one. Any error aborts the rest of
//! that workspace's pass; writes already made stay. The workspace's
//! resources are released on every path before moving on.

use crate::accessor::{ScopedRepository, TenantDataSource};
use crate::detector::find_duplicates;
use crate::resolver::{resolve_group, Action, PassContext};
use crate::summary::{EntityReport, RunSummary, WorkspaceOutcome, WorkspaceState};
use crate::target::{DedupTarget, CORRECTION_ORDER};
use crate::Result;
use tracing::{error, info, warn};

/// Options for one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Detect and log only, write nothing
    pub dry_run: bool,
    /// Restrict the run to these workspaces; empty means every active one
    pub workspace_ids: Vec<String>,
}

pub struct Orchestrator<'a> {
    source: &'a dyn TenantDataSource,
    options: RunOptions,
}

impl<'a> Orchestrator<'a> {
    pub fn new(source: &'a dyn TenantDataSource, options: RunOptions) -> Self {
        Self { source, options }
    }

    /// Run the correction passes over every selected workspace
    ///
    /// Only failing to list workspaces is an error; workspace failures are
    /// logged and recorded in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let workspace_ids = self.select_workspaces().await?;
        let total = workspace_ids.len();
        let mut summary = RunSummary::new(self.options.dry_run);

        if self.options.dry_run {
            info!("Dry run: no changes will be written");
        }

        for (position, workspace_id) in workspace_ids.iter().enumerate() {
            info!(
                workspace_id = %workspace_id,
                "Running command on workspace {}/{}",
                position + 1,
                total
            );
            summary.workspaces.push(self.process_workspace(workspace_id).await);
        }

        info!(
            workspaces = total,
            completed = summary.completed_count(),
            failed = summary.failed_count(),
            remediations = summary.remediation_count(),
            dry_run = self.options.dry_run,
            "Command completed!"
        );

        Ok(summary)
    }

    /// Active workspaces, narrowed to the requested ids when given
    async fn select_workspaces(&self) -> Result<Vec<String>> {
        let active = self.source.list_active_workspace_ids().await?;

        if self.options.workspace_ids.is_empty() {
            return Ok(active);
        }

        for requested in &self.options.workspace_ids {
            if !active.contains(requested) {
                warn!(workspace_id = %requested, "Requested workspace is not active, skipping");
            }
        }

        Ok(active
            .into_iter()
            .filter(|id| self.options.workspace_ids.contains(id))
            .collect())
    }

    async fn process_workspace(&self, workspace_id: &str) -> WorkspaceOutcome {
        let mut outcome = WorkspaceOutcome::new(workspace_id);
        outcome.transition_to(WorkspaceState::Running);

        let result = match self.source.acquire(workspace_id).await {
            Ok(repo) => self.correct_workspace(repo.as_ref(), &mut outcome).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                outcome.transition_to(WorkspaceState::Completed);
                info!(
                    workspace_id = %workspace_id,
                    remediations = outcome.remediation_count(),
                    "Workspace completed"
                );
            }
            Err(e) => {
                outcome.transition_to(WorkspaceState::Failed);
                error!(workspace_id = %workspace_id, error = %e, "Error in workspace");
            }
        }

        match self.source.release(workspace_id).await {
            Ok(()) => outcome.resources_released = true,
            Err(e) => {
                warn!(workspace_id = %workspace_id, error = %e, "Failed to release workspace resources")
            }
        }

        outcome
    }

    async fn correct_workspace(
        &self,
        repo: &dyn ScopedRepository,
        outcome: &mut WorkspaceOutcome,
    ) -> Result<()> {
        let workspace_id = outcome.workspace_id.clone();
        let ctx = PassContext {
            workspace_id: &workspace_id,
            dry_run: self.options.dry_run,
        };

        for target in &CORRECTION_ORDER {
            let report = correct_target(repo, target, ctx, outcome).await?;
            outcome.passes.push((target.entity, report));
        }

        Ok(())
    }
}

/// One entity pass: detect, then resolve each group in key order
async fn correct_target(
    repo: &dyn ScopedRepository,
    target: &DedupTarget,
    ctx: PassContext<'_>,
    outcome: &mut WorkspaceOutcome,
) -> Result<EntityReport> {
    let duplicates = find_duplicates(repo, target).await?;

    if duplicates.is_empty() {
        info!(workspace_id = ctx.workspace_id, entity = %target.entity, "No duplicates found");
        return Ok(EntityReport::default());
    }

    info!(
        workspace_id = ctx.workspace_id,
        entity = %target.entity,
        groups = duplicates.len(),
        "Found duplicate groups"
    );

    let first_record = outcome.records.len();
    for key in &duplicates {
        resolve_group(repo, target, key, ctx, &mut outcome.records).await?;
    }

    let mut report = EntityReport {
        duplicate_groups: duplicates.len(),
        ..EntityReport::default()
    };
    for record in &outcome.records[first_record..] {
        match record.action {
            Action::Rename => report.renamed += 1,
            Action::SoftDelete => report.soft_deleted += 1,
            Action::Skip => report.skipped += 1,
        }
    }

    Ok(report)
}

/// Run every correction pass over all active workspaces
pub async fn run(source: &dyn TenantDataSource, dry_run: bool) -> Result<RunSummary> {
    Orchestrator::new(
        source,
        RunOptions {
            dry_run,
            ..RunOptions::default()
        },
    )
    .run()
    .await
}
