//! Conflict resolution
//!
//! Within a duplicate group the most recently created live row is canonical
//! and left alone. Every other row is remediated according to the target:
//!
//! | Remediation        | Row at index `i` (1-based after the canonical row) |
//! |--------------------|----------------------------------------------------|
//! | `AppendIndex`      | `acme.com` becomes `acme.com{i}`                   |
//! | `PlusAddressEmail` | `a@b.com` becomes `a+{i}@b.com`                    |
//! | `SoftDelete`       | `deleted_at` is set                                |
//!
//! Rewritten values are not checked against existing rows: `acme.com1` may
//! already belong to another company. A later run picks such collisions up
//! as a fresh duplicate group.
//!
//! Dry-run records match a real run's records except for `applied`, with one
//! exception: when a rewrite collides with a key that a later group of the
//! same pass handles, the real run resolves that group with the rewritten row
//! included and reports one more rename than the dry run.

use crate::accessor::{CandidateRow, DuplicateKey, ScopedRepository};
use crate::target::{DedupTarget, EntityKind, Remediation};
use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What happens to one non-canonical row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Rename,
    SoftDelete,
    /// Value cannot be remediated; row left untouched
    Skip,
}

/// Decision for one row, before anything is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAction {
    pub row_id: String,
    /// 1-based position in the group; the canonical row is position 0
    pub index: usize,
    pub action: Action,
    pub old_value: String,
    pub new_value: Option<String>,
}

/// Decision for one row, as reported after the pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemediationRecord {
    pub entity: EntityKind,
    pub row_id: String,
    pub action: Action,
    pub old_value: String,
    pub new_value: Option<String>,
    /// False in dry-run mode and for skipped rows
    pub applied: bool,
}

/// Per-pass settings threaded through group resolution
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub workspace_id: &'a str,
    pub dry_run: bool,
}

/// `original` with the group index appended
pub fn append_index(original: &str, index: usize) -> String {
    format!("{}{}", original, index)
}

/// Plus-address an email: `local@domain` becomes `local+index@domain`
///
/// The domain (everything after the first `@`) is preserved exactly.
/// Returns `None` when there is no `@`.
pub fn plus_address(email: &str, index: usize) -> Option<String> {
    let (local, domain) = email.split_once('@')?;
    Some(format!("{}+{}@{}", local, index, domain))
}

/// Decide the remediation of every non-canonical row
///
/// `rows` must already be ordered newest first.
pub fn plan_group(target: &DedupTarget, rows: &[CandidateRow]) -> Vec<PlannedAction> {
    rows.iter()
        .enumerate()
        .skip(1)
        .map(|(index, row)| {
            let old_value = row.key_values.join(", ");
            let (action, new_value) = match target.remediation {
                Remediation::AppendIndex => (Action::Rename, Some(append_index(&old_value, index))),
                Remediation::PlusAddressEmail => match plus_address(&old_value, index) {
                    Some(email) => (Action::Rename, Some(email)),
                    None => (Action::Skip, None),
                },
                Remediation::SoftDelete => (Action::SoftDelete, None),
            };

            PlannedAction {
                row_id: row.id.clone(),
                index,
                action,
                old_value,
                new_value,
            }
        })
        .collect()
}

/// Resolve one duplicate group
///
/// Records are appended to `records` as each row is handled, so rows written
/// before a failure are still reported. The first write failure is returned
/// and the rest of the group is not touched.
pub async fn resolve_group(
    repo: &dyn ScopedRepository,
    target: &DedupTarget,
    key: &DuplicateKey,
    ctx: PassContext<'_>,
    records: &mut Vec<RemediationRecord>,
) -> Result<()> {
    let rows = repo.find_live(target, key).await?;

    let Some(canonical) = rows.first() else {
        debug!(workspace_id = ctx.workspace_id, entity = %target.entity, key = %key, "Group vanished before resolution");
        return Ok(());
    };

    debug!(
        workspace_id = ctx.workspace_id,
        entity = %target.entity,
        key = %key,
        canonical = %canonical.id,
        rows = rows.len(),
        "Keeping most recent row"
    );

    for plan in plan_group(target, &rows) {
        let applied = match plan.action {
            Action::Rename => {
                let new_value = plan.new_value.as_deref().ok_or_else(|| {
                    Error::InvalidTarget(format!("{} rename without value", target.entity))
                })?;
                info!(
                    workspace_id = ctx.workspace_id,
                    entity = %target.entity,
                    row_id = %plan.row_id,
                    index = plan.index,
                    old = %plan.old_value,
                    new = %new_value,
                    dry_run = ctx.dry_run,
                    "Renaming duplicate value"
                );
                if !ctx.dry_run {
                    repo.update_value(target, &plan.row_id, new_value).await?;
                }
                !ctx.dry_run
            }
            Action::SoftDelete => {
                info!(
                    workspace_id = ctx.workspace_id,
                    entity = %target.entity,
                    row_id = %plan.row_id,
                    index = plan.index,
                    key = %plan.old_value,
                    dry_run = ctx.dry_run,
                    "Soft-deleting duplicate row"
                );
                if !ctx.dry_run {
                    repo.soft_delete(target, &plan.row_id).await?;
                }
                !ctx.dry_run
            }
            Action::Skip => {
                warn!(
                    workspace_id = ctx.workspace_id,
                    entity = %target.entity,
                    row_id = %plan.row_id,
                    index = plan.index,
                    old = %plan.old_value,
                    "Cannot remediate value, leaving row untouched"
                );
                false
            }
        };

        records.push(RemediationRecord {
            entity: target.entity,
            row_id: plan.row_id,
            action: plan.action,
            old_value: plan.old_value,
            new_value: plan.new_value,
            applied,
        });
    }

    Ok(())
}
