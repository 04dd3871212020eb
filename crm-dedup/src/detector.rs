//! Duplicate detection
//!
//! Finds uniqueness-key values held by more than one live row. Read-only.

use crate::accessor::{DuplicateKey, ScopedRepository};
use crate::target::DedupTarget;
use crate::Result;
use tracing::debug;

/// Smallest group size that violates uniqueness
const MIN_DUPLICATES: i64 = 2;

/// Duplicate keys of `target`, in ascending key order
pub async fn find_duplicates(
    repo: &dyn ScopedRepository,
    target: &DedupTarget,
) -> Result<Vec<DuplicateKey>> {
    let mut duplicates: Vec<DuplicateKey> = repo
        .grouped_count(target, MIN_DUPLICATES)
        .await?
        .into_iter()
        .filter(|group| group.count >= MIN_DUPLICATES && is_countable(target, group))
        .collect();

    duplicates.sort_by(|a, b| a.values.cmp(&b.values));

    debug!(
        entity = %target.entity,
        groups = duplicates.len(),
        "Duplicate detection finished"
    );

    Ok(duplicates)
}

/// Blank values never count as duplicates for targets that ignore blanks
fn is_countable(target: &DedupTarget, group: &DuplicateKey) -> bool {
    !(target.ignore_blank && group.values.iter().any(|v| v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::CandidateRow;
    use crate::target::{COMPANY, VIEW_FIELD};
    use async_trait::async_trait;

    /// Repository returning canned groups regardless of filter
    struct CannedGroups(Vec<DuplicateKey>);

    #[async_trait]
    impl ScopedRepository for CannedGroups {
        async fn grouped_count(&self, _target: &DedupTarget, _min: i64) -> Result<Vec<DuplicateKey>> {
            Ok(self.0.clone())
        }

        async fn find_live(&self, _t: &DedupTarget, _k: &DuplicateKey) -> Result<Vec<CandidateRow>> {
            unimplemented!()
        }

        async fn update_value(&self, _t: &DedupTarget, _id: &str, _v: &str) -> Result<()> {
            unimplemented!()
        }

        async fn soft_delete(&self, _t: &DedupTarget, _id: &str) -> Result<()> {
            unimplemented!()
        }
    }

    fn key(values: &[&str], count: i64) -> DuplicateKey {
        DuplicateKey {
            values: values.iter().map(|v| v.to_string()).collect(),
            count,
        }
    }

    #[tokio::test]
    async fn test_singletons_and_blanks_are_dropped() {
        let repo = CannedGroups(vec![
            key(&["zeta.io"], 2),
            key(&["solo.com"], 1),
            key(&[""], 4),
            key(&["acme.com"], 3),
        ]);

        let found = find_duplicates(&repo, &COMPANY).await.unwrap();

        assert_eq!(found, vec![key(&["acme.com"], 3), key(&["zeta.io"], 2)]);
    }

    #[tokio::test]
    async fn test_blank_composite_parts_kept_when_not_ignored() {
        let repo = CannedGroups(vec![key(&["", "view-1"], 2)]);

        let found = find_duplicates(&repo, &VIEW_FIELD).await.unwrap();

        assert_eq!(found.len(), 1);
    }
}
