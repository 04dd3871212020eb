//! Uniqueness targets
//!
//! Every correction pass runs the same detect / pick canonical / remediate
//! algorithm. A [`DedupTarget`] supplies what varies between entities: the
//! table, the key columns and the [`Remediation`] applied to extra rows.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Company,
    Person,
    ViewField,
    ViewSort,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Company => "company",
            EntityKind::Person => "person",
            EntityKind::ViewField => "viewField",
            EntityKind::ViewSort => "viewSort",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How non-canonical rows of a duplicate group are neutralized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remediation {
    /// Append the row's 1-based index in the group to the value
    AppendIndex,
    /// Insert `+<index>` before the `@` of an email address
    PlusAddressEmail,
    /// Set `deleted_at`
    SoftDelete,
}

impl Remediation {
    /// Whether this remediation rewrites the key value in place
    pub fn rewrites_value(&self) -> bool {
        matches!(self, Remediation::AppendIndex | Remediation::PlusAddressEmail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupTarget {
    pub entity: EntityKind,
    pub table: &'static str,
    /// Columns forming the uniqueness key; NULL in any of them excludes the row
    pub key_columns: &'static [&'static str],
    /// Treat `''` like NULL
    pub ignore_blank: bool,
    pub remediation: Remediation,
}

impl DedupTarget {
    /// Column rewritten by value remediations
    ///
    /// Only single-column keys can be rewritten.
    pub fn value_column(&self) -> Option<&'static str> {
        match self.key_columns {
            [column] if self.remediation.rewrites_value() => Some(*column),
            _ => None,
        }
    }
}

pub const COMPANY: DedupTarget = DedupTarget {
    entity: EntityKind::Company,
    table: "company",
    key_columns: &["domain_name_primary_link_url"],
    ignore_blank: true,
    remediation: Remediation::AppendIndex,
};

pub const PERSON: DedupTarget = DedupTarget {
    entity: EntityKind::Person,
    table: "person",
    key_columns: &["emails_primary_email"],
    ignore_blank: true,
    remediation: Remediation::PlusAddressEmail,
};

pub const VIEW_FIELD: DedupTarget = DedupTarget {
    entity: EntityKind::ViewField,
    table: "view_field",
    key_columns: &["field_metadata_id", "view_id"],
    ignore_blank: false,
    remediation: Remediation::SoftDelete,
};

pub const VIEW_SORT: DedupTarget = DedupTarget {
    entity: EntityKind::ViewSort,
    table: "view_sort",
    key_columns: &["field_metadata_id", "view_id"],
    ignore_blank: false,
    remediation: Remediation::SoftDelete,
};

/// Fixed order of correction passes within one workspace
pub const CORRECTION_ORDER: [DedupTarget; 4] = [COMPANY, PERSON, VIEW_FIELD, VIEW_SORT];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_order() {
        let order: Vec<EntityKind> = CORRECTION_ORDER.iter().map(|t| t.entity).collect();
        assert_eq!(
            order,
            vec![
                EntityKind::Company,
                EntityKind::Person,
                EntityKind::ViewField,
                EntityKind::ViewSort
            ]
        );
    }

    #[test]
    fn test_value_column_only_for_rewrites() {
        assert_eq!(COMPANY.value_column(), Some("domain_name_primary_link_url"));
        assert_eq!(PERSON.value_column(), Some("emails_primary_email"));
        assert_eq!(VIEW_FIELD.value_column(), None);
        assert_eq!(VIEW_SORT.value_column(), None);
    }
}
