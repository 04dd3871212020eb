//! SQL for the correction passes
//!
//! Table and column names come from the static [`DedupTarget`] definitions,
//! never from input; values are always bound.

use crate::accessor::{CandidateRow, DuplicateKey, ScopedRepository};
use crate::target::DedupTarget;
use crate::{Error, Result};
use async_trait::async_trait;
use crm_common::time::{now_storage, parse_storage};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Workspace-scoped repository over one partition database
pub struct SqliteScopedRepository {
    pool: SqlitePool,
}

impl SqliteScopedRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// WHERE clause selecting live rows that carry a full uniqueness key
fn live_key_filter(target: &DedupTarget) -> String {
    let mut clauses = vec!["deleted_at IS NULL".to_string()];
    for column in target.key_columns {
        clauses.push(format!("{} IS NOT NULL", column));
        if target.ignore_blank {
            clauses.push(format!("{} <> ''", column));
        }
    }
    clauses.join(" AND ")
}

fn grouped_count_sql(target: &DedupTarget) -> String {
    let columns = target.key_columns.join(", ");
    format!(
        "SELECT {columns}, COUNT(*) AS row_count FROM {table} WHERE {filter} \
         GROUP BY {columns} HAVING COUNT(*) >= ? ORDER BY {columns}",
        columns = columns,
        table = target.table,
        filter = live_key_filter(target),
    )
}

fn find_live_sql(target: &DedupTarget) -> String {
    let columns = target.key_columns.join(", ");
    let key_match = target
        .key_columns
        .iter()
        .map(|c| format!("{} = ?", c))
        .collect::<Vec<_>>()
        .join(" AND ");
    format!(
        "SELECT id, {columns}, created_at FROM {table} \
         WHERE deleted_at IS NULL AND {key_match} \
         ORDER BY created_at DESC, id ASC",
        columns = columns,
        table = target.table,
        key_match = key_match,
    )
}

/// Key columns of one row as text; a non-TEXT value is a decode error
fn key_values(target: &DedupTarget, row: &SqliteRow) -> Result<Vec<String>> {
    let mut values = Vec::with_capacity(target.key_columns.len());
    for column in target.key_columns {
        values.push(row.try_get::<String, _>(*column)?);
    }
    Ok(values)
}

#[async_trait]
impl ScopedRepository for SqliteScopedRepository {
    async fn grouped_count(&self, target: &DedupTarget, min_count: i64) -> Result<Vec<DuplicateKey>> {
        let sql = grouped_count_sql(target);
        let rows = sqlx::query(&sql).bind(min_count).fetch_all(&self.pool).await?;

        let mut groups = Vec::with_capacity(rows.len());
        for row in &rows {
            groups.push(DuplicateKey {
                values: key_values(target, row)?,
                count: row.try_get("row_count")?,
            });
        }

        Ok(groups)
    }

    async fn find_live(&self, target: &DedupTarget, key: &DuplicateKey) -> Result<Vec<CandidateRow>> {
        if key.values.len() != target.key_columns.len() {
            return Err(Error::InvalidTarget(format!(
                "{} key needs {} values, got {}",
                target.entity,
                target.key_columns.len(),
                key.values.len()
            )));
        }

        let sql = find_live_sql(target);
        let mut query = sqlx::query(&sql);
        for value in &key.values {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let created_at: String = row.try_get("created_at")?;
            candidates.push(CandidateRow {
                id: row.try_get("id")?,
                key_values: key_values(target, &row)?,
                created_at: parse_storage(&created_at)?,
            });
        }

        Ok(candidates)
    }

    async fn update_value(&self, target: &DedupTarget, id: &str, value: &str) -> Result<()> {
        let column = target.value_column().ok_or_else(|| {
            Error::InvalidTarget(format!("{} has no rewritable value column", target.entity))
        })?;

        let sql = format!(
            "UPDATE {} SET {} = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
            target.table, column
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(now_storage())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() != 1 {
            return Err(Error::RowNotUpdated {
                table: target.table,
                id: id.to_string(),
            });
        }

        Ok(())
    }

    async fn soft_delete(&self, target: &DedupTarget, id: &str) -> Result<()> {
        let now = now_storage();
        let sql = format!(
            "UPDATE {} SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
            target.table
        );
        let result = sqlx::query(&sql)
            .bind(&now)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() != 1 {
            return Err(Error::RowNotUpdated {
                table: target.table,
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
