//! PostgreSQL storage implementation
//!
//! One table per record kind. Records are kept as JSONB next to the columns
//! the store itself filters on; deletes only stamp `deleted_at`.

use async_trait::async_trait;
use resource_core::{Record, RecordId, RecordStore, StoreError, StoreResult};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::marker::PhantomData;
use std::time::Duration;

/// Open a connection pool.
pub async fn connect(
    url: &str,
    max_connections: u32,
    connect_timeout_secs: u64,
) -> StoreResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(connect_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))
}

/// PostgreSQL-backed store for records of type `R`
pub struct PostgresStore<R> {
    pool: PgPool,
    _records: PhantomData<fn() -> R>,
}

impl<R> Clone for PostgresStore<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _records: PhantomData,
        }
    }
}

impl<R: Record> PostgresStore<R> {
    /// Create the table for `R` if needed.
    ///
    /// `unique_field` names a JSON field that must be unique among the live
    /// children of one parent.
    pub async fn new(pool: PgPool, unique_field: Option<&str>) -> StoreResult<Self> {
        let store = Self {
            pool,
            _records: PhantomData,
        };
        store.initialize_schema(unique_field).await?;
        Ok(store)
    }

    async fn initialize_schema(&self, unique_field: Option<&str>) -> StoreResult<()> {
        let table = R::KIND;
        let mut statements = vec![
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id BIGSERIAL PRIMARY KEY,
                    parent_id BIGINT NOT NULL,
                    data JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    deleted_at TIMESTAMPTZ
                );
                "#
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {table}_parent_id ON {table}(parent_id) WHERE deleted_at IS NULL;"
            ),
        ];

        if let Some(field) = unique_field {
            statements.push(format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {table}_unique_{field} \
                 ON {table}(parent_id, (data->>'{field}')) WHERE deleted_at IS NULL;"
            ));
        }

        for stmt in &statements {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
        }

        Ok(())
    }

    fn decode(row: sqlx::postgres::PgRow) -> StoreResult<R> {
        let data: Value = row
            .try_get("data")
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for PostgresStore<R> {
    async fn find(&self, id: RecordId) -> StoreResult<Option<R>> {
        let Some(id) = pg_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query(&format!(
            "SELECT data FROM {} WHERE id = $1 AND deleted_at IS NULL",
            R::KIND
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(Self::decode).transpose()
    }

    async fn related(&self, parent_id: RecordId) -> StoreResult<Vec<R>> {
        let Some(parent_id) = pg_id(parent_id) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(&format!(
            "SELECT data FROM {} WHERE parent_id = $1 AND deleted_at IS NULL ORDER BY id",
            R::KIND
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn create(&self, mut record: R) -> StoreResult<R> {
        // The identifier is part of the stored document, so reserve it first.
        let id: i64 = sqlx::query_scalar(&format!(
            "SELECT nextval(pg_get_serial_sequence('{}', 'id'))",
            R::KIND
        ))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let assigned = RecordId::try_from(id)
            .map_err(|e| StoreError::Query(format!("sequence returned {id}: {e}")))?;
        record.assign_id(assigned);

        let parent_id = required_pg_id(record.parent_id())?;
        let data = serde_json::to_value(&record)?;

        sqlx::query(&format!(
            "INSERT INTO {} (id, parent_id, data) VALUES ($1, $2, $3)",
            R::KIND
        ))
        .bind(id)
        .bind(parent_id)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(record)
    }

    async fn update(&self, record: R) -> StoreResult<R> {
        let id = required_pg_id(record.id())?;
        let parent_id = required_pg_id(record.parent_id())?;
        let data = serde_json::to_value(&record)?;

        let result = sqlx::query(&format!(
            "UPDATE {} SET parent_id = $2, data = $3, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
            R::KIND
        ))
        .bind(id)
        .bind(parent_id)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing {
                kind: R::KIND,
                id: record.id(),
            });
        }
        Ok(record)
    }

    async fn delete(&self, record: &R) -> StoreResult<()> {
        let id = required_pg_id(record.id())?;

        let result = sqlx::query(&format!(
            "UPDATE {} SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
            R::KIND
        ))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing {
                kind: R::KIND,
                id: record.id(),
            });
        }
        Ok(())
    }
}

/// Identifiers above `i64::MAX` cannot exist in a BIGSERIAL column.
fn pg_id(id: RecordId) -> Option<i64> {
    i64::try_from(id).ok()
}

fn required_pg_id(id: RecordId) -> StoreResult<i64> {
    pg_id(id).ok_or_else(|| StoreError::Constraint(format!("identifier {id} out of range")))
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) => classify(db.code().as_deref(), db.message()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Connection(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

/// Map a SQLSTATE onto a store error. Class 23 is integrity constraint
/// violation; 23505 is `unique_violation`.
fn classify(code: Option<&str>, message: &str) -> StoreError {
    match code {
        Some("23505") => StoreError::Conflict(message.to_string()),
        Some(code) if code.starts_with("23") => StoreError::Constraint(message.to_string()),
        _ => StoreError::Query(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_core::StoreErrorKind;

    #[test]
    fn test_sqlstate_classification() {
        assert_eq!(
            classify(Some("23505"), "duplicate key").kind(),
            StoreErrorKind::Conflict
        );
        assert_eq!(
            classify(Some("23503"), "foreign key").kind(),
            StoreErrorKind::Constraint
        );
        assert_eq!(
            classify(Some("42P01"), "undefined table").kind(),
            StoreErrorKind::Query
        );
        assert_eq!(classify(None, "?").kind(), StoreErrorKind::Query);
    }

    #[test]
    fn test_identifier_range() {
        assert_eq!(pg_id(7), Some(7));
        assert_eq!(pg_id(u64::MAX), None);
        assert!(required_pg_id(u64::MAX).is_err());
    }
}
