//! # Table Repository
//!
//! Seating units and slot availability.
//!
//! ## Availability Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  available(window)                                                      │
//! │                                                                         │
//! │  active tables                                                          │
//! │     minus tables with a non-cancelled reservation r where               │
//! │           window.start < r.ends_at AND r.starts_at < window.end         │
//! │                                                                         │
//! │  ORDER BY capacity, table_number   (smallest fitting table first)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use dinein_core::validation::validate_new_table;
use dinein_core::{NewTable, Table, TimeWindow};

const TABLE_COLUMNS: &str = "id, table_number, capacity, location, is_active";

/// Repository for table database operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Lists all tables ordered by table number.
    pub async fn list(&self) -> DbResult<Vec<Table>> {
        let sql = format!("SELECT {TABLE_COLUMNS} FROM tables ORDER BY table_number");
        let tables = sqlx::query_as::<_, Table>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(tables)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Table>> {
        let sql = format!("SELECT {TABLE_COLUMNS} FROM tables WHERE id = ?1");
        let table = sqlx::query_as::<_, Table>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(table)
    }

    /// Creates a table.
    ///
    /// ## Errors
    /// - `Domain(Validation)` for a non-positive number or capacity
    /// - `UniqueViolation` when the table number is taken
    pub async fn create(&self, table: &NewTable) -> DbResult<Table> {
        validate_new_table(table)?;

        debug!(table_number = table.table_number, capacity = table.capacity, "Creating table");

        let result = sqlx::query(
            r#"
            INSERT INTO tables (table_number, capacity, location, is_active)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(table.table_number)
        .bind(table.capacity)
        .bind(table.location.trim())
        .bind(table.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                DbError::duplicate("table_number", table.table_number.to_string())
            }
            other => other,
        })?;

        Ok(Table {
            id: result.last_insert_rowid(),
            table_number: table.table_number,
            capacity: table.capacity,
            location: table.location.trim().to_string(),
            is_active: table.is_active,
        })
    }

    /// Activates or deactivates a table. Tables are never deleted.
    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE tables SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", id.to_string()));
        }
        Ok(())
    }

    /// Active tables with no non-cancelled reservation overlapping `window`.
    pub async fn available(&self, window: &TimeWindow) -> DbResult<Vec<Table>> {
        let sql = format!(
            r#"
            SELECT {TABLE_COLUMNS}
            FROM tables t
            WHERE t.is_active = 1
              AND NOT EXISTS (
                  SELECT 1 FROM reservations r
                  WHERE r.table_id = t.id
                    AND r.status != 'cancelled'
                    AND ?1 < r.ends_at
                    AND r.starts_at < ?2
              )
            ORDER BY t.capacity ASC, t.table_number ASC
            "#
        );
        let tables = sqlx::query_as::<_, Table>(&sql)
            .bind(window.start_ts())
            .bind(window.end_ts())
            .fetch_all(&self.pool)
            .await?;
        Ok(tables)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tables")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
