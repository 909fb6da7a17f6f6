//! # Repository Module
//!
//! Store Gateway repositories for the dine-in engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service layer (server)                                                 │
//! │       │                                                                 │
//! │       │  db.orders().set_status(7, Ready, policy)                       │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── create_order(&self, new_order)         one transaction            │
//! │  ├── set_status(&self, id, status, policy)  one transaction            │
//! │  └── pay(&self, id, payment, policy)        one transaction            │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TableRepository`](table::TableRepository) - Tables and slot availability
//! - [`ReservationRepository`](reservation::ReservationRepository) - Bookings and the conflict check
//! - [`MenuRepository`](menu::MenuRepository) - Catalog reads and admin writes
//! - [`OrderRepository`](order::OrderRepository) - Orders, status machine, payments

pub mod menu;
pub mod order;
pub mod reservation;
pub mod table;

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{DbError, DbResult};

/// Opens a transaction that takes the SQLite write lock at `BEGIN`.
///
/// A deferred transaction that reads first and writes later cannot wait
/// for the lock: SQLite fails the upgrade immediately with "database is
/// locked". Taking the lock up front lets competing writers queue on
/// `busy_timeout` and then see the committed state of the winner.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Commits `tx`. A lock timeout stays [`DbError::Busy`]; any other failure
/// becomes [`DbError::TransactionFailed`].
pub(crate) async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
    tx.commit().await.map_err(|err| match DbError::from(err) {
        busy @ DbError::Busy(_) => busy,
        other => DbError::TransactionFailed(other.to_string()),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared setup for repository tests.

    use dinein_core::{MenuItem, NewTable, Table};

    use crate::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// File-backed database with a real connection pool, for tests where
    /// writers race on separate connections.
    pub async fn file_database(dir: &tempfile::TempDir, max_connections: u32) -> Database {
        let config = DbConfig::new(dir.path().join("dinein.db")).max_connections(max_connections);
        Database::new(config).await.unwrap()
    }

    pub async fn table(db: &Database, number: i64, capacity: i64) -> Table {
        db.tables()
            .create(&NewTable {
                table_number: number,
                capacity,
                location: "main_hall".to_string(),
                is_active: true,
            })
            .await
            .unwrap()
    }

    /// Burger ($10.00) and Fries ($5.00) in a "Mains" category.
    pub async fn burger_and_fries(db: &Database) -> (MenuItem, MenuItem) {
        let menu = db.menu();
        let category = menu.create_category("Mains", 1).await.unwrap();
        let burger = menu
            .create_item(category.id, "Burger", Some("Beef patty"), 1000)
            .await
            .unwrap();
        let fries = menu.create_item(category.id, "Fries", None, 500).await.unwrap();
        (burger, fries)
    }
}
