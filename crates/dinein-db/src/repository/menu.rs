//! # Menu Repository
//!
//! Catalog of categories and items. Orders only ever read it; the write
//! operations exist for seeding and back-office maintenance.
//!
//! Deactivating an item hides it from new orders but keeps existing order
//! lines intact, since those carry their own name and price snapshot.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use dinein_core::validation::{validate_menu_name, validate_price_cents};
use dinein_core::{Category, MenuItem};

const ITEM_COLUMNS: &str = "id, category_id, name, description, price_cents, is_active";

/// Repository for menu database operations.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, display_order FROM categories ORDER BY display_order, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Lists menu items, optionally limited to one category.
    ///
    /// Inactive items are omitted unless `include_inactive` is set.
    pub async fn list_items(
        &self,
        category_id: Option<i64>,
        include_inactive: bool,
    ) -> DbResult<Vec<MenuItem>> {
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM menu_items
            WHERE (?1 IS NULL OR category_id = ?1)
              AND (?2 = 1 OR is_active = 1)
            ORDER BY category_id, name
            "#
        );
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(category_id)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn get_item(&self, id: i64) -> DbResult<Option<MenuItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM menu_items WHERE id = ?1");
        let item = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    pub async fn create_category(&self, name: &str, display_order: i64) -> DbResult<Category> {
        validate_menu_name(name)?;

        let result = sqlx::query("INSERT INTO categories (name, display_order) VALUES (?1, ?2)")
            .bind(name.trim())
            .bind(display_order)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => DbError::duplicate("category", name.trim()),
                other => other,
            })?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.trim().to_string(),
            display_order,
        })
    }

    pub async fn create_item(
        &self,
        category_id: i64,
        name: &str,
        description: Option<&str>,
        price_cents: i64,
    ) -> DbResult<MenuItem> {
        validate_menu_name(name)?;
        validate_price_cents(price_cents)?;

        debug!(category_id, name = %name.trim(), price_cents, "Creating menu item");

        let result = sqlx::query(
            r#"
            INSERT INTO menu_items (category_id, name, description, price_cents, is_active)
            VALUES (?1, ?2, ?3, ?4, 1)
            "#,
        )
        .bind(category_id)
        .bind(name.trim())
        .bind(description)
        .bind(price_cents)
        .execute(&self.pool)
        .await?;

        Ok(MenuItem {
            id: result.last_insert_rowid(),
            category_id,
            name: name.trim().to_string(),
            description: description.map(str::to_string),
            price_cents,
            is_active: true,
        })
    }

    /// Changes the catalog price. Existing order lines keep their snapshot.
    pub async fn update_price(&self, id: i64, price_cents: i64) -> DbResult<()> {
        validate_price_cents(price_cents)?;

        let result = sqlx::query("UPDATE menu_items SET price_cents = ?2 WHERE id = ?1")
            .bind(id)
            .bind(price_cents)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id.to_string()));
        }
        Ok(())
    }

    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE menu_items SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id.to_string()));
        }
        Ok(())
    }

    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
