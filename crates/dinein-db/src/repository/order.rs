//! # Order Repository
//!
//! Order builder, status machine and payment recorder persistence.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create_order() → Order { status: Pending } + snapshot items     │
//! │                                                                         │
//! │  2. KITCHEN                                                             │
//! │     └── set_status(Preparing) → log pending → preparing                 │
//! │     └── set_status(Ready)     → log preparing → ready                   │
//! │     └── set_status(Served)    → log ready → served                      │
//! │                                                                         │
//! │  3. SETTLE                                                              │
//! │     └── pay() → Payment row + status paid + log served → paid           │
//! │                                                                         │
//! │  Each numbered call is one transaction. The status UPDATEs are          │
//! │  compare-and-set, so two racing writers cannot both win.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, commit};
use dinein_core::validation::validate_new_order;
use dinein_core::{
    CoreError, Money, NewOrder, NewPayment, Order, OrderDetail, OrderItem, OrderStatus,
    OrderStatusLog, Payment, PaymentPolicy, StatusChange, TransitionPolicy, ValidationError,
};

const ORDER_COLUMNS: &str =
    "id, table_id, reservation_id, status, total_cents, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, menu_item_id, name_snapshot, unit_price_cents, quantity, notes";

/// Outcome of a successful payment.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub change: StatusChange,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

fn total_overflow() -> DbError {
    ValidationError::OutOfRange {
        field: "total_cents".to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

async fn append_log(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    old_status: OrderStatus,
    new_status: OrderStatus,
    changed_at: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_status_logs (order_id, old_status, new_status, changed_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(order_id)
    .bind(old_status)
    .bind(new_status)
    .bind(changed_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists orders newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE (?1 IS NULL OR status = ?1) ORDER BY id DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn get_items(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY id");
        let items = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Order with its line items.
    pub async fn get_detail(&self, id: i64) -> DbResult<OrderDetail> {
        let order = self
            .get_by_id(id)
            .await?
            .ok_or(CoreError::OrderNotFound(id))?;
        let items = self.get_items(id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Status history, oldest first.
    pub async fn status_logs(&self, order_id: i64) -> DbResult<Vec<OrderStatusLog>> {
        let logs = sqlx::query_as::<_, OrderStatusLog>(
            r#"
            SELECT id, order_id, old_status, new_status, changed_at
            FROM order_status_logs
            WHERE order_id = ?1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    pub async fn payments(&self, order_id: i64) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, amount_cents, payment_method, transaction_id, paid_at
            FROM payments
            WHERE order_id = ?1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    // =========================================================================
    // Order Builder
    // =========================================================================

    /// Creates an order in `pending` with price-snapshotted items.
    ///
    /// ## Errors
    /// - `Validation` for an empty order or a bad quantity (nothing written)
    /// - `TableNotFound`, `ReservationNotFound`, `MenuItemNotFound`
    ///   (inactive items count as missing)
    ///
    /// Any failure drops the transaction, so no order or item is visible.
    pub async fn create_order(&self, new_order: &NewOrder) -> DbResult<OrderDetail> {
        validate_new_order(new_order)?;

        let mut tx = begin_write(&self.pool).await?;

        let table: Option<i64> = sqlx::query_scalar("SELECT id FROM tables WHERE id = ?1")
            .bind(new_order.table_id)
            .fetch_optional(&mut *tx)
            .await?;
        if table.is_none() {
            return Err(CoreError::TableNotFound(new_order.table_id).into());
        }

        if let Some(reservation_id) = new_order.reservation_id {
            let reservation: Option<i64> =
                sqlx::query_scalar("SELECT id FROM reservations WHERE id = ?1")
                    .bind(reservation_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if reservation.is_none() {
                return Err(CoreError::ReservationNotFound(reservation_id).into());
            }
        }

        // Resolve every line against the catalog before writing anything
        let mut priced = Vec::with_capacity(new_order.items.len());
        let mut total = Money::zero();
        for line in &new_order.items {
            let item: Option<(String, i64)> = sqlx::query_as(
                "SELECT name, price_cents FROM menu_items WHERE id = ?1 AND is_active = 1",
            )
            .bind(line.menu_item_id)
            .fetch_optional(&mut *tx)
            .await?;
            let (name, price_cents) = item.ok_or(CoreError::MenuItemNotFound(line.menu_item_id))?;

            let line_total = Money::from_cents(price_cents)
                .checked_line_total(line.quantity)
                .ok_or_else(total_overflow)?;
            total = total.checked_add(line_total).ok_or_else(total_overflow)?;
            priced.push((line, name, price_cents));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO orders (table_id, reservation_id, status, total_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(new_order.table_id)
        .bind(new_order.reservation_id)
        .bind(OrderStatus::Pending)
        .bind(total.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let order_id = result.last_insert_rowid();

        let mut items = Vec::with_capacity(priced.len());
        for (line, name, unit_price_cents) in priced {
            let result = sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, menu_item_id, name_snapshot, unit_price_cents, quantity, notes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(order_id)
            .bind(line.menu_item_id)
            .bind(&name)
            .bind(unit_price_cents)
            .bind(line.quantity)
            .bind(line.notes.as_deref())
            .execute(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: result.last_insert_rowid(),
                order_id,
                menu_item_id: line.menu_item_id,
                name_snapshot: name,
                unit_price_cents,
                quantity: line.quantity,
                notes: line.notes.clone(),
            });
        }

        commit(tx).await?;

        info!(
            order_id,
            table_id = new_order.table_id,
            lines = items.len(),
            total = %total,
            "Order created"
        );

        Ok(OrderDetail {
            order: Order {
                id: order_id,
                table_id: new_order.table_id,
                reservation_id: new_order.reservation_id,
                status: OrderStatus::Pending,
                total_cents: total.cents(),
                created_at: now,
                updated_at: now,
            },
            items,
        })
    }

    // =========================================================================
    // Status Machine
    // =========================================================================

    /// Moves an order to `new_status` and appends the audit log row.
    ///
    /// ## Errors
    /// - `OrderNotFound`
    /// - `InvalidTransition` when `policy` rejects the move
    /// - `StaleStatus` when another writer changed the status mid-flight
    pub async fn set_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        policy: TransitionPolicy,
    ) -> DbResult<StatusChange> {
        let mut tx = begin_write(&self.pool).await?;

        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;
        let old_status = current.ok_or(CoreError::OrderNotFound(order_id))?;

        policy.check(order_id, old_status, new_status)?;

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(order_id)
        .bind(new_status)
        .bind(now)
        .bind(old_status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::StaleStatus {
                order_id,
                expected: old_status,
            }
            .into());
        }

        append_log(&mut tx, order_id, old_status, new_status, now).await?;
        commit(tx).await?;

        debug!(order_id, old = %old_status, new = %new_status, "Order status changed");

        Ok(StatusChange {
            order_id,
            old_status,
            new_status,
        })
    }

    // =========================================================================
    // Payment Recorder
    // =========================================================================

    /// Records a payment and moves the order to `paid`.
    ///
    /// ## What This Does
    /// 1. Rejects non-positive amounts before touching the store
    /// 2. In one transaction: order lookup, already-paid check, amount
    ///    policy, payment insert, compare-and-set to `paid`, audit log
    ///
    /// Of two concurrent payments on one order exactly one succeeds; the
    /// other gets `AlreadyPaid` and leaves no payment row behind.
    pub async fn pay(
        &self,
        order_id: i64,
        payment: &NewPayment,
        policy: PaymentPolicy,
    ) -> DbResult<PaymentReceipt> {
        let amount = Money::from_cents(payment.amount_cents);
        if !amount.is_positive() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "amount must be positive".to_string(),
            }
            .into());
        }

        let mut tx = begin_write(&self.pool).await?;

        let order: Option<(OrderStatus, i64)> =
            sqlx::query_as("SELECT status, total_cents FROM orders WHERE id = ?1")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (old_status, total_cents) = order.ok_or(CoreError::OrderNotFound(order_id))?;

        if old_status == OrderStatus::Paid {
            return Err(CoreError::AlreadyPaid(order_id).into());
        }

        policy.check_amount(amount, Money::from_cents(total_cents))?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO payments (order_id, amount_cents, payment_method, transaction_id, paid_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(order_id)
        .bind(amount.cents())
        .bind(payment.payment_method)
        .bind(payment.transaction_id.as_deref())
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let payment_id = result.last_insert_rowid();

        let updated = sqlx::query(
            "UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status != ?2",
        )
        .bind(order_id)
        .bind(OrderStatus::Paid)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CoreError::AlreadyPaid(order_id).into());
        }

        append_log(&mut tx, order_id, old_status, OrderStatus::Paid, now).await?;
        commit(tx).await?;

        info!(
            order_id,
            payment_id,
            amount = %amount,
            method = %payment.payment_method,
            "Order paid"
        );

        Ok(PaymentReceipt {
            payment: Payment {
                id: payment_id,
                order_id,
                amount_cents: amount.cents(),
                payment_method: payment.payment_method,
                transaction_id: payment.transaction_id.clone(),
                paid_at: now,
            },
            change: StatusChange {
                order_id,
                old_status,
                new_status: OrderStatus::Paid,
            },
        })
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use crate::Database;
    use dinein_core::{NewOrderLine, PaymentMethod};

    fn line(menu_item_id: i64, quantity: i64) -> NewOrderLine {
        NewOrderLine {
            menu_item_id,
            quantity,
            notes: None,
        }
    }

    fn cash(amount_cents: i64) -> NewPayment {
        NewPayment {
            amount_cents,
            payment_method: PaymentMethod::Cash,
            transaction_id: None,
        }
    }

    async fn log_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM order_status_logs")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn payment_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM payments")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    /// Table 3 with an order of 2×Burger + 1×Fries ($25.00).
    async fn standard_order(db: &Database) -> OrderDetail {
        let table = fixtures::table(db, 3, 4).await;
        let (burger, fries) = fixtures::burger_and_fries(db).await;
        db.orders()
            .create_order(&NewOrder {
                table_id: table.id,
                reservation_id: None,
                items: vec![line(burger.id, 2), line(fries.id, 1)],
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_order_totals_and_snapshots() {
        let db = fixtures::database().await;
        let detail = standard_order(&db).await;

        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.order.total_cents, 2500);
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].name_snapshot, "Burger");
        assert_eq!(detail.items[0].unit_price_cents, 1000);

        let stored = db.orders().get_detail(detail.order.id).await.unwrap();
        assert_eq!(stored.order.total_cents, 2500);
        let sum: i64 = stored.items.iter().map(|i| i.line_total().cents()).sum();
        assert_eq!(sum, stored.order.total_cents);
    }

    #[tokio::test]
    async fn test_price_change_does_not_touch_existing_order() {
        let db = fixtures::database().await;
        let detail = standard_order(&db).await;

        db.menu()
            .update_price(detail.items[0].menu_item_id, 1500)
            .await
            .unwrap();

        let stored = db.orders().get_detail(detail.order.id).await.unwrap();
        assert_eq!(stored.items[0].unit_price_cents, 1000);
        assert_eq!(stored.order.total_cents, 2500);
    }

    #[tokio::test]
    async fn test_unknown_menu_item_rolls_back_everything() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 4).await;
        let (burger, _) = fixtures::burger_and_fries(&db).await;

        let err = db
            .orders()
            .create_order(&NewOrder {
                table_id: table.id,
                reservation_id: None,
                items: vec![line(burger.id, 1), line(9999, 1)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::MenuItemNotFound(9999))));
        assert_eq!(db.orders().count().await.unwrap(), 0);

        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
    }

    #[tokio::test]
    async fn test_inactive_menu_item_rejected() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 4).await;
        let (_, fries) = fixtures::burger_and_fries(&db).await;
        db.menu().set_active(fries.id, false).await.unwrap();

        let err = db
            .orders()
            .create_order(&NewOrder {
                table_id: table.id,
                reservation_id: None,
                items: vec![line(fries.id, 1)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::MenuItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_order_reference_checks() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 4).await;
        let (burger, _) = fixtures::burger_and_fries(&db).await;
        let orders = db.orders();

        let err = orders
            .create_order(&NewOrder {
                table_id: 404,
                reservation_id: None,
                items: vec![line(burger.id, 1)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::TableNotFound(404))));

        let err = orders
            .create_order(&NewOrder {
                table_id: table.id,
                reservation_id: Some(12),
                items: vec![line(burger.id, 1)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ReservationNotFound(12))));

        let err = orders
            .create_order(&NewOrder {
                table_id: table.id,
                reservation_id: None,
                items: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let err = orders
            .create_order(&NewOrder {
                table_id: table.id,
                reservation_id: None,
                items: vec![line(burger.id, 0)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(orders.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_status_writes_log() {
        let db = fixtures::database().await;
        let detail = standard_order(&db).await;
        let orders = db.orders();
        let id = detail.order.id;

        let change = orders
            .set_status(id, OrderStatus::Preparing, TransitionPolicy::Permissive)
            .await
            .unwrap();
        assert_eq!(change.old_status, OrderStatus::Pending);
        assert_eq!(change.new_status, OrderStatus::Preparing);

        let order = orders.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
        assert!(order.updated_at >= order.created_at);

        let logs = orders.status_logs(id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].old_status, OrderStatus::Pending);
        assert_eq!(logs[0].new_status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_set_status_unknown_order() {
        let db = fixtures::database().await;
        let err = db
            .orders()
            .set_status(55, OrderStatus::Ready, TransitionPolicy::Permissive)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::OrderNotFound(55))));
        assert_eq!(log_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_permissive_allows_backwards_move() {
        let db = fixtures::database().await;
        let id = standard_order(&db).await.order.id;
        let orders = db.orders();

        orders
            .set_status(id, OrderStatus::Served, TransitionPolicy::Permissive)
            .await
            .unwrap();
        orders
            .set_status(id, OrderStatus::Pending, TransitionPolicy::Permissive)
            .await
            .unwrap();
        assert_eq!(orders.status_logs(id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_forward_only_rejects_without_writing() {
        let db = fixtures::database().await;
        let id = standard_order(&db).await.order.id;
        let orders = db.orders();

        orders
            .set_status(id, OrderStatus::Served, TransitionPolicy::ForwardOnly)
            .await
            .unwrap();
        let err = orders
            .set_status(id, OrderStatus::Pending, TransitionPolicy::ForwardOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidTransition { .. })));

        let order = orders.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Served);
        assert_eq!(orders.status_logs(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let db = fixtures::database().await;
        let first = standard_order(&db).await.order;
        let table_id = first.table_id;
        let burger_id: i64 = sqlx::query_scalar("SELECT id FROM menu_items WHERE name = 'Burger'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let second = db
            .orders()
            .create_order(&NewOrder {
                table_id,
                reservation_id: None,
                items: vec![line(burger_id, 1)],
            })
            .await
            .unwrap()
            .order;
        db.orders()
            .set_status(second.id, OrderStatus::Ready, TransitionPolicy::Permissive)
            .await
            .unwrap();

        let all = db.orders().list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);

        let ready = db.orders().list(Some(OrderStatus::Ready)).await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, second.id);
    }

    #[tokio::test]
    async fn test_pay_marks_order_paid() {
        let db = fixtures::database().await;
        let id = standard_order(&db).await.order.id;
        let orders = db.orders();

        let receipt = orders
            .pay(
                id,
                &NewPayment {
                    amount_cents: 2500,
                    payment_method: PaymentMethod::Card,
                    transaction_id: Some("auth-8812".to_string()),
                },
                PaymentPolicy::default(),
            )
            .await
            .unwrap();
        assert_eq!(receipt.change.old_status, OrderStatus::Pending);
        assert_eq!(receipt.change.new_status, OrderStatus::Paid);

        let order = orders.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);

        let payments = orders.payments(id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].payment_method, PaymentMethod::Card);
        assert_eq!(payments[0].transaction_id.as_deref(), Some("auth-8812"));

        let logs = orders.status_logs(id).await.unwrap();
        assert_eq!(logs.last().unwrap().new_status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_second_payment_rejected() {
        let db = fixtures::database().await;
        let id = standard_order(&db).await.order.id;
        let orders = db.orders();

        orders.pay(id, &cash(2500), PaymentPolicy::default()).await.unwrap();
        let err = orders
            .pay(id, &cash(2500), PaymentPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::AlreadyPaid(_))));
        assert_eq!(payment_count(&db).await, 1);
        assert_eq!(log_count(&db).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_payments_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        let db = fixtures::file_database(&dir, 8).await;
        let id = standard_order(&db).await.order.id;

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let orders = db.orders();
                tokio::spawn(async move { orders.pay(id, &cash(2500), PaymentPolicy::default()).await })
            })
            .collect();

        let mut paid = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => paid += 1,
                // Losers must see the winner's commit, never a lock error
                Err(err) => assert!(
                    matches!(err, DbError::Domain(CoreError::AlreadyPaid(_))),
                    "unexpected error: {err:?}"
                ),
            }
        }
        assert_eq!(paid, 1);
        assert_eq!(payment_count(&db).await, 1);
        assert_eq!(log_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_payment_amount_rules() {
        let db = fixtures::database().await;
        let id = standard_order(&db).await.order.id;
        let orders = db.orders();

        let err = orders.pay(id, &cash(0), PaymentPolicy::default()).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidPaymentAmount { .. })));

        let err = orders.pay(id, &cash(2000), PaymentPolicy::strict()).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidPaymentAmount { .. })));
        assert_eq!(payment_count(&db).await, 0);

        let err = orders.pay(404, &cash(100), PaymentPolicy::default()).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::OrderNotFound(404))));
    }

    #[tokio::test]
    async fn test_full_service_scenario() {
        let db = fixtures::database().await;
        let detail = standard_order(&db).await;
        let id = detail.order.id;
        let orders = db.orders();

        for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Served] {
            orders
                .set_status(id, status, TransitionPolicy::ForwardOnly)
                .await
                .unwrap();
        }
        orders.pay(id, &cash(2500), PaymentPolicy::strict()).await.unwrap();

        let logs = orders.status_logs(id).await.unwrap();
        let trail: Vec<(OrderStatus, OrderStatus)> =
            logs.iter().map(|l| (l.old_status, l.new_status)).collect();
        assert_eq!(
            trail,
            vec![
                (OrderStatus::Pending, OrderStatus::Preparing),
                (OrderStatus::Preparing, OrderStatus::Ready),
                (OrderStatus::Ready, OrderStatus::Served),
                (OrderStatus::Served, OrderStatus::Paid),
            ]
        );
        assert_eq!(orders.payments(id).await.unwrap()[0].amount_cents, 2500);
    }
}
