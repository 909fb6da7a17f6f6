//! # Reservation Repository
//!
//! Table bookings and the slot conflict check.
//!
//! ## Booking Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(booking)                                                        │
//! │                                                                         │
//! │  validate fields ── fail ──► InvalidArgument (nothing written)          │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │       ├── table exists?              no ──► TableNotFound               │
//! │       ├── party_size ≤ capacity?     no ──► PartyTooLarge               │
//! │       ├── overlapping live booking?  yes ─► SlotConflict                │
//! │       └── INSERT (confirmed)                                            │
//! │             └── overlap trigger fires ───► SlotConflict                 │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Windows are half-open, so a booking ending at 20:30 and another starting
//! at 20:30 on the same table are both accepted. Cancelled bookings never
//! block a slot.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, commit};
use dinein_core::validation::validate_new_reservation;
use dinein_core::{CoreError, NewReservation, Reservation, ReservationStatus, TimeWindow};

const RESERVATION_COLUMNS: &str = "id, table_id, customer_name, customer_phone, party_size, \
     starts_at, duration_minutes, status, created_at";

/// Storage shape of a reservation (epoch seconds).
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: i64,
    table_id: i64,
    customer_name: String,
    customer_phone: String,
    party_size: i64,
    starts_at: i64,
    duration_minutes: i64,
    status: ReservationStatus,
    created_at: i64,
}

fn from_timestamp(secs: i64) -> DbResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DbError::Internal(format!("timestamp out of range: {secs}")))
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = DbError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.id,
            table_id: row.table_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            party_size: row.party_size,
            reservation_time: from_timestamp(row.starts_at)?,
            duration_minutes: row.duration_minutes,
            status: row.status,
            created_at: from_timestamp(row.created_at)?,
        })
    }
}

/// Finds one non-cancelled reservation on `table_id` overlapping `window`.
async fn find_conflict<'e, E>(executor: E, table_id: i64, window: &TimeWindow) -> DbResult<Option<i64>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let id: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM reservations
        WHERE table_id = ?1
          AND status != 'cancelled'
          AND ?2 < ends_at
          AND starts_at < ?3
        LIMIT 1
        "#,
    )
    .bind(table_id)
    .bind(window.start_ts())
    .bind(window.end_ts())
    .fetch_optional(executor)
    .await?;
    Ok(id)
}

fn slot_conflict(table_id: i64, window: &TimeWindow) -> DbError {
    DbError::Domain(CoreError::SlotConflict {
        table_id,
        starts_at: window.start.to_rfc3339(),
        ends_at: window.end.to_rfc3339(),
    })
}

/// Repository for reservation database operations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// All reservations, latest slot first.
    pub async fn list(&self) -> DbResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY starts_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Reservation::try_from).collect()
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Reservation>> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?1");
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Reservation::try_from).transpose()
    }

    /// True when a non-cancelled reservation on `table_id` overlaps `window`.
    pub async fn has_conflict(&self, table_id: i64, window: &TimeWindow) -> DbResult<bool> {
        Ok(find_conflict(&self.pool, table_id, window).await?.is_some())
    }

    /// Books a table for `[reservation_time, reservation_time + duration)`.
    pub async fn create(&self, booking: &NewReservation) -> DbResult<Reservation> {
        validate_new_reservation(booking)?;
        let window = TimeWindow::try_from_start(booking.reservation_time, booking.duration_minutes())?;

        debug!(
            table_id = booking.table_id,
            party_size = booking.party_size,
            starts_at = %window.start,
            "Creating reservation"
        );

        let mut tx = begin_write(&self.pool).await?;

        let capacity: Option<i64> = sqlx::query_scalar("SELECT capacity FROM tables WHERE id = ?1")
            .bind(booking.table_id)
            .fetch_optional(&mut *tx)
            .await?;
        let capacity = capacity.ok_or(CoreError::TableNotFound(booking.table_id))?;

        if booking.party_size > capacity {
            return Err(CoreError::PartyTooLarge {
                table_id: booking.table_id,
                party_size: booking.party_size,
                capacity,
            }
            .into());
        }

        if let Some(existing) = find_conflict(&mut *tx, booking.table_id, &window).await? {
            debug!(table_id = booking.table_id, existing, "Reservation slot taken");
            return Err(slot_conflict(booking.table_id, &window));
        }

        let created_at = Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO reservations (
                table_id, customer_name, customer_phone, party_size,
                starts_at, ends_at, duration_minutes, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(booking.table_id)
        .bind(booking.customer_name.trim())
        .bind(booking.customer_phone.trim())
        .bind(booking.party_size)
        .bind(window.start_ts())
        .bind(window.end_ts())
        .bind(booking.duration_minutes())
        .bind(ReservationStatus::Confirmed)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::OverlapViolation => slot_conflict(booking.table_id, &window),
            other => other,
        })?;

        commit(tx).await?;

        let id = result.last_insert_rowid();
        info!(reservation_id = id, table_id = booking.table_id, "Reservation confirmed");

        Ok(Reservation {
            id,
            table_id: booking.table_id,
            customer_name: booking.customer_name.trim().to_string(),
            customer_phone: booking.customer_phone.trim().to_string(),
            party_size: booking.party_size,
            reservation_time: window.start,
            duration_minutes: booking.duration_minutes(),
            status: ReservationStatus::Confirmed,
            created_at: from_timestamp(created_at)?,
        })
    }

    /// Cancels a reservation, freeing its slot. Cancelling twice is a no-op.
    pub async fn cancel(&self, id: i64) -> DbResult<Reservation> {
        let result = sqlx::query("UPDATE reservations SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(ReservationStatus::Cancelled)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ReservationNotFound(id).into());
        }

        info!(reservation_id = id, "Reservation cancelled");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ReservationNotFound(id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, hour, minute, 0).unwrap()
    }

    fn booking(table_id: i64, start: DateTime<Utc>, minutes: i64) -> NewReservation {
        NewReservation {
            table_id,
            customer_name: "Ada Lovelace".to_string(),
            customer_phone: "555-0100".to_string(),
            party_size: 2,
            reservation_time: start,
            duration_minutes: Some(minutes),
        }
    }

    #[tokio::test]
    async fn test_create_reservation() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 4).await;

        let created = db.reservations().create(&booking(table.id, at(19, 0), 90)).await.unwrap();
        assert_eq!(created.status, ReservationStatus::Confirmed);
        assert_eq!(created.window().end, at(20, 30));

        let fetched = db.reservations().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.reservation_time, at(19, 0));
        assert_eq!(fetched.duration_minutes, 90);
    }

    #[tokio::test]
    async fn test_overlapping_booking_conflicts() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 4).await;
        let repo = db.reservations();

        repo.create(&booking(table.id, at(19, 0), 90)).await.unwrap();

        let err = repo.create(&booking(table.id, at(19, 45), 90)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::SlotConflict { .. })));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_overlapping_bookings_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        let db = fixtures::file_database(&dir, 8).await;
        let table = fixtures::table(&db, 1, 4).await;

        let attempts: Vec<_> = (0..8)
            .map(|i| {
                let repo = db.reservations();
                let request = booking(table.id, at(19, 0) + Duration::minutes(i * 5), 90);
                tokio::spawn(async move { repo.create(&request).await })
            })
            .collect();

        let mut booked = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => booked += 1,
                Err(err) => assert!(
                    matches!(err, DbError::Domain(CoreError::SlotConflict { .. })),
                    "unexpected error: {err:?}"
                ),
            }
        }
        assert_eq!(booked, 1);
        assert_eq!(db.reservations().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_back_to_back_bookings_allowed() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 4).await;
        let repo = db.reservations();

        repo.create(&booking(table.id, at(19, 0), 90)).await.unwrap();
        repo.create(&booking(table.id, at(20, 30), 90)).await.unwrap();
        repo.create(&booking(table.id, at(17, 30), 90)).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].reservation_time, at(20, 30));
    }

    #[tokio::test]
    async fn test_other_table_unaffected() {
        let db = fixtures::database().await;
        let first = fixtures::table(&db, 1, 4).await;
        let second = fixtures::table(&db, 2, 4).await;

        db.reservations().create(&booking(first.id, at(19, 0), 90)).await.unwrap();
        db.reservations().create(&booking(second.id, at(19, 0), 90)).await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_booking_frees_slot() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 4).await;
        let repo = db.reservations();

        let first = repo.create(&booking(table.id, at(19, 0), 90)).await.unwrap();
        let window = TimeWindow::from_start(at(19, 30), 60);
        assert!(repo.has_conflict(table.id, &window).await.unwrap());

        let cancelled = repo.cancel(first.id).await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert!(!repo.has_conflict(table.id, &window).await.unwrap());

        repo.create(&booking(table.id, at(19, 30), 60)).await.unwrap();

        // Idempotent
        let again = repo.cancel(first.id).await.unwrap();
        assert_eq!(again.status, ReservationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_trigger_guards_direct_inserts() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 4).await;
        db.reservations().create(&booking(table.id, at(19, 0), 90)).await.unwrap();

        // Bypass the application check, as a racing writer would
        let start = at(19, 15).timestamp();
        let err = sqlx::query(
            "INSERT INTO reservations (table_id, customer_name, customer_phone, party_size, \
             starts_at, ends_at, duration_minutes, status, created_at) \
             VALUES (?1, 'Eve', '555', 2, ?2, ?3, 60, 'confirmed', 0)",
        )
        .bind(table.id)
        .bind(start)
        .bind(start + Duration::minutes(60).num_seconds())
        .execute(db.pool())
        .await
        .unwrap_err();
        assert!(matches!(DbError::from(err), DbError::OverlapViolation));
    }

    #[tokio::test]
    async fn test_unknown_table_and_capacity() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 2).await;
        let repo = db.reservations();

        let err = repo.create(&booking(404, at(19, 0), 90)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::TableNotFound(404))));

        let mut party = booking(table.id, at(19, 0), 90);
        party.party_size = 6;
        let err = repo.create(&party).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::PartyTooLarge { capacity: 2, .. })));
    }

    #[tokio::test]
    async fn test_invalid_fields_rejected_before_write() {
        let db = fixtures::database().await;
        let table = fixtures::table(&db, 1, 4).await;

        let mut bad = booking(table.id, at(19, 0), 90);
        bad.customer_name = "  ".to_string();
        let err = db.reservations().create(&bad).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert!(db.reservations().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_unknown_reservation() {
        let db = fixtures::database().await;
        let err = db.reservations().cancel(77).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ReservationNotFound(77))));
    }
}
