//! # Reservation Routes

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use dinein_core::{NewReservation, Reservation};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    Ok(Json(state.db.reservations().list().await?))
}

/// Books a table. Overlap with a confirmed booking is a 409.
pub async fn create_reservation(
    State(state): State<AppState>,
    payload: Result<Json<NewReservation>, JsonRejection>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let Json(booking) = payload?;
    let reservation = state.db.reservations().create(&booking).await?;
    info!(
        reservation_id = reservation.id,
        table_id = reservation.table_id,
        starts_at = %reservation.reservation_time,
        "Reservation confirmed"
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Reservation>, ApiError> {
    let Path(id) = id?;
    let reservation = state.db.reservations().cancel(id).await?;
    info!(reservation_id = id, "Reservation cancelled");
    Ok(Json(reservation))
}
