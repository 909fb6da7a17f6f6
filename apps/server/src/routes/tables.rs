//! # Table Routes

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use dinein_core::{NewTable, Table, TimeWindow, DEFAULT_RESERVATION_MINUTES};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub reservation_time: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
}

fn default_duration() -> i64 {
    DEFAULT_RESERVATION_MINUTES
}

pub async fn list_tables(State(state): State<AppState>) -> Result<Json<Vec<Table>>, ApiError> {
    Ok(Json(state.db.tables().list().await?))
}

pub async fn create_table(
    State(state): State<AppState>,
    payload: Result<Json<NewTable>, JsonRejection>,
) -> Result<(StatusCode, Json<Table>), ApiError> {
    let Json(new_table) = payload?;
    let table = state.db.tables().create(&new_table).await?;
    info!(table_id = table.id, table_number = table.table_number, "Table created");
    Ok((StatusCode::CREATED, Json(table)))
}

/// Active tables with no confirmed reservation overlapping the window.
pub async fn available_tables(
    State(state): State<AppState>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<Vec<Table>>, ApiError> {
    let Query(query) = query?;
    let window = TimeWindow::try_from_start(query.reservation_time, query.duration_minutes)?;
    Ok(Json(state.db.tables().available(&window).await?))
}
