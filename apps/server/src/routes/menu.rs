//! # Menu Routes
//!
//! Read-only catalog endpoints for order entry screens.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use dinein_core::{Category, MenuItem};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemsQuery {
    pub category_id: Option<i64>,
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.menu().list_categories().await?))
}

pub async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<MenuItemsQuery>, QueryRejection>,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    let Query(query) = query?;
    let items = state
        .db
        .menu()
        .list_items(query.category_id, query.include_inactive)
        .await?;
    Ok(Json(items))
}
