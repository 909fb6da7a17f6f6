//! # Live Event Stream
//!
//! `GET /ws` upgrades to a WebSocket that receives every order event as a
//! JSON text frame until either side closes.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use tracing::debug;

use dinein_live::serve_socket;

use crate::state::AppState;

pub async fn live_events(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    debug!("Live event stream upgrade requested");
    let hub = state.hub.clone();
    let options = state.delivery;
    ws.on_upgrade(move |socket| serve_socket(socket, hub, options))
}
