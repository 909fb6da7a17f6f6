//! # HTTP Routes
//!
//! ```text
//! routes/
//! ├── mod.rs           ◄─── router assembly
//! ├── health.rs        ◄─── GET  /health
//! ├── tables.rs        ◄─── /api/tables, availability
//! ├── reservations.rs  ◄─── /api/reservations, cancel
//! ├── menu.rs          ◄─── /api/menu catalog reads
//! ├── orders.rs        ◄─── /api/orders, status, pay
//! └── ws.rs            ◄─── GET  /ws live event stream
//! ```
//!
//! Handlers take their body, query and path extractors as
//! `Result<_, Rejection>` so malformed input comes back in the same
//! `{code, message}` shape as every other error.
//!
//! Every route sits behind a CORS layer built from `[http] cors_origins`.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info};

use crate::config::{HttpSettings, ANY_ORIGIN};
use crate::state::AppState;

/// How long browsers may cache a preflight answer.
const CORS_MAX_AGE_SECS: u64 = 600;

pub mod health;
pub mod menu;
pub mod orders;
pub mod reservations;
pub mod tables;
pub mod ws;

pub fn router(state: AppState, http: &HttpSettings) -> Router {
    let app = Router::new()
        .route("/health", get(health::health))
        .route("/ws", get(ws::live_events))
        // Tables
        .route("/api/tables", get(tables::list_tables).post(tables::create_table))
        .route("/api/tables/available", get(tables::available_tables))
        // Reservations
        .route(
            "/api/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/api/reservations/{id}/cancel",
            post(reservations::cancel_reservation),
        )
        // Menu
        .route("/api/menu/categories", get(menu::list_categories))
        .route("/api/menu/items", get(menu::list_items))
        // Orders
        .route("/api/orders", get(orders::list_orders).post(orders::create_order))
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/logs", get(orders::order_logs))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .route("/api/orders/{id}/pay", post(orders::pay_order))
        .with_state(state);

    match cors_layer(&http.cors_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

/// `["*"]` allows any origin, an empty list installs no layer, anything
/// else is an exact allow-list.
pub fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        info!("CORS disabled");
        return None;
    }

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECS));

    if origins.iter().any(|origin| origin == ANY_ORIGIN) {
        info!("CORS configured for any origin");
        return Some(cors.allow_origin(Any));
    }

    // validate() rejects these before startup
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                error!(origin = %origin.escape_debug(), "Invalid CORS origin, skipped");
                None
            }
        })
        .collect();

    info!(origins = ?origins, "CORS configured");
    Some(cors.allow_origin(AllowOrigin::list(allowed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::state::fixtures;

    fn allowing(origins: &[&str]) -> HttpSettings {
        HttpSettings {
            cors_origins: origins.iter().map(|origin| origin.to_string()).collect(),
            ..HttpSettings::default()
        }
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/orders")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_preflight_from_listed_origin() {
        let app = router(fixtures::state().await, &allowing(&["http://kitchen.local:5173"]));

        let response = app.oneshot(preflight("http://kitchen.local:5173")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://kitchen.local:5173");
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("PUT"));
        assert!(methods.contains("POST"));
    }

    #[tokio::test]
    async fn test_default_settings_allow_frontend_dev_server() {
        let app = router(fixtures::state().await, &HttpSettings::default());

        let response = app.oneshot(preflight("http://localhost:5173")).await.unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");
    }

    #[tokio::test]
    async fn test_unlisted_origin_gets_no_allow_header() {
        let app = router(fixtures::state().await, &allowing(&["http://kitchen.local:5173"]));

        let response = app.oneshot(preflight("http://elsewhere.example")).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_wildcard_allows_any_origin_on_plain_request() {
        let app = router(fixtures::state().await, &allowing(&["*"]));

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://billing.local")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_empty_list_installs_no_layer() {
        assert!(cors_layer(&[]).is_none());

        let app = router(fixtures::state().await, &allowing(&[]));
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://billing.local")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
