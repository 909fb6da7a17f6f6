//! # Application State
//!
//! Shared by every handler through axum's `State` extractor.
//!
//! `Database` wraps a `SqlitePool` and `NotificationHub` an `Arc`, so
//! cloning the state per request only bumps reference counts.

use dinein_core::{PaymentPolicy, TransitionPolicy};
use dinein_db::Database;
use dinein_live::{DeliveryOptions, NotificationHub};

use crate::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub hub: NotificationHub,
    pub delivery: DeliveryOptions,
    pub transition_policy: TransitionPolicy,
    pub payment_policy: PaymentPolicy,
}

impl AppState {
    pub fn new(db: Database, config: &ServerConfig) -> Self {
        AppState {
            db,
            hub: NotificationHub::new(&config.hub),
            delivery: DeliveryOptions::from(&config.hub),
            transition_policy: config.orders.transition_policy,
            payment_policy: config.orders.payment_policy(),
        }
    }
}
