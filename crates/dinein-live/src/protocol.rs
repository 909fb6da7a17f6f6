//! # Live Event Messages
//!
//! Events pushed to staff clients.
//!
//! ## Wire Format
//! Internally tagged JSON, one object per WebSocket text frame:
//! ```json
//! {"type":"new_order","order":{"id":12,"table_id":3,"status":"pending",
//!   "items":[{"name":"Burger","quantity":2}],"created_at":"2026-10-14T19:02:11Z"}}
//!
//! {"type":"status_update","order_id":12,"new_status":"preparing","old_status":"pending"}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use dinein_core::{OrderDetail, OrderStatus, StatusChange};

/// All events the hub fans out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum LiveEvent {
    /// A freshly created order, for the kitchen display.
    NewOrder { order: NewOrderPayload },

    /// An order moved between statuses (including payment).
    StatusUpdate {
        order_id: i64,
        new_status: OrderStatus,
        old_status: OrderStatus,
    },
}

/// Kitchen-facing summary of a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrderPayload {
    pub id: i64,
    pub table_id: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderLineSummary>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineSummary {
    pub name: String,
    pub quantity: i64,
}

impl LiveEvent {
    pub fn new_order(detail: &OrderDetail) -> Self {
        LiveEvent::NewOrder {
            order: NewOrderPayload {
                id: detail.order.id,
                table_id: detail.order.table_id,
                status: detail.order.status,
                items: detail
                    .items
                    .iter()
                    .map(|item| OrderLineSummary {
                        name: item.name_snapshot.clone(),
                        quantity: item.quantity,
                    })
                    .collect(),
                created_at: detail.order.created_at,
            },
        }
    }

    pub fn status_update(change: &StatusChange) -> Self {
        LiveEvent::StatusUpdate {
            order_id: change.order_id,
            new_status: change.new_status,
            old_status: change.old_status,
        }
    }

    /// The order this event concerns.
    pub fn order_id(&self) -> i64 {
        match self {
            LiveEvent::NewOrder { order } => order.id,
            LiveEvent::StatusUpdate { order_id, .. } => *order_id,
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            LiveEvent::NewOrder { .. } => "new_order",
            LiveEvent::StatusUpdate { .. } => "status_update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dinein_core::{Order, OrderItem};
    use serde_json::json;

    #[test]
    fn test_status_update_wire_shape() {
        let event = LiveEvent::status_update(&StatusChange {
            order_id: 12,
            old_status: OrderStatus::Pending,
            new_status: OrderStatus::Preparing,
        });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "status_update",
                "order_id": 12,
                "new_status": "preparing",
                "old_status": "pending",
            })
        );
    }

    #[test]
    fn test_new_order_wire_shape() {
        let created_at = Utc.with_ymd_and_hms(2026, 10, 14, 19, 2, 11).unwrap();
        let detail = OrderDetail {
            order: Order {
                id: 12,
                table_id: 3,
                reservation_id: None,
                status: OrderStatus::Pending,
                total_cents: 2500,
                created_at,
                updated_at: created_at,
            },
            items: vec![OrderItem {
                id: 1,
                order_id: 12,
                menu_item_id: 7,
                name_snapshot: "Burger".to_string(),
                unit_price_cents: 1000,
                quantity: 2,
                notes: None,
            }],
        };

        let value = serde_json::to_value(LiveEvent::new_order(&detail)).unwrap();
        assert_eq!(value["type"], "new_order");
        assert_eq!(value["order"]["id"], 12);
        assert_eq!(value["order"]["table_id"], 3);
        assert_eq!(value["order"]["status"], "pending");
        assert_eq!(value["order"]["items"], json!([{ "name": "Burger", "quantity": 2 }]));
        assert!(value["order"]["created_at"].as_str().unwrap().starts_with("2026-10-14T19:02:11"));
        // Prices stay off the kitchen feed
        assert!(value["order"].get("total_cents").is_none());
    }

    #[test]
    fn test_event_parses_back() {
        let raw = r#"{"type":"status_update","order_id":4,"new_status":"paid","old_status":"served"}"#;
        let event: LiveEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.order_id(), 4);
        assert_eq!(event.kind(), "status_update");
    }
}
