//! # Order Service
//!
//! ```text
//!   place_order ──► OrderRepository::create_order ──commit──► broadcast(new_order)
//!   set_status  ──► OrderRepository::set_status   ──commit──► broadcast(status_update)
//!   pay         ──► OrderRepository::pay          ──commit──► broadcast(status_update)
//! ```
//!
//! Events go out only after the transaction committed. A failed operation
//! broadcasts nothing, and a slow observer cannot delay the response.

use tracing::debug;

use dinein_core::{
    NewOrder, NewPayment, OrderDetail, OrderStatus, PaymentPolicy, StatusChange, TransitionPolicy,
};
use dinein_db::{DbResult, OrderRepository, PaymentReceipt};
use dinein_live::{LiveEvent, NotificationHub};

use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct OrderService {
    orders: OrderRepository,
    hub: NotificationHub,
    transition_policy: TransitionPolicy,
    payment_policy: PaymentPolicy,
}

impl OrderService {
    pub fn new(state: &AppState) -> Self {
        OrderService {
            orders: state.db.orders(),
            hub: state.hub.clone(),
            transition_policy: state.transition_policy,
            payment_policy: state.payment_policy,
        }
    }

    pub async fn place_order(&self, new_order: &NewOrder) -> DbResult<OrderDetail> {
        let detail = self.orders.create_order(new_order).await?;
        self.publish(LiveEvent::new_order(&detail));
        Ok(detail)
    }

    pub async fn set_status(&self, order_id: i64, status: OrderStatus) -> DbResult<StatusChange> {
        let change = self
            .orders
            .set_status(order_id, status, self.transition_policy)
            .await?;
        self.publish(LiveEvent::status_update(&change));
        Ok(change)
    }

    pub async fn pay(&self, order_id: i64, payment: &NewPayment) -> DbResult<PaymentReceipt> {
        let receipt = self
            .orders
            .pay(order_id, payment, self.payment_policy)
            .await?;
        self.publish(LiveEvent::status_update(&receipt.change));
        Ok(receipt)
    }

    fn publish(&self, event: LiveEvent) {
        let order_id = event.order_id();
        let kind = event.kind();
        let report = self.hub.broadcast(event);
        debug!(
            order_id,
            kind,
            delivered = report.delivered,
            dropped = report.dropped,
            "Published order event"
        );
    }
}
