//! New-order notification fan-out.
//!
//! Order creation publishes onto a tokio broadcast channel; the admin
//! dashboard subscribes through the `/api/orders/events` SSE endpoint. Lagged
//! subscribers drop messages rather than backpressure order creation.

use serde::Serialize;
use tokio::sync::broadcast;

use knobsshop_core::OrderId;

const CHANNEL_CAPACITY: usize = 64;

/// Payload pushed to dashboard subscribers when an order lands.
#[derive(Debug, Clone, Serialize)]
pub struct OrderNotification {
    pub order_id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    pub final_amount: rust_decimal::Decimal,
}

/// Shared handle for publishing and subscribing to order notifications.
#[derive(Clone)]
pub struct OrderEvents {
    sender: broadcast::Sender<OrderNotification>,
}

impl OrderEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish a notification. Silently drops when nobody is listening.
    pub fn publish(&self, notification: OrderNotification) {
        let _ = self.sender.send(notification);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OrderNotification> {
        self.sender.subscribe()
    }
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn subscriber_receives_published_notification() {
        let events = OrderEvents::new();
        let mut rx = events.subscribe();

        events.publish(OrderNotification {
            order_id: OrderId::generate(),
            order_number: "ORD-0042".into(),
            customer_name: "Asha".into(),
            final_amount: Decimal::from(1499),
        });

        let got = rx.recv().await.expect("notification");
        assert_eq!(got.order_number, "ORD-0042");
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let events = OrderEvents::new();
        events.publish(OrderNotification {
            order_id: OrderId::generate(),
            order_number: "ORD-0001".into(),
            customer_name: "Ravi".into(),
            final_amount: Decimal::ZERO,
        });
    }
}
