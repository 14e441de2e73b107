use async_trait::async_trait;
use contracts::system::notifications::events::OrderCompletedEvent;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::{NotificationError, OrderNotifier};

/// Bounded in-process queue feeding the mail worker.
///
/// Enqueueing never waits: a full queue is reported instead.
pub struct QueueNotifier {
    sender: mpsc::Sender<OrderCompletedEvent>,
}

pub fn channel(capacity: usize) -> (QueueNotifier, mpsc::Receiver<OrderCompletedEvent>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (QueueNotifier { sender }, receiver)
}

#[async_trait]
impl OrderNotifier for QueueNotifier {
    async fn order_completed(&self, event: OrderCompletedEvent) -> Result<(), NotificationError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => NotificationError::QueueFull,
            TrySendError::Closed(_) => NotificationError::QueueClosed,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use contracts::domain::a002_address::aggregate::ShippingAddressSnapshot;
    use contracts::domain::a004_order::aggregate::OrderId;
    use contracts::system::notifications::events::OrderCompletedItem;
    use rust_decimal::Decimal;

    pub(crate) fn sample_event(customer_name: &str) -> OrderCompletedEvent {
        OrderCompletedEvent {
            order_id: OrderId::new_v4(),
            customer_email: "ada@example.com".into(),
            customer_name: Some(customer_name.into()),
            items: vec![OrderCompletedItem {
                product_name: "Mug".into(),
                quantity: 2,
                product_price: Decimal::new(1250, 2),
            }],
            total_amount: Decimal::new(2500, 2),
            shipping_address: ShippingAddressSnapshot {
                recipient_name: "Ada Lovelace".into(),
                phone: None,
                address_line1: "12 St James's Square".into(),
                address_line2: None,
                city: "London".into(),
                state: "Greater London".into(),
                postal_code: "SW1Y 4JH".into(),
                country: "GB".into(),
            },
        }
    }

    #[tokio::test]
    async fn test_enqueue_and_receive() {
        let (notifier, mut receiver) = channel(4);
        let event = sample_event("Ada");
        notifier.order_completed(event.clone()).await.unwrap();
        assert_eq!(receiver.recv().await, Some(event));
    }

    #[tokio::test]
    async fn test_full_queue_does_not_block() {
        let (notifier, _receiver) = channel(1);
        notifier.order_completed(sample_event("Ada")).await.unwrap();
        let err = notifier.order_completed(sample_event("Bob")).await.unwrap_err();
        assert!(matches!(err, NotificationError::QueueFull));
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let (notifier, receiver) = channel(1);
        drop(receiver);
        let err = notifier.order_completed(sample_event("Ada")).await.unwrap_err();
        assert!(matches!(err, NotificationError::QueueClosed));
    }
}
