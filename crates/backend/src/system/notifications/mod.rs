//! Order notification dispatch.
//!
//! Checkout hands an [`OrderCompletedEvent`] to the installed
//! [`OrderNotifier`] after its transaction has committed. Delivery is
//! best-effort: a failure here is logged by the caller and never touches
//! the order.

pub mod mailer;
pub mod queue;
pub mod templates;
pub mod worker;

use std::sync::Arc;

use async_trait::async_trait;
use contracts::system::notifications::events::OrderCompletedEvent;
use once_cell::sync::OnceCell;

use crate::shared::config::NotificationsConfig;

static NOTIFIER: OnceCell<Arc<dyn OrderNotifier>> = OnceCell::new();

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification queue is full")]
    QueueFull,

    #[error("notification queue is closed")]
    QueueClosed,
}

/// Receiver of completed-order events
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn order_completed(&self, event: OrderCompletedEvent) -> Result<(), NotificationError>;
}

/// Installed when notifications are switched off
pub struct DisabledNotifier;

#[async_trait]
impl OrderNotifier for DisabledNotifier {
    async fn order_completed(&self, event: OrderCompletedEvent) -> Result<(), NotificationError> {
        tracing::debug!("Notifications disabled, dropping event for order {}", event.order_id);
        Ok(())
    }
}

/// The process-wide notifier, or a disabled one before [`start`] ran
pub fn notifier() -> Arc<dyn OrderNotifier> {
    NOTIFIER
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::new(DisabledNotifier))
}

/// Install the notifier described by `config`, spawning the mail worker
/// when notifications are enabled. Must run inside the tokio runtime.
pub fn start(config: &NotificationsConfig) -> anyhow::Result<()> {
    let notifier: Arc<dyn OrderNotifier> = if config.enabled {
        let (notifier, receiver) = queue::channel(config.queue_capacity);
        let worker = worker::EmailWorker::new(
            receiver,
            Arc::new(mailer::LogMailer),
            config.from.clone(),
            config.admin_email.clone(),
        );
        tokio::spawn(worker.run_loop());
        tracing::info!(
            "Order notifications enabled (queue capacity {}, admin copy: {})",
            config.queue_capacity,
            config.admin_email.as_deref().unwrap_or("none")
        );
        Arc::new(notifier)
    } else {
        tracing::info!("Order notifications disabled");
        Arc::new(DisabledNotifier)
    };

    NOTIFIER
        .set(notifier)
        .map_err(|_| anyhow::anyhow!("Order notifier already installed"))
}
