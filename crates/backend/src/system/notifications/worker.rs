use std::sync::Arc;

use contracts::system::notifications::events::OrderCompletedEvent;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::mailer::{Mailer, OutgoingMail};
use super::templates;

/// Фоновый воркер отправки писем о заказах.
pub struct EmailWorker {
    receiver: mpsc::Receiver<OrderCompletedEvent>,
    mailer: Arc<dyn Mailer>,
    from: String,
    admin_email: Option<String>,
}

impl EmailWorker {
    pub fn new(
        receiver: mpsc::Receiver<OrderCompletedEvent>,
        mailer: Arc<dyn Mailer>,
        from: String,
        admin_email: Option<String>,
    ) -> Self {
        Self {
            receiver,
            mailer,
            from,
            admin_email,
        }
    }

    /// Обрабатывает события, пока очередь не закрыта.
    pub async fn run_loop(mut self) {
        info!("Order notification worker started");
        while let Some(event) = self.receiver.recv().await {
            self.process(&event).await;
        }
        info!("Order notification worker stopped");
    }

    fn mails_for(&self, event: &OrderCompletedEvent) -> Vec<OutgoingMail> {
        let mut mails = vec![templates::customer_confirmation(event, &self.from)];
        if let Some(admin_email) = &self.admin_email {
            mails.push(templates::admin_new_order(event, &self.from, admin_email));
        }
        mails
    }

    /// Отправляет письма по одному событию; ошибка одного письма не мешает остальным.
    async fn process(&self, event: &OrderCompletedEvent) {
        for mail in self.mails_for(event) {
            match self.mailer.send(&mail).await {
                Ok(()) => info!("Sent '{}' to {} for order {}", mail.subject, mail.to, event.order_id),
                Err(e) => error!(
                    "Failed to send '{}' to {} for order {}: {:?}",
                    mail.subject, mail.to, event.order_id, e
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::notifications::queue::tests::sample_event;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
            if self.fail_for.as_deref() == Some(mail.to.as_str()) {
                anyhow::bail!("smtp refused {}", mail.to);
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    async fn run(mailer: Arc<RecordingMailer>, admin: Option<&str>, events: Vec<OrderCompletedEvent>) {
        let (sender, receiver) = mpsc::channel(8);
        let worker = EmailWorker::new(
            receiver,
            mailer,
            "shop@example.com".into(),
            admin.map(str::to_string),
        );
        for event in events {
            sender.send(event).await.unwrap();
        }
        drop(sender);
        worker.run_loop().await;
    }

    #[tokio::test]
    async fn test_customer_and_admin_mail_per_event() {
        let mailer = Arc::new(RecordingMailer::default());
        run(mailer.clone(), Some("ops@example.com"), vec![sample_event("Ada")]).await;

        let sent = mailer.sent.lock().unwrap();
        let recipients: Vec<&str> = sent.iter().map(|m| m.to.as_str()).collect();
        assert_eq!(recipients, vec!["ada@example.com", "ops@example.com"]);
    }

    #[tokio::test]
    async fn test_no_admin_copy_without_admin_email() {
        let mailer = Arc::new(RecordingMailer::default());
        run(mailer.clone(), None, vec![sample_event("Ada"), sample_event("Bob")]).await;
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_mail_does_not_stop_the_worker() {
        let mailer = Arc::new(RecordingMailer {
            fail_for: Some("ada@example.com".into()),
            ..Default::default()
        });
        run(
            mailer.clone(),
            Some("ops@example.com"),
            vec![sample_event("Ada"), sample_event("Ada")],
        )
        .await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.to == "ops@example.com"));
    }
}
