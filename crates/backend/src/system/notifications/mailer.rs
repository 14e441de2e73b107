use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Mail transport used by the notification worker
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()>;
}

/// Writes mails to the log instead of delivering them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        tracing::info!(
            "[mail] from={} to={} subject={:?} ({} bytes)",
            mail.from,
            mail.to,
            mail.subject,
            mail.html.len()
        );
        tracing::debug!("[mail] body:\n{}", mail.html);
        Ok(())
    }
}
