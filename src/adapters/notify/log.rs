use async_trait::async_trait;

use crate::ports::{EmailTransport, NotificationError, OutgoingEmail};

/// Logs outgoing emails instead of sending them. Used when email is
/// disabled so that alerts still show up in the service logs.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

impl LogTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailTransport for LogTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError> {
        if email.to.is_empty() {
            return Err(NotificationError::NoRecipients);
        }
        tracing::info!(
            target: "email",
            to = %email.to.join(", "),
            subject = %email.subject,
            "Email delivery disabled; message not sent"
        );
        Ok(())
    }
}
