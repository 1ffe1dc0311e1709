//! Email transport port - hands a rendered message to a mail system.

use async_trait::async_trait;

use super::NotificationError;

/// A rendered message with HTML and plain-text alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_transport_is_object_safe() {
        fn _accepts_dyn(_transport: &dyn EmailTransport) {}
    }
}
