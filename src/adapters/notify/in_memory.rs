//! Recording notifier and transport for tests and local runs.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{
    EmailTransport, NewLeadNotice, NotificationError, Notifier, OutgoingEmail, ResultNotice,
};

/// Records every notice instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    leads: Arc<RwLock<Vec<NewLeadNotice>>>,
    results: Arc<RwLock<Vec<ResultNotice>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every call fails with a transport error.
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.set_failing(true);
        notifier
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn lead_notices(&self) -> Vec<NewLeadNotice> {
        self.leads.read().await.clone()
    }

    pub async fn result_notices(&self) -> Vec<ResultNotice> {
        self.results.read().await.clone()
    }

    fn check(&self) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(NotificationError::Transport("simulated outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn new_lead(&self, notice: &NewLeadNotice) -> Result<(), NotificationError> {
        self.check()?;
        self.leads.write().await.push(notice.clone());
        Ok(())
    }

    async fn deliver_result(&self, notice: &ResultNotice) -> Result<(), NotificationError> {
        self.check()?;
        self.results.write().await.push(notice.clone());
        Ok(())
    }
}

/// Keeps outgoing emails in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<RwLock<Vec<OutgoingEmail>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError> {
        if email.to.is_empty() {
            return Err(NotificationError::NoRecipients);
        }
        self.sent.write().await.push(email.clone());
        Ok(())
    }
}
