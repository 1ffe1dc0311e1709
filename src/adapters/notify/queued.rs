//! Notifier that hands lead alerts to a background worker.
//!
//! `new_lead` only enqueues, so lead creation never waits on SMTP. Result
//! delivery stays synchronous: the visitor asked for it and must hear
//! whether it failed.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ports::{NewLeadNotice, NotificationError, Notifier, ResultNotice};

pub struct QueuedNotifier {
    sender: mpsc::Sender<NewLeadNotice>,
    inner: Arc<dyn Notifier>,
}

impl QueuedNotifier {
    /// Spawns the delivery worker. The worker exits once every sender is
    /// dropped and the queue is drained.
    pub fn spawn(inner: Arc<dyn Notifier>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<NewLeadNotice>(capacity.max(1));
        let worker_inner = Arc::clone(&inner);
        let worker = tokio::spawn(async move {
            while let Some(notice) = receiver.recv().await {
                if let Err(err) = worker_inner.new_lead(&notice).await {
                    tracing::warn!(
                        lead_id = %notice.lead.id,
                        public_assessment_id = %notice.lead.public_assessment_id,
                        error = %err,
                        "Queued lead alert failed"
                    );
                }
            }
            tracing::debug!("Notification worker stopped");
        });
        (Self { sender, inner }, worker)
    }
}

#[async_trait]
impl Notifier for QueuedNotifier {
    async fn new_lead(&self, notice: &NewLeadNotice) -> Result<(), NotificationError> {
        if notice.recipients.is_empty() {
            return Err(NotificationError::NoRecipients);
        }
        self.sender.try_send(notice.clone()).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => {
                NotificationError::Transport("notification queue is full".into())
            }
            mpsc::error::TrySendError::Closed(_) => NotificationError::QueueClosed,
        })
    }

    async fn deliver_result(&self, notice: &ResultNotice) -> Result<(), NotificationError> {
        self.inner.deliver_result(notice).await
    }
}
