//! Notifier port - one-way email events of the lead pipeline.
//!
//! The core never waits on delivery outcomes for lead alerts; callers log
//! failures and carry on. Delivery may be at-least-once.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode};
use crate::domain::lead::Lead;
use crate::domain::public::{AnswerDigest, ResultSummary};

/// Alert sent to a type's recipients when a lead is created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLeadNotice {
    pub lead: Lead,
    pub type_name: String,
    pub recipients: Vec<String>,
    pub digest: Vec<AnswerDigest>,
}

/// Result summary sent to the visitor's own address.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultNotice {
    pub recipient: EmailAddress,
    pub summary: ResultSummary,
    /// Absolute link back to the result page, when the base URL is known.
    pub result_url: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotificationError {
    #[error("no recipients configured")]
    NoRecipients,

    #[error("email transport failed: {0}")]
    Transport(String),

    #[error("message could not be built: {0}")]
    InvalidMessage(String),

    #[error("notification queue is closed")]
    QueueClosed,
}

impl From<NotificationError> for DomainError {
    fn from(err: NotificationError) -> Self {
        DomainError::new(ErrorCode::TransportError, err.to_string())
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Alerts the type's recipients about a new lead.
    ///
    /// # Errors
    ///
    /// - `NoRecipients` if the recipient list is empty
    /// - `Transport` when the message could not be handed off
    async fn new_lead(&self, notice: &NewLeadNotice) -> Result<(), NotificationError>;

    /// Sends the visitor a copy of their result.
    async fn deliver_result(&self, notice: &ResultNotice) -> Result<(), NotificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_is_object_safe() {
        fn _accepts_dyn(_notifier: &dyn Notifier) {}
    }

    #[test]
    fn notification_errors_are_transient_domain_errors() {
        let err: DomainError = NotificationError::Transport("timeout".into()).into();
        assert_eq!(err.code, ErrorCode::TransportError);
        assert!(err.message.contains("timeout"));
    }
}
