//! Notification adapters.
//!
//! - `EmailNotifier` - renders alerts and result copies as email
//! - `SmtpTransport` - lettre SMTP, basic or OAuth2
//! - `QueuedNotifier` - background delivery of lead alerts
//! - `LogTransport` - logs messages when email is disabled
//! - `InMemoryNotifier` / `RecordingTransport` - recording doubles

mod email;
mod in_memory;
mod log;
mod queued;
mod smtp;

pub use email::{render_new_lead, render_result, EmailNotifier};
pub use in_memory::{InMemoryNotifier, RecordingTransport};
pub use log::LogTransport;
pub use queued::QueuedNotifier;
pub use smtp::{build_message, OAuth2Settings, SmtpAuth, SmtpSettings, SmtpTransport};
