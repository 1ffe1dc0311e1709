//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `memory` - In-memory store for tests and local development
//! - `postgres` - PostgreSQL repositories and audit log (sqlx)
//! - `notify` - Email notifier over SMTP (lettre), queued delivery
//! - `ai` - OpenAI-backed recommendation generator
//! - `audit` - Audit sinks
//! - `auth` - Credential verification and session tokens
//! - `http` - axum REST surface

pub mod ai;
pub mod audit;
pub mod auth;
pub mod http;
pub mod memory;
pub mod notify;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{PostgresAuditLog, PostgresStore};
