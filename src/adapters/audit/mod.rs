//! Audit log adapters.
//!
//! - `TracingAuditLog` - writes records to the structured log
//! - `InMemoryAuditLog` - keeps records for assertions
//!
//! The PostgreSQL sink lives with the other database adapters.

mod in_memory;
mod tracing_log;

pub use in_memory::InMemoryAuditLog;
pub use tracing_log::TracingAuditLog;
