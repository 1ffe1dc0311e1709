//! Authentication adapters.
//!
//! - `credentials` - bootstrap administrator plus respondent logins
//! - `sessions` - opaque bearer tokens kept in process memory

mod credentials;
mod sessions;

pub use credentials::{sha256_hex, AdminAccount, StaticCredentialProvider};
pub use sessions::InMemorySessionStore;
