//! Intake session store port.
//!
//! Holds the server-side state behind a public session handle. Sessions
//! have no expiry; a handle dies when the visitor discards it.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::public::{IntakeSession, SessionHandle};

#[async_trait]
pub trait IntakeSessionStore: Send + Sync {
    /// Inserts or replaces the session.
    async fn save(&self, session: &IntakeSession) -> Result<(), DomainError>;

    async fn find(&self, handle: &SessionHandle) -> Result<Option<IntakeSession>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn IntakeSessionStore) {}
    }
}
