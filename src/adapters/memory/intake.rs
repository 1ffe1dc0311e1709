use async_trait::async_trait;

use super::InMemoryStore;
use crate::domain::foundation::DomainError;
use crate::domain::public::{IntakeSession, SessionHandle};
use crate::ports::IntakeSessionStore;

#[async_trait]
impl IntakeSessionStore for InMemoryStore {
    async fn save(&self, session: &IntakeSession) -> Result<(), DomainError> {
        self.state
            .lock()
            .await
            .intake_sessions
            .insert(session.handle, session.clone());
        Ok(())
    }

    async fn find(&self, handle: &SessionHandle) -> Result<Option<IntakeSession>, DomainError> {
        Ok(self.state.lock().await.intake_sessions.get(handle).cloned())
    }
}
