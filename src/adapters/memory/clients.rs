use async_trait::async_trait;

use super::InMemoryStore;
use crate::domain::client::{Client, ClientDraft, Respondent, RespondentDraft};
use crate::domain::foundation::{
    ClientId, DomainError, EmailAddress, ErrorCode, RespondentId, Timestamp,
};
use crate::ports::ClientRepository;

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn create_client(
        &self,
        draft: &ClientDraft,
        now: Timestamp,
    ) -> Result<Client, DomainError> {
        let mut state = self.state.lock().await;
        let id = ClientId::new(state.next_id());
        let client = Client {
            id,
            trade_name: draft.trade_name.clone(),
            legal_name: draft.legal_name.clone(),
            tax_id: draft.tax_id.clone(),
            location: draft.location.clone(),
            segment: draft.segment.clone(),
            active: true,
            created_at: now,
        };
        state.clients.insert(id, client.clone());
        Ok(client)
    }

    async fn find_client(&self, id: ClientId) -> Result<Option<Client>, DomainError> {
        Ok(self.state.lock().await.clients.get(&id).cloned())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, DomainError> {
        let mut clients: Vec<Client> = self.state.lock().await.clients.values().cloned().collect();
        clients.sort_by(|a, b| a.trade_name.cmp(&b.trade_name));
        Ok(clients)
    }

    async fn create_respondent(
        &self,
        draft: &RespondentDraft,
        now: Timestamp,
    ) -> Result<Respondent, DomainError> {
        let mut state = self.state.lock().await;
        if !state.clients.contains_key(&draft.client_id) {
            return Err(DomainError::not_found(
                ErrorCode::ClientNotFound,
                "Client",
                draft.client_id,
            ));
        }
        if state.respondents.values().any(|r| r.login == draft.login) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("Login {} is already in use", draft.login),
            )
            .with_detail("field", "login"));
        }
        let id = RespondentId::new(state.next_id());
        let respondent = Respondent {
            id,
            client_id: draft.client_id,
            login: draft.login.clone(),
            secret_digest: draft.secret_digest.clone(),
            display_name: draft.display_name.clone(),
            role: draft.role.clone(),
            department: draft.department.clone(),
            active: true,
            must_rotate_credentials: true,
            last_access_at: None,
            completed_at: None,
            created_at: now,
        };
        state.respondents.insert(id, respondent.clone());
        Ok(respondent)
    }

    async fn find_respondent(&self, id: RespondentId) -> Result<Option<Respondent>, DomainError> {
        Ok(self.state.lock().await.respondents.get(&id).cloned())
    }

    async fn find_respondent_by_login(
        &self,
        login: &EmailAddress,
    ) -> Result<Option<Respondent>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .respondents
            .values()
            .find(|r| &r.login == login)
            .cloned())
    }

    async fn list_respondents(&self, client_id: ClientId) -> Result<Vec<Respondent>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .respondents
            .values()
            .filter(|r| r.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn record_access(&self, id: RespondentId, at: Timestamp) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let respondent = state.respondents.get_mut(&id).ok_or_else(|| {
            DomainError::not_found(ErrorCode::RespondentNotFound, "Respondent", id)
        })?;
        respondent.last_access_at = Some(at);
        Ok(())
    }
}
