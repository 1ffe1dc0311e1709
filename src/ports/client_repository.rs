//! Client repository port - organizations and their respondents.

use async_trait::async_trait;

use crate::domain::client::{Client, ClientDraft, Respondent, RespondentDraft};
use crate::domain::foundation::{ClientId, DomainError, EmailAddress, RespondentId, Timestamp};

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create_client(&self, draft: &ClientDraft, now: Timestamp)
        -> Result<Client, DomainError>;

    async fn find_client(&self, id: ClientId) -> Result<Option<Client>, DomainError>;

    /// Clients ordered by trade name.
    async fn list_clients(&self) -> Result<Vec<Client>, DomainError>;

    /// # Errors
    ///
    /// - `ClientNotFound` if the client does not exist
    /// - `Conflict` if the login is already used
    async fn create_respondent(
        &self,
        draft: &RespondentDraft,
        now: Timestamp,
    ) -> Result<Respondent, DomainError>;

    async fn find_respondent(&self, id: RespondentId) -> Result<Option<Respondent>, DomainError>;

    async fn find_respondent_by_login(
        &self,
        login: &EmailAddress,
    ) -> Result<Option<Respondent>, DomainError>;

    async fn list_respondents(&self, client_id: ClientId) -> Result<Vec<Respondent>, DomainError>;

    /// Stamps the last successful login.
    async fn record_access(&self, id: RespondentId, at: Timestamp) -> Result<(), DomainError>;
}
