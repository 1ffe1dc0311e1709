//! Client and respondent read handlers.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::client::{Client, Respondent};
use crate::domain::foundation::{ClientId, DomainError, ErrorCode};
use crate::ports::ClientRepository;

#[derive(Debug, Clone, Serialize)]
pub struct ClientDetail {
    pub client: Client,
    pub respondents: Vec<Respondent>,
}

pub struct ClientQueries {
    clients: Arc<dyn ClientRepository>,
}

impl ClientQueries {
    pub fn new(clients: Arc<dyn ClientRepository>) -> Self {
        Self { clients }
    }

    pub async fn list(&self) -> Result<Vec<Client>, DomainError> {
        self.clients.list_clients().await
    }

    pub async fn detail(&self, client_id: ClientId) -> Result<ClientDetail, DomainError> {
        let client = self
            .clients
            .find_client(client_id)
            .await?
            .ok_or_else(|| DomainError::not_found(ErrorCode::ClientNotFound, "Client", client_id))?;
        let respondents = self.clients.list_respondents(client_id).await?;
        Ok(ClientDetail {
            client,
            respondents,
        })
    }
}
