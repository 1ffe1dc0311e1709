//! CreateClientHandler - registers a client organization.

use std::sync::Arc;

use crate::domain::client::{Client, ClientDraft};
use crate::domain::foundation::{AuditRecord, DomainError, Principal, Timestamp};
use crate::ports::{record_quietly, AuditLog, ClientRepository};

#[derive(Debug, Clone)]
pub struct CreateClientCommand {
    pub trade_name: String,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub location: Option<String>,
    pub segment: Option<String>,
    pub actor: Principal,
}

pub struct CreateClientHandler {
    clients: Arc<dyn ClientRepository>,
    audit: Arc<dyn AuditLog>,
}

impl CreateClientHandler {
    pub fn new(clients: Arc<dyn ClientRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { clients, audit }
    }

    pub async fn handle(&self, cmd: CreateClientCommand) -> Result<Client, DomainError> {
        let draft = ClientDraft::new(
            &cmd.trade_name,
            cmd.legal_name,
            cmd.tax_id,
            cmd.location,
            cmd.segment,
        )?;
        let client = self.clients.create_client(&draft, Timestamp::now()).await?;
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "client.created", "client")
                .entity(client.id, Some(&client.trade_name)),
        )
        .await;
        Ok(client)
    }
}
