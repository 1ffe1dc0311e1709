//! UpdateTypeHandler - renames, describes or (de)activates a type.

use std::sync::Arc;

use crate::application::handlers::lookup::require_type;
use crate::domain::catalog::{AssessmentType, TypeDraft};
use crate::domain::foundation::{AuditRecord, DomainError, Principal, TypeId};
use crate::ports::{record_quietly, AuditLog, CatalogRepository};

/// `None` leaves a field as is.
#[derive(Debug, Clone)]
pub struct UpdateTypeCommand {
    pub type_id: TypeId,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub active: Option<bool>,
    pub actor: Principal,
}

pub struct UpdateTypeHandler {
    catalog: Arc<dyn CatalogRepository>,
    audit: Arc<dyn AuditLog>,
}

impl UpdateTypeHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { catalog, audit }
    }

    pub async fn handle(&self, cmd: UpdateTypeCommand) -> Result<AssessmentType, DomainError> {
        let mut assessment_type = require_type(self.catalog.as_ref(), cmd.type_id).await?;

        let name = cmd.name.unwrap_or_else(|| assessment_type.name.clone());
        let description = cmd
            .description
            .unwrap_or_else(|| assessment_type.description.clone());
        let validated = TypeDraft::new(&name, description)?;
        assessment_type.name = validated.name;
        assessment_type.description = validated.description;
        if let Some(active) = cmd.active {
            assessment_type.active = active;
        }

        self.catalog.update_type(&assessment_type).await?;
        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "type.updated", "assessment_type")
                .entity(assessment_type.id, Some(&assessment_type.name))
                .detail(serde_json::json!({ "active": assessment_type.active })),
        )
        .await;
        Ok(assessment_type)
    }
}
