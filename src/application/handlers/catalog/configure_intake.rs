//! ConfigureIntakeHandler - public intake switch, lead recipients and CTA text.

use std::sync::Arc;

use crate::application::handlers::lookup::require_type;
use crate::domain::catalog::{AssessmentType, PublicIntakeSettings};
use crate::domain::foundation::{AuditRecord, DomainError, Principal, TypeId};
use crate::ports::{record_quietly, AuditLog, CatalogRepository};

#[derive(Debug, Clone)]
pub struct ConfigureIntakeCommand {
    pub type_id: TypeId,
    pub enabled: bool,
    /// Raw list as typed by the admin, split on `,` or `;`.
    pub recipients: String,
    pub cta_text: Option<String>,
    pub actor: Principal,
}

pub struct ConfigureIntakeHandler {
    catalog: Arc<dyn CatalogRepository>,
    audit: Arc<dyn AuditLog>,
}

impl ConfigureIntakeHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>, audit: Arc<dyn AuditLog>) -> Self {
        Self { catalog, audit }
    }

    pub async fn handle(&self, cmd: ConfigureIntakeCommand) -> Result<AssessmentType, DomainError> {
        let settings = PublicIntakeSettings::parse(cmd.enabled, &cmd.recipients, cmd.cta_text)?;
        let mut assessment_type = require_type(self.catalog.as_ref(), cmd.type_id).await?;
        assessment_type.apply_intake_settings(settings);
        self.catalog.update_type(&assessment_type).await?;

        record_quietly(
            self.audit.as_ref(),
            AuditRecord::by(&cmd.actor, "type.intake_configured", "assessment_type")
                .entity(assessment_type.id, Some(&assessment_type.name))
                .detail(serde_json::json!({
                    "enabled": assessment_type.public_intake_enabled,
                    "recipients": assessment_type.notification_recipients,
                })),
        )
        .await;
        Ok(assessment_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::foundation::ErrorCode;

    fn command(type_id: TypeId, recipients: &str) -> ConfigureIntakeCommand {
        ConfigureIntakeCommand {
            type_id,
            enabled: true,
            recipients: recipients.into(),
            cta_text: Some("  ".into()),
            actor: admin(),
        }
    }

    #[tokio::test]
    async fn recipients_are_split_and_trimmed() {
        let fx = Fixture::new();
        let (assessment_type, _) = fx.published_type("Cyber", &[("Identity", &[true])]).await;
        let handler = ConfigureIntakeHandler::new(fx.catalog(), fx.audit_log());

        let updated = handler
            .handle(command(assessment_type.id, " sales@acme.io ; ops@acme.io,, "))
            .await
            .unwrap();

        assert!(updated.public_intake_enabled);
        assert_eq!(
            updated.notification_recipients,
            vec!["sales@acme.io".to_string(), "ops@acme.io".to_string()]
        );
        assert_eq!(updated.cta_text, None);
    }

    #[tokio::test]
    async fn malformed_recipient_is_rejected() {
        let fx = Fixture::new();
        let (assessment_type, _) = fx.published_type("Cyber", &[("Identity", &[true])]).await;
        let handler = ConfigureIntakeHandler::new(fx.catalog(), fx.audit_log());

        let err = handler
            .handle(command(assessment_type.id, "sales@acme.io, nobody"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let stored = fx.catalog().find_type(assessment_type.id).await.unwrap().unwrap();
        assert!(!stored.public_intake_enabled);
    }
}
