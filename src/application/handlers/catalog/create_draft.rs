//! CreateDraftHandler - starts a new draft version from an existing one.

use std::sync::Arc;

use crate::application::handlers::lookup::require_tree;
use crate::domain::catalog::{AssessmentVersion, VersionDraft};
use crate::domain::foundation::{DomainError, Principal, Timestamp, VersionId};
use crate::ports::CatalogRepository;

/// Command to deep-clone `base_version_id` into a new draft labelled `label`.
#[derive(Debug, Clone)]
pub struct CreateDraftCommand {
    pub base_version_id: VersionId,
    pub label: String,
    pub notes: Option<String>,
    pub actor: Principal,
}

pub struct CreateDraftHandler {
    catalog: Arc<dyn CatalogRepository>,
}

impl CreateDraftHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, cmd: CreateDraftCommand) -> Result<AssessmentVersion, DomainError> {
        // 1. Validate input
        let draft = VersionDraft::new(
            &cmd.label,
            cmd.notes,
            Some(cmd.actor.display_name().to_string()),
        )?;

        // 2. Snapshot the base (active rows only)
        let base = require_tree(self.catalog.as_ref(), cmd.base_version_id).await?;

        // 3. Insert the copy; the store rejects a taken label
        let version = self
            .catalog
            .create_version(
                base.version.type_id(),
                &draft,
                &base.blueprint(),
                Timestamp::now(),
            )
            .await?;

        tracing::info!(
            version_id = %version.id(),
            base_version_id = %cmd.base_version_id,
            label = %version.label(),
            "Draft version created"
        );
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::testing::{admin, Fixture};
    use crate::domain::catalog::{QuestionFields, VersionStatus};
    use crate::domain::foundation::ErrorCode;

    fn command(base: VersionId, label: &str) -> CreateDraftCommand {
        CreateDraftCommand {
            base_version_id: base,
            label: label.into(),
            notes: Some("Refresh".into()),
            actor: admin(),
        }
    }

    #[tokio::test]
    async fn clone_is_independent_of_its_base() {
        let fx = Fixture::new();
        let (_, base) = fx.published_type("Cyber", &[("Identity", &[true, false])]).await;
        let handler = CreateDraftHandler::new(fx.catalog());

        let draft = handler.handle(command(base.version.id(), "1.1")).await.unwrap();
        assert_eq!(draft.status(), VersionStatus::Draft);

        let catalog = fx.catalog();
        let copy = catalog.load_tree(draft.id()).await.unwrap().unwrap();
        let copied_question = copy.domains[0].questions[0].clone();
        assert_ne!(copied_question.id, base.domains[0].questions[0].id);

        let mut fields = QuestionFields::from(&copied_question);
        fields.text = "Rewritten".into();
        catalog
            .update_question(copied_question.id, &fields)
            .await
            .unwrap();

        let base_again = catalog.load_tree(base.version.id()).await.unwrap().unwrap();
        assert_eq!(base_again.domains[0].questions[0].text, base.domains[0].questions[0].text);
    }

    #[tokio::test]
    async fn inactive_rows_are_not_copied() {
        let fx = Fixture::new();
        let catalog = fx.catalog();
        let (_, base) = fx.published_type("Cyber", &[("Identity", &[true])]).await;
        let draft = CreateDraftHandler::new(fx.catalog())
            .handle(command(base.version.id(), "1.1"))
            .await
            .unwrap();
        let tree = catalog.load_tree(draft.id()).await.unwrap().unwrap();
        let mut fields = QuestionFields::from(&tree.domains[0].questions[0]);
        fields.active = false;
        catalog
            .update_question(tree.domains[0].questions[0].id, &fields)
            .await
            .unwrap();

        let second = CreateDraftHandler::new(fx.catalog())
            .handle(command(draft.id(), "1.2"))
            .await
            .unwrap();
        let copy = catalog.load_tree(second.id()).await.unwrap().unwrap();
        assert_eq!(copy.totals().questions, 0);
        assert!(copy.domains[0].questions.is_empty());
    }

    #[tokio::test]
    async fn existing_label_is_a_conflict() {
        let fx = Fixture::new();
        let (_, base) = fx.published_type("Cyber", &[("Identity", &[true])]).await;
        let handler = CreateDraftHandler::new(fx.catalog());

        let err = handler.handle(command(base.version.id(), "1.0")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::VersionLabelTaken);
    }
}
