//! UpdateVersionNotesHandler - edits the release notes of a draft.

use std::sync::Arc;

use crate::domain::catalog::AssessmentVersion;
use crate::domain::foundation::{DomainError, VersionId};
use crate::ports::CatalogRepository;

#[derive(Debug, Clone)]
pub struct UpdateVersionNotesCommand {
    pub version_id: VersionId,
    pub notes: Option<String>,
}

pub struct UpdateVersionNotesHandler {
    catalog: Arc<dyn CatalogRepository>,
}

impl UpdateVersionNotesHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn handle(
        &self,
        cmd: UpdateVersionNotesCommand,
    ) -> Result<AssessmentVersion, DomainError> {
        self.catalog
            .update_version_notes(cmd.version_id, cmd.notes)
            .await
    }
}
