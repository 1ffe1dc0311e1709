//! EditDraftHandler - structural edits on a draft version.
//!
//! Every edit is refused with `NOT_EDITABLE` once the owning version has
//! left the draft state.

use std::sync::Arc;

use crate::domain::catalog::{Domain, DomainFields, Question, QuestionFields};
use crate::domain::foundation::{DomainError, DomainId, QuestionId, VersionId};
use crate::ports::CatalogRepository;

/// One mutation of a draft's domains or questions.
#[derive(Debug, Clone)]
pub enum DraftEdit {
    AddDomain {
        version_id: VersionId,
        fields: DomainFields,
    },
    UpdateDomain {
        domain_id: DomainId,
        fields: DomainFields,
    },
    DeleteDomain {
        domain_id: DomainId,
    },
    ReorderDomains {
        version_id: VersionId,
        order: Vec<DomainId>,
    },
    AddQuestion {
        domain_id: DomainId,
        fields: QuestionFields,
    },
    UpdateQuestion {
        question_id: QuestionId,
        fields: QuestionFields,
    },
    DeleteQuestion {
        question_id: QuestionId,
    },
    ReorderQuestions {
        domain_id: DomainId,
        order: Vec<QuestionId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftEditResult {
    Domain(Domain),
    Question(Question),
    Done,
}

pub struct EditDraftHandler {
    catalog: Arc<dyn CatalogRepository>,
}

impl EditDraftHandler {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, edit: DraftEdit) -> Result<DraftEditResult, DomainError> {
        let catalog = self.catalog.as_ref();
        let result = match edit {
            DraftEdit::AddDomain { version_id, fields } => {
                DraftEditResult::Domain(catalog.add_domain(version_id, &fields).await?)
            }
            DraftEdit::UpdateDomain { domain_id, fields } => {
                DraftEditResult::Domain(catalog.update_domain(domain_id, &fields).await?)
            }
            DraftEdit::DeleteDomain { domain_id } => {
                catalog.delete_domain(domain_id).await?;
                DraftEditResult::Done
            }
            DraftEdit::ReorderDomains { version_id, order } => {
                catalog.reorder_domains(version_id, &order).await?;
                DraftEditResult::Done
            }
            DraftEdit::AddQuestion { domain_id, fields } => {
                DraftEditResult::Question(catalog.add_question(domain_id, &fields).await?)
            }
            DraftEdit::UpdateQuestion {
                question_id,
                fields,
            } => DraftEditResult::Question(catalog.update_question(question_id, &fields).await?),
            DraftEdit::DeleteQuestion { question_id } => {
                catalog.delete_question(question_id).await?;
                DraftEditResult::Done
            }
            DraftEdit::ReorderQuestions { domain_id, order } => {
                catalog.reorder_questions(domain_id, &order).await?;
                DraftEditResult::Done
            }
        };
        Ok(result)
    }
}
