use async_trait::async_trait;

use super::{InMemoryStore, State};
use crate::domain::catalog::{
    ensure_unique_type_name, plan_reorder, publish_replacing, AssessmentType, AssessmentVersion,
    Domain, DomainFields, Question, QuestionFields, TypeDraft, VersionBlueprint, VersionDraft,
    VersionTree,
};
use crate::domain::foundation::{
    DomainError, DomainId, ErrorCode, QuestionId, Timestamp, TypeId, VersionId,
};
use crate::ports::CatalogRepository;

impl State {
    fn insert_blueprint(&mut self, version_id: VersionId, blueprint: &VersionBlueprint) {
        for domain in &blueprint.domains {
            let domain_id = DomainId::new(self.next_id());
            self.domains.insert(
                domain_id,
                Domain {
                    id: domain_id,
                    version_id,
                    name: domain.fields.name.clone(),
                    description: domain.fields.description.clone(),
                    position: domain.position,
                    active: domain.fields.active,
                },
            );
            for (fields, position) in &domain.questions {
                let question_id = QuestionId::new(self.next_id());
                self.questions.insert(
                    question_id,
                    question_from(question_id, domain_id, fields, *position),
                );
            }
        }
    }

    fn editable_version(&self, id: VersionId) -> Result<&AssessmentVersion, DomainError> {
        let version = self
            .versions
            .get(&id)
            .ok_or_else(|| DomainError::not_found(ErrorCode::VersionNotFound, "Version", id))?;
        version.ensure_editable()?;
        Ok(version)
    }

    fn editable_domain(&self, id: DomainId) -> Result<&Domain, DomainError> {
        let domain = self
            .domains
            .get(&id)
            .ok_or_else(|| DomainError::not_found(ErrorCode::DomainNotFound, "Domain", id))?;
        self.editable_version(domain.version_id)?;
        Ok(domain)
    }

    fn editable_question(&self, id: QuestionId) -> Result<&Question, DomainError> {
        let question = self
            .questions
            .get(&id)
            .ok_or_else(|| DomainError::not_found(ErrorCode::QuestionNotFound, "Question", id))?;
        self.editable_domain(question.domain_id)?;
        Ok(question)
    }

    fn ordered_domain_ids(&self, version_id: VersionId) -> Vec<DomainId> {
        let mut domains: Vec<&Domain> = self
            .domains
            .values()
            .filter(|d| d.version_id == version_id)
            .collect();
        domains.sort_by_key(|d| (d.position, d.id));
        domains.into_iter().map(|d| d.id).collect()
    }

    fn ordered_question_ids(&self, domain_id: DomainId) -> Vec<QuestionId> {
        let mut questions: Vec<&Question> = self
            .questions
            .values()
            .filter(|q| q.domain_id == domain_id)
            .collect();
        questions.sort_by_key(|q| (q.position, q.id));
        questions.into_iter().map(|q| q.id).collect()
    }
}

fn question_from(
    id: QuestionId,
    domain_id: DomainId,
    fields: &QuestionFields,
    position: i32,
) -> Question {
    Question {
        id,
        domain_id,
        text: fields.text.clone(),
        description: fields.description.clone(),
        reference: fields.reference.clone(),
        recommendation: fields.recommendation.clone(),
        light: fields.light,
        position,
        active: fields.active,
    }
}

fn label_taken(state: &State, type_id: TypeId, label: &str) -> bool {
    state
        .versions
        .values()
        .any(|v| v.type_id() == type_id && v.label() == label)
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn create_type(
        &self,
        draft: &TypeDraft,
        version: &VersionDraft,
        blueprint: &VersionBlueprint,
        now: Timestamp,
    ) -> Result<(AssessmentType, AssessmentVersion), DomainError> {
        let mut state = self.state.lock().await;
        let existing: Vec<AssessmentType> = state.types.values().cloned().collect();
        ensure_unique_type_name(&existing, &draft.name, None)?;

        let type_id = TypeId::new(state.next_id());
        let assessment_type = AssessmentType {
            id: type_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            active: true,
            public_intake_enabled: false,
            notification_recipients: vec![],
            cta_text: None,
            created_at: now,
        };
        let version_id = VersionId::new(state.next_id());
        let version = AssessmentVersion::new_draft(version_id, type_id, version.clone(), now);

        state.types.insert(type_id, assessment_type.clone());
        state.versions.insert(version_id, version.clone());
        state.insert_blueprint(version_id, blueprint);
        Ok((assessment_type, version))
    }

    async fn update_type(&self, assessment_type: &AssessmentType) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if !state.types.contains_key(&assessment_type.id) {
            return Err(DomainError::not_found(
                ErrorCode::TypeNotFound,
                "Assessment type",
                assessment_type.id,
            ));
        }
        let existing: Vec<AssessmentType> = state.types.values().cloned().collect();
        ensure_unique_type_name(&existing, &assessment_type.name, Some(assessment_type.id))?;
        state
            .types
            .insert(assessment_type.id, assessment_type.clone());
        Ok(())
    }

    async fn find_type(&self, id: TypeId) -> Result<Option<AssessmentType>, DomainError> {
        Ok(self.state.lock().await.types.get(&id).cloned())
    }

    async fn list_types(&self) -> Result<Vec<AssessmentType>, DomainError> {
        let mut types: Vec<AssessmentType> =
            self.state.lock().await.types.values().cloned().collect();
        types.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(types)
    }

    async fn create_version(
        &self,
        type_id: TypeId,
        draft: &VersionDraft,
        blueprint: &VersionBlueprint,
        now: Timestamp,
    ) -> Result<AssessmentVersion, DomainError> {
        let mut state = self.state.lock().await;
        if !state.types.contains_key(&type_id) {
            return Err(DomainError::not_found(
                ErrorCode::TypeNotFound,
                "Assessment type",
                type_id,
            ));
        }
        if label_taken(&state, type_id, &draft.label) {
            return Err(DomainError::new(
                ErrorCode::VersionLabelTaken,
                format!("Version '{}' already exists for this type", draft.label),
            )
            .with_detail("field", "label"));
        }
        let version_id = VersionId::new(state.next_id());
        let version = AssessmentVersion::new_draft(version_id, type_id, draft.clone(), now);
        state.versions.insert(version_id, version.clone());
        state.insert_blueprint(version_id, blueprint);
        Ok(version)
    }

    async fn find_version(&self, id: VersionId) -> Result<Option<AssessmentVersion>, DomainError> {
        Ok(self.state.lock().await.versions.get(&id).cloned())
    }

    async fn list_versions(&self, type_id: TypeId) -> Result<Vec<AssessmentVersion>, DomainError> {
        let mut versions: Vec<AssessmentVersion> = self
            .state
            .lock()
            .await
            .versions
            .values()
            .filter(|v| v.type_id() == type_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(versions)
    }

    async fn find_published(
        &self,
        type_id: TypeId,
    ) -> Result<Option<AssessmentVersion>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .versions
            .values()
            .find(|v| v.type_id() == type_id && v.is_published())
            .cloned())
    }

    async fn load_tree(&self, version_id: VersionId) -> Result<Option<VersionTree>, DomainError> {
        Ok(self.state.lock().await.tree(version_id))
    }

    async fn publish_version(
        &self,
        id: VersionId,
        now: Timestamp,
    ) -> Result<AssessmentVersion, DomainError> {
        let mut state = self.state.lock().await;
        let mut target = state
            .versions
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(ErrorCode::VersionNotFound, "Version", id))?;
        let mut current = state
            .versions
            .values()
            .find(|v| v.type_id() == target.type_id() && v.is_published() && v.id() != id)
            .cloned();

        publish_replacing(&mut target, current.as_mut(), now)?;

        if let Some(archived) = current {
            state.versions.insert(archived.id(), archived);
        }
        state.versions.insert(id, target.clone());
        Ok(target)
    }

    async fn update_version_notes(
        &self,
        id: VersionId,
        notes: Option<String>,
    ) -> Result<AssessmentVersion, DomainError> {
        let mut state = self.state.lock().await;
        let mut version = state.editable_version(id)?.clone();
        version.set_notes(notes)?;
        state.versions.insert(id, version.clone());
        Ok(version)
    }

    async fn delete_draft(&self, id: VersionId) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.editable_version(id)?;
        if state.bindings.values().any(|b| b.version_id() == id) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Version is referenced by a project and cannot be deleted",
            )
            .with_detail("version_id", id.to_string()));
        }
        let domain_ids = state.ordered_domain_ids(id);
        state
            .questions
            .retain(|_, q| !domain_ids.contains(&q.domain_id));
        state.domains.retain(|_, d| d.version_id != id);
        state.versions.remove(&id);
        Ok(())
    }

    async fn add_domain(
        &self,
        version_id: VersionId,
        fields: &DomainFields,
    ) -> Result<Domain, DomainError> {
        let mut state = self.state.lock().await;
        state.editable_version(version_id)?;
        let position = state
            .domains
            .values()
            .filter(|d| d.version_id == version_id)
            .map(|d| d.position)
            .max()
            .unwrap_or(0)
            + 1;
        let id = DomainId::new(state.next_id());
        let domain = Domain {
            id,
            version_id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            position,
            active: fields.active,
        };
        state.domains.insert(id, domain.clone());
        Ok(domain)
    }

    async fn update_domain(
        &self,
        id: DomainId,
        fields: &DomainFields,
    ) -> Result<Domain, DomainError> {
        let mut state = self.state.lock().await;
        let mut domain = state.editable_domain(id)?.clone();
        domain.name = fields.name.clone();
        domain.description = fields.description.clone();
        domain.active = fields.active;
        state.domains.insert(id, domain.clone());
        Ok(domain)
    }

    async fn delete_domain(&self, id: DomainId) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.editable_domain(id)?;
        state.questions.retain(|_, q| q.domain_id != id);
        state.domains.remove(&id);
        Ok(())
    }

    async fn reorder_domains(
        &self,
        version_id: VersionId,
        order: &[DomainId],
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.editable_version(version_id)?;
        let current = state.ordered_domain_ids(version_id);
        for (id, position) in plan_reorder(&current, order)? {
            if let Some(domain) = state.domains.get_mut(&id) {
                domain.position = position;
            }
        }
        Ok(())
    }

    async fn add_question(
        &self,
        domain_id: DomainId,
        fields: &QuestionFields,
    ) -> Result<Question, DomainError> {
        let mut state = self.state.lock().await;
        state.editable_domain(domain_id)?;
        let position = state
            .questions
            .values()
            .filter(|q| q.domain_id == domain_id)
            .map(|q| q.position)
            .max()
            .unwrap_or(0)
            + 1;
        let id = QuestionId::new(state.next_id());
        let question = question_from(id, domain_id, fields, position);
        state.questions.insert(id, question.clone());
        Ok(question)
    }

    async fn update_question(
        &self,
        id: QuestionId,
        fields: &QuestionFields,
    ) -> Result<Question, DomainError> {
        let mut state = self.state.lock().await;
        let current = state.editable_question(id)?.clone();
        let question = question_from(id, current.domain_id, fields, current.position);
        state.questions.insert(id, question.clone());
        Ok(question)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.editable_question(id)?;
        state.questions.remove(&id);
        Ok(())
    }

    async fn reorder_questions(
        &self,
        domain_id: DomainId,
        order: &[QuestionId],
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.editable_domain(domain_id)?;
        let current = state.ordered_question_ids(domain_id);
        for (id, position) in plan_reorder(&current, order)? {
            if let Some(question) = state.questions.get_mut(&id) {
                question.position = position;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorKind;

    async fn seeded() -> (InMemoryStore, AssessmentType, AssessmentVersion) {
        let store = InMemoryStore::new();
        let (t, v) = store
            .create_type(
                &TypeDraft::new("Cyber", None).unwrap(),
                &VersionDraft::initial(None),
                &VersionBlueprint::empty(),
                Timestamp::now(),
            )
            .await
            .unwrap();
        (store, t, v)
    }

    fn fields(name: &str) -> DomainFields {
        DomainFields::new(name, None, true).unwrap()
    }

    #[tokio::test]
    async fn type_names_are_unique_case_insensitively() {
        let (store, _, _) = seeded().await;
        let err = store
            .create_type(
                &TypeDraft::new("cyber", None).unwrap(),
                &VersionDraft::initial(None),
                &VersionBlueprint::empty(),
                Timestamp::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeNameTaken);
    }

    #[tokio::test]
    async fn domains_append_at_the_end_and_reorder() {
        let (store, _, v) = seeded().await;
        let a = store.add_domain(v.id(), &fields("A")).await.unwrap();
        let b = store.add_domain(v.id(), &fields("B")).await.unwrap();
        assert_eq!((a.position, b.position), (1, 2));

        store.reorder_domains(v.id(), &[b.id, a.id]).await.unwrap();
        let tree = store.load_tree(v.id()).await.unwrap().unwrap();
        let names: Vec<&str> = tree.domains.iter().map(|d| d.domain.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn published_versions_reject_structure_edits() {
        let (store, _, v) = seeded().await;
        let domain = store.add_domain(v.id(), &fields("A")).await.unwrap();
        store.publish_version(v.id(), Timestamp::now()).await.unwrap();

        let err = store.add_domain(v.id(), &fields("B")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEditable);
        let err = store.delete_domain(domain.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEditable);
    }

    #[tokio::test]
    async fn duplicate_label_is_rejected() {
        let (store, t, _) = seeded().await;
        let err = store
            .create_version(
                t.id,
                &VersionDraft::new("1.0", None, None).unwrap(),
                &VersionBlueprint::empty(),
                Timestamp::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::VersionLabelTaken);
    }

    #[tokio::test]
    async fn deleting_a_draft_removes_its_tree() {
        let (store, t, _) = seeded().await;
        let draft = store
            .create_version(
                t.id,
                &VersionDraft::new("2.0", None, None).unwrap(),
                &VersionBlueprint::empty(),
                Timestamp::now(),
            )
            .await
            .unwrap();
        let domain = store.add_domain(draft.id(), &fields("A")).await.unwrap();

        store.delete_draft(draft.id()).await.unwrap();

        assert!(store.find_version(draft.id()).await.unwrap().is_none());
        let err = store.update_domain(domain.id, &fields("B")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DomainNotFound);
    }
}
