//! PostgreSQL implementation of CatalogRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgConnection;

use super::{
    col, db, fetch_version, is_unique_violation, load_tree, row_to_domain, row_to_question,
    row_to_version, ts, PostgresStore, VERSION_COLUMNS,
};
use crate::domain::catalog::{
    ensure_unique_type_name, plan_reorder, publish_replacing, AssessmentType, AssessmentVersion,
    Domain, DomainFields, Question, QuestionFields, TypeDraft, VersionBlueprint, VersionDraft,
    VersionTree,
};
use crate::domain::foundation::{
    DomainError, DomainId, ErrorCode, QuestionId, Timestamp, TypeId, VersionId,
};
use crate::ports::CatalogRepository;

const TYPE_COLUMNS: &str = "id, name, description, active, public_intake_enabled, \
                            notification_recipients, cta_text, created_at";

fn row_to_type(row: &PgRow) -> Result<AssessmentType, DomainError> {
    Ok(AssessmentType {
        id: TypeId::new(col(row, "id")?),
        name: col(row, "name")?,
        description: col(row, "description")?,
        active: col(row, "active")?,
        public_intake_enabled: col(row, "public_intake_enabled")?,
        notification_recipients: col(row, "notification_recipients")?,
        cta_text: col(row, "cta_text")?,
        created_at: ts(row, "created_at")?,
    })
}

fn label_taken(label: &str) -> DomainError {
    DomainError::new(
        ErrorCode::VersionLabelTaken,
        format!("Version '{}' already exists for this type", label),
    )
    .with_detail("field", "label")
}

fn name_taken(name: &str) -> DomainError {
    DomainError::new(
        ErrorCode::TypeNameTaken,
        format!("An assessment type named '{}' already exists", name),
    )
    .with_detail("field", "name")
}

/// Maps a publish failure; losing the one-published slot is a conflict.
fn publish_failed(id: VersionId) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        if is_unique_violation(&e) {
            DomainError::new(
                ErrorCode::Conflict,
                "Another version of this type was published concurrently",
            )
            .with_detail("version_id", id.to_string())
        } else {
            DomainError::database("publish version", e)
        }
    }
}

fn version_not_found(id: VersionId) -> DomainError {
    DomainError::not_found(ErrorCode::VersionNotFound, "Version", id)
}

async fn all_types(conn: &mut PgConnection) -> Result<Vec<AssessmentType>, DomainError> {
    sqlx::query(&format!("SELECT {} FROM assessment_types", TYPE_COLUMNS))
        .fetch_all(&mut *conn)
        .await
        .map_err(db("fetch assessment types"))?
        .iter()
        .map(row_to_type)
        .collect()
}

async fn insert_version(
    conn: &mut PgConnection,
    type_id: TypeId,
    draft: &VersionDraft,
    now: Timestamp,
) -> Result<AssessmentVersion, DomainError> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO assessment_versions (type_id, label, status, notes, author, created_at)
        VALUES ($1, $2, 'draft', $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(type_id.value())
    .bind(&draft.label)
    .bind(&draft.notes)
    .bind(&draft.author)
    .bind(now.as_datetime())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            label_taken(&draft.label)
        } else {
            DomainError::database("insert version", e)
        }
    })?;
    Ok(AssessmentVersion::new_draft(
        VersionId::new(id),
        type_id,
        draft.clone(),
        now,
    ))
}

async fn insert_blueprint(
    conn: &mut PgConnection,
    version_id: VersionId,
    blueprint: &VersionBlueprint,
) -> Result<(), DomainError> {
    for domain in &blueprint.domains {
        let (domain_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO domains (version_id, name, description, position, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(version_id.value())
        .bind(&domain.fields.name)
        .bind(&domain.fields.description)
        .bind(domain.position)
        .bind(domain.fields.active)
        .fetch_one(&mut *conn)
        .await
        .map_err(db("copy domain"))?;

        for (fields, position) in &domain.questions {
            insert_question(conn, DomainId::new(domain_id), fields, *position).await?;
        }
    }
    Ok(())
}

async fn insert_question(
    conn: &mut PgConnection,
    domain_id: DomainId,
    fields: &QuestionFields,
    position: i32,
) -> Result<Question, DomainError> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO questions (
            domain_id, text, description, reference, recommendation, light, position, active
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(domain_id.value())
    .bind(&fields.text)
    .bind(&fields.description)
    .bind(&fields.reference)
    .bind(&fields.recommendation)
    .bind(fields.light)
    .bind(position)
    .bind(fields.active)
    .fetch_one(&mut *conn)
    .await
    .map_err(db("insert question"))?;
    Ok(Question {
        id: QuestionId::new(id),
        domain_id,
        text: fields.text.clone(),
        description: fields.description.clone(),
        reference: fields.reference.clone(),
        recommendation: fields.recommendation.clone(),
        light: fields.light,
        position,
        active: fields.active,
    })
}

/// Locks the version and checks that it is still a draft.
async fn editable_version(
    conn: &mut PgConnection,
    id: VersionId,
) -> Result<AssessmentVersion, DomainError> {
    let version = fetch_version(conn, id, true)
        .await?
        .ok_or_else(|| version_not_found(id))?;
    version.ensure_editable()?;
    Ok(version)
}

async fn editable_domain(conn: &mut PgConnection, id: DomainId) -> Result<Domain, DomainError> {
    let domain = sqlx::query(
        "SELECT id, version_id, name, description, position, active FROM domains WHERE id = $1",
    )
    .bind(id.value())
    .fetch_optional(&mut *conn)
    .await
    .map_err(db("fetch domain"))?
    .as_ref()
    .map(row_to_domain)
    .transpose()?
    .ok_or_else(|| DomainError::not_found(ErrorCode::DomainNotFound, "Domain", id))?;
    editable_version(conn, domain.version_id).await?;
    Ok(domain)
}

async fn editable_question(
    conn: &mut PgConnection,
    id: QuestionId,
) -> Result<Question, DomainError> {
    let question = sqlx::query(
        r#"
        SELECT id, domain_id, text, description, reference, recommendation, light, position, active
        FROM questions
        WHERE id = $1
        "#,
    )
    .bind(id.value())
    .fetch_optional(&mut *conn)
    .await
    .map_err(db("fetch question"))?
    .as_ref()
    .map(row_to_question)
    .transpose()?
    .ok_or_else(|| DomainError::not_found(ErrorCode::QuestionNotFound, "Question", id))?;
    editable_domain(conn, question.domain_id).await?;
    Ok(question)
}

async fn set_positions(
    conn: &mut PgConnection,
    table: &'static str,
    positions: &[(i64, i32)],
) -> Result<(), DomainError> {
    let sql = format!("UPDATE {} SET position = $2 WHERE id = $1", table);
    for (id, position) in positions {
        sqlx::query(&sql)
            .bind(id)
            .bind(position)
            .execute(&mut *conn)
            .await
            .map_err(db("reorder"))?;
    }
    Ok(())
}

#[async_trait]
impl CatalogRepository for PostgresStore {
    async fn create_type(
        &self,
        draft: &TypeDraft,
        version: &VersionDraft,
        blueprint: &VersionBlueprint,
        now: Timestamp,
    ) -> Result<(AssessmentType, AssessmentVersion), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let existing = all_types(&mut tx).await?;
        ensure_unique_type_name(&existing, &draft.name, None)?;

        let (type_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO assessment_types (name, description, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(now.as_datetime())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                name_taken(&draft.name)
            } else {
                DomainError::database("insert assessment type", e)
            }
        })?;
        let type_id = TypeId::new(type_id);
        let first = insert_version(&mut tx, type_id, version, now).await?;
        insert_blueprint(&mut tx, first.id(), blueprint).await?;

        tx.commit().await.map_err(db("commit transaction"))?;

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
        Ok((assessment_type, first))
    }

    async fn update_type(&self, assessment_type: &AssessmentType) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;
        let existing = all_types(&mut conn).await?;
        ensure_unique_type_name(&existing, &assessment_type.name, Some(assessment_type.id))?;

        let result = sqlx::query(
            r#"
            UPDATE assessment_types SET
                name = $2,
                description = $3,
                active = $4,
                public_intake_enabled = $5,
                notification_recipients = $6,
                cta_text = $7
            WHERE id = $1
            "#,
        )
        .bind(assessment_type.id.value())
        .bind(&assessment_type.name)
        .bind(&assessment_type.description)
        .bind(assessment_type.active)
        .bind(assessment_type.public_intake_enabled)
        .bind(&assessment_type.notification_recipients)
        .bind(&assessment_type.cta_text)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                name_taken(&assessment_type.name)
            } else {
                DomainError::database("update assessment type", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(
                ErrorCode::TypeNotFound,
                "Assessment type",
                assessment_type.id,
            ));
        }
        Ok(())
    }

    async fn find_type(&self, id: TypeId) -> Result<Option<AssessmentType>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM assessment_types WHERE id = $1",
            TYPE_COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db("fetch assessment type"))?
        .as_ref()
        .map(row_to_type)
        .transpose()
    }

    async fn list_types(&self) -> Result<Vec<AssessmentType>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM assessment_types ORDER BY lower(name)",
            TYPE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db("list assessment types"))?
        .iter()
        .map(row_to_type)
        .collect()
    }

    async fn create_version(
        &self,
        type_id: TypeId,
        draft: &VersionDraft,
        blueprint: &VersionBlueprint,
        now: Timestamp,
    ) -> Result<AssessmentVersion, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let exists: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM assessment_types WHERE id = $1 FOR UPDATE")
                .bind(type_id.value())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db("fetch assessment type"))?;
        if exists.is_none() {
            return Err(DomainError::not_found(
                ErrorCode::TypeNotFound,
                "Assessment type",
                type_id,
            ));
        }

        let version = insert_version(&mut tx, type_id, draft, now).await?;
        insert_blueprint(&mut tx, version.id(), blueprint).await?;
        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(version)
    }

    async fn find_version(&self, id: VersionId) -> Result<Option<AssessmentVersion>, DomainError> {
        let mut conn = self.connection().await?;
        fetch_version(&mut conn, id, false).await
    }

    async fn list_versions(&self, type_id: TypeId) -> Result<Vec<AssessmentVersion>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM assessment_versions WHERE type_id = $1 \
             ORDER BY created_at DESC, id DESC",
            VERSION_COLUMNS
        ))
        .bind(type_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(db("list versions"))?
        .iter()
        .map(row_to_version)
        .collect()
    }

    async fn find_published(
        &self,
        type_id: TypeId,
    ) -> Result<Option<AssessmentVersion>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM assessment_versions WHERE type_id = $1 AND status = 'published'",
            VERSION_COLUMNS
        ))
        .bind(type_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db("fetch published version"))?
        .as_ref()
        .map(row_to_version)
        .transpose()
    }

    async fn load_tree(&self, version_id: VersionId) -> Result<Option<VersionTree>, DomainError> {
        let mut conn = self.connection().await?;
        load_tree(&mut conn, version_id).await
    }

    async fn publish_version(
        &self,
        id: VersionId,
        now: Timestamp,
    ) -> Result<AssessmentVersion, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let mut target = fetch_version(&mut tx, id, true)
            .await?
            .ok_or_else(|| version_not_found(id))?;
        // Publishes of one type queue on the type row.
        sqlx::query("SELECT id FROM assessment_types WHERE id = $1 FOR UPDATE")
            .bind(target.type_id().value())
            .execute(&mut *tx)
            .await
            .map_err(db("lock assessment type"))?;
        let mut current = sqlx::query(&format!(
            "SELECT {} FROM assessment_versions \
             WHERE type_id = $1 AND status = 'published' AND id <> $2 FOR UPDATE",
            VERSION_COLUMNS
        ))
        .bind(target.type_id().value())
        .bind(id.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db("fetch published version"))?
        .as_ref()
        .map(row_to_version)
        .transpose()?;

        publish_replacing(&mut target, current.as_mut(), now)?;

        // Archive first so the one-published index never sees two rows.
        if let Some(archived) = &current {
            sqlx::query(
                "UPDATE assessment_versions SET status = $2, archived_at = $3 WHERE id = $1",
            )
            .bind(archived.id().value())
            .bind(archived.status().as_str())
            .bind(archived.archived_at().map(|t| *t.as_datetime()))
            .execute(&mut *tx)
            .await
            .map_err(db("archive version"))?;
        }
        sqlx::query("UPDATE assessment_versions SET status = $2, published_at = $3 WHERE id = $1")
            .bind(id.value())
            .bind(target.status().as_str())
            .bind(target.published_at().map(|t| *t.as_datetime()))
            .execute(&mut *tx)
            .await
            .map_err(publish_failed(id))?;

        tx.commit().await.map_err(publish_failed(id))?;
        Ok(target)
    }

    async fn update_version_notes(
        &self,
        id: VersionId,
        notes: Option<String>,
    ) -> Result<AssessmentVersion, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        let mut version = editable_version(&mut tx, id).await?;
        version.set_notes(notes)?;
        sqlx::query("UPDATE assessment_versions SET notes = $2 WHERE id = $1")
            .bind(id.value())
            .bind(version.notes())
            .execute(&mut *tx)
            .await
            .map_err(db("update version notes"))?;
        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(version)
    }

    async fn delete_draft(&self, id: VersionId) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        editable_version(&mut tx, id).await?;

        let (bound,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM project_assessments WHERE version_id = $1")
                .bind(id.value())
                .fetch_one(&mut *tx)
                .await
                .map_err(db("count bindings"))?;
        if bound > 0 {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Version is referenced by a project and cannot be deleted",
            )
            .with_detail("version_id", id.to_string()));
        }

        // Domains and questions go with the version (ON DELETE CASCADE).
        sqlx::query("DELETE FROM assessment_versions WHERE id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(db("delete version"))?;
        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(())
    }

    async fn add_domain(
        &self,
        version_id: VersionId,
        fields: &DomainFields,
    ) -> Result<Domain, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        editable_version(&mut tx, version_id).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO domains (version_id, name, description, position, active)
            SELECT $1, $2, $3, COALESCE(MAX(position), 0) + 1, $4
            FROM domains WHERE version_id = $1
            RETURNING id, version_id, name, description, position, active
            "#,
        )
        .bind(version_id.value())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.active)
        .fetch_one(&mut *tx)
        .await
        .map_err(db("insert domain"))?;
        let domain = row_to_domain(&row)?;

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(domain)
    }

    async fn update_domain(
        &self,
        id: DomainId,
        fields: &DomainFields,
    ) -> Result<Domain, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        let mut domain = editable_domain(&mut tx, id).await?;
        domain.name = fields.name.clone();
        domain.description = fields.description.clone();
        domain.active = fields.active;

        sqlx::query("UPDATE domains SET name = $2, description = $3, active = $4 WHERE id = $1")
            .bind(id.value())
            .bind(&domain.name)
            .bind(&domain.description)
            .bind(domain.active)
            .execute(&mut *tx)
            .await
            .map_err(db("update domain"))?;
        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(domain)
    }

    async fn delete_domain(&self, id: DomainId) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        editable_domain(&mut tx, id).await?;
        sqlx::query("DELETE FROM domains WHERE id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(db("delete domain"))?;
        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(())
    }

    async fn reorder_domains(
        &self,
        version_id: VersionId,
        order: &[DomainId],
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        editable_version(&mut tx, version_id).await?;

        let current: Vec<DomainId> = sqlx::query_as::<_, (i64,)>(
            "SELECT id FROM domains WHERE version_id = $1 ORDER BY position, id",
        )
        .bind(version_id.value())
        .fetch_all(&mut *tx)
        .await
        .map_err(db("fetch domains"))?
        .into_iter()
        .map(|(id,)| DomainId::new(id))
        .collect();

        let positions: Vec<(i64, i32)> = plan_reorder(&current, order)?
            .into_iter()
            .map(|(id, position)| (id.value(), position))
            .collect();
        set_positions(&mut tx, "domains", &positions).await?;
        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(())
    }

    async fn add_question(
        &self,
        domain_id: DomainId,
        fields: &QuestionFields,
    ) -> Result<Question, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        editable_domain(&mut tx, domain_id).await?;

        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM questions WHERE domain_id = $1",
        )
        .bind(domain_id.value())
        .fetch_one(&mut *tx)
        .await
        .map_err(db("fetch question positions"))?;
        let question = insert_question(&mut tx, domain_id, fields, next).await?;

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(question)
    }

    async fn update_question(
        &self,
        id: QuestionId,
        fields: &QuestionFields,
    ) -> Result<Question, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        let current = editable_question(&mut tx, id).await?;

        sqlx::query(
            r#"
            UPDATE questions SET
                text = $2,
                description = $3,
                reference = $4,
                recommendation = $5,
                light = $6,
                active = $7
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .bind(&fields.text)
        .bind(&fields.description)
        .bind(&fields.reference)
        .bind(&fields.recommendation)
        .bind(fields.light)
        .bind(fields.active)
        .execute(&mut *tx)
        .await
        .map_err(db("update question"))?;
        tx.commit().await.map_err(db("commit transaction"))?;

        Ok(Question {
            id,
            domain_id: current.domain_id,
            text: fields.text.clone(),
            description: fields.description.clone(),
            reference: fields.reference.clone(),
            recommendation: fields.recommendation.clone(),
            light: fields.light,
            position: current.position,
            active: fields.active,
        })
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        editable_question(&mut tx, id).await?;
        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(db("delete question"))?;
        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(())
    }

    async fn reorder_questions(
        &self,
        domain_id: DomainId,
        order: &[QuestionId],
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;
        editable_domain(&mut tx, domain_id).await?;

        let current: Vec<QuestionId> = sqlx::query_as::<_, (i64,)>(
            "SELECT id FROM questions WHERE domain_id = $1 ORDER BY position, id",
        )
        .bind(domain_id.value())
        .fetch_all(&mut *tx)
        .await
        .map_err(db("fetch questions"))?
        .into_iter()
        .map(|(id,)| QuestionId::new(id))
        .collect();

        let positions: Vec<(i64, i32)> = plan_reorder(&current, order)?
            .into_iter()
            .map(|(id, position)| (id.value(), position))
            .collect();
        set_positions(&mut tx, "questions", &positions).await?;
        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(())
    }
}
