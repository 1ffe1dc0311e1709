//! PostgreSQL implementation of ResponseRepository.
//!
//! Project answers are written under a lock on the binding row, so the
//! last-write-wins comparison and the write itself cannot interleave with
//! finalization.

use async_trait::async_trait;
use sqlx::postgres::PgRow;

use super::projects::{fetch_binding, fetch_project};
use super::{col, corrupt, db, load_tree, ts, PostgresStore};
use crate::domain::foundation::{
    DomainError, ErrorCode, ProjectAssessmentId, ProjectId, PublicAssessmentId, QuestionId,
    RespondentId,
};
use crate::domain::response::{
    apply_write, ProjectResponse, ProjectScore, PublicAnswer, PublicResponse, ResponseWrite,
    WriteOutcome,
};
use crate::ports::ResponseRepository;

fn row_to_project_response(row: &PgRow) -> Result<ProjectResponse, DomainError> {
    let score: i16 = col(row, "score")?;
    Ok(ProjectResponse {
        project_id: ProjectId::new(col(row, "project_id")?),
        question_id: QuestionId::new(col(row, "question_id")?),
        respondent_id: RespondentId::new(col(row, "respondent_id")?),
        score: ProjectScore::new(i32::from(score)).map_err(|e| corrupt("score", e))?,
        comment: col(row, "comment")?,
        answered_at: ts(row, "answered_at")?,
    })
}

fn row_to_public_response(row: &PgRow) -> Result<PublicResponse, DomainError> {
    let value: i16 = col(row, "value")?;
    Ok(PublicResponse {
        public_assessment_id: PublicAssessmentId::new(col(row, "public_assessment_id")?),
        question_id: QuestionId::new(col(row, "question_id")?),
        value: PublicAnswer::from_value(i32::from(value)).map_err(|e| corrupt("value", e))?,
        answered_at: ts(row, "answered_at")?,
    })
}

#[async_trait]
impl ResponseRepository for PostgresStore {
    async fn upsert_project_response(
        &self,
        binding_id: ProjectAssessmentId,
        write: &ResponseWrite,
    ) -> Result<WriteOutcome, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let binding = fetch_binding(&mut tx, binding_id, true)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(
                    ErrorCode::ProjectAssessmentNotFound,
                    "Project assessment",
                    binding_id,
                )
            })?;
        if binding.project_id() != write.project_id {
            return Err(DomainError::validation(
                "project_assessment_id",
                "Assessment does not belong to this project",
            ));
        }
        let project = fetch_project(&mut tx, write.project_id, false)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(ErrorCode::ProjectNotFound, "Project", write.project_id)
            })?;
        project.ensure_active()?;
        binding.ensure_open()?;

        let reachable = load_tree(&mut tx, binding.version_id())
            .await?
            .is_some_and(|tree| tree.contains_active_question(write.question_id));
        if !reachable {
            return Err(DomainError::validation(
                "question_id",
                format!(
                    "Question {} is not part of this assessment",
                    write.question_id
                ),
            ));
        }

        let current = sqlx::query(
            r#"
            SELECT project_id, question_id, respondent_id, score, comment, answered_at
            FROM project_responses
            WHERE project_id = $1 AND question_id = $2
            FOR UPDATE
            "#,
        )
        .bind(write.project_id.value())
        .bind(write.question_id.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db("fetch response"))?
        .as_ref()
        .map(row_to_project_response)
        .transpose()?;

        let outcome = apply_write(current.as_ref(), write);
        match &outcome {
            WriteOutcome::Stored(row) => {
                sqlx::query(
                    r#"
                    INSERT INTO project_responses (
                        project_id, question_id, respondent_id, score, comment, answered_at
                    ) VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (project_id, question_id) DO UPDATE SET
                        respondent_id = EXCLUDED.respondent_id,
                        score = EXCLUDED.score,
                        comment = EXCLUDED.comment,
                        answered_at = EXCLUDED.answered_at
                    "#,
                )
                .bind(row.project_id.value())
                .bind(row.question_id.value())
                .bind(row.respondent_id.value())
                .bind(i16::from(row.score.value()))
                .bind(&row.comment)
                .bind(row.answered_at.as_datetime())
                .execute(&mut *tx)
                .await
                .map_err(db("store response"))?;
            }
            WriteOutcome::Deleted => {
                sqlx::query(
                    "DELETE FROM project_responses WHERE project_id = $1 AND question_id = $2",
                )
                .bind(write.project_id.value())
                .bind(write.question_id.value())
                .execute(&mut *tx)
                .await
                .map_err(db("delete response"))?;
            }
            WriteOutcome::Unchanged | WriteOutcome::Superseded(_) => {}
        }

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(outcome)
    }

    async fn list_project_responses(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectResponse>, DomainError> {
        sqlx::query(
            r#"
            SELECT project_id, question_id, respondent_id, score, comment, answered_at
            FROM project_responses
            WHERE project_id = $1
            ORDER BY question_id
            "#,
        )
        .bind(project_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(db("list responses"))?
        .iter()
        .map(row_to_project_response)
        .collect()
    }

    async fn upsert_public_responses(
        &self,
        public_assessment_id: PublicAssessmentId,
        responses: &[PublicResponse],
    ) -> Result<(), DomainError> {
        if responses
            .iter()
            .any(|r| r.public_assessment_id != public_assessment_id)
        {
            return Err(DomainError::validation(
                "public_assessment_id",
                "Responses belong to another assessment",
            ));
        }

        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let completed: Option<(Option<chrono::DateTime<chrono::Utc>>,)> = sqlx::query_as(
            "SELECT completed_at FROM public_assessments WHERE id = $1 FOR UPDATE",
        )
        .bind(public_assessment_id.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db("fetch public assessment"))?;
        match completed {
            None => {
                return Err(DomainError::not_found(
                    ErrorCode::PublicAssessmentNotFound,
                    "Public assessment",
                    public_assessment_id,
                ))
            }
            Some((Some(_),)) => {
                return Err(DomainError::new(
                    ErrorCode::AssessmentCompleted,
                    "This assessment has already been completed",
                )
                .with_detail("public_assessment_id", public_assessment_id.to_string()))
            }
            Some((None,)) => {}
        }

        for response in responses {
            sqlx::query(
                r#"
                INSERT INTO public_responses (public_assessment_id, question_id, value, answered_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (public_assessment_id, question_id) DO UPDATE SET
                    value = EXCLUDED.value,
                    answered_at = EXCLUDED.answered_at
                "#,
            )
            .bind(public_assessment_id.value())
            .bind(response.question_id.value())
            .bind(i16::from(response.value.value()))
            .bind(response.answered_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db("store public response"))?;
        }

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(())
    }

    async fn list_public_responses(
        &self,
        public_assessment_id: PublicAssessmentId,
    ) -> Result<Vec<PublicResponse>, DomainError> {
        sqlx::query(
            r#"
            SELECT public_assessment_id, question_id, value, answered_at
            FROM public_responses
            WHERE public_assessment_id = $1
            ORDER BY question_id
            "#,
        )
        .bind(public_assessment_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(db("list public responses"))?
        .iter()
        .map(row_to_public_response)
        .collect()
    }
}
