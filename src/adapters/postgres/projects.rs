//! PostgreSQL implementation of ProjectRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgConnection;

use super::{
    binding_progress, col, corrupt, db, fetch_version, opt_ts, row_to_binding, ts, PostgresStore,
};
use crate::domain::client::Respondent;
use crate::domain::foundation::{
    ClientId, DomainError, EmailAddress, ErrorCode, ProjectAssessmentId, ProjectId, RespondentId,
    Timestamp,
};
use crate::domain::project::{Membership, Progress, Project, ProjectAssessment, ProjectDraft};
use crate::ports::{ClientRepository, ProjectRepository};

const PROJECT_COLUMNS: &str = "id, client_id, name, description, evaluator_name, \
                               evaluator_email, report_text, active, created_at, \
                               finalized_at, released_at";

fn project_not_found(id: ProjectId) -> DomainError {
    DomainError::not_found(ErrorCode::ProjectNotFound, "Project", id)
}

fn binding_not_found(id: ProjectAssessmentId) -> DomainError {
    DomainError::not_found(ErrorCode::ProjectAssessmentNotFound, "Project assessment", id)
}

fn row_to_project(row: &PgRow) -> Result<Project, DomainError> {
    let evaluator_email = col::<Option<String>>(row, "evaluator_email")?
        .map(|raw| EmailAddress::parse(&raw).map_err(|e| corrupt("evaluator_email", e)))
        .transpose()?;
    Ok(Project::reconstitute(
        ProjectId::new(col(row, "id")?),
        ClientId::new(col(row, "client_id")?),
        col(row, "name")?,
        col(row, "description")?,
        col(row, "evaluator_name")?,
        evaluator_email,
        col(row, "report_text")?,
        col(row, "active")?,
        ts(row, "created_at")?,
        opt_ts(row, "finalized_at")?,
        opt_ts(row, "released_at")?,
    ))
}

fn row_to_membership(row: &PgRow) -> Result<Membership, DomainError> {
    Ok(Membership {
        project_id: ProjectId::new(col(row, "project_id")?),
        respondent_id: RespondentId::new(col(row, "respondent_id")?),
        active: col(row, "active")?,
        added_at: ts(row, "added_at")?,
    })
}

pub(super) async fn fetch_project(
    conn: &mut PgConnection,
    id: ProjectId,
    lock: bool,
) -> Result<Option<Project>, DomainError> {
    let sql = format!(
        "SELECT {} FROM projects WHERE id = $1{}",
        PROJECT_COLUMNS,
        if lock { " FOR UPDATE" } else { "" }
    );
    sqlx::query(&sql)
        .bind(id.value())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db("fetch project"))?
        .as_ref()
        .map(row_to_project)
        .transpose()
}

pub(super) async fn fetch_binding(
    conn: &mut PgConnection,
    id: ProjectAssessmentId,
    lock: bool,
) -> Result<Option<ProjectAssessment>, DomainError> {
    let sql = format!(
        "SELECT id, project_id, version_id, finalized_at FROM project_assessments WHERE id = $1{}",
        if lock { " FOR UPDATE" } else { "" }
    );
    sqlx::query(&sql)
        .bind(id.value())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db("fetch project assessment"))?
        .as_ref()
        .map(row_to_binding)
        .transpose()
}

async fn project_bindings(
    conn: &mut PgConnection,
    project_id: ProjectId,
) -> Result<Vec<ProjectAssessment>, DomainError> {
    sqlx::query(
        r#"
        SELECT id, project_id, version_id, finalized_at
        FROM project_assessments
        WHERE project_id = $1
        ORDER BY id
        "#,
    )
    .bind(project_id.value())
    .fetch_all(&mut *conn)
    .await
    .map_err(db("fetch project assessments"))?
    .iter()
    .map(row_to_binding)
    .collect()
}

async fn write_project(conn: &mut PgConnection, project: &Project) -> Result<u64, DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE projects SET
            name = $2,
            description = $3,
            evaluator_name = $4,
            evaluator_email = $5,
            report_text = $6,
            active = $7,
            finalized_at = $8,
            released_at = $9
        WHERE id = $1
        "#,
    )
    .bind(project.id().value())
    .bind(project.name())
    .bind(project.description())
    .bind(project.evaluator_name())
    .bind(project.evaluator_email().map(|e| e.as_str()))
    .bind(project.report_text())
    .bind(project.is_active())
    .bind(project.finalized_at().map(|t| *t.as_datetime()))
    .bind(project.released_at().map(|t| *t.as_datetime()))
    .execute(&mut *conn)
    .await
    .map_err(db("update project"))?;
    Ok(result.rows_affected())
}

#[async_trait]
impl ProjectRepository for PostgresStore {
    async fn create(
        &self,
        draft: &ProjectDraft,
        now: Timestamp,
    ) -> Result<(Project, Vec<ProjectAssessment>), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let client: Option<(i64,)> = sqlx::query_as("SELECT id FROM clients WHERE id = $1")
            .bind(draft.client_id.value())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db("fetch client"))?;
        if client.is_none() {
            return Err(DomainError::not_found(
                ErrorCode::ClientNotFound,
                "Client",
                draft.client_id,
            ));
        }

        // Lock the versions so none is archived or deleted mid-creation.
        let mut versions = Vec::with_capacity(draft.version_ids.len());
        for version_id in &draft.version_ids {
            if let Some(version) = fetch_version(&mut tx, *version_id, true).await? {
                versions.push(version);
            }
        }
        draft.validate_versions(&versions)?;

        let (project_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO projects (
                client_id, name, description, evaluator_name, evaluator_email, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(draft.client_id.value())
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.evaluator_name)
        .bind(draft.evaluator_email.as_ref().map(|e| e.as_str()))
        .bind(now.as_datetime())
        .fetch_one(&mut *tx)
        .await
        .map_err(db("insert project"))?;
        let project = Project::new(ProjectId::new(project_id), draft, now);

        let mut bindings = Vec::with_capacity(draft.version_ids.len());
        for version_id in &draft.version_ids {
            let (binding_id,): (i64,) = sqlx::query_as(
                r#"
                INSERT INTO project_assessments (project_id, version_id)
                VALUES ($1, $2)
                RETURNING id
                "#,
            )
            .bind(project_id)
            .bind(version_id.value())
            .fetch_one(&mut *tx)
            .await
            .map_err(db("insert project assessment"))?;
            bindings.push(ProjectAssessment::new(
                ProjectAssessmentId::new(binding_id),
                project.id(),
                *version_id,
            ));
        }

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok((project, bindings))
    }

    async fn find(&self, id: ProjectId) -> Result<Option<Project>, DomainError> {
        let mut conn = self.connection().await?;
        fetch_project(&mut conn, id, false).await
    }

    async fn list(&self, client_id: Option<ClientId>) -> Result<Vec<Project>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM projects WHERE ($1::BIGINT IS NULL OR client_id = $1) \
             ORDER BY created_at DESC, id DESC",
            PROJECT_COLUMNS
        ))
        .bind(client_id.map(|c| c.value()))
        .fetch_all(&self.pool)
        .await
        .map_err(db("list projects"))?
        .iter()
        .map(row_to_project)
        .collect()
    }

    async fn list_for_respondent(
        &self,
        respondent_id: RespondentId,
    ) -> Result<Vec<Project>, DomainError> {
        sqlx::query(
            r#"
            SELECT p.id, p.client_id, p.name, p.description, p.evaluator_name,
                   p.evaluator_email, p.report_text, p.active, p.created_at,
                   p.finalized_at, p.released_at
            FROM projects p
            JOIN project_members m ON m.project_id = p.id
            WHERE m.respondent_id = $1 AND m.active
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(respondent_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(db("list respondent projects"))?
        .iter()
        .map(row_to_project)
        .collect()
    }

    async fn update(&self, project: &Project) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;
        if write_project(&mut conn, project).await? == 0 {
            return Err(project_not_found(project.id()));
        }
        Ok(())
    }

    async fn bindings(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectAssessment>, DomainError> {
        let mut conn = self.connection().await?;
        project_bindings(&mut conn, project_id).await
    }

    async fn find_binding(
        &self,
        id: ProjectAssessmentId,
    ) -> Result<Option<ProjectAssessment>, DomainError> {
        let mut conn = self.connection().await?;
        fetch_binding(&mut conn, id, false).await
    }

    async fn add_member(
        &self,
        project_id: ProjectId,
        respondent_id: RespondentId,
        now: Timestamp,
    ) -> Result<Membership, DomainError> {
        let mut conn = self.connection().await?;
        let project = fetch_project(&mut conn, project_id, false)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;
        let respondent: Respondent = self
            .find_respondent(respondent_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(ErrorCode::RespondentNotFound, "Respondent", respondent_id)
            })?;
        respondent.ensure_belongs_to(project.client_id())?;

        // Re-adding a removed member reactivates the original row.
        let row = sqlx::query(
            r#"
            INSERT INTO project_members (project_id, respondent_id, active, added_at)
            VALUES ($1, $2, TRUE, $3)
            ON CONFLICT (project_id, respondent_id) DO UPDATE SET active = TRUE
            RETURNING project_id, respondent_id, active, added_at
            "#,
        )
        .bind(project_id.value())
        .bind(respondent_id.value())
        .bind(now.as_datetime())
        .fetch_one(&mut *conn)
        .await
        .map_err(db("add member"))?;
        row_to_membership(&row)
    }

    async fn remove_member(
        &self,
        project_id: ProjectId,
        respondent_id: RespondentId,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE project_members SET active = FALSE WHERE project_id = $1 AND respondent_id = $2",
        )
        .bind(project_id.value())
        .bind(respondent_id.value())
        .execute(&self.pool)
        .await
        .map_err(db("remove member"))?;
        if result.rows_affected() == 0 {
            return Err(
                DomainError::not_found(ErrorCode::RespondentNotFound, "Member", respondent_id)
                    .with_detail("project_id", project_id.to_string()),
            );
        }
        Ok(())
    }

    async fn members(&self, project_id: ProjectId) -> Result<Vec<Membership>, DomainError> {
        sqlx::query(
            r#"
            SELECT project_id, respondent_id, active, added_at
            FROM project_members
            WHERE project_id = $1
            ORDER BY added_at, respondent_id
            "#,
        )
        .bind(project_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(db("list members"))?
        .iter()
        .map(row_to_membership)
        .collect()
    }

    async fn progress(&self, binding_id: ProjectAssessmentId) -> Result<Progress, DomainError> {
        let mut conn = self.connection().await?;
        let binding = fetch_binding(&mut conn, binding_id, false)
            .await?
            .ok_or_else(|| binding_not_found(binding_id))?;
        binding_progress(&mut conn, &binding, None).await
    }

    async fn respondent_progress(
        &self,
        binding_id: ProjectAssessmentId,
        respondent_id: RespondentId,
    ) -> Result<Progress, DomainError> {
        let mut conn = self.connection().await?;
        let binding = fetch_binding(&mut conn, binding_id, false)
            .await?
            .ok_or_else(|| binding_not_found(binding_id))?;
        binding_progress(&mut conn, &binding, Some(respondent_id)).await
    }

    async fn finalize_binding(
        &self,
        binding_id: ProjectAssessmentId,
        now: Timestamp,
    ) -> Result<ProjectAssessment, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let mut binding = fetch_binding(&mut tx, binding_id, true)
            .await?
            .ok_or_else(|| binding_not_found(binding_id))?;
        let mut project = fetch_project(&mut tx, binding.project_id(), true)
            .await?
            .ok_or_else(|| project_not_found(binding.project_id()))?;
        project.ensure_active()?;

        let progress = binding_progress(&mut tx, &binding, None).await?;
        binding.finalize(progress, now)?;
        sqlx::query("UPDATE project_assessments SET finalized_at = $2 WHERE id = $1")
            .bind(binding_id.value())
            .bind(binding.finalized_at().map(|t| *t.as_datetime()))
            .execute(&mut *tx)
            .await
            .map_err(db("finalize project assessment"))?;

        let bindings = project_bindings(&mut tx, project.id()).await?;
        project.note_finalization(&bindings, now);
        write_project(&mut tx, &project).await?;

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(binding)
    }

    async fn release(
        &self,
        project_id: ProjectId,
        now: Timestamp,
    ) -> Result<(Project, bool), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let mut project = fetch_project(&mut tx, project_id, true)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;
        let bindings = project_bindings(&mut tx, project_id).await?;
        let changed = project.release(&bindings, now)?;
        if changed {
            write_project(&mut tx, &project).await?;
        }

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok((project, changed))
    }
}
