//! PostgreSQL adapters - database implementations of the repository ports.
//!
//! [`PostgresStore`] implements every repository port over one pool, one
//! file per port. Multi-row writes (publish, finalize, release, lead
//! materialization) run in a transaction and lock the rows they read with
//! `FOR UPDATE`.
//!
//! The schema lives in `migrations/`; [`PostgresStore::migrate`] applies it.

mod audit;
mod catalog;
mod clients;
mod intake;
mod leads;
mod projects;
mod public;
mod responses;

pub use audit::PostgresAuditLog;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Postgres, Row};

use crate::config::DatabaseConfig;
use crate::domain::catalog::{AssessmentVersion, Domain, Question, VersionStatus, VersionTree};
use crate::domain::foundation::{
    DomainError, DomainId, ErrorCode, ProjectAssessmentId, ProjectId, QuestionId, RespondentId,
    Timestamp, TypeId, VersionId,
};
use crate::domain::project::{Progress, ProjectAssessment};

/// PostgreSQL-backed implementation of the repository ports.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool sized by `config`.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .connect(url)
            .await
            .map_err(db("connect to database"))?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::database("run migrations", e))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn connection(&self) -> Result<sqlx::pool::PoolConnection<Postgres>, DomainError> {
        self.pool.acquire().await.map_err(db("acquire connection"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error and column helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Maps a driver error onto a transient domain error.
fn db(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::database(context, e)
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error.as_database_error().and_then(|e| e.code()).as_deref(),
        Some("23505")
    )
}

/// Reads one column, mapping a decode failure onto a database error.
fn col<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(&format!("get {}", name), e))
}

fn ts(row: &PgRow, name: &str) -> Result<Timestamp, DomainError> {
    col::<DateTime<Utc>>(row, name).map(Timestamp::from_datetime)
}

fn opt_ts(row: &PgRow, name: &str) -> Result<Option<Timestamp>, DomainError> {
    Ok(col::<Option<DateTime<Utc>>>(row, name)?.map(Timestamp::from_datetime))
}

/// Wraps a stored value that no longer parses as a domain value.
fn corrupt(column: &str, cause: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid value in column {}: {}", column, cause),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared loaders
// ─────────────────────────────────────────────────────────────────────────────

const VERSION_COLUMNS: &str = "id, type_id, label, status, notes, author, \
                               created_at, published_at, archived_at";

fn row_to_version(row: &PgRow) -> Result<AssessmentVersion, DomainError> {
    let status: String = col(row, "status")?;
    Ok(AssessmentVersion::reconstitute(
        VersionId::new(col(row, "id")?),
        TypeId::new(col(row, "type_id")?),
        col(row, "label")?,
        status
            .parse::<VersionStatus>()
            .map_err(|e| corrupt("status", e))?,
        col(row, "notes")?,
        col(row, "author")?,
        ts(row, "created_at")?,
        opt_ts(row, "published_at")?,
        opt_ts(row, "archived_at")?,
    ))
}

fn row_to_domain(row: &PgRow) -> Result<Domain, DomainError> {
    Ok(Domain {
        id: DomainId::new(col(row, "id")?),
        version_id: VersionId::new(col(row, "version_id")?),
        name: col(row, "name")?,
        description: col(row, "description")?,
        position: col(row, "position")?,
        active: col(row, "active")?,
    })
}

fn row_to_question(row: &PgRow) -> Result<Question, DomainError> {
    Ok(Question {
        id: QuestionId::new(col(row, "id")?),
        domain_id: DomainId::new(col(row, "domain_id")?),
        text: col(row, "text")?,
        description: col(row, "description")?,
        reference: col(row, "reference")?,
        recommendation: col(row, "recommendation")?,
        light: col(row, "light")?,
        position: col(row, "position")?,
        active: col(row, "active")?,
    })
}

fn row_to_binding(row: &PgRow) -> Result<ProjectAssessment, DomainError> {
    Ok(ProjectAssessment::reconstitute(
        ProjectAssessmentId::new(col(row, "id")?),
        ProjectId::new(col(row, "project_id")?),
        VersionId::new(col(row, "version_id")?),
        opt_ts(row, "finalized_at")?,
    ))
}

async fn fetch_version(
    conn: &mut PgConnection,
    id: VersionId,
    lock: bool,
) -> Result<Option<AssessmentVersion>, DomainError> {
    let sql = format!(
        "SELECT {} FROM assessment_versions WHERE id = $1{}",
        VERSION_COLUMNS,
        if lock { " FOR UPDATE" } else { "" }
    );
    sqlx::query(&sql)
        .bind(id.value())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db("fetch version"))?
        .as_ref()
        .map(row_to_version)
        .transpose()
}

/// Loads a version with its domains and questions.
async fn load_tree(
    conn: &mut PgConnection,
    version_id: VersionId,
) -> Result<Option<VersionTree>, DomainError> {
    let Some(version) = fetch_version(conn, version_id, false).await? else {
        return Ok(None);
    };
    let domains = sqlx::query(
        r#"
        SELECT id, version_id, name, description, position, active
        FROM domains
        WHERE version_id = $1
        "#,
    )
    .bind(version_id.value())
    .fetch_all(&mut *conn)
    .await
    .map_err(db("fetch domains"))?
    .iter()
    .map(row_to_domain)
    .collect::<Result<Vec<_>, _>>()?;

    let questions = sqlx::query(
        r#"
        SELECT q.id, q.domain_id, q.text, q.description, q.reference,
               q.recommendation, q.light, q.position, q.active
        FROM questions q
        JOIN domains d ON d.id = q.domain_id
        WHERE d.version_id = $1
        "#,
    )
    .bind(version_id.value())
    .fetch_all(&mut *conn)
    .await
    .map_err(db("fetch questions"))?
    .iter()
    .map(row_to_question)
    .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(VersionTree::assemble(version, domains, questions)))
}

/// Progress of a binding, optionally counting one author's answers only.
///
/// Only answers to active questions of active domains count.
async fn binding_progress(
    conn: &mut PgConnection,
    binding: &ProjectAssessment,
    author: Option<RespondentId>,
) -> Result<Progress, DomainError> {
    let Some(tree) = load_tree(conn, binding.version_id()).await? else {
        return Ok(Progress::new(0, 0));
    };
    let active: Vec<i64> = tree.active_questions().map(|q| q.id.value()).collect();
    if active.is_empty() {
        return Ok(Progress::new(0, 0));
    }
    let (answered,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM project_responses
        WHERE project_id = $1
          AND question_id = ANY($2)
          AND ($3::BIGINT IS NULL OR respondent_id = $3)
        "#,
    )
    .bind(binding.project_id().value())
    .bind(&active)
    .bind(author.map(|a| a.value()))
    .fetch_one(&mut *conn)
    .await
    .map_err(db("count answers"))?;
    Ok(Progress::new(answered as usize, active.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_needs_a_database_error() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn corrupt_values_are_transient_database_errors() {
        let err = corrupt("status", "bogus");
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("status"));
    }
}
