//! PostgreSQL implementation of IntakeSessionStore.

use async_trait::async_trait;
use sqlx::postgres::PgRow;

use super::{col, corrupt, db, ts, PostgresStore};
use crate::domain::foundation::{DomainError, DomainId, PublicAssessmentId, TypeId};
use crate::domain::public::{IntakeSession, SessionHandle};
use crate::ports::IntakeSessionStore;

fn row_to_session(row: &PgRow) -> Result<IntakeSession, DomainError> {
    let domain_ids: Vec<i64> = col(row, "domain_ids")?;
    let current_index: i32 = col(row, "current_index")?;
    Ok(IntakeSession {
        handle: SessionHandle::from_uuid(col(row, "handle")?),
        type_id: TypeId::new(col(row, "type_id")?),
        public_assessment_id: PublicAssessmentId::new(col(row, "public_assessment_id")?),
        domain_ids: domain_ids.into_iter().map(DomainId::new).collect(),
        current_index: usize::try_from(current_index)
            .map_err(|e| corrupt("current_index", e))?,
        created_at: ts(row, "created_at")?,
    })
}

#[async_trait]
impl IntakeSessionStore for PostgresStore {
    async fn save(&self, session: &IntakeSession) -> Result<(), DomainError> {
        let domain_ids: Vec<i64> = session.domain_ids.iter().map(|d| d.value()).collect();
        let current_index =
            i32::try_from(session.current_index).map_err(|e| corrupt("current_index", e))?;

        sqlx::query(
            r#"
            INSERT INTO intake_sessions (
                handle, type_id, public_assessment_id, domain_ids, current_index, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (handle) DO UPDATE SET
                domain_ids = EXCLUDED.domain_ids,
                current_index = EXCLUDED.current_index
            "#,
        )
        .bind(session.handle.as_uuid())
        .bind(session.type_id.value())
        .bind(session.public_assessment_id.value())
        .bind(&domain_ids)
        .bind(current_index)
        .bind(session.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db("save intake session"))?;
        Ok(())
    }

    async fn find(&self, handle: &SessionHandle) -> Result<Option<IntakeSession>, DomainError> {
        sqlx::query(
            r#"
            SELECT handle, type_id, public_assessment_id, domain_ids, current_index, created_at
            FROM intake_sessions
            WHERE handle = $1
            "#,
        )
        .bind(handle.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db("fetch intake session"))?
        .as_ref()
        .map(row_to_session)
        .transpose()
    }
}
