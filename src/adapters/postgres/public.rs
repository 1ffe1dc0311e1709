//! PostgreSQL implementation of PublicAssessmentRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;

use super::{col, corrupt, db, is_unique_violation, opt_ts, ts, PostgresStore};
use crate::domain::foundation::{
    DomainError, EmailAddress, ErrorCode, PublicAssessmentId, Timestamp, TypeId, VersionId,
};
use crate::domain::public::{
    ContactDetails, GroupSelector, GroupTag, PublicAssessment, PublicAssessmentDraft, ResultToken,
};
use crate::ports::PublicAssessmentRepository;

const COLUMNS: &str = "id, type_id, version_id, token, group_tag, contact_name, contact_email, \
                       contact_phone, contact_role, contact_company, source_ip, started_at, \
                       completed_at";

fn not_found(id: PublicAssessmentId) -> DomainError {
    DomainError::not_found(ErrorCode::PublicAssessmentNotFound, "Public assessment", id)
}

/// Reads the `contact_*` columns shared by public assessments and leads.
pub(super) fn row_to_contact(row: &PgRow) -> Result<ContactDetails, DomainError> {
    let email = col::<Option<String>>(row, "contact_email")?
        .map(|raw| EmailAddress::parse(&raw).map_err(|e| corrupt("contact_email", e)))
        .transpose()?;
    Ok(ContactDetails {
        name: col(row, "contact_name")?,
        email,
        phone: col(row, "contact_phone")?,
        role: col(row, "contact_role")?,
        company: col(row, "contact_company")?,
    })
}

fn row_to_assessment(row: &PgRow) -> Result<PublicAssessment, DomainError> {
    let token: String = col(row, "token")?;
    let group: Option<String> = col(row, "group_tag")?;
    Ok(PublicAssessment::reconstitute(
        PublicAssessmentId::new(col(row, "id")?),
        TypeId::new(col(row, "type_id")?),
        VersionId::new(col(row, "version_id")?),
        ResultToken::parse(&token).map_err(|e| corrupt("token", e))?,
        GroupTag::parse(group.as_deref()).map_err(|e| corrupt("group_tag", e))?,
        row_to_contact(row)?,
        col(row, "source_ip")?,
        ts(row, "started_at")?,
        opt_ts(row, "completed_at")?,
    ))
}

#[async_trait]
impl PublicAssessmentRepository for PostgresStore {
    async fn create(
        &self,
        draft: PublicAssessmentDraft,
    ) -> Result<PublicAssessment, DomainError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO public_assessments (
                type_id, version_id, token, group_tag, source_ip, started_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(draft.type_id.value())
        .bind(draft.version_id.value())
        .bind(draft.token.as_str())
        .bind(draft.group_tag.as_ref().map(|g| g.as_str()))
        .bind(&draft.source_ip)
        .bind(draft.started_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(ErrorCode::Conflict, "Result token collision")
            } else {
                DomainError::database("insert public assessment", e)
            }
        })?;
        Ok(PublicAssessment::new(PublicAssessmentId::new(id), draft))
    }

    async fn find(&self, id: PublicAssessmentId) -> Result<Option<PublicAssessment>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM public_assessments WHERE id = $1",
            COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db("fetch public assessment"))?
        .as_ref()
        .map(row_to_assessment)
        .transpose()
    }

    async fn find_by_token(
        &self,
        token: &ResultToken,
    ) -> Result<Option<PublicAssessment>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM public_assessments WHERE token = $1",
            COLUMNS
        ))
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db("fetch public assessment by token"))?
        .as_ref()
        .map(row_to_assessment)
        .transpose()
    }

    async fn complete(
        &self,
        id: PublicAssessmentId,
        contact: ContactDetails,
        now: Timestamp,
    ) -> Result<(PublicAssessment, bool), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let mut assessment = sqlx::query(&format!(
            "SELECT {} FROM public_assessments WHERE id = $1 FOR UPDATE",
            COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db("fetch public assessment"))?
        .as_ref()
        .map(row_to_assessment)
        .transpose()?
        .ok_or_else(|| not_found(id))?;

        let changed = assessment.complete(contact, now)?;
        if changed {
            let contact = assessment.contact();
            sqlx::query(
                r#"
                UPDATE public_assessments SET
                    contact_name = $2,
                    contact_email = $3,
                    contact_phone = $4,
                    contact_role = $5,
                    contact_company = $6,
                    completed_at = $7
                WHERE id = $1
                "#,
            )
            .bind(id.value())
            .bind(&contact.name)
            .bind(contact.email.as_ref().map(|e| e.as_str()))
            .bind(&contact.phone)
            .bind(&contact.role)
            .bind(&contact.company)
            .bind(assessment.completed_at().map(|t| *t.as_datetime()))
            .execute(&mut *tx)
            .await
            .map_err(db("complete public assessment"))?;
        }

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok((assessment, changed))
    }

    async fn record_email(
        &self,
        id: PublicAssessmentId,
        email: &EmailAddress,
    ) -> Result<PublicAssessment, DomainError> {
        sqlx::query(&format!(
            "UPDATE public_assessments SET contact_email = $2 WHERE id = $1 RETURNING {}",
            COLUMNS
        ))
        .bind(id.value())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db("record email"))?
        .as_ref()
        .map(row_to_assessment)
        .transpose()?
        .ok_or_else(|| not_found(id))
    }

    async fn list_completed(
        &self,
        type_id: TypeId,
        group: &GroupSelector,
    ) -> Result<Vec<PublicAssessment>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM public_assessments \
             WHERE type_id = $1 AND completed_at IS NOT NULL \
               AND ($2::TEXT IS NULL OR group_tag = $2) \
             ORDER BY completed_at, id",
            COLUMNS
        ))
        .bind(type_id.value())
        .bind(group.tag().map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db("list completed assessments"))?
        .iter()
        .map(row_to_assessment)
        .collect()
    }

    async fn list_all_completed(&self) -> Result<Vec<PublicAssessment>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM public_assessments WHERE completed_at IS NOT NULL \
             ORDER BY completed_at, id",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db("list completed assessments"))?
        .iter()
        .map(row_to_assessment)
        .collect()
    }
}
