//! PostgreSQL implementation of LeadRepository.
//!
//! Domain scores are stored as a JSONB snapshot; the unique key on
//! `public_assessment_id` keeps one lead per assessment.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::PgConnection;

use super::public::row_to_contact;
use super::{col, corrupt, db, ts, PostgresStore};
use crate::domain::foundation::{DomainError, ErrorCode, LeadId, PublicAssessmentId};
use crate::domain::lead::{
    Lead, LeadAction, LeadDomainScore, LeadDraft, LeadFilter, LeadHistoryEntry, LeadPriority,
    LeadStatus,
};
use crate::ports::LeadRepository;

const COLUMNS: &str = "id, public_assessment_id, contact_name, contact_email, contact_phone, \
                       contact_role, contact_company, type_name, overall_score, domain_scores, \
                       status, priority, notes, assignee, created_at, updated_at";

fn not_found(id: LeadId) -> DomainError {
    DomainError::not_found(ErrorCode::LeadNotFound, "Lead", id)
}

fn row_to_lead(row: &PgRow) -> Result<Lead, DomainError> {
    let status: String = col(row, "status")?;
    let priority: String = col(row, "priority")?;
    let Json(domain_scores) = col::<Json<Vec<LeadDomainScore>>>(row, "domain_scores")?;
    Ok(Lead {
        id: LeadId::new(col(row, "id")?),
        public_assessment_id: PublicAssessmentId::new(col(row, "public_assessment_id")?),
        contact: row_to_contact(row)?,
        type_name: col(row, "type_name")?,
        overall_score: col(row, "overall_score")?,
        domain_scores,
        status: status
            .parse::<LeadStatus>()
            .map_err(|e| corrupt("status", e))?,
        priority: priority
            .parse::<LeadPriority>()
            .map_err(|e| corrupt("priority", e))?,
        notes: col(row, "notes")?,
        assignee: col(row, "assignee")?,
        created_at: ts(row, "created_at")?,
        updated_at: ts(row, "updated_at")?,
    })
}

fn row_to_entry(row: &PgRow) -> Result<LeadHistoryEntry, DomainError> {
    let action: String = col(row, "action")?;
    Ok(LeadHistoryEntry {
        action: LeadAction::parse(&action).ok_or_else(|| corrupt("action", &action))?,
        actor: col(row, "actor")?,
        detail: col(row, "detail")?,
        at: ts(row, "at")?,
    })
}

async fn insert_entries(
    conn: &mut PgConnection,
    lead_id: LeadId,
    entries: &[LeadHistoryEntry],
) -> Result<(), DomainError> {
    for entry in entries {
        sqlx::query(
            "INSERT INTO lead_history (lead_id, action, actor, detail, at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(lead_id.value())
        .bind(entry.action.as_str())
        .bind(&entry.actor)
        .bind(&entry.detail)
        .bind(entry.at.as_datetime())
        .execute(&mut *conn)
        .await
        .map_err(db("insert lead history"))?;
    }
    Ok(())
}

#[async_trait]
impl LeadRepository for PostgresStore {
    async fn insert_if_absent(&self, draft: &LeadDraft) -> Result<(Lead, bool), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        // Serializes concurrent materializations of the same assessment.
        let exists: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM public_assessments WHERE id = $1 FOR UPDATE")
                .bind(draft.public_assessment_id.value())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db("lock public assessment"))?;
        if exists.is_none() {
            return Err(DomainError::not_found(
                ErrorCode::PublicAssessmentNotFound,
                "Public assessment",
                draft.public_assessment_id,
            ));
        }

        let existing = sqlx::query(&format!(
            "SELECT {} FROM leads WHERE public_assessment_id = $1",
            COLUMNS
        ))
        .bind(draft.public_assessment_id.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db("fetch lead"))?;
        if let Some(row) = existing {
            let lead = row_to_lead(&row)?;
            tx.commit().await.map_err(db("commit transaction"))?;
            return Ok((lead, false));
        }

        let contact = &draft.contact;
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO leads (
                public_assessment_id, contact_name, contact_email, contact_phone,
                contact_role, contact_company, type_name, overall_score, domain_scores,
                status, priority, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING id
            "#,
        )
        .bind(draft.public_assessment_id.value())
        .bind(&contact.name)
        .bind(contact.email.as_ref().map(|e| e.as_str()))
        .bind(&contact.phone)
        .bind(&contact.role)
        .bind(&contact.company)
        .bind(&draft.type_name)
        .bind(draft.overall_score)
        .bind(Json(&draft.domain_scores))
        .bind(LeadStatus::New.as_str())
        .bind(LeadPriority::Medium.as_str())
        .bind(draft.created_at.as_datetime())
        .fetch_one(&mut *tx)
        .await
        .map_err(db("insert lead"))?;

        let lead = Lead::new(LeadId::new(id), draft.clone());
        insert_entries(&mut tx, lead.id, &[draft.created_entry()]).await?;

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok((lead, true))
    }

    async fn find(&self, id: LeadId) -> Result<Option<Lead>, DomainError> {
        sqlx::query(&format!("SELECT {} FROM leads WHERE id = $1", COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(db("fetch lead"))?
            .as_ref()
            .map(row_to_lead)
            .transpose()
    }

    async fn find_by_public_assessment(
        &self,
        id: PublicAssessmentId,
    ) -> Result<Option<Lead>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM leads WHERE public_assessment_id = $1",
            COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db("fetch lead by assessment"))?
        .as_ref()
        .map(row_to_lead)
        .transpose()
    }

    async fn save(&self, lead: &Lead, entries: &[LeadHistoryEntry]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let result = sqlx::query(
            r#"
            UPDATE leads SET
                status = $2,
                priority = $3,
                notes = $4,
                assignee = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(lead.id.value())
        .bind(lead.status.as_str())
        .bind(lead.priority.as_str())
        .bind(&lead.notes)
        .bind(&lead.assignee)
        .bind(lead.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db("update lead"))?;
        if result.rows_affected() == 0 {
            return Err(not_found(lead.id));
        }

        insert_entries(&mut tx, lead.id, entries).await?;

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(())
    }

    async fn history(&self, id: LeadId) -> Result<Vec<LeadHistoryEntry>, DomainError> {
        sqlx::query(
            "SELECT action, actor, detail, at FROM lead_history WHERE lead_id = $1 ORDER BY id",
        )
        .bind(id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(db("list lead history"))?
        .iter()
        .map(row_to_entry)
        .collect()
    }

    async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>, DomainError> {
        let leads = sqlx::query(&format!(
            "SELECT {} FROM leads \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::TEXT IS NULL OR priority = $2) \
             ORDER BY created_at DESC, id DESC",
            COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.priority.map(|p| p.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db("list leads"))?
        .iter()
        .map(row_to_lead)
        .collect::<Result<Vec<_>, _>>()?;

        // Text search over contact fields runs in process.
        Ok(leads.into_iter().filter(|l| filter.matches(l)).collect())
    }

    async fn delete_cascade(&self, id: LeadId) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db("start transaction"))?;

        let assessment: Option<(i64,)> =
            sqlx::query_as("SELECT public_assessment_id FROM leads WHERE id = $1 FOR UPDATE")
                .bind(id.value())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db("fetch lead"))?;
        let (assessment_id,) = assessment.ok_or_else(|| not_found(id))?;

        // History, responses, intake sessions and the lead itself cascade.
        sqlx::query("DELETE FROM public_assessments WHERE id = $1")
            .bind(assessment_id)
            .execute(&mut *tx)
            .await
            .map_err(db("delete public assessment"))?;

        tx.commit().await.map_err(db("commit transaction"))?;
        Ok(())
    }
}
