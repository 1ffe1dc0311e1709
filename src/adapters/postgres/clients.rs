//! PostgreSQL implementation of ClientRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;

use super::{col, corrupt, db, is_unique_violation, opt_ts, ts, PostgresStore};
use crate::domain::client::{Client, ClientDraft, Respondent, RespondentDraft};
use crate::domain::foundation::{
    ClientId, DomainError, EmailAddress, ErrorCode, RespondentId, Timestamp,
};
use crate::ports::ClientRepository;

const CLIENT_COLUMNS: &str =
    "id, trade_name, legal_name, tax_id, location, segment, active, created_at";

const RESPONDENT_COLUMNS: &str = "id, client_id, login, secret_digest, display_name, role, \
                                  department, active, must_rotate_credentials, \
                                  last_access_at, completed_at, created_at";

fn row_to_client(row: &PgRow) -> Result<Client, DomainError> {
    Ok(Client {
        id: ClientId::new(col(row, "id")?),
        trade_name: col(row, "trade_name")?,
        legal_name: col(row, "legal_name")?,
        tax_id: col(row, "tax_id")?,
        location: col(row, "location")?,
        segment: col(row, "segment")?,
        active: col(row, "active")?,
        created_at: ts(row, "created_at")?,
    })
}

fn row_to_respondent(row: &PgRow) -> Result<Respondent, DomainError> {
    let login: String = col(row, "login")?;
    Ok(Respondent {
        id: RespondentId::new(col(row, "id")?),
        client_id: ClientId::new(col(row, "client_id")?),
        login: EmailAddress::parse(&login).map_err(|e| corrupt("login", e))?,
        secret_digest: col(row, "secret_digest")?,
        display_name: col(row, "display_name")?,
        role: col(row, "role")?,
        department: col(row, "department")?,
        active: col(row, "active")?,
        must_rotate_credentials: col(row, "must_rotate_credentials")?,
        last_access_at: opt_ts(row, "last_access_at")?,
        completed_at: opt_ts(row, "completed_at")?,
        created_at: ts(row, "created_at")?,
    })
}

#[async_trait]
impl ClientRepository for PostgresStore {
    async fn create_client(
        &self,
        draft: &ClientDraft,
        now: Timestamp,
    ) -> Result<Client, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO clients (trade_name, legal_name, tax_id, location, segment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(&draft.trade_name)
        .bind(&draft.legal_name)
        .bind(&draft.tax_id)
        .bind(&draft.location)
        .bind(&draft.segment)
        .bind(now.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(db("insert client"))?;
        row_to_client(&row)
    }

    async fn find_client(&self, id: ClientId) -> Result<Option<Client>, DomainError> {
        sqlx::query(&format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(db("fetch client"))?
            .as_ref()
            .map(row_to_client)
            .transpose()
    }

    async fn list_clients(&self) -> Result<Vec<Client>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM clients ORDER BY trade_name",
            CLIENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db("list clients"))?
        .iter()
        .map(row_to_client)
        .collect()
    }

    async fn create_respondent(
        &self,
        draft: &RespondentDraft,
        now: Timestamp,
    ) -> Result<Respondent, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO respondents (
                client_id, login, secret_digest, display_name, role, department, created_at
            )
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE EXISTS (SELECT 1 FROM clients WHERE id = $1)
            RETURNING {}
            "#,
            RESPONDENT_COLUMNS
        ))
        .bind(draft.client_id.value())
        .bind(draft.login.as_str())
        .bind(&draft.secret_digest)
        .bind(&draft.display_name)
        .bind(&draft.role)
        .bind(&draft.department)
        .bind(now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::new(
                    ErrorCode::Conflict,
                    format!("Login {} is already in use", draft.login),
                )
                .with_detail("field", "login")
            } else {
                DomainError::database("insert respondent", e)
            }
        })?;

        match row {
            Some(row) => row_to_respondent(&row),
            None => Err(DomainError::not_found(
                ErrorCode::ClientNotFound,
                "Client",
                draft.client_id,
            )),
        }
    }

    async fn find_respondent(&self, id: RespondentId) -> Result<Option<Respondent>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM respondents WHERE id = $1",
            RESPONDENT_COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(db("fetch respondent"))?
        .as_ref()
        .map(row_to_respondent)
        .transpose()
    }

    async fn find_respondent_by_login(
        &self,
        login: &EmailAddress,
    ) -> Result<Option<Respondent>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM respondents WHERE login = $1",
            RESPONDENT_COLUMNS
        ))
        .bind(login.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db("fetch respondent by login"))?
        .as_ref()
        .map(row_to_respondent)
        .transpose()
    }

    async fn list_respondents(&self, client_id: ClientId) -> Result<Vec<Respondent>, DomainError> {
        sqlx::query(&format!(
            "SELECT {} FROM respondents WHERE client_id = $1 ORDER BY id",
            RESPONDENT_COLUMNS
        ))
        .bind(client_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(db("list respondents"))?
        .iter()
        .map(row_to_respondent)
        .collect()
    }

    async fn record_access(&self, id: RespondentId, at: Timestamp) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE respondents SET last_access_at = $2 WHERE id = $1")
            .bind(id.value())
            .bind(at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(db("record access"))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(
                ErrorCode::RespondentNotFound,
                "Respondent",
                id,
            ));
        }
        Ok(())
    }
}
