//! PostgreSQL implementation of the audit entry repository

use crate::domain::audit::{AuditEntry, AuditEntryRepository, EventType, NewAuditEntry};
use crate::domain::shared::{DomainError, Page, Paging, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error};

#[derive(FromRow)]
struct AuditEntryRow {
    id: i64,
    performing_user_id: i32,
    performing_details: String,
    performing_ip: String,
    event_date: DateTime<Utc>,
    affected_user_id: i32,
    affected_details: String,
    event_type: String,
    event_details: String,
}

impl TryFrom<AuditEntryRow> for AuditEntry {
    type Error = DomainError;

    fn try_from(r: AuditEntryRow) -> Result<Self> {
        let event_type = EventType::parse(r.event_type).map_err(|e| {
            DomainError::Internal(format!("Stored audit entry {} is invalid: {}", r.id, e))
        })?;

        Ok(AuditEntry {
            id: r.id,
            performing_user_id: r.performing_user_id,
            performing_details: r.performing_details,
            performing_ip: r.performing_ip,
            event_date: r.event_date,
            affected_user_id: r.affected_user_id,
            affected_details: r.affected_details,
            event_type,
            event_details: r.event_details,
        })
    }
}

pub struct PgAuditEntryRepository {
    pool: PgPool,
}

impl PgAuditEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditEntryRepository for PgAuditEntryRepository {
    async fn create(&self, entry: NewAuditEntry) -> Result<AuditEntry> {
        debug!("Creating audit entry of type {}", entry.event_type);

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO audit_entries (
                performing_user_id, performing_details, performing_ip,
                event_date,
                affected_user_id, affected_details,
                event_type, event_details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(entry.performing_user_id)
        .bind(&entry.performing_details)
        .bind(&entry.performing_ip)
        .bind(entry.event_date)
        .bind(entry.affected_user_id)
        .bind(&entry.affected_details)
        .bind(entry.event_type.as_str())
        .bind(&entry.event_details)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to create audit entry: {}", e);
            DomainError::from(e)
        })?;

        debug!("Audit entry created successfully: {}", id);
        Ok(entry.into_entry(id))
    }

    async fn list(&self) -> Result<Vec<AuditEntry>> {
        debug!("Listing all audit entries");

        let rows = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT
                id,
                performing_user_id, performing_details, performing_ip,
                event_date,
                affected_user_id, affected_details,
                event_type, event_details
            FROM audit_entries
            ORDER BY event_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to list audit entries: {}", e);
            DomainError::from(e)
        })?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }

    async fn get_page(&self, paging: Paging) -> Result<Page<AuditEntry>> {
        debug!("Paging audit entries: {:?}", paging);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to count audit entries: {}", e);
                DomainError::from(e)
            })?;

        let rows = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT
                id,
                performing_user_id, performing_details, performing_ip,
                event_date,
                affected_user_id, affected_details,
                event_type, event_details
            FROM audit_entries
            ORDER BY event_date DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::try_from(paging.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(paging.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to page audit entries: {}", e);
            DomainError::from(e)
        })?;

        let entries = rows
            .into_iter()
            .map(AuditEntry::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(entries, total.max(0) as u64))
    }
}
