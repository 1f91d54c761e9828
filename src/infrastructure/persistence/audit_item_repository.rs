//! PostgreSQL implementation of the audit item repository

use crate::domain::audit::{
    AuditItem, AuditItemQuery, AuditItemRepository, AuditItemScope, AuditType, NewAuditItem,
};
use crate::domain::shared::{DomainError, Page, Paging, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, error};

const SELECT_ITEMS: &str =
    "SELECT id, entity_id, user_id, audit_type, comment, created_at FROM audit_items";

#[derive(FromRow)]
struct AuditItemRow {
    id: i64,
    entity_id: i32,
    user_id: i32,
    audit_type: String,
    comment: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditItemRow> for AuditItem {
    type Error = DomainError;

    fn try_from(r: AuditItemRow) -> Result<Self> {
        let audit_type = AuditType::from_str(&r.audit_type).ok_or_else(|| {
            DomainError::Internal(format!("Unknown audit type '{}' in row {}", r.audit_type, r.id))
        })?;

        Ok(AuditItem {
            id: r.id,
            entity_id: r.entity_id,
            user_id: r.user_id,
            audit_type,
            comment: r.comment,
            created_at: r.created_at,
        })
    }
}

/// Append the WHERE clause for `query`
fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, query: &AuditItemQuery) {
    qb.push(" WHERE 1=1");

    match query.scope {
        AuditItemScope::All => {}
        AuditItemScope::Entity(entity_id) => {
            qb.push(" AND entity_id = ").push_bind(entity_id);
        }
        AuditItemScope::User(user_id) => {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
    }

    if !query.audit_types.is_empty() {
        let types: Vec<String> = query
            .audit_types
            .iter()
            .map(|t| t.as_str().to_string())
            .collect();
        qb.push(" AND audit_type = ANY(").push_bind(types).push(")");
    }

    let filter = &query.filter;
    if let Some(ref needle) = filter.comment_contains {
        qb.push(" AND comment ILIKE ")
            .push_bind(format!("%{}%", escape_like(needle)));
    }
    if let Some(from) = filter.created_from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.created_to {
        qb.push(" AND created_at <= ").push_bind(to);
    }
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(entity_id) = filter.entity_id {
        qb.push(" AND entity_id = ").push_bind(entity_id);
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, query: &AuditItemQuery) {
    let dir = query.direction.as_sql();
    qb.push(format!(" ORDER BY created_at {dir}, id {dir}"));
}

/// Escape LIKE wildcards so the needle matches literally
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

pub struct PgAuditItemRepository {
    pool: PgPool,
}

impl PgAuditItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, query: &AuditItemQuery) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_items");
        push_conditions(&mut qb, query);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to count audit items: {}", e);
                DomainError::from(e)
            })?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl AuditItemRepository for PgAuditItemRepository {
    async fn create(&self, item: NewAuditItem) -> Result<AuditItem> {
        debug!(
            "Creating audit item {} for entity {}",
            item.audit_type, item.entity_id
        );

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO audit_items (entity_id, user_id, audit_type, comment, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(item.entity_id)
        .bind(item.user_id)
        .bind(item.audit_type.as_str())
        .bind(&item.comment)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to create audit item: {}", e);
            DomainError::from(e)
        })?;

        debug!("Audit item created successfully: {}", id);
        Ok(item.into_item(id))
    }

    async fn get_paged(&self, query: &AuditItemQuery, paging: Paging) -> Result<Page<AuditItem>> {
        debug!("Paging audit items with query: {:?}, paging: {:?}", query, paging);

        let total = self.count(query).await?;

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_ITEMS);
        push_conditions(&mut qb, query);
        push_order(&mut qb, query);
        qb.push(" LIMIT ").push_bind(to_i64(paging.limit()));
        qb.push(" OFFSET ").push_bind(to_i64(paging.offset()));

        let rows: Vec<AuditItemRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to page audit items: {}", e);
                DomainError::from(e)
            })?;

        let items = rows
            .into_iter()
            .map(AuditItem::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(items, total))
    }

    async fn list(&self, query: &AuditItemQuery) -> Result<Vec<AuditItem>> {
        debug!("Listing audit items with query: {:?}", query);

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_ITEMS);
        push_conditions(&mut qb, query);
        push_order(&mut qb, query);

        let rows: Vec<AuditItemRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to list audit items: {}", e);
                DomainError::from(e)
            })?;

        rows.into_iter().map(AuditItem::try_from).collect()
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        debug!("Deleting audit items older than {}", cutoff);

        let result = sqlx::query("DELETE FROM audit_items WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to delete old audit items: {}", e);
                DomainError::from(e)
            })?;

        debug!("Deleted {} old audit items", result.rows_affected());
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::{AuditItemFilter, PagedItemsOptions};
    use crate::domain::shared::Direction;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_query_sql_for_entity() {
        let query = AuditItemQuery::for_entity(
            1050,
            PagedItemsOptions::default()
                .with_direction(Direction::Ascending)
                .with_audit_types(vec![AuditType::Save, AuditType::Publish])
                .with_filter(AuditItemFilter {
                    comment_contains: Some("page".to_string()),
                    user_id: Some(3),
                    ..Default::default()
                }),
        );

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_ITEMS);
        push_conditions(&mut qb, &query);
        push_order(&mut qb, &query);

        assert_eq!(
            qb.sql(),
            "SELECT id, entity_id, user_id, audit_type, comment, created_at FROM audit_items \
             WHERE 1=1 AND entity_id = $1 AND audit_type = ANY($2) AND comment ILIKE $3 \
             AND user_id = $4 ORDER BY created_at ASC, id ASC"
        );
    }

    #[test]
    fn test_query_sql_default_is_newest_first() {
        let query = AuditItemQuery::for_user(7, PagedItemsOptions::default());

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_items");
        push_conditions(&mut qb, &query);
        push_order(&mut qb, &query);

        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM audit_items WHERE 1=1 AND user_id = $1 ORDER BY created_at DESC, id DESC"
        );
    }

    #[test]
    fn test_row_with_unknown_type_is_rejected() {
        let row = AuditItemRow {
            id: 1,
            entity_id: 1,
            user_id: 1,
            audit_type: "teleport".to_string(),
            comment: String::new(),
            created_at: Utc::now(),
        };
        assert!(matches!(AuditItem::try_from(row), Err(DomainError::Internal(_))));
    }
}
