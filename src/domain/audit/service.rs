//! Audit service: the contract callers record and read audit history through

use super::entry::{AuditEntry, NewAuditEntry, WriteAuditEntry};
use super::filter::{AuditItemFilter, AuditItemQuery, AuditItemScope, PagedItemsOptions};
use super::item::{AuditItem, AuditType, NewAuditItem};
use super::repository::{AuditEntryRepository, AuditItemRepository};
use crate::domain::shared::{Page, Paging, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Records and retrieves audit items and audit entries
#[async_trait]
pub trait AuditService: Send + Sync {
    /// Record a lightweight audit item against `object_id`, performed by `user_id`
    async fn add(&self, audit_type: AuditType, comment: &str, user_id: i32, object_id: i32) -> Result<()>;

    /// Paged audit trail of one entity. Newest first unless `options` says otherwise.
    async fn get_paged_items_by_entity(
        &self,
        entity_id: i32,
        paging: Paging,
        options: PagedItemsOptions,
    ) -> Result<Page<AuditItem>>;

    /// Paged audit trail of one user. Newest first unless `options` says otherwise.
    async fn get_paged_items_by_user(
        &self,
        user_id: i32,
        paging: Paging,
        options: PagedItemsOptions,
    ) -> Result<Page<AuditItem>>;

    /// Write an audit entry for an audited event.
    ///
    /// Fails with a validation error when the event type is not made of
    /// alphanumeric characters and hyphens with at least one `/`.
    async fn write(&self, entry: WriteAuditEntry) -> Result<AuditEntry>;

    /// All audit entries, most recent event first
    async fn get(&self) -> Result<Vec<AuditEntry>>;

    /// One page of audit entries, most recent event first
    async fn get_page(&self, paging: Paging) -> Result<Page<AuditEntry>>;

    /// Items of one type, newest first, optionally only those created since `since`
    async fn get_logs(&self, audit_type: AuditType, since: Option<DateTime<Utc>>) -> Result<Vec<AuditItem>>;

    /// Items of one type performed by one user, newest first
    async fn get_user_logs(
        &self,
        user_id: i32,
        audit_type: AuditType,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AuditItem>>;

    /// Delete audit items older than `max_age`, returning how many were removed
    async fn clean_logs(&self, max_age: Duration) -> Result<u64>;
}

/// Repository-backed audit service
pub struct AuditTrailService {
    items: Arc<dyn AuditItemRepository>,
    entries: Arc<dyn AuditEntryRepository>,
}

impl AuditTrailService {
    pub fn new(items: Arc<dyn AuditItemRepository>, entries: Arc<dyn AuditEntryRepository>) -> Self {
        Self { items, entries }
    }

    fn logs_query(scope: AuditItemScope, audit_type: AuditType, since: Option<DateTime<Utc>>) -> AuditItemQuery {
        let mut query = AuditItemQuery::new(scope);
        query.audit_types = vec![audit_type];
        query.filter = AuditItemFilter {
            created_from: since,
            ..Default::default()
        };
        query
    }
}

#[async_trait]
impl AuditService for AuditTrailService {
    async fn add(&self, audit_type: AuditType, comment: &str, user_id: i32, object_id: i32) -> Result<()> {
        let item = self
            .items
            .create(NewAuditItem::new(audit_type, comment, user_id, object_id))
            .await?;

        counter!("audit_items_recorded_total", "audit_type" => audit_type.as_str()).increment(1);
        debug!(
            "Audit item {} recorded: {} on entity {} by user {}",
            item.id, audit_type, object_id, user_id
        );
        Ok(())
    }

    async fn get_paged_items_by_entity(
        &self,
        entity_id: i32,
        paging: Paging,
        options: PagedItemsOptions,
    ) -> Result<Page<AuditItem>> {
        let query = AuditItemQuery::for_entity(entity_id, options);
        self.items.get_paged(&query, paging).await
    }

    async fn get_paged_items_by_user(
        &self,
        user_id: i32,
        paging: Paging,
        options: PagedItemsOptions,
    ) -> Result<Page<AuditItem>> {
        let query = AuditItemQuery::for_user(user_id, options);
        self.items.get_paged(&query, paging).await
    }

    async fn write(&self, entry: WriteAuditEntry) -> Result<AuditEntry> {
        let new_entry = match NewAuditEntry::try_from(entry) {
            Ok(new_entry) => new_entry,
            Err(e) => {
                counter!("audit_entry_validation_failures_total").increment(1);
                warn!("Rejected audit entry: {}", e);
                return Err(e);
            }
        };

        let entry = self.entries.create(new_entry).await?;

        counter!("audit_entries_written_total").increment(1);
        debug!("Audit entry {} written: {}", entry.id, entry.event_type);
        Ok(entry)
    }

    async fn get(&self) -> Result<Vec<AuditEntry>> {
        self.entries.list().await
    }

    async fn get_page(&self, paging: Paging) -> Result<Page<AuditEntry>> {
        self.entries.get_page(paging).await
    }

    async fn get_logs(&self, audit_type: AuditType, since: Option<DateTime<Utc>>) -> Result<Vec<AuditItem>> {
        let query = Self::logs_query(AuditItemScope::All, audit_type, since);
        self.items.list(&query).await
    }

    async fn get_user_logs(
        &self,
        user_id: i32,
        audit_type: AuditType,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AuditItem>> {
        let query = Self::logs_query(AuditItemScope::User(user_id), audit_type, since);
        self.items.list(&query).await
    }

    async fn clean_logs(&self, max_age: Duration) -> Result<u64> {
        // An age reaching past the earliest representable instant deletes nothing
        let cutoff = Utc::now()
            .checked_sub_signed(max_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let removed = self.items.delete_older_than(cutoff).await?;

        counter!("audit_items_cleaned_total").increment(removed);
        info!("Cleaned {} audit items older than {}", removed, cutoff);
        Ok(removed)
    }
}

/// Run `clean_logs` now and then every `interval` until the task is aborted
pub fn spawn_retention_task(
    service: Arc<dyn AuditService>,
    max_age: Duration,
    interval: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = service.clean_logs(max_age).await {
                error!("Audit log cleanup failed: {}", e);
            }
            tokio::time::sleep(interval).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::repository::{MockAuditEntryRepository, MockAuditItemRepository};
    use crate::domain::shared::{DomainError, Direction};
    use chrono::TimeZone;
    use mockall::predicate::eq;

    fn sample_write(event_type: &str) -> WriteAuditEntry {
        WriteAuditEntry {
            performing_user_id: 1,
            performing_details: "admin".to_string(),
            performing_ip: "127.0.0.1".to_string(),
            event_date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            affected_user_id: 2,
            affected_details: "user profile".to_string(),
            event_type: event_type.to_string(),
            event_details: "published page X".to_string(),
        }
    }

    fn service(items: MockAuditItemRepository, entries: MockAuditEntryRepository) -> AuditTrailService {
        AuditTrailService::new(Arc::new(items), Arc::new(entries))
    }

    #[tokio::test]
    async fn test_write_rejects_event_type_without_separator() {
        let mut entries = MockAuditEntryRepository::new();
        entries.expect_create().never();

        let svc = service(MockAuditItemRepository::new(), entries);
        let err = svc.write(sample_write("publish")).await.unwrap_err();

        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_write_returns_stored_entry() {
        let mut entries = MockAuditEntryRepository::new();
        entries
            .expect_create()
            .times(1)
            .returning(|new_entry| Ok(new_entry.into_entry(11)));

        let svc = service(MockAuditItemRepository::new(), entries);
        let input = sample_write("content/publish");
        let entry = svc.write(input.clone()).await.unwrap();

        assert_eq!(entry.id, 11);
        assert_eq!(entry.performing_user_id, input.performing_user_id);
        assert_eq!(entry.performing_details, input.performing_details);
        assert_eq!(entry.performing_ip, input.performing_ip);
        assert_eq!(entry.event_date, input.event_date);
        assert_eq!(entry.affected_user_id, input.affected_user_id);
        assert_eq!(entry.affected_details, input.affected_details);
        assert_eq!(entry.event_type, "content/publish");
        assert_eq!(entry.event_details, input.event_details);
    }

    #[tokio::test]
    async fn test_add_maps_arguments() {
        let mut items = MockAuditItemRepository::new();
        items
            .expect_create()
            .withf(|new| {
                new.audit_type == AuditType::Publish
                    && new.comment == "Published"
                    && new.user_id == 3
                    && new.entity_id == 1050
            })
            .times(1)
            .returning(|new| Ok(new.into_item(1)));

        let svc = service(items, MockAuditEntryRepository::new());
        svc.add(AuditType::Publish, "Published", 3, 1050).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_propagates_storage_error() {
        let mut items = MockAuditItemRepository::new();
        items
            .expect_create()
            .returning(|_| Err(DomainError::Database("connection refused".to_string())));

        let svc = service(items, MockAuditEntryRepository::new());
        let err = svc.add(AuditType::Save, "Saved", 1, 2).await.unwrap_err();
        assert_eq!(err, DomainError::Database("connection refused".to_string()));
    }

    #[tokio::test]
    async fn test_paged_by_entity_builds_query() {
        let mut items = MockAuditItemRepository::new();
        items
            .expect_get_paged()
            .withf(|query, paging| {
                query.scope == AuditItemScope::Entity(1050)
                    && query.direction == Direction::Descending
                    && query.audit_types == vec![AuditType::Save]
                    && *paging == Paging::new(2, 25)
            })
            .times(1)
            .returning(|_, _| Ok(Page::new(Vec::new(), 60)));

        let svc = service(items, MockAuditEntryRepository::new());
        let page = svc
            .get_paged_items_by_entity(
                1050,
                Paging::new(2, 25),
                PagedItemsOptions::default().with_audit_types(vec![AuditType::Save]),
            )
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_records, 60);
    }

    #[tokio::test]
    async fn test_paged_by_user_builds_query() {
        let mut items = MockAuditItemRepository::new();
        items
            .expect_get_paged()
            .withf(|query, _| {
                query.scope == AuditItemScope::User(5) && query.direction == Direction::Ascending
            })
            .times(1)
            .returning(|_, _| Ok(Page::empty()));

        let svc = service(items, MockAuditEntryRepository::new());
        svc.get_paged_items_by_user(
            5,
            Paging::new(0, 10),
            PagedItemsOptions::default().with_direction(Direction::Ascending),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_get_user_logs_query() {
        let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut items = MockAuditItemRepository::new();
        items
            .expect_list()
            .withf(move |query| {
                query.scope == AuditItemScope::User(9)
                    && query.audit_types == vec![AuditType::Delete]
                    && query.filter.created_from == Some(since)
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let svc = service(items, MockAuditEntryRepository::new());
        svc.get_user_logs(9, AuditType::Delete, Some(since)).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_page_delegates() {
        let mut entries = MockAuditEntryRepository::new();
        entries
            .expect_get_page()
            .with(eq(Paging::new(1, 5)))
            .times(1)
            .returning(|_| Ok(Page::new(Vec::new(), 12)));

        let svc = service(MockAuditItemRepository::new(), entries);
        let page = svc.get_page(Paging::new(1, 5)).await.unwrap();
        assert_eq!(page.total_records, 12);
    }

    #[tokio::test]
    async fn test_clean_logs_uses_cutoff() {
        let before = Utc::now() - Duration::minutes(60);
        let mut items = MockAuditItemRepository::new();
        items
            .expect_delete_older_than()
            .withf(move |cutoff| *cutoff >= before && *cutoff <= Utc::now() - Duration::minutes(59))
            .times(1)
            .returning(|_| Ok(4));

        let svc = service(items, MockAuditEntryRepository::new());
        assert_eq!(svc.clean_logs(Duration::minutes(60)).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_clean_logs_age_beyond_calendar_deletes_nothing() {
        let mut items = MockAuditItemRepository::new();
        items
            .expect_delete_older_than()
            .with(eq(DateTime::<Utc>::MIN_UTC))
            .times(1)
            .returning(|_| Ok(0));

        let svc = service(items, MockAuditEntryRepository::new());
        assert_eq!(svc.clean_logs(Duration::days(365 * 300_000)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_retention_task_cleans_immediately() {
        let cleaned = Arc::new(tokio::sync::Notify::new());
        let signal = cleaned.clone();

        let mut items = MockAuditItemRepository::new();
        items.expect_delete_older_than().returning(move |_| {
            signal.notify_one();
            Ok(1)
        });

        let svc: Arc<dyn AuditService> = Arc::new(service(items, MockAuditEntryRepository::new()));
        let task = spawn_retention_task(svc, Duration::days(7), std::time::Duration::from_secs(3600));

        tokio::time::timeout(std::time::Duration::from_secs(5), cleaned.notified())
            .await
            .unwrap();
        task.abort();
    }
}
