//! In-memory audit repositories

use crate::domain::audit::{
    AuditEntry, AuditEntryRepository, AuditItem, AuditItemQuery, AuditItemRepository,
    NewAuditEntry, NewAuditItem,
};
use crate::domain::shared::{Page, Paging, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

struct Table<T> {
    rows: Vec<T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory audit item store
#[derive(Clone, Default)]
pub struct MemoryAuditItemRepository {
    table: Arc<RwLock<Table<AuditItem>>>,
}

impl MemoryAuditItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn matching(&self, query: &AuditItemQuery) -> Vec<AuditItem> {
        let table = self.table.read().await;
        let mut items: Vec<AuditItem> = table
            .rows
            .iter()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| query.compare(a, b));
        items
    }
}

#[async_trait]
impl AuditItemRepository for MemoryAuditItemRepository {
    async fn create(&self, item: NewAuditItem) -> Result<AuditItem> {
        let mut table = self.table.write().await;
        let item = item.into_item(table.next_id());
        table.rows.push(item.clone());

        debug!("Stored audit item {} in memory", item.id);
        Ok(item)
    }

    async fn get_paged(&self, query: &AuditItemQuery, paging: Paging) -> Result<Page<AuditItem>> {
        let items = self.matching(query).await;
        let total = items.len() as u64;
        Ok(Page::new(paging.apply(items), total))
    }

    async fn list(&self, query: &AuditItemQuery) -> Result<Vec<AuditItem>> {
        Ok(self.matching(query).await)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|item| item.created_at >= cutoff);
        let removed = (before - table.rows.len()) as u64;

        debug!("Deleted {} audit items older than {}", removed, cutoff);
        Ok(removed)
    }
}

/// In-memory audit entry store
#[derive(Clone, Default)]
pub struct MemoryAuditEntryRepository {
    table: Arc<RwLock<Table<AuditEntry>>>,
}

impl MemoryAuditEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn newest_first(&self) -> Vec<AuditEntry> {
        let table = self.table.read().await;
        let mut entries = table.rows.clone();
        entries.sort_by(newest_event_first);
        entries
    }
}

fn newest_event_first(a: &AuditEntry, b: &AuditEntry) -> Ordering {
    b.event_date.cmp(&a.event_date).then(b.id.cmp(&a.id))
}

#[async_trait]
impl AuditEntryRepository for MemoryAuditEntryRepository {
    async fn create(&self, entry: NewAuditEntry) -> Result<AuditEntry> {
        let mut table = self.table.write().await;
        let entry = entry.into_entry(table.next_id());
        table.rows.push(entry.clone());

        debug!("Stored audit entry {} in memory", entry.id);
        Ok(entry)
    }

    async fn list(&self) -> Result<Vec<AuditEntry>> {
        Ok(self.newest_first().await)
    }

    async fn get_page(&self, paging: Paging) -> Result<Page<AuditEntry>> {
        let entries = self.newest_first().await;
        let total = entries.len() as u64;
        Ok(Page::new(paging.apply(entries), total))
    }
}
