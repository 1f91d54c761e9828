//! Audit repository interfaces

use super::entry::{AuditEntry, NewAuditEntry};
use super::filter::AuditItemQuery;
use super::item::{AuditItem, NewAuditItem};
use crate::domain::shared::{Page, Paging, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Audit item repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditItemRepository: Send + Sync {
    /// Store a new item and return it with its assigned id
    async fn create(&self, item: NewAuditItem) -> Result<AuditItem>;

    /// One ordered page of matching items plus the total match count
    async fn get_paged(&self, query: &AuditItemQuery, paging: Paging) -> Result<Page<AuditItem>>;

    /// Every matching item, ordered
    async fn list(&self, query: &AuditItemQuery) -> Result<Vec<AuditItem>>;

    /// Delete items created before `cutoff`, returning how many were removed
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// Audit entry repository trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditEntryRepository: Send + Sync {
    /// Store a validated entry and return it with its assigned id
    async fn create(&self, entry: NewAuditEntry) -> Result<AuditEntry>;

    /// All entries, most recent event first
    async fn list(&self) -> Result<Vec<AuditEntry>>;

    /// One page of entries, most recent event first, plus the total count
    async fn get_page(&self, paging: Paging) -> Result<Page<AuditEntry>>;
}
