//! Audit trail domain
//!
//! Audit items are lightweight records of an action performed against an
//! entity by a user. Audit entries are richer records describing both the
//! performing and the affected party of an audited event.

pub mod entry;
pub mod filter;
pub mod item;
pub mod repository;
pub mod service;

pub use entry::{AuditEntry, EventType, NewAuditEntry, WriteAuditEntry};
pub use filter::{AuditItemFilter, AuditItemQuery, AuditItemScope, PagedItemsOptions};
pub use item::{AuditItem, AuditType, NewAuditItem};
pub use repository::{AuditEntryRepository, AuditItemRepository};
pub use service::{spawn_retention_task, AuditService, AuditTrailService};
