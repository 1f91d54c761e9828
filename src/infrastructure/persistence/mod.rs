//! Persistence implementations

pub mod memory;
#[cfg(feature = "postgres")]
pub mod database;
#[cfg(feature = "postgres")]
pub mod audit_item_repository;
#[cfg(feature = "postgres")]
pub mod audit_entry_repository;

pub use memory::{MemoryAuditEntryRepository, MemoryAuditItemRepository};
#[cfg(feature = "postgres")]
pub use database::{create_pool, run_migrations};
#[cfg(feature = "postgres")]
pub use audit_item_repository::PgAuditItemRepository;
#[cfg(feature = "postgres")]
pub use audit_entry_repository::PgAuditEntryRepository;
