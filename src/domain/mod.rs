//! Domain layer - Core audit trail rules
//!
//! This layer contains:
//! - Entities and value objects of the audit trail
//! - Repository interfaces: Ports for persistence
//! - The audit service contract and its implementation

pub mod audit;
pub mod shared;

// Re-export commonly used types
pub use shared::{DomainError, Result};
