//! Audit trail service
//!
//! Records who did what, when, to which entity, and serves that history back
//! in pages. Laid out in domain, infrastructure and interface layers.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::error::Result;
