//! Infrastructure layer - Technical implementations
//!
//! This layer contains the repository implementations backing the audit
//! service: an in-memory store and PostgreSQL.

pub mod persistence;
