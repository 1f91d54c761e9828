//! Shared kernel - Common types used across the audit domain

pub mod error;
pub mod paging;

pub use error::{DomainError, Result};
pub use paging::{Direction, Page, Paging};
