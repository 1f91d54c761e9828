//! API interface implementations

pub mod audit_dto;
pub mod audit_handler;
pub mod extract;
pub mod metrics_handler;
pub mod router;

pub use audit_handler::AppState;
pub use metrics_handler::{detached_metrics, init_metrics};
pub use router::build_router;
