//! Audit API DTOs

use crate::domain::audit::{AuditEntry, AuditItem, WriteAuditEntry};
use crate::domain::shared::{Page, Paging};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for recording an audit item
#[derive(Debug, Serialize, Deserialize)]
pub struct AddAuditItemRequest {
    pub audit_type: String,
    #[serde(default)]
    pub comment: String,
    pub user_id: i32,
    pub object_id: i32,
}

/// Request body for writing an audit entry
#[derive(Debug, Serialize, Deserialize)]
pub struct WriteAuditEntryRequest {
    pub performing_user_id: i32,
    #[serde(default)]
    pub performing_details: String,
    #[serde(default)]
    pub performing_ip: String,
    pub event_date: DateTime<Utc>,
    pub affected_user_id: i32,
    #[serde(default)]
    pub affected_details: String,
    pub event_type: String,
    #[serde(default)]
    pub event_details: String,
}

impl From<WriteAuditEntryRequest> for WriteAuditEntry {
    fn from(req: WriteAuditEntryRequest) -> Self {
        WriteAuditEntry {
            performing_user_id: req.performing_user_id,
            performing_details: req.performing_details,
            performing_ip: req.performing_ip,
            event_date: req.event_date,
            affected_user_id: req.affected_user_id,
            affected_details: req.affected_details,
            event_type: req.event_type,
            event_details: req.event_details,
        }
    }
}

/// Audit item response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuditItemResponse {
    pub id: i64,
    pub entity_id: i32,
    pub user_id: i32,
    pub audit_type: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<AuditItem> for AuditItemResponse {
    fn from(item: AuditItem) -> Self {
        AuditItemResponse {
            id: item.id,
            entity_id: item.entity_id,
            user_id: item.user_id,
            audit_type: item.audit_type.as_str().to_string(),
            comment: item.comment,
            created_at: item.created_at,
        }
    }
}

/// Audit entry response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuditEntryResponse {
    pub id: i64,
    pub performing_user_id: i32,
    pub performing_details: String,
    pub performing_ip: String,
    pub event_date: DateTime<Utc>,
    pub affected_user_id: i32,
    pub affected_details: String,
    pub event_type: String,
    pub event_details: String,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(entry: AuditEntry) -> Self {
        AuditEntryResponse {
            id: entry.id,
            performing_user_id: entry.performing_user_id,
            performing_details: entry.performing_details,
            performing_ip: entry.performing_ip,
            event_date: entry.event_date,
            affected_user_id: entry.affected_user_id,
            affected_details: entry.affected_details,
            event_type: entry.event_type.into(),
            event_details: entry.event_details,
        }
    }
}

/// One page of results
#[derive(Debug, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub total_records: u64,
    pub page_index: u64,
    pub page_size: u32,
}

impl<T> PagedResponse<T> {
    pub fn from_page<U: Into<T>>(page: Page<U>, paging: Paging) -> Self {
        PagedResponse {
            items: page.items.into_iter().map(Into::into).collect(),
            total_records: page.total_records,
            page_index: paging.page_index,
            page_size: paging.page_size,
        }
    }
}

/// Generic API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}
