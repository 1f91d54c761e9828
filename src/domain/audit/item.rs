//! Audit items: lightweight "who did what to which entity" records

use super::entry::TIMESTAMP_PRECISION;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Category of an audit item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditType {
    New,
    Save,
    Open,
    Delete,
    Publish,
    SendToPublish,
    Unpublish,
    Move,
    Copy,
    AssignDomain,
    PublicAccess,
    Sort,
    Notify,
    System,
    Rollback,
    PackagerInstall,
    PackagerUninstall,
    Custom,
}

impl AuditType {
    pub const ALL: [AuditType; 18] = [
        AuditType::New,
        AuditType::Save,
        AuditType::Open,
        AuditType::Delete,
        AuditType::Publish,
        AuditType::SendToPublish,
        AuditType::Unpublish,
        AuditType::Move,
        AuditType::Copy,
        AuditType::AssignDomain,
        AuditType::PublicAccess,
        AuditType::Sort,
        AuditType::Notify,
        AuditType::System,
        AuditType::Rollback,
        AuditType::PackagerInstall,
        AuditType::PackagerUninstall,
        AuditType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditType::New => "new",
            AuditType::Save => "save",
            AuditType::Open => "open",
            AuditType::Delete => "delete",
            AuditType::Publish => "publish",
            AuditType::SendToPublish => "send_to_publish",
            AuditType::Unpublish => "unpublish",
            AuditType::Move => "move",
            AuditType::Copy => "copy",
            AuditType::AssignDomain => "assign_domain",
            AuditType::PublicAccess => "public_access",
            AuditType::Sort => "sort",
            AuditType::Notify => "notify",
            AuditType::System => "system",
            AuditType::Rollback => "rollback",
            AuditType::PackagerInstall => "packager_install",
            AuditType::PackagerUninstall => "packager_uninstall",
            AuditType::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for AuditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded audit item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditItem {
    /// System assigned, increasing
    pub id: i64,

    /// Entity the action was performed on
    pub entity_id: i32,

    /// User who performed the action
    pub user_id: i32,

    pub audit_type: AuditType,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Data for an audit item that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditItem {
    pub entity_id: i32,
    pub user_id: i32,
    pub audit_type: AuditType,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl NewAuditItem {
    /// Stamp a new item with the current time
    pub fn new(audit_type: AuditType, comment: impl Into<String>, user_id: i32, entity_id: i32) -> Self {
        Self {
            entity_id,
            user_id,
            audit_type,
            comment: comment.into(),
            created_at: Utc::now().trunc_subsecs(TIMESTAMP_PRECISION),
        }
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at.trunc_subsecs(TIMESTAMP_PRECISION);
        self
    }

    pub fn into_item(self, id: i64) -> AuditItem {
        AuditItem {
            id,
            entity_id: self.entity_id,
            user_id: self.user_id,
            audit_type: self.audit_type,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}
