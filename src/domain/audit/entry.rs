//! Audit entries: free-form audited events with a performing and an affected party

use crate::domain::shared::{DomainError, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separates the categories of an event type, e.g. `content/publish`
pub const CATEGORY_SEPARATOR: char = '/';

/// Maximum length of an event type
pub const EVENT_TYPE_MAX_LEN: usize = 256;

/// Fractional second digits kept on timestamps, matching `TIMESTAMPTZ`
pub const TIMESTAMP_PRECISION: u16 = 6;

/// Validated event type.
///
/// Only alphanumeric characters, hyphens and `/` are allowed, and at least one
/// `/` must be present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventType(String);

impl EventType {
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();

        if !value.contains(CATEGORY_SEPARATOR)
            || !value
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == CATEGORY_SEPARATOR)
        {
            return Err(DomainError::ValidationError(
                "eventType must contain only alphanumeric characters, hyphens and at least one '/' defining a category"
                    .to_string(),
            ));
        }

        if value.chars().count() > EVENT_TYPE_MAX_LEN {
            return Err(DomainError::ValidationError(format!(
                "eventType must be at most {} characters",
                EVENT_TYPE_MAX_LEN
            )));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category segments, e.g. `["content", "publish"]`
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.split(CATEGORY_SEPARATOR)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EventType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.0
    }
}

impl PartialEq<str> for EventType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EventType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Arguments of a write; the event type is still unvalidated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAuditEntry {
    /// User triggering the audited event
    pub performing_user_id: i32,
    pub performing_details: String,
    /// IP address of the request triggering the event
    pub performing_ip: String,
    pub event_date: DateTime<Utc>,
    /// User affected by the audited event
    pub affected_user_id: i32,
    pub affected_details: String,
    pub event_type: String,
    pub event_details: String,
}

/// A recorded audit entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub performing_user_id: i32,
    pub performing_details: String,
    pub performing_ip: String,
    pub event_date: DateTime<Utc>,
    pub affected_user_id: i32,
    pub affected_details: String,
    pub event_type: EventType,
    pub event_details: String,
}

/// A write whose event type passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub performing_user_id: i32,
    pub performing_details: String,
    pub performing_ip: String,
    pub event_date: DateTime<Utc>,
    pub affected_user_id: i32,
    pub affected_details: String,
    pub event_type: EventType,
    pub event_details: String,
}

impl TryFrom<WriteAuditEntry> for NewAuditEntry {
    type Error = DomainError;

    fn try_from(w: WriteAuditEntry) -> Result<Self> {
        Ok(NewAuditEntry {
            event_type: EventType::parse(w.event_type)?,
            performing_user_id: w.performing_user_id,
            performing_details: w.performing_details,
            performing_ip: w.performing_ip,
            event_date: w.event_date.trunc_subsecs(TIMESTAMP_PRECISION),
            affected_user_id: w.affected_user_id,
            affected_details: w.affected_details,
            event_details: w.event_details,
        })
    }
}

impl NewAuditEntry {
    pub fn into_entry(self, id: i64) -> AuditEntry {
        AuditEntry {
            id,
            performing_user_id: self.performing_user_id,
            performing_details: self.performing_details,
            performing_ip: self.performing_ip,
            event_date: self.event_date,
            affected_user_id: self.affected_user_id,
            affected_details: self.affected_details,
            event_type: self.event_type,
            event_details: self.event_details,
        }
    }
}
