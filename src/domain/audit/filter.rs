//! Typed filters for audit item queries

use super::item::{AuditItem, AuditType};
use crate::domain::shared::Direction;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Additional conditions on audit items. Every present condition must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditItemFilter {
    /// Case-insensitive substring of the comment
    pub comment_contains: Option<String>,
    /// Inclusive lower bound on creation time
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    pub created_to: Option<DateTime<Utc>>,
    /// Narrow an entity query to one user
    pub user_id: Option<i32>,
    /// Narrow a user query to one entity
    pub entity_id: Option<i32>,
}

impl AuditItemFilter {
    pub fn is_empty(&self) -> bool {
        self == &AuditItemFilter::default()
    }

    pub fn matches(&self, item: &AuditItem) -> bool {
        if let Some(ref needle) = self.comment_contains {
            if !item.comment.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if item.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if item.created_at > to {
                return false;
            }
        }
        if let Some(user_id) = self.user_id {
            if item.user_id != user_id {
                return false;
            }
        }
        if let Some(entity_id) = self.entity_id {
            if item.entity_id != entity_id {
                return false;
            }
        }
        true
    }
}

/// Optional arguments of the paged item queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagedItemsOptions {
    pub direction: Direction,
    /// Restrict to these categories; `None` or empty means all
    pub audit_types: Option<Vec<AuditType>>,
    pub filter: Option<AuditItemFilter>,
}

impl PagedItemsOptions {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_audit_types(mut self, audit_types: Vec<AuditType>) -> Self {
        self.audit_types = Some(audit_types);
        self
    }

    pub fn with_filter(mut self, filter: AuditItemFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Whose audit trail a query reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditItemScope {
    All,
    Entity(i32),
    User(i32),
}

/// Query understood by every audit item repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditItemQuery {
    pub scope: AuditItemScope,
    pub direction: Direction,
    pub audit_types: Vec<AuditType>,
    pub filter: AuditItemFilter,
}

impl AuditItemQuery {
    pub fn new(scope: AuditItemScope) -> Self {
        Self {
            scope,
            direction: Direction::Descending,
            audit_types: Vec::new(),
            filter: AuditItemFilter::default(),
        }
    }

    pub fn for_entity(entity_id: i32, options: PagedItemsOptions) -> Self {
        Self::new(AuditItemScope::Entity(entity_id)).with_options(options)
    }

    pub fn for_user(user_id: i32, options: PagedItemsOptions) -> Self {
        Self::new(AuditItemScope::User(user_id)).with_options(options)
    }

    fn with_options(mut self, options: PagedItemsOptions) -> Self {
        self.direction = options.direction;
        self.audit_types = options.audit_types.unwrap_or_default();
        self.filter = options.filter.unwrap_or_default();
        self
    }

    pub fn matches(&self, item: &AuditItem) -> bool {
        let in_scope = match self.scope {
            AuditItemScope::All => true,
            AuditItemScope::Entity(entity_id) => item.entity_id == entity_id,
            AuditItemScope::User(user_id) => item.user_id == user_id,
        };

        in_scope
            && (self.audit_types.is_empty() || self.audit_types.contains(&item.audit_type))
            && self.filter.matches(item)
    }

    /// Ordering by creation time, ties broken by id, both in the query direction.
    pub fn compare(&self, a: &AuditItem, b: &AuditItem) -> Ordering {
        let ascending = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
        match self.direction {
            Direction::Ascending => ascending,
            Direction::Descending => ascending.reverse(),
        }
    }
}
