//! Paging value objects shared by every paged query

use serde::{Deserialize, Serialize};

/// Sort direction for time-ordered queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    /// Newest first
    #[default]
    Descending,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }

    /// Accepts `asc`/`ascending` and `desc`/`descending`, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Direction::Ascending),
            "desc" | "descending" => Some(Direction::Descending),
            _ => None,
        }
    }
}

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub page_index: u64,
    pub page_size: u32,
}

impl Paging {
    pub fn new(page_index: u64, page_size: u32) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> u64 {
        self.page_index.saturating_mul(u64::from(self.page_size))
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// Slice one page out of an already ordered sequence.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(offset)
            .take(self.page_size as usize)
            .collect()
    }
}

/// One page of results together with the number of records matching the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_records: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_records: u64) -> Self {
        Self {
            items,
            total_records,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_records: self.total_records,
        }
    }
}
