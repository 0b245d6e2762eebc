//! Page requests and the paginated response envelope

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// One page worth of query parameters. Pages are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub search: String,
    /// Extra equality filters sent as query parameters (e.g. `estado`)
    pub filters: BTreeMap<String, String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search: String::new(),
            filters: BTreeMap::new(),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Rows before this page, saturating for absurd page numbers.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Query string pairs; `search` is omitted when blank.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search".to_string(), search.to_string()));
        }
        for (k, v) in &self.filters {
            pairs.push((k.clone(), v.clone()));
        }
        pairs
    }
}

/// `ceil(total / limit)`; zero for an empty result set.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(default)]
    pub last_page: u64,
}

impl PageMeta {
    pub fn for_request(total: u64, request: &PageRequest) -> Self {
        Self {
            total,
            page: request.page,
            limit: request.limit,
            last_page: total_pages(total, request.limit),
        }
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn empty(request: &PageRequest) -> Self {
        Self {
            data: Vec::new(),
            meta: PageMeta::for_request(0, request),
        }
    }

    /// Slice a full result set locally, for endpoints that return plain arrays.
    pub fn from_full(items: Vec<T>, request: &PageRequest) -> Self {
        let total = items.len() as u64;
        let data = items
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit).unwrap_or(usize::MAX))
            .collect();
        Self {
            data,
            meta: PageMeta::for_request(total, request),
        }
    }
}

/// List endpoints answer with either the envelope or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Paged(Paginated<T>),
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Paged(p) => p.data,
            ListEnvelope::Bare(items) => items,
        }
    }

    pub fn into_page(self, request: &PageRequest) -> Paginated<T> {
        match self {
            ListEnvelope::Paged(p) => p,
            ListEnvelope::Bare(items) => Paginated::from_full(items, request),
        }
    }
}
