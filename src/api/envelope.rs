use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::filter::FilterValue;

/// Per-field value histograms, e.g. `{"isActive": {"true": 12, "false": 3}}`
pub type FilterCounts = BTreeMap<String, BTreeMap<String, u64>>;

/// Paginated list envelope returned by `GET /{entity}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_counts: Option<FilterCounts>,
}

impl<T> Page<T> {
    /// Envelope for a complete, unpaginated list
    pub fn single(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        let page_size = u32::try_from(data.len()).unwrap_or(u32::MAX).max(1);
        Self {
            data,
            total,
            page: 1,
            page_size,
            total_pages: 1,
            has_next: false,
            filter_counts: None,
        }
    }

    /// Server-reported count for one facet value, if the envelope carries counts
    pub fn count_for(&self, field: &str, value: &FilterValue) -> Option<u64> {
        self.filter_counts
            .as_ref()?
            .get(field)?
            .get(&value.count_key())
            .copied()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_next: self.has_next,
            filter_counts: self.filter_counts,
        }
    }
}

/// One selectable option of a faceted filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub label: &'static str,
    pub value: FilterValue,
}

impl FilterOption {
    pub fn text(label: &'static str, value: &str) -> Self {
        Self {
            label,
            value: FilterValue::from(value),
        }
    }

    pub fn flag(label: &'static str, value: bool) -> Self {
        Self {
            label,
            value: FilterValue::Bool(value),
        }
    }

    /// Badge count for this option taken from a page's `filterCounts`
    pub fn count_in<T>(&self, page: &Page<T>, field: &str) -> Option<u64> {
        page.count_for(field, &self.value)
    }
}

/// Option-list endpoints answer with either the envelope or a bare array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Paged(Page<T>),
    Bare(Vec<T>),
}

impl<T> ListPayload<T> {
    pub fn total(&self) -> u64 {
        match self {
            ListPayload::Paged(page) => page.total,
            ListPayload::Bare(items) => items.len() as u64,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Paged(page) => page.data,
            ListPayload::Bare(items) => items,
        }
    }

    pub fn into_page(self) -> Page<T> {
        match self {
            ListPayload::Paged(page) => page,
            ListPayload::Bare(items) => Page::single(items),
        }
    }
}
