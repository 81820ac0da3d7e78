use serde::Serialize;
use tokio::sync::watch;

use crate::filter::filter_where::merge;
use crate::filter::{FilterError, FilterMap, FilterPatch, QueryParams, SortDescriptor};
use crate::types::Entity;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page, page size, filters and sort for one entity table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// 1-based
    pub page: u32,
    pub page_size: u32,
    pub filters: FilterMap,
    pub sort: Option<SortDescriptor>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            filters: FilterMap::new(),
            sort: None,
        }
    }
}

impl ViewState {
    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn to_params(&self) -> QueryParams {
        QueryParams::new(self.page, self.page_size, self.filters.clone(), self.sort.clone())
    }

    /// Request pairs for this view; fails only if the filters cannot be encoded
    pub fn to_pairs(&self) -> Result<Vec<(String, String)>, FilterError> {
        self.to_params().to_pairs()
    }
}

/// State container for one entity's view-state.
///
/// Mutations go through the setters only and every one of them notifies all
/// subscribers, including no-op writes. There is no persistence: a new store
/// always starts from defaults.
#[derive(Debug)]
pub struct ViewStateStore {
    entity: Entity,
    state: watch::Sender<ViewState>,
}

impl ViewStateStore {
    pub fn new(entity: Entity) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self { entity, state }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receiver that wakes after every mutation
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Pages are 1-based; zero is clamped to the first page.
    pub fn set_page(&self, page: u32) {
        let page = page.max(DEFAULT_PAGE);
        self.state.send_modify(|s| s.page = page);
        tracing::debug!(entity = %self.entity, page, "view-state page set");
    }

    pub fn set_page_size(&self, page_size: u32) {
        let page_size = page_size.max(1);
        self.state.send_modify(|s| s.page_size = page_size);
        tracing::debug!(entity = %self.entity, page_size, "view-state page size set");
    }

    /// Shallow, key-by-key merge. A `None` or empty list removes that field.
    pub fn set_filters(&self, patch: FilterPatch) {
        self.state.send_modify(|s| merge(&mut s.filters, patch));
        tracing::debug!(entity = %self.entity, filters = ?self.state.borrow().filters, "view-state filters merged");
    }

    pub fn set_sort(&self, sort: Option<SortDescriptor>) {
        tracing::debug!(entity = %self.entity, sort = ?sort, "view-state sort set");
        self.state.send_modify(|s| s.sort = sort);
    }

    /// Restore every default in a single write
    pub fn reset(&self) {
        self.state.send_replace(ViewState::default());
        tracing::debug!(entity = %self.entity, "view-state reset");
    }
}
