//! Synchronization between a table controller and its entity's view-state store.
//!
//! Table events are translated into store mutations; store changes made from
//! anywhere else (Reset, another component) are pulled back into the table's
//! local filter and sorting mirrors.

use std::sync::Arc;

use tokio::sync::watch;

use crate::filter::filter_where::{patch_for, toggle_facet, with_column};
use crate::filter::{
    from_query, sort_from_query, sort_to_query, to_query, ColumnFilter, ColumnSort, FilterValue,
    NAME_FIELD,
};
use crate::store::{ViewState, ViewStateStore};
use crate::table::{PaginationState, TableController, Updater};

pub struct SyncBridge<T> {
    store: Arc<ViewStateStore>,
    changes: watch::Receiver<ViewState>,
    table: TableController<T>,
}

impl<T> SyncBridge<T> {
    /// Attach a fresh table to `store`, hydrated from its current state.
    pub fn new(store: Arc<ViewStateStore>) -> Self {
        let mut changes = store.subscribe();
        let mut table = TableController::new();
        hydrate(&mut table, &changes.borrow_and_update());
        Self {
            store,
            changes,
            table,
        }
    }

    pub fn store(&self) -> &Arc<ViewStateStore> {
        &self.store
    }

    pub fn table(&self) -> &TableController<T> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableController<T> {
        &mut self.table
    }

    pub fn view_state(&self) -> ViewState {
        self.store.snapshot()
    }

    /// The store's 1-based page as the table's 0-based index
    pub fn pagination(&self) -> PaginationState {
        let state = self.changes.borrow();
        PaginationState {
            page_index: state.page.saturating_sub(1),
            page_size: state.page_size,
        }
    }

    /// Whether the Reset control should be shown
    pub fn is_filtered(&self) -> bool {
        self.table.is_filtered()
    }

    pub fn on_column_filters_change(&mut self, updater: Updater<Vec<ColumnFilter>>) {
        let next = updater.resolve(&self.table.column_filters().to_vec());
        let mapping = to_query(&next);
        let previous = self.store.snapshot().filters;

        self.table.set_column_filters(from_query(&mapping));
        self.store.set_filters(patch_for(&previous, &mapping));
    }

    pub fn on_sorting_change(&mut self, updater: Updater<Vec<ColumnSort>>) {
        let next = updater.resolve(&self.table.sorting().to_vec());
        self.table.set_sorting(next);
        self.store.set_sort(sort_to_query(self.table.sorting()));
    }

    pub fn on_pagination_change(&mut self, updater: Updater<PaginationState>) {
        let next = updater.resolve(&self.pagination());
        self.store.set_page(next.page_index.saturating_add(1));
        self.store.set_page_size(next.page_size);
    }

    /// Select or deselect one option of a faceted column filter
    pub fn toggle_facet(&mut self, column: &str, value: impl Into<FilterValue>) {
        let next = toggle_facet(self.table.column_filters(), column, &value.into());
        self.on_column_filters_change(Updater::Value(next));
    }

    pub fn clear_facet(&mut self, column: &str) {
        let next = with_column(self.table.column_filters(), column, Vec::new());
        self.on_column_filters_change(Updater::Value(next));
    }

    /// Free-text search on the name column. An empty term clears it.
    pub fn set_search(&mut self, term: &str) {
        let next = with_column(
            self.table.column_filters(),
            NAME_FIELD,
            vec![FilterValue::from(term)],
        );
        self.on_column_filters_change(Updater::Value(next));
    }

    /// The Reset control: clears local filters and selection and resets the store.
    pub fn reset(&mut self) {
        self.table.reset_column_filters();
        self.table.reset_row_selection();
        self.store.reset();
        self.sync_from_store();
    }

    /// Re-hydrate the local mirrors if the store changed since the last sync.
    /// Returns whether anything was pulled.
    pub fn sync_from_store(&mut self) -> bool {
        if !self.changes.has_changed().unwrap_or(false) {
            return false;
        }
        let state = self.changes.borrow_and_update().clone();
        hydrate(&mut self.table, &state);
        true
    }

    /// Wait for the next store mutation and re-hydrate. Returns the new state.
    pub async fn changed(&mut self) -> Option<ViewState> {
        self.changes.changed().await.ok()?;
        let state = self.changes.borrow_and_update().clone();
        hydrate(&mut self.table, &state);
        Some(state)
    }
}

fn hydrate<T>(table: &mut TableController<T>, state: &ViewState) {
    table.set_column_filters(from_query(&state.filters));
    table.set_sorting(sort_from_query(state.sort.as_ref()));
}
