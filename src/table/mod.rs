//! Table controller: renders server-prepared rows and keeps local, non-authoritative
//! mirrors of selection, visibility, sorting and column filters.
//!
//! The controller only runs in manual mode. It never filters, sorts or paginates
//! the rows it is given; the server already did that for the requested page.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::filter::{ColumnFilter, ColumnSort};

/// A state change as the table reports it: a replacement value, or a function of the current one.
pub enum Updater<T> {
    Value(T),
    Apply(Box<dyn FnOnce(&T) -> T + Send>),
}

impl<T> Updater<T> {
    pub fn apply(f: impl FnOnce(&T) -> T + Send + 'static) -> Self {
        Updater::Apply(Box::new(f))
    }

    pub fn resolve(self, current: &T) -> T {
        match self {
            Updater::Value(value) => value,
            Updater::Apply(f) => f(current),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Updater<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Updater::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Updater::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// 0-based pagination as the table sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: u32,
    pub page_size: u32,
}

pub struct TableController<T> {
    rows: Vec<T>,
    page_count: u32,
    row_selection: BTreeSet<usize>,
    column_visibility: HashMap<String, bool>,
    sorting: Vec<ColumnSort>,
    column_filters: Vec<ColumnFilter>,
}

impl<T> Default for TableController<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            page_count: 0,
            row_selection: BTreeSet::new(),
            column_visibility: HashMap::new(),
            sorting: Vec::new(),
            column_filters: Vec::new(),
        }
    }
}

impl<T> TableController<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pagination, sorting and filtering are always server-side
    pub fn is_manual(&self) -> bool {
        true
    }

    /// Hand a fetched page to the table. Selection is positional, so it is cleared.
    pub fn set_data(&mut self, rows: Vec<T>, page_count: u32) {
        self.rows = rows;
        self.page_count = page_count;
        self.row_selection.clear();
    }

    /// Rows exactly as received
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn sorting(&self) -> &[ColumnSort] {
        &self.sorting
    }

    /// Local sorting mirror; at most one entry is kept
    pub fn set_sorting(&mut self, mut sorting: Vec<ColumnSort>) {
        sorting.truncate(1);
        self.sorting = sorting;
    }

    pub fn column_filters(&self) -> &[ColumnFilter] {
        &self.column_filters
    }

    pub fn set_column_filters(&mut self, filters: Vec<ColumnFilter>) {
        self.column_filters = filters;
    }

    pub fn column_filter(&self, column: &str) -> Option<&ColumnFilter> {
        self.column_filters.iter().find(|f| f.id == column)
    }

    /// Any active column filter; the Reset control is shown only then
    pub fn is_filtered(&self) -> bool {
        !self.column_filters.is_empty()
    }

    pub fn reset_column_filters(&mut self) {
        self.column_filters.clear();
    }

    // Row selection

    pub fn toggle_row_selected(&mut self, index: usize) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        if !self.row_selection.remove(&index) {
            self.row_selection.insert(index);
        }
        true
    }

    pub fn is_row_selected(&self, index: usize) -> bool {
        self.row_selection.contains(&index)
    }

    pub fn toggle_all_rows_selected(&mut self, selected: bool) {
        if selected {
            self.row_selection = (0..self.rows.len()).collect();
        } else {
            self.row_selection.clear();
        }
    }

    pub fn selected_rows(&self) -> Vec<&T> {
        self.row_selection
            .iter()
            .filter_map(|&i| self.rows.get(i))
            .collect()
    }

    pub fn reset_row_selection(&mut self) {
        self.row_selection.clear();
    }

    // Column visibility

    pub fn set_column_visibility(&mut self, column: impl Into<String>, visible: bool) {
        self.column_visibility.insert(column.into(), visible);
    }

    pub fn toggle_column_visibility(&mut self, column: &str) {
        let visible = self.is_column_visible(column);
        self.set_column_visibility(column, !visible);
    }

    /// Columns are visible unless hidden explicitly
    pub fn is_column_visible(&self, column: &str) -> bool {
        self.column_visibility.get(column).copied().unwrap_or(true)
    }
}
