//! Column filter translation between the table's descriptor list and the
//! store's flattened field-to-values mapping.

use super::types::{ColumnFilter, FilterMap, FilterPatch, FilterValue};

/// Free-text search column. An empty search box is never sent as a filter.
pub const NAME_FIELD: &str = "name";

/// Normalize one descriptor into the values the store should hold, or `None`
/// when the descriptor carries no constraint.
pub fn normalize(descriptor: &ColumnFilter) -> Option<Vec<FilterValue>> {
    let values = descriptor.values();
    if values.is_empty() {
        return None;
    }

    if descriptor.id == NAME_FIELD {
        // The search box holds one term
        return match values.into_iter().next() {
            Some(FilterValue::Text(term)) if term.trim().is_empty() => None,
            Some(term) => Some(vec![term]),
            None => None,
        };
    }

    Some(values)
}

/// Table descriptors to store mapping. Later descriptors for the same id win;
/// descriptors without values are discarded, a blank search term clears `name`.
pub fn to_query(descriptors: &[ColumnFilter]) -> FilterMap {
    descriptors
        .iter()
        .filter(|descriptor| !descriptor.values().is_empty())
        .fold(FilterMap::new(), |mut acc, descriptor| {
            match normalize(descriptor) {
                Some(values) => {
                    acc.insert(descriptor.id.clone(), values);
                }
                None => {
                    acc.remove(&descriptor.id);
                }
            }
            acc
        })
}

/// Store mapping to table descriptors: one per non-empty field, values in array form.
pub fn from_query(filters: &FilterMap) -> Vec<ColumnFilter> {
    filters
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(id, values)| ColumnFilter::list(id.clone(), values.clone()))
        .collect()
}

/// Patch that turns `previous` into `next` under shallow merge: every field of
/// `next` is set, every field only in `previous` is removed.
pub fn patch_for(previous: &FilterMap, next: &FilterMap) -> FilterPatch {
    let mut patch: FilterPatch = next
        .iter()
        .map(|(id, values)| (id.clone(), Some(values.clone())))
        .collect();
    for id in previous.keys() {
        if !next.contains_key(id) {
            patch.insert(id.clone(), None);
        }
    }
    patch
}

/// Shallow merge used by the store: key-by-key overwrite, `None`/empty removes.
pub fn merge(filters: &mut FilterMap, patch: FilterPatch) {
    for (id, values) in patch {
        match values {
            Some(values) if !values.is_empty() => {
                filters.insert(id, values);
            }
            _ => {
                filters.remove(&id);
            }
        }
    }
}

/// Descriptor list after toggling one option of a faceted filter.
/// Deselecting the last option drops the descriptor.
pub fn toggle_facet(
    descriptors: &[ColumnFilter],
    column: &str,
    value: &FilterValue,
) -> Vec<ColumnFilter> {
    let mut selected = descriptors
        .iter()
        .find(|d| d.id == column)
        .map(ColumnFilter::values)
        .unwrap_or_default();

    if let Some(pos) = selected.iter().position(|v| v == value) {
        selected.remove(pos);
    } else {
        selected.push(value.clone());
    }

    with_column(descriptors, column, selected)
}

/// Descriptor list with `column` replaced by `values` (dropped when empty).
pub fn with_column(
    descriptors: &[ColumnFilter],
    column: &str,
    values: Vec<FilterValue>,
) -> Vec<ColumnFilter> {
    let mut next: Vec<ColumnFilter> = descriptors
        .iter()
        .filter(|d| d.id != column)
        .cloned()
        .collect();
    if !values.is_empty() {
        next.push(ColumnFilter::list(column, values));
    }
    next
}
