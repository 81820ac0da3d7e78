use super::types::{ColumnSort, SortDescriptor};

/// Table sorting to store sort: only the first entry is kept, no multi-column sort.
pub fn sort_to_query(sorting: &[ColumnSort]) -> Option<SortDescriptor> {
    sorting.first().map(|s| SortDescriptor {
        field: s.id.clone(),
        descending: s.desc,
    })
}

/// Store sort to the table's sorting array (zero or one entry).
pub fn sort_from_query(sort: Option<&SortDescriptor>) -> Vec<ColumnSort> {
    sort.map(|s| vec![ColumnSort::new(s.field.clone(), s.descending)])
        .unwrap_or_default()
}
