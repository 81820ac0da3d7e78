use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One accepted value of a column filter: facet codes and search terms are text,
/// status facets are booleans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Text(String),
}

impl FilterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            FilterValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterValue::Bool(b) => Some(*b),
            FilterValue::Text(_) => None,
        }
    }

    /// Key under which the server reports this value in `filterCounts`
    pub fn count_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// Store-side filters: field name to its ordered, non-empty list of accepted values.
/// Ordered by field so equal filters always serialize identically.
pub type FilterMap = BTreeMap<String, Vec<FilterValue>>;

/// Partial update merged into a [`FilterMap`]. `None` (or an empty list) removes the field.
pub type FilterPatch = BTreeMap<String, Option<Vec<FilterValue>>>;

/// Raw value carried by a table filter descriptor, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorValue {
    List(Vec<FilterValue>),
    Single(FilterValue),
}

/// Table-side filter descriptor `{id, value}`. A missing value is the table's "undefined".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<DescriptorValue>,
}

impl ColumnFilter {
    pub fn list(id: impl Into<String>, values: Vec<FilterValue>) -> Self {
        Self {
            id: id.into(),
            value: Some(DescriptorValue::List(values)),
        }
    }

    pub fn single(id: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            id: id.into(),
            value: Some(DescriptorValue::Single(value.into())),
        }
    }

    pub fn cleared(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: None,
        }
    }

    /// Values in array form; a scalar becomes a one-element list, undefined becomes empty.
    pub fn values(&self) -> Vec<FilterValue> {
        match &self.value {
            None => Vec::new(),
            Some(DescriptorValue::List(values)) => values.clone(),
            Some(DescriptorValue::Single(value)) => vec![value.clone()],
        }
    }
}

/// Table-side sort entry `{id, desc}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    pub id: String,
    pub desc: bool,
}

impl ColumnSort {
    pub fn new(id: impl Into<String>, desc: bool) -> Self {
        Self { id: id.into(), desc }
    }
}

/// The single active sort held by the view-state store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub field: String,
    pub descending: bool,
}

impl SortDescriptor {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn direction(&self) -> SortDirection {
        if self.descending {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}
