use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterMap, FilterValue, SortDescriptor, SortDirection};

/// Paginated list request in server terms:
/// `page`, `pageSize`, `filters` (JSON object), `sortBy`, `sortOrder`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParams {
    pub page: u32,
    pub page_size: u32,
    pub filters: FilterMap,
    pub sort: Option<SortDescriptor>,
}

impl QueryParams {
    pub fn new(page: u32, page_size: u32, filters: FilterMap, sort: Option<SortDescriptor>) -> Self {
        Self {
            page,
            page_size,
            filters,
            sort,
        }
    }

    /// Unfiltered, unsorted first page; used for option lists and summaries
    pub fn first_page(page_size: u32) -> Self {
        Self::new(1, page_size, FilterMap::new(), None)
    }

    pub fn filters_json(&self) -> Result<String, FilterError> {
        Ok(serde_json::to_string(&self.filters)?)
    }

    pub fn sort_order(&self) -> SortDirection {
        self.sort
            .as_ref()
            .map(SortDescriptor::direction)
            .unwrap_or(SortDirection::Asc)
    }

    /// Query-string pairs in the order the server documents them.
    /// `sortBy` is omitted without an active sort; `sortOrder` is always present.
    pub fn to_pairs(&self) -> Result<Vec<(String, String)>, FilterError> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
            ("filters".to_string(), self.filters_json()?),
        ];
        if let Some(sort) = &self.sort {
            pairs.push(("sortBy".to_string(), sort.field.clone()));
        }
        pairs.push(("sortOrder".to_string(), self.sort_order().as_param().to_string()));
        Ok(pairs)
    }

    /// Decode query-string pairs back into parameters. Missing values take the
    /// view-state defaults; fields with empty value lists are dropped.
    pub fn parse<I, K, V>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::first_page(crate::store::DEFAULT_PAGE_SIZE);
        let mut sort_by: Option<String> = None;
        let mut direction = SortDirection::Asc;

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "page" => {
                    params.page = value
                        .parse::<u32>()
                        .ok()
                        .filter(|p| *p >= 1)
                        .ok_or_else(|| FilterError::InvalidPage(value.to_string()))?;
                }
                "pageSize" => {
                    params.page_size = value
                        .parse::<u32>()
                        .ok()
                        .filter(|p| *p >= 1)
                        .ok_or_else(|| FilterError::InvalidPageSize(value.to_string()))?;
                }
                "filters" => params.filters = Self::parse_filters(value)?,
                "sortBy" if !value.is_empty() => sort_by = Some(value.to_string()),
                "sortOrder" => {
                    direction = SortDirection::parse(value)
                        .ok_or_else(|| FilterError::InvalidSortOrder(value.to_string()))?;
                }
                _ => {}
            }
        }

        params.sort = sort_by.map(|field| SortDescriptor {
            field,
            descending: direction == SortDirection::Desc,
        });
        Ok(params)
    }

    fn parse_filters(raw: &str) -> Result<FilterMap, FilterError> {
        if raw.trim().is_empty() {
            return Ok(FilterMap::new());
        }
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(obj) = value else {
            return Err(FilterError::InvalidFilters(format!(
                "expected an object, got {}",
                raw
            )));
        };

        let mut filters = FilterMap::new();
        for (field, values) in obj {
            let values: Vec<FilterValue> = match values {
                Value::Null => continue,
                Value::Array(_) => serde_json::from_value(values)?,
                scalar => vec![serde_json::from_value(scalar)?],
            };
            if !values.is_empty() {
                filters.insert(field, values);
            }
        }
        Ok(filters)
    }
}
