use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(String),

    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),

    #[error("Invalid filters: {0}")]
    InvalidFilters(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
