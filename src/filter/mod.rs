pub mod types;
pub mod params;
pub mod filter_where;
pub mod filter_order;
pub mod error;

pub use types::*;
pub use params::QueryParams;
pub use error::FilterError;
pub use filter_where::{from_query, to_query, NAME_FIELD};
pub use filter_order::{sort_from_query, sort_to_query};
