//! Per-entity table view-state: what the user wants to see, independent of fetched data.

pub mod registry;
pub mod view_state;

pub use registry::StoreRegistry;
pub use view_state::{ViewState, ViewStateStore, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
