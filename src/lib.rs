pub mod api;
pub mod bridge;
pub mod config;
pub mod confirm;
pub mod dashboard;
pub mod entities;
pub mod error;
pub mod filter;
pub mod session;
pub mod store;
pub mod table;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use error::ApiError;
pub use session::{AdminSession, Feature};
pub use types::{Entity, Operation};
