pub mod models;
pub mod routes;
pub mod store;

pub use store::{AttributeStore, AttributeStoreError};
