pub mod models;
pub mod routes;
pub mod service;

pub use routes::resource_routes;
pub use service::{ResourceError, ResourceService};
