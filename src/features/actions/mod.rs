pub mod models;
pub mod routes;
pub mod service;

pub use routes::action_routes;
pub use service::{ActionError, ActionService};
