pub mod dto;
pub mod error;
pub mod facade;
pub mod routes;

pub use error::AccessControlError;
pub use facade::{AccessControlFacade, DEFAULT_EVALUATION_TIMEOUT, DEFAULT_AUDIT_BEST_EFFORT_TIMEOUT};
pub use routes::access_control_routes;
