pub mod routes;
pub mod service;

pub use routes::subject_routes;
pub use service::{SubjectError, SubjectService};
