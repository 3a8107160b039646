pub mod models;
pub mod reader;
pub mod routes;
pub mod writer;

pub use reader::{AuditQueryError, AuditReader};
pub use routes::audit_routes;
pub use writer::{AuditWriteError, AuditWriter, NewAccessLog, PolicyOutcomeRecord};
