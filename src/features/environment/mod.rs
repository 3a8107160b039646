pub mod service;

pub use service::{EnvironmentProvider, RequestContext};
