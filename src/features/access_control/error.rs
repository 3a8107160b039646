use thiserror::Error;

use crate::features::attributes::AttributeStoreError;
use crate::features::audit::AuditWriteError;
use crate::features::policies::CatalogueError;
use crate::features::resources::ResourceError;

/// Aggregates every failure mode `checkAccess` can surface. Each fatal
/// variant still drives a best-effort audit write before propagating —
/// see [`super::facade::AccessControlFacade`].
#[derive(Debug, Error)]
pub enum AccessControlError {
    #[error("resource not found")]
    ResourceNotFound,
    #[error("audit write failed: {0}")]
    AuditWriteError(#[from] AuditWriteError),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("evaluation timed out")]
    EvaluationTimeout,
}

impl From<AttributeStoreError> for AccessControlError {
    fn from(err: AttributeStoreError) -> Self {
        AccessControlError::StoreUnavailable(err.to_string())
    }
}

impl From<CatalogueError> for AccessControlError {
    fn from(err: CatalogueError) -> Self {
        AccessControlError::StoreUnavailable(err.to_string())
    }
}

impl From<ResourceError> for AccessControlError {
    fn from(err: ResourceError) -> Self {
        AccessControlError::StoreUnavailable(err.to_string())
    }
}
