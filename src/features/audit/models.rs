use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DecisionResult;

/// Filters for [`super::reader::AuditReader::query`]. Every field is
/// optional; an absent field imposes no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub subject_id: Option<Uuid>,
    pub resource_id: Option<Uuid>,
    pub action_id: Option<Uuid>,
    pub result: Option<DecisionResult>,
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
}

/// The closed set of sortable columns. Anything outside this set is
/// rejected by the caller, never passed through to SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuditSortField {
    CreatedAt,
    Result,
    SubjectId,
    ResourceId,
    ActionId,
}

impl AuditSortField {
    pub fn column(self) -> &'static str {
        match self {
            AuditSortField::CreatedAt => "created_at",
            AuditSortField::Result => "result",
            AuditSortField::SubjectId => "subject_id",
            AuditSortField::ResourceId => "resource_id",
            AuditSortField::ActionId => "action_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditSort {
    pub field: AuditSortField,
    pub direction: SortDirection,
}

impl Default for AuditSort {
    fn default() -> Self {
        Self {
            field: AuditSortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PagedAccessLogs {
    pub items: Vec<crate::domain::AccessLog>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditStatistics {
    pub total: i64,
    pub permits: i64,
    pub denies: i64,
    pub errors: i64,
    pub permit_rate: f64,
    pub deny_rate: f64,
    pub error_rate: f64,
}

pub const MAX_TOP_N: u32 = 100;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopEntry {
    pub id: Uuid,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PolicyDenyEntry {
    pub policy_id: Option<Uuid>,
    pub count: i64,
}
