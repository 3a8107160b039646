use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A value bound to a subject for a given attribute, with optional temporal
/// validity. At most one live, non-expired row per `(subject_id,
/// attribute_id)` is expected to exist; historical rows may accumulate.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubjectAttribute {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub attribute_id: Uuid,
    pub value: String,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubjectAttribute {
    /// True iff this row is live and `at` falls within `[valid_from, valid_to]`.
    pub fn active_at(&self, at: DateTime<Utc>) -> bool {
        if self.is_deleted {
            return false;
        }
        let from_ok = self.valid_from.map_or(true, |from| from <= at);
        let to_ok = self.valid_to.map_or(true, |to| to >= at);
        from_ok && to_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(valid_from: Option<DateTime<Utc>>, valid_to: Option<DateTime<Utc>>) -> SubjectAttribute {
        SubjectAttribute {
            id: Uuid::new_v4(),
            subject_id: Uuid::new_v4(),
            attribute_id: Uuid::new_v4(),
            value: "5".to_string(),
            valid_from,
            valid_to,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn active_with_no_bounds() {
        assert!(row(None, None).active_at(Utc::now()));
    }

    #[test]
    fn inactive_after_expiry() {
        let now = Utc::now();
        let r = row(None, Some(now - Duration::days(1)));
        assert!(!r.active_at(now));
    }

    #[test]
    fn inactive_before_start() {
        let now = Utc::now();
        let r = row(Some(now + Duration::days(1)), None);
        assert!(!r.active_at(now));
    }

    #[test]
    fn soft_deleted_never_active() {
        let mut r = row(None, None);
        r.is_deleted = true;
        assert!(!r.active_at(Utc::now()));
    }
}
