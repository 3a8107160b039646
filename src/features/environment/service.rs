use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::domain::AttributeValue;
use crate::features::evaluation::condition::AttributeBag;

/// Request-scoped facts the facade gathers from the surrounding transport
/// layer before calling into the decision engine. Opaque to everything
/// except [`EnvironmentProvider`].
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub request_method: Option<String>,
    pub request_path: Option<String>,
    pub user_agent: Option<String>,
}

/// Produces the environment attribute map for one evaluation. Non-blocking,
/// pure aside from the clock read the caller hands it via `at`.
pub struct EnvironmentProvider;

impl EnvironmentProvider {
    /// Builds the reserved-key environment bag for instant `at`, then
    /// merges `overrides` on top — caller-supplied keys win on conflict,
    /// including over the reserved keys' *values* (not their types).
    pub fn build(at: DateTime<Utc>, ctx: &RequestContext, overrides: &AttributeBag) -> AttributeBag {
        let mut bag = AttributeBag::new();

        if let Some(ip) = &ctx.ip_address {
            bag.insert("ipAddress".to_string(), AttributeValue::String(ip.clone()));
        }
        if let Some(method) = &ctx.request_method {
            bag.insert(
                "requestMethod".to_string(),
                AttributeValue::String(method.clone()),
            );
        }
        if let Some(path) = &ctx.request_path {
            bag.insert(
                "requestPath".to_string(),
                AttributeValue::String(path.clone()),
            );
        }
        if let Some(ua) = &ctx.user_agent {
            bag.insert(
                "userAgent".to_string(),
                AttributeValue::String(ua.clone()),
            );
        }

        let hour = at.hour();
        bag.insert("hourOfDay".to_string(), AttributeValue::Number(hour as f64));
        bag.insert(
            "dayOfWeek".to_string(),
            AttributeValue::String(weekday_code(at.weekday()).to_string()),
        );
        bag.insert(
            "isBusinessHours".to_string(),
            AttributeValue::Boolean((8..18).contains(&hour)),
        );

        for (key, value) in overrides {
            match value {
                Ok(v) => bag.insert(key.clone(), v.clone()),
                Err(reason) => bag.insert_unparseable(key.clone(), reason.clone()),
            }
        }

        bag
    }
}

fn weekday_code(day: chrono::Weekday) -> &'static str {
    match day {
        chrono::Weekday::Mon => "Mon",
        chrono::Weekday::Tue => "Tue",
        chrono::Weekday::Wed => "Wed",
        chrono::Weekday::Thu => "Thu",
        chrono::Weekday::Fri => "Fri",
        chrono::Weekday::Sat => "Sat",
        chrono::Weekday::Sun => "Sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn business_hours_boundary() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap(); // Monday
        let bag = EnvironmentProvider::build(at, &RequestContext::default(), &AttributeBag::new());
        assert_eq!(bag.get("isBusinessHours"), Some(&Ok(AttributeValue::Boolean(true))));
        assert_eq!(bag.get("dayOfWeek"), Some(&Ok(AttributeValue::String("Mon".to_string()))));
    }

    #[test]
    fn after_hours_is_false() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 18, 0, 0).unwrap();
        let bag = EnvironmentProvider::build(at, &RequestContext::default(), &AttributeBag::new());
        assert_eq!(bag.get("isBusinessHours"), Some(&Ok(AttributeValue::Boolean(false))));
    }

    #[test]
    fn caller_override_wins() {
        let at = Utc::now();
        let mut overrides = AttributeBag::new();
        overrides.insert(
            "ipAddress".to_string(),
            AttributeValue::String("10.0.0.1".to_string()),
        );
        let ctx = RequestContext {
            ip_address: Some("192.168.0.1".to_string()),
            ..Default::default()
        };
        let bag = EnvironmentProvider::build(at, &ctx, &overrides);
        assert_eq!(
            bag.get("ipAddress"),
            Some(&Ok(AttributeValue::String("10.0.0.1".to_string())))
        );
    }
}
