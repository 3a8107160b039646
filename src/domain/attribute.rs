use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three ABAC attribute categories a [`crate::domain::PolicyCondition`] can
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "PascalCase")]
pub enum AttributeCategory {
    Subject,
    Resource,
    Environment,
}

impl fmt::Display for AttributeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeCategory::Subject => write!(f, "Subject"),
            AttributeCategory::Resource => write!(f, "Resource"),
            AttributeCategory::Environment => write!(f, "Environment"),
        }
    }
}

/// The primitive type carried by an [`crate::domain::AttributeSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "PascalCase")]
pub enum AttributeType {
    String,
    Number,
    Boolean,
    DateTime,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => write!(f, "String"),
            AttributeType::Number => write!(f, "Number"),
            AttributeType::Boolean => write!(f, "Boolean"),
            AttributeType::DateTime => write!(f, "DateTime"),
        }
    }
}

/// A typed, resolved attribute value. Produced by the Attribute Store (C1)
/// from a schema + string-encoded row, and by the Condition Evaluator (C4)
/// from a condition's `expectedValue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum AttributeValue {
    String(String),
    Number(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
}

impl AttributeValue {
    pub fn type_of(&self) -> AttributeType {
        match self {
            AttributeValue::String(_) => AttributeType::String,
            AttributeValue::Number(_) => AttributeType::Number,
            AttributeValue::Boolean(_) => AttributeType::Boolean,
            AttributeValue::DateTime(_) => AttributeType::DateTime,
        }
    }
}

impl AttributeType {
    /// Parses a raw, string-encoded value per this type's grammar.
    ///
    /// DateTime values without an explicit zone are interpreted as UTC.
    pub fn parse(self, raw: &str) -> Result<AttributeValue, String> {
        match self {
            AttributeType::String => Ok(AttributeValue::String(raw.to_string())),
            AttributeType::Number => {
                let n: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("'{raw}' is not a valid Number"))?;
                if n.is_nan() {
                    return Err("NaN is not a comparable Number".to_string());
                }
                Ok(AttributeValue::Number(n))
            }
            AttributeType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(AttributeValue::Boolean(true)),
                "false" => Ok(AttributeValue::Boolean(false)),
                _ => Err(format!("'{raw}' is not a valid Boolean")),
            },
            AttributeType::DateTime => parse_datetime(raw)
                .map(AttributeValue::DateTime)
                .ok_or_else(|| format!("'{raw}' is not a valid DateTime")),
        }
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Some(dt.with_timezone(&Utc));
    }
    // No explicit zone: interpret as UTC.
    chrono::NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_number() {
        assert_eq!(
            AttributeType::Number.parse("5").unwrap(),
            AttributeValue::Number(5.0)
        );
    }

    #[test]
    fn rejects_nan_equivalent() {
        assert!(AttributeType::Number.parse("nan").is_err());
    }

    #[test]
    fn parses_bare_datetime_as_utc() {
        let v = AttributeType::DateTime.parse("2026-01-01T00:00:00").unwrap();
        match v {
            AttributeValue::DateTime(dt) => assert_eq!(dt.timezone(), Utc),
            _ => panic!("expected DateTime"),
        }
    }

    #[test]
    fn rejects_malformed_boolean() {
        assert!(AttributeType::Boolean.parse("yes").is_err());
    }
}
