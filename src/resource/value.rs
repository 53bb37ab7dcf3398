//! Field values and JSON coercion
//!
//! Scalars are coerced leniently, the way the upstream API's own clients
//! treat its loosely-typed payloads. Date-times are the one strict case.

use super::instance::Resource;
use super::schema::PropertyKind;
use crate::error::MappingError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::fmt;

/// Wire format of date-time fields (always UTC)
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wire format of date fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Value held by one field of a resource instance
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    String(String),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Json(Value),
    One(Box<Resource>),
    Many(Vec<Resource>),
}

impl FieldValue {
    /// Whether this value can be stored in a property of `kind`
    pub fn matches(&self, kind: PropertyKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Integer(_), PropertyKind::Integer)
                | (FieldValue::String(_), PropertyKind::String)
                | (FieldValue::Boolean(_), PropertyKind::Boolean)
                | (FieldValue::DateTime(_), PropertyKind::DateTime)
                | (FieldValue::Date(_), PropertyKind::Date)
                | (FieldValue::Json(_), PropertyKind::Json)
        )
    }

    /// JSON form of a scalar value; relations render as their full objects
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Integer(n) => Value::from(*n),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::DateTime(dt) => Value::String(format_datetime(dt)),
            FieldValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
            FieldValue::Json(v) => v.clone(),
            FieldValue::One(res) => res.to_json(),
            FieldValue::Many(items) => Value::Array(items.iter().map(Resource::to_json).collect()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.write_str(s),
            other => match other.to_json() {
                Value::String(s) => f.write_str(&s),
                v => write!(f, "{}", v),
            },
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FieldValue::DateTime(dt)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

/// Convert a raw JSON value into a scalar of `kind`.
///
/// `Ok(None)` means the field stays unset (null, empty date, or a shape that
/// cannot be coerced at all).
pub fn coerce_scalar(field: &str, kind: PropertyKind, raw: &Value) -> Result<Option<FieldValue>, MappingError> {
    if raw.is_null() {
        return Ok(None);
    }

    let value = match kind {
        PropertyKind::Integer => coerce_integer(raw).map(FieldValue::Integer),
        PropertyKind::String => coerce_string(raw).map(FieldValue::String),
        PropertyKind::Boolean => coerce_boolean(raw).map(FieldValue::Boolean),
        PropertyKind::DateTime => parse_datetime(field, raw)?.map(FieldValue::DateTime),
        PropertyKind::Date => parse_date(field, raw)?.map(FieldValue::Date),
        PropertyKind::Json => Some(FieldValue::Json(raw.clone())),
    };

    Ok(value)
}

fn coerce_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .or(Some(0))
        },
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn coerce_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_boolean(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
        Value::String(s) => {
            let s = s.trim();
            Some(!(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")))
        },
        _ => None,
    }
}

fn parse_datetime(field: &str, raw: &Value) -> Result<Option<DateTime<Utc>>, MappingError> {
    let Some(text) = raw.as_str() else {
        return Err(invalid(field, raw));
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| invalid(field, raw))
}

fn parse_date(field: &str, raw: &Value) -> Result<Option<NaiveDate>, MappingError> {
    let Some(text) = raw.as_str() else {
        return Err(invalid(field, raw));
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(Some)
        .map_err(|_| invalid(field, raw))
}

fn invalid(field: &str, raw: &Value) -> MappingError {
    MappingError::InvalidDateTime {
        field: field.to_string(),
        value: match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Format a date-time the way the API expects it
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_datetime_parses_wire_format() {
        let value = coerce_scalar("due_on", PropertyKind::DateTime, &json!("2021-05-01 12:00:00")).unwrap();
        let expected = Utc.with_ymd_and_hms(2021, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(value, Some(FieldValue::DateTime(expected)));
    }

    #[test]
    fn test_datetime_empty_or_null_is_unset() {
        assert_eq!(coerce_scalar("due_on", PropertyKind::DateTime, &json!("")).unwrap(), None);
        assert_eq!(coerce_scalar("due_on", PropertyKind::DateTime, &Value::Null).unwrap(), None);
    }

    #[test]
    fn test_datetime_garbage_names_field() {
        let err = coerce_scalar("due_on", PropertyKind::DateTime, &json!("not-a-date")).unwrap_err();
        assert_eq!(
            err,
            MappingError::InvalidDateTime {
                field: "due_on".to_string(),
                value: "not-a-date".to_string(),
            }
        );
    }

    #[test]
    fn test_integer_coercion() {
        let int = |v: Value| coerce_scalar("n", PropertyKind::Integer, &v).unwrap();
        assert_eq!(int(json!(42)), Some(FieldValue::Integer(42)));
        assert_eq!(int(json!("17")), Some(FieldValue::Integer(17)));
        assert_eq!(int(json!(3.9)), Some(FieldValue::Integer(3)));
        assert_eq!(int(json!(true)), Some(FieldValue::Integer(1)));
        assert_eq!(int(json!("abc")), Some(FieldValue::Integer(0)));
        assert_eq!(int(json!({"a": 1})), None);
    }

    #[test]
    fn test_boolean_coercion() {
        let boolean = |v: Value| coerce_scalar("b", PropertyKind::Boolean, &v).unwrap();
        assert_eq!(boolean(json!(true)), Some(FieldValue::Boolean(true)));
        assert_eq!(boolean(json!(0)), Some(FieldValue::Boolean(false)));
        assert_eq!(boolean(json!("false")), Some(FieldValue::Boolean(false)));
        assert_eq!(boolean(json!("")), Some(FieldValue::Boolean(false)));
        assert_eq!(boolean(json!("yes")), Some(FieldValue::Boolean(true)));
    }

    #[test]
    fn test_string_coercion() {
        let string = |v: Value| coerce_scalar("s", PropertyKind::String, &v).unwrap();
        assert_eq!(string(json!("open")), Some(FieldValue::String("open".into())));
        assert_eq!(string(json!(12)), Some(FieldValue::String("12".into())));
        assert_eq!(string(json!([1, 2])), None);
    }

    #[test]
    fn test_date_roundtrip_text() {
        let value = coerce_scalar("until", PropertyKind::Date, &json!("2024-02-29")).unwrap().unwrap();
        assert_eq!(value.to_json(), json!("2024-02-29"));
    }

    #[test]
    fn test_display_for_path_segments() {
        assert_eq!(FieldValue::Integer(99).to_string(), "99");
        assert_eq!(FieldValue::from("item").to_string(), "item");
    }
}
