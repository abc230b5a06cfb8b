//! Report record types: raw input from the report store and its canonical form

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Sentinel key for a missing project or employee reference
pub const UNKNOWN_KEY: &str = "unknown";

/// Display label for a report with no project
pub const NO_PROJECT_LABEL: &str = "No Project";

/// Display label for a report with no employee
pub const UNKNOWN_EMPLOYEE_LABEL: &str = "Unknown";

/// A JSON scalar that may arrive as a number or as text (form values)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Render as a trimmed, non-empty key
    pub fn as_key(&self) -> Option<String> {
        let key = match self {
            Scalar::Integer(n) => n.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        };
        (!key.is_empty()).then_some(key)
    }

    /// Interpret as an hours value (no sign or finiteness check)
    pub fn as_hours(&self) -> Option<f64> {
        match self {
            Scalar::Integer(n) => Some(*n as f64),
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

/// A report as delivered by the report store, before validation.
///
/// Every field tolerates a wrong JSON type so one malformed record cannot
/// fail a whole export: references that are not scalars fall back to the
/// unknown sentinel, while dates and hours keep their raw text so the
/// normalizer can report why the record was skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_reference")]
    pub id: Option<Scalar>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_reference")]
    pub project_id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_reference")]
    pub employee_id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub employee_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub hours_worked: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub details: Option<String>,
}

fn scalar_from(value: &Value) -> Option<Scalar> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Scalar::Integer)
            .or_else(|| n.as_f64().map(Scalar::Number)),
        Value::String(s) => Some(Scalar::Text(s.clone())),
        _ => None,
    }
}

/// Scalar id, or the `_id`/`id` of a populated reference object
fn lenient_reference<'de, D>(deserializer: D) -> std::result::Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Object(map) => map
            .get("_id")
            .or_else(|| map.get("id"))
            .and_then(scalar_from),
        other => scalar_from(other),
    })
}

/// Any non-null value as text; non-strings keep their JSON rendering
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Numbers and strings as-is; anything else as text that will not parse
fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        value => Some(scalar_from(&value).unwrap_or_else(|| Scalar::Text(value.to_string()))),
    })
}

/// Strings only; other types are dropped
fn lenient_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Opaque identity of a project or employee plus its display label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn unknown_project() -> Self {
        Self::new(UNKNOWN_KEY, NO_PROJECT_LABEL)
    }

    pub fn unknown_employee() -> Self {
        Self::new(UNKNOWN_KEY, UNKNOWN_EMPLOYEE_LABEL)
    }

    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_KEY
    }
}

/// A validated report: one employee's hours against one project on one date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: String,
    pub date: NaiveDate,
    pub project: EntityRef,
    pub employee: EntityRef,
    pub hours_worked: f64,
    pub details: String,
}
