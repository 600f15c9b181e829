//! Document value representation and Firestore wire encoding

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::json;

use super::error::StoreError;

/// A value stored in a document field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/empty value
    Null,
    /// String value
    String(String),
    /// Whole number (integer)
    Int(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Date and time
    Timestamp(DateTime<Utc>),
    /// Ordered list of values
    Array(Vec<Value>),
    /// Nested document
    Map(BTreeMap<String, Value>),
}

/// The field set of one document
pub type Fields = BTreeMap<String, Value>;

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Encode into the store's typed wire representation
    ///
    /// Integers travel as strings on the wire, per the REST contract.
    pub fn to_api(&self) -> serde_json::Value {
        match self {
            Value::Null => json!({ "nullValue": null }),
            Value::String(s) => json!({ "stringValue": s }),
            Value::Int(i) => json!({ "integerValue": i.to_string() }),
            Value::Float(f) => json!({ "doubleValue": f }),
            Value::Bool(b) => json!({ "booleanValue": b }),
            Value::Timestamp(dt) => json!({ "timestampValue": dt.to_rfc3339() }),
            Value::Array(items) => {
                let values: Vec<serde_json::Value> = items.iter().map(Value::to_api).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Value::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
        }
    }

    /// Decode from the store's typed wire representation
    pub fn from_api(api: &serde_json::Value) -> Result<Self, StoreError> {
        let obj = api
            .as_object()
            .ok_or_else(|| StoreError::InvalidResponse(format!("expected typed value, got {api}")))?;
        let (kind, inner) = obj
            .iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse("empty typed value".into()))?;

        match kind.as_str() {
            "nullValue" => Ok(Value::Null),
            "stringValue" => Ok(Value::String(inner.as_str().unwrap_or_default().to_string())),
            "integerValue" => {
                // The REST API emits integers as strings
                let i = match inner {
                    serde_json::Value::String(s) => s.parse::<i64>().ok(),
                    serde_json::Value::Number(n) => n.as_i64(),
                    _ => None,
                };
                i.map(Value::Int).ok_or_else(|| {
                    StoreError::InvalidResponse(format!("invalid integerValue: {inner}"))
                })
            }
            "doubleValue" => inner
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| StoreError::InvalidResponse(format!("invalid doubleValue: {inner}"))),
            "booleanValue" => inner
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| StoreError::InvalidResponse(format!("invalid booleanValue: {inner}"))),
            "timestampValue" => {
                let s = inner.as_str().unwrap_or_default();
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| Value::Timestamp(dt.with_timezone(&Utc)))
                    .map_err(|_| StoreError::InvalidResponse(format!("invalid timestampValue: {s}")))
            }
            "arrayValue" => {
                let values = inner
                    .get("values")
                    .and_then(|v| v.as_array())
                    .map(|items| items.iter().map(Value::from_api).collect::<Result<_, _>>())
                    .unwrap_or_else(|| Ok(Vec::new()))?;
                Ok(Value::Array(values))
            }
            "mapValue" => {
                let fields = match inner.get("fields").and_then(|f| f.as_object()) {
                    Some(obj) => decode_fields(obj)?,
                    None => Fields::new(),
                };
                Ok(Value::Map(fields))
            }
            other => Err(StoreError::InvalidResponse(format!(
                "unsupported value type: {other}"
            ))),
        }
    }

    /// Build a value from plain JSON (used by the raw export uploader)
    ///
    /// Strings that parse as RFC 3339 timestamps become [`Value::Timestamp`],
    /// so exported date fields keep their native type in the store.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Value::Timestamp(dt.with_timezone(&Utc));
                }
                Value::String(s.clone())
            }
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Timestamp(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Array(items) => write!(f, "[{} items]", items.len()),
            Value::Map(fields) => write!(f, "{{{} fields}}", fields.len()),
        }
    }
}

/// Encode a field set into the wire `fields` object
pub fn encode_fields(fields: &Fields) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    for (name, value) in fields {
        obj.insert(name.clone(), value.to_api());
    }
    serde_json::Value::Object(obj)
}

/// Decode a wire `fields` object into a field set
pub fn decode_fields(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> Result<Fields, StoreError> {
    let mut fields = Fields::new();
    for (name, value) in obj {
        fields.insert(name.clone(), Value::from_api(value)?);
    }
    Ok(fields)
}

/// Build a field set from plain JSON document data
pub fn fields_from_json(obj: &serde_json::Map<String, serde_json::Value>) -> Fields {
    obj.iter()
        .map(|(k, v)| (k.clone(), Value::from_json(v)))
        .collect()
}
