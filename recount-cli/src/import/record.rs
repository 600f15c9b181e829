//! One sheet row as a field-value record

use std::collections::HashMap;

use calamine::Data;

use crate::store::Value;

/// A single source row, addressed by column header
#[derive(Debug, Clone)]
pub struct Record {
    /// 1-based row number in the source sheet, for reporting
    pub row: usize,
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new(row: usize, fields: HashMap<String, Value>) -> Self {
        Self { row, fields }
    }

    /// Render a cell as trimmed text. `None` when the cell is missing,
    /// null, or blank after trimming.
    pub fn text(&self, field: &str) -> Option<String> {
        let rendered = match self.fields.get(field)? {
            Value::Null => return None,
            Value::String(s) => s.trim().to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Timestamp(dt) => dt.to_rfc3339(),
            Value::Array(_) | Value::Map(_) => return None,
        };
        if rendered.is_empty() {
            None
        } else {
            Some(rendered)
        }
    }

    /// Like [`text`](Self::text), but also rejects the `"nan"` marker the
    /// original exports carry in place of missing key cells.
    pub fn key_text(&self, field: &str) -> Option<String> {
        self.text(field).filter(|s| s != "nan")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(Value::is_null)
    }
}

/// Convert an Excel cell into a store value
pub fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => {
            // Whole numbers come out of Excel as floats; keep them integral
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                Value::Int(*f as i64)
            } else {
                Value::Float(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        // Excel datetimes render as text; no sheet column feeds a
        // timestamp field, those come from the injected clock
        Data::DateTime(dt) => Value::String(format!("{}", dt)),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) => Value::Null,
    }
}
