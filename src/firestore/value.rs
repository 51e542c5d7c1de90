//! Firestore REST wire encoding for cell values
//!
//! Documents cross the wire as `{"fields": {name: {typedValue: ...}}}`.
//! Two quirks of the encoding matter here: 64-bit integers are carried as
//! strings, and non-finite doubles are spelled out as the strings `"NaN"`,
//! `"Infinity"`, and `"-Infinity"`.

use chrono::SecondsFormat;
use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::model::CellValue;

/// Encode one cell as a Firestore REST `Value`
pub fn to_wire(value: &CellValue) -> Value {
    match value {
        CellValue::Null => json!({ "nullValue": null }),
        CellValue::Bool(b) => json!({ "booleanValue": b }),
        CellValue::Int(i) => json!({ "integerValue": i.to_string() }),
        CellValue::Float(f) => encode_double(*f),
        CellValue::String(s) => json!({ "stringValue": s.as_ref() }),
        // Firestore has no date-only type; dates become midnight UTC
        CellValue::Date(d) => json!({ "timestampValue": format!("{}T00:00:00Z", d.format("%Y-%m-%d")) }),
        CellValue::DateTime(dt) => {
            json!({ "timestampValue": dt.and_utc().to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
    }
}

fn encode_double(f: f64) -> Value {
    if f.is_nan() {
        json!({ "doubleValue": "NaN" })
    } else if f.is_infinite() {
        if f > 0.0 {
            json!({ "doubleValue": "Infinity" })
        } else {
            json!({ "doubleValue": "-Infinity" })
        }
    } else {
        json!({ "doubleValue": f })
    }
}

/// Encode a whole document's fields
pub fn fields_to_wire(fields: &IndexMap<String, CellValue>) -> Value {
    let map: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), to_wire(value)))
        .collect();
    Value::Object(map)
}
