//! Record representation
//!
//! A Record is one row of a sheet: a flat mapping from column header to a
//! scalar cell value. Rows come from spreadsheets, so every value may need to
//! be read back as text or as a number regardless of how it was stored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A single cell value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// The cell as text. `Null` reads as the empty string and integral
    /// floats drop their fraction (`45.0` reads as `"45"`).
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Int(i) => Cow::Owned(i.to_string()),
            Value::Float(f) => Cow::Owned(format_float(*f)),
            Value::String(s) => Cow::Borrowed(s),
        }
    }

    /// The cell as a finite decimal, if it is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            Value::String(s) => parse_decimal(s),
            _ => None,
        }
    }

    /// True for `Null` and for text that is empty once trimmed
    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }

    /// Convert a JSON cell. Nested arrays and objects keep their JSON text.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            nested => Value::String(nested.to_string()),
        }
    }
}

/// Parse trimmed text as a finite decimal. Empty text, `NaN` and infinities
/// are not numbers.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Field names to values, in column order
pub type Fields = IndexMap<String, Value>;

/// One row of a sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub fields: Fields,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`Record::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A field as text; absent fields read as the empty string
    pub fn text(&self, key: &str) -> Cow<'_, str> {
        self.get(key).map(Value::text).unwrap_or(Cow::Borrowed(""))
    }

    /// The first of `keys` whose value is not blank
    pub fn first_present<'a, I>(&self, keys: I) -> Option<&Value>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let mut record = Record::new();
        record.set("Nombre", "Ana").set("Edad", 45i64).set("Activo", true);

        assert_eq!(record.get("Nombre"), Some(&Value::String("Ana".into())));
        assert_eq!(record.text("Edad"), "45");
        assert_eq!(record.text("Ausente"), "");
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(Value::Float(45.0).text(), "45");
        assert_eq!(Value::Float(1.5).text(), "1.5");
        assert_eq!(Value::Null.text(), "");
        assert_eq!(Value::Bool(false).text(), "false");
    }

    #[test]
    fn test_numeric_reading() {
        assert_eq!(Value::from(" 40 ").as_number(), Some(40.0));
        assert_eq!(Value::from("12.5").as_number(), Some(12.5));
        assert_eq!(Value::from("desconocido").as_number(), None);
        assert_eq!(Value::from("").as_number(), None);
        assert_eq!(Value::from("NaN").as_number(), None);
        assert_eq!(Value::from("inf").as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), None);
        assert_eq!(Value::Int(7).as_number(), Some(7.0));
    }

    #[test]
    fn test_from_json_cells() {
        assert_eq!(Value::from_json(serde_json::json!(3)), Value::Int(3));
        assert_eq!(Value::from_json(serde_json::json!(3.25)), Value::Float(3.25));
        assert_eq!(Value::from_json(serde_json::json!(["a"])), Value::String("[\"a\"]".into()));
    }

    #[test]
    fn test_first_present_skips_blank() {
        let record = Record::new().with("DNI", "  ").with("Documento", "30111222");
        assert_eq!(
            record.first_present(["DNI", "Documento"]).map(|v| v.text().into_owned()),
            Some("30111222".to_string())
        );
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let record = Record::new().with("Sexo", "F");
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"Sexo":"F"}"#);
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let headers: Vec<String> = (0..12).map(|i| format!("Col{:02}", i)).collect();
        let mut record = Record::new();
        for (i, header) in headers.iter().enumerate() {
            record.set(header.clone(), i as i64);
        }
        record.set("Col03", "updated");

        let json = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();
        let keys: Vec<&String> = parsed.fields.keys().collect();
        assert_eq!(keys, headers.iter().collect::<Vec<_>>());
        assert!(json.starts_with(r#"{"Col00":0,"Col01":1,"Col02":2,"Col03":"updated""#));
    }
}
