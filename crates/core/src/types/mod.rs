//! Shared type definitions and newtypes

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Backend identifier of a box
pub type BoxId = i64;

/// Backend identifier of a transaction
pub type TransactionId = i64;

/// A numeric figure as the backend renders it.
///
/// The backend sends decimals as fixed-point strings (`"42.50000000"`),
/// sometimes as plain numbers, and `"N/A"` when no market price is known.
/// All of these decode; anything unparseable becomes "unavailable".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Figure(Option<f64>);

impl Figure {
    pub fn new(value: f64) -> Self {
        Figure(Some(value).filter(|v| v.is_finite()))
    }

    pub fn unavailable() -> Self {
        Figure(None)
    }

    /// Helper to read a JSON value as a figure (handles both string and number)
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => Figure(n.as_f64().filter(|v| v.is_finite())),
            Value::String(s) => Figure(s.trim().parse::<f64>().ok().filter(|v| v.is_finite())),
            _ => Figure(None),
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn is_available(&self) -> bool {
        self.0.is_some()
    }

    /// Two-decimal rendering used for money columns
    pub fn fixed2(&self) -> String {
        match self.0 {
            Some(v) => format!("{:.2}", v),
            None => "N/A".to_string(),
        }
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v),
            None => f.write_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for Figure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Figure::from_value(&value))
    }
}

impl Serialize for Figure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Per-field error messages, as rendered next to form inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a backend error map.
    ///
    /// Accepts `{field: "msg"}` and `{field: ["msg", ...]}`; a body that is not
    /// an object yields no field errors.
    pub fn from_value(value: &Value) -> Self {
        let mut errors = FieldErrors::new();
        if let Value::Object(map) = value {
            for (field, entry) in map {
                match entry {
                    Value::String(s) => errors.insert(field, s),
                    Value::Array(items) => {
                        for item in items {
                            match item {
                                Value::String(s) => errors.insert(field, s),
                                other => errors.insert(field, &other.to_string()),
                            }
                        }
                    }
                    Value::Null => {}
                    other => errors.insert(field, &other.to_string()),
                }
            }
        }
        errors
    }

    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(|v| v.as_slice())
    }

    /// First message for a field (what a form shows under the input)
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0.get(field)?.first().map(|s| s.as_str())
    }

    pub fn first_message(&self) -> Option<&str> {
        self.0.values().flatten().next().map(|s| s.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

/// User-entered decimal, kept as the typed text for the wire.
///
/// Sent as typed once it parses as a finite number.
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalInput {
    text: String,
    value: f64,
}

impl DecimalInput {
    /// Accept any finite number
    pub fn parse(input: &str) -> Option<Self> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }
        let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
        Some(Self {
            text: text.to_string(),
            value,
        })
    }

    /// Accept only numbers greater than zero
    pub fn parse_positive(input: &str) -> Option<Self> {
        Self::parse(input).filter(|d| d.value > 0.0)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl fmt::Display for DecimalInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for DecimalInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}
