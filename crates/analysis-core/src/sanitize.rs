//! Numeric sanitizer.
//!
//! Every numeric field coming from a provider passes through [`sanitize`] before it
//! reaches a calculator or a rule. Anything that is not a finite number comes back
//! as `None` (or the caller's default), so NaN and placeholder text never reach the
//! scoring arithmetic.

use serde::{Deserialize, Serialize};

/// Placeholder strings providers use for "no value".
const MISSING_MARKERS: [&str; 5] = ["", "N/A", "-", "None", "nan"];

/// One raw field as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn text(s: impl Into<String>) -> Self {
        RawValue::Text(s.into())
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(RawValue::Missing, RawValue::Number)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<&serde_json::Value> for RawValue {
    /// Quote endpoints wrap numbers as `{"raw": 12.3, "fmt": "12.30"}`; the `raw`
    /// member is unwrapped. Arrays, booleans and other objects count as missing.
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map_or(RawValue::Missing, RawValue::Number),
            serde_json::Value::String(s) => RawValue::Text(s.clone()),
            serde_json::Value::Object(map) => map
                .get("raw")
                .map(RawValue::from)
                .unwrap_or(RawValue::Missing),
            _ => RawValue::Missing,
        }
    }
}

impl From<Option<&serde_json::Value>> for RawValue {
    fn from(value: Option<&serde_json::Value>) -> Self {
        value.map(RawValue::from).unwrap_or(RawValue::Missing)
    }
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Convert a raw field into a finite number, or `None`.
pub fn sanitize(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Missing => None,
        RawValue::Number(v) => finite(*v),
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if MISSING_MARKERS.contains(&trimmed) {
                return None;
            }
            trimmed.parse::<f64>().ok().and_then(finite)
        }
    }
}

/// Same as [`sanitize`] but falls back to `default`.
pub fn sanitize_or(raw: &RawValue, default: f64) -> f64 {
    sanitize(raw).unwrap_or(default)
}
