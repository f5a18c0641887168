//! Core types shared by the loading and normalization pipeline.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Mapping produced by the structural decoder.
pub type RawMap = BTreeMap<String, RawValue>;

/// Dynamically-typed value decoded from a JSON or YAML document.
///
/// Serializes untagged, so `Null` becomes `null` and maps become JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<RawValue>),
    Map(RawMap),
}

impl RawValue {
    /// Returns the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Integer(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::String(_) => "string",
            RawValue::List(_) => "list",
            RawValue::Map(_) => "mapping",
        }
    }

    /// Canonical textual form of a scalar.
    ///
    /// Integers print as `%d`, booleans as `true`/`false`. Floats use the
    /// shortest representation that round-trips, so `200.0` prints as `200`
    /// and no digits are lost. Returns `None` for null, lists and maps.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            RawValue::Bool(b) => Some(b.to_string()),
            RawValue::Integer(i) => Some(i.to_string()),
            RawValue::Float(f) => Some(f.to_string()),
            RawValue::String(s) => Some(s.clone()),
            RawValue::Null | RawValue::List(_) | RawValue::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            RawValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Integer(i),
                None => RawValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => RawValue::String(s),
            Value::Array(items) => RawValue::List(items.into_iter().map(RawValue::from).collect()),
            Value::Object(obj) => {
                RawValue::Map(obj.into_iter().map(|(k, v)| (k, RawValue::from(v))).collect())
            }
        }
    }
}

impl From<serde_yaml::Value> for RawValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Integer(i),
                None => RawValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => RawValue::String(s),
            Value::Sequence(items) => {
                RawValue::List(items.into_iter().map(RawValue::from).collect())
            }
            Value::Mapping(mapping) => RawValue::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| (yaml_key_to_string(&k), RawValue::from(v)))
                    .collect(),
            ),
            // Custom tags (`!foo bar`) keep their value and drop the tag.
            Value::Tagged(tagged) => RawValue::from(tagged.value),
        }
    }
}

/// YAML permits non-string keys; they are coerced to their textual form.
fn yaml_key_to_string(key: &serde_yaml::Value) -> String {
    use serde_yaml::Value;
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Structured text format detected by sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
    Unknown,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Persisted login credentials.
///
/// Written once after a verified login handshake and read by every
/// authenticated command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    pub email: String,
    pub token: String,
}
