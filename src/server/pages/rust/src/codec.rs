/* src/server/pages/rust/src/codec.rs */

//! JSON text with an escape channel for values plain JSON cannot carry.
//!
//! Special values are encoded as strings with a `!` prefix: `"!undefined"`,
//! `"!NaN"`, `"!Infinity"`, `"!-Infinity"`. A genuine string starting with
//! `!` gets one more `!` in front, so decoding is unambiguous.

use std::fmt;

use crate::value::{PageObject, PageValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeError {
  message: String,
}

impl SerializeError {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into() }
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

impl fmt::Display for SerializeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.message)
  }
}

impl std::error::Error for SerializeError {}

/// Turns a page value into a string payload, or fails for content that
/// cannot cross to the client.
pub trait Serializer: Send + Sync {
  /// `value_name` labels the value in error messages, e.g. `pageContext["user"]`.
  fn serialize(&self, value: &PageValue, value_name: Option<&str>)
  -> Result<String, SerializeError>;
}

#[derive(Debug, Clone)]
pub struct JsonSerializer {
  pub forbid_elements: bool,
}

impl Default for JsonSerializer {
  fn default() -> Self {
    Self { forbid_elements: true }
  }
}

impl Serializer for JsonSerializer {
  fn serialize(
    &self,
    value: &PageValue,
    value_name: Option<&str>,
  ) -> Result<String, SerializeError> {
    let root = value_name.unwrap_or("value");
    let json = self.encode(value, root)?;
    serde_json::to_string(&json).map_err(|e| SerializeError::new(e.to_string()))
  }
}

impl JsonSerializer {
  fn encode(&self, value: &PageValue, path: &str) -> Result<serde_json::Value, SerializeError> {
    Ok(match value {
      PageValue::Undefined => serde_json::Value::String("!undefined".into()),
      PageValue::Null => serde_json::Value::Null,
      PageValue::Bool(b) => serde_json::Value::Bool(*b),
      PageValue::Number(n) => encode_number(*n),
      PageValue::String(s) if s.starts_with('!') => serde_json::Value::String(format!("!{s}")),
      PageValue::String(s) => serde_json::Value::String(s.clone()),
      PageValue::Array(items) => serde_json::Value::Array(
        items
          .iter()
          .enumerate()
          .map(|(i, item)| self.encode(item, &format!("{path}[{i}]")))
          .collect::<Result<_, _>>()?,
      ),
      PageValue::Object(map) => {
        let mut out = serde_json::Map::new();
        for (key, item) in map {
          out.insert(key.clone(), self.encode(item, &format!("{path}.{key}"))?);
        }
        serde_json::Value::Object(out)
      }
      PageValue::Function(_) => {
        return Err(SerializeError::new(format!(
          "Cannot serialize {path} because it is a function"
        )));
      }
      PageValue::Element { element_type } if self.forbid_elements => {
        return Err(SerializeError::new(format!(
          "Cannot serialize {path} because it is a framework element (<{element_type}>)"
        )));
      }
      PageValue::Element { element_type } => {
        serde_json::Value::String(format!("!Element:{element_type}"))
      }
    })
  }
}

fn encode_number(n: f64) -> serde_json::Value {
  if n.is_nan() {
    return serde_json::Value::String("!NaN".into());
  }
  if n.is_infinite() {
    let tag = if n > 0.0 { "!Infinity" } else { "!-Infinity" };
    return serde_json::Value::String(tag.into());
  }
  if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
    return serde_json::Value::Number((n as i64).into());
  }
  serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

/// Decode a payload produced by [`JsonSerializer`].
pub fn parse(payload: &str) -> Result<PageValue, SerializeError> {
  let json: serde_json::Value =
    serde_json::from_str(payload).map_err(|e| SerializeError::new(e.to_string()))?;
  Ok(decode(json))
}

fn decode(json: serde_json::Value) -> PageValue {
  match json {
    serde_json::Value::String(s) => decode_string(s),
    serde_json::Value::Array(items) => PageValue::Array(items.into_iter().map(decode).collect()),
    serde_json::Value::Object(map) => {
      PageValue::Object(map.into_iter().map(|(k, v)| (k, decode(v))).collect::<PageObject>())
    }
    other => PageValue::from(other),
  }
}

fn decode_string(s: String) -> PageValue {
  let Some(rest) = s.strip_prefix('!') else {
    return PageValue::String(s);
  };
  if rest.starts_with('!') {
    return PageValue::String(rest.to_string());
  }
  match rest {
    "undefined" => PageValue::Undefined,
    "NaN" => PageValue::Number(f64::NAN),
    "Infinity" => PageValue::Number(f64::INFINITY),
    "-Infinity" => PageValue::Number(f64::NEG_INFINITY),
    _ => match rest.strip_prefix("Element:") {
      Some(element_type) => PageValue::Element { element_type: element_type.to_string() },
      None => PageValue::String(s),
    },
  }
}
