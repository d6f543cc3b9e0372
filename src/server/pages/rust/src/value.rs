/* src/server/pages/rust/src/value.rs */

//! Dynamic values crossing the bundler and client boundaries.
//!
//! Glob results, module exports and page context fields are produced by
//! generated code, so they arrive untyped. `PageValue` is the one shape they
//! all share until a validation pass turns them into typed structures.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type PageObject = BTreeMap<String, PageValue>;

pub type CallableFn = Arc<dyn Fn() -> BoxFuture<Result<PageValue, String>> + Send + Sync>;

/// A no-argument async function: a lazy module loader or an exported hook.
#[derive(Clone)]
pub struct Callable {
  name: Option<String>,
  func: CallableFn,
}

impl Callable {
  pub fn new<F, Fut>(func: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PageValue, String>> + Send + 'static,
  {
    let func: CallableFn =
      Arc::new(move || -> BoxFuture<Result<PageValue, String>> { Box::pin(func()) });
    Self { name: None, func }
  }

  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn call(&self) -> BoxFuture<Result<PageValue, String>> {
    (self.func)()
  }
}

impl fmt::Debug for Callable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "[Function: {name}]"),
      None => f.write_str("[Function]"),
    }
  }
}

#[derive(Clone, Debug, Default)]
pub enum PageValue {
  #[default]
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  String(String),
  Array(Vec<PageValue>),
  Object(PageObject),
  Function(Callable),
  /// A framework UI element, e.g. a rendered JSX node.
  Element { element_type: String },
}

impl PageValue {
  pub fn object<K, I>(entries: I) -> Self
  where
    K: Into<String>,
    I: IntoIterator<Item = (K, PageValue)>,
  {
    Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
  }

  pub fn function<F, Fut>(func: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PageValue, String>> + Send + 'static,
  {
    Self::Function(Callable::new(func))
  }

  pub fn is_undefined(&self) -> bool {
    matches!(self, Self::Undefined)
  }

  pub fn is_object(&self) -> bool {
    matches!(self, Self::Object(_))
  }

  pub fn is_callable(&self) -> bool {
    matches!(self, Self::Function(_))
  }

  pub fn as_object(&self) -> Option<&PageObject> {
    match self {
      Self::Object(map) => Some(map),
      _ => None,
    }
  }

  pub fn as_object_mut(&mut self) -> Option<&mut PageObject> {
    match self {
      Self::Object(map) => Some(map),
      _ => None,
    }
  }

  pub fn into_object(self) -> Option<PageObject> {
    match self {
      Self::Object(map) => Some(map),
      _ => None,
    }
  }

  pub fn as_callable(&self) -> Option<&Callable> {
    match self {
      Self::Function(f) => Some(f),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      _ => None,
    }
  }

  /// `Some` only when every element is a string.
  pub fn as_string_array(&self) -> Option<Vec<String>> {
    let Self::Array(items) = self else {
      return None;
    };
    items.iter().map(|v| v.as_str().map(String::from)).collect()
  }

  /// Property lookup on objects; anything else yields `None`.
  pub fn get(&self, key: &str) -> Option<&PageValue> {
    self.as_object().and_then(|map| map.get(key))
  }

  /// Type name used in validation messages.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Undefined => "undefined",
      Self::Null => "null",
      Self::Bool(_) => "boolean",
      Self::Number(_) => "number",
      Self::String(_) => "string",
      Self::Array(_) => "array",
      Self::Object(_) => "object",
      Self::Function(_) => "function",
      Self::Element { .. } => "element",
    }
  }

  /// Short rendering of scalar values for error messages.
  pub fn describe(&self) -> String {
    match self {
      Self::Bool(b) => b.to_string(),
      Self::Number(n) => n.to_string(),
      Self::String(s) => format!("{s:?}"),
      other => other.kind().to_string(),
    }
  }
}

/// Structural equality. Functions compare by identity.
impl PartialEq for PageValue {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
      (Self::Bool(a), Self::Bool(b)) => a == b,
      (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
      (Self::String(a), Self::String(b)) => a == b,
      (Self::Array(a), Self::Array(b)) => a == b,
      (Self::Object(a), Self::Object(b)) => a == b,
      (Self::Function(a), Self::Function(b)) => Arc::ptr_eq(&a.func, &b.func),
      (Self::Element { element_type: a }, Self::Element { element_type: b }) => a == b,
      _ => false,
    }
  }
}

impl From<serde_json::Value> for PageValue {
  fn from(value: serde_json::Value) -> Self {
    match value {
      serde_json::Value::Null => Self::Null,
      serde_json::Value::Bool(b) => Self::Bool(b),
      serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
      serde_json::Value::String(s) => Self::String(s),
      serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
      serde_json::Value::Object(map) => {
        Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
      }
    }
  }
}

impl From<&str> for PageValue {
  fn from(s: &str) -> Self {
    Self::String(s.to_string())
  }
}

impl From<String> for PageValue {
  fn from(s: String) -> Self {
    Self::String(s)
  }
}

impl From<bool> for PageValue {
  fn from(b: bool) -> Self {
    Self::Bool(b)
  }
}

impl From<f64> for PageValue {
  fn from(n: f64) -> Self {
    Self::Number(n)
  }
}

impl From<PageObject> for PageValue {
  fn from(map: PageObject) -> Self {
    Self::Object(map)
  }
}

impl From<Vec<String>> for PageValue {
  fn from(items: Vec<String>) -> Self {
    Self::Array(items.into_iter().map(Self::String).collect())
  }
}
