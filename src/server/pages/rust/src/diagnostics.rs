/* src/server/pages/rust/src/diagnostics.rs */

//! Structured events emitted while aggregating page files and serializing
//! page contexts. Sinks are injected so callers (and tests) decide where
//! events go.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemPackageInfo {
  pub name: String,
  pub root_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  StemPackagesFound { packages: Vec<StemPackageInfo> },
  StemConfigLoaded { package_name: String },
  StemConfigMissing { package_name: String },
  PageFilesParsed { count: usize },
  /// A pass-through property was replaced by the not-serializable marker.
  PropNotSerializable { prop: String, message: String },
}

impl Diagnostic {
  pub fn is_warning(&self) -> bool {
    matches!(self, Self::PropNotSerializable { .. })
  }
}

pub trait DiagnosticSink: Send + Sync {
  fn emit(&self, event: &Diagnostic);
}

/// Forwards events to `tracing` under the `seam::pages` target.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
  fn emit(&self, event: &Diagnostic) {
    match event {
      Diagnostic::StemPackagesFound { packages } => {
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        tracing::debug!(target: "seam::pages", packages = ?names, "stem packages found");
        for p in packages {
          tracing::debug!(target: "seam::pages", name = %p.name, root = %p.root_dir, "stem package");
        }
      }
      Diagnostic::StemConfigLoaded { package_name } => {
        tracing::debug!(target: "seam::pages", package = %package_name, "stem config loaded");
      }
      Diagnostic::StemConfigMissing { package_name } => {
        tracing::debug!(target: "seam::pages", package = %package_name, "no stem config");
      }
      Diagnostic::PageFilesParsed { count } => {
        tracing::debug!(target: "seam::pages", count, "page files parsed");
      }
      Diagnostic::PropNotSerializable { prop, message } => {
        tracing::warn!(target: "seam::pages", prop = %prop, "{message}");
      }
    }
  }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct MemorySink {
  events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn events(&self) -> Vec<Diagnostic> {
    self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  pub fn warnings(&self) -> Vec<Diagnostic> {
    self.events().into_iter().filter(Diagnostic::is_warning).collect()
  }
}

impl DiagnosticSink for MemorySink {
  fn emit(&self, event: &Diagnostic) {
    self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
  }
}

/// Entry point for emitting events; de-duplicates warnings when `warn_once` is set.
#[derive(Clone)]
pub struct Diagnostics {
  sink: Arc<dyn DiagnosticSink>,
  warn_once: bool,
  seen: Arc<Mutex<HashSet<String>>>,
}

impl Diagnostics {
  pub fn new(sink: Arc<dyn DiagnosticSink>, warn_once: bool) -> Self {
    Self { sink, warn_once, seen: Arc::new(Mutex::new(HashSet::new())) }
  }

  pub fn tracing(warn_once: bool) -> Self {
    Self::new(Arc::new(TracingSink), warn_once)
  }

  pub fn emit(&self, event: Diagnostic) {
    if self.warn_once && let Diagnostic::PropNotSerializable { message, .. } = &event {
      let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
      if !seen.insert(message.clone()) {
        return;
      }
    }
    self.sink.emit(&event);
  }
}

impl Default for Diagnostics {
  fn default() -> Self {
    Self::tracing(true)
  }
}
