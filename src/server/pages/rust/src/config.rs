/* src/server/pages/rust/src/config.rs */

use std::path::Path;

use serde::Deserialize;

use crate::errors::PagesError;

pub const DEFAULT_STEM_CONFIG_FILE: &str = "seam.config.json";

/// `[pages]` section of `seam.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagesConfig {
  /// Whether the runtime can load modules at runtime. Without it stem
  /// packages are not probed at all.
  #[serde(default = "default_true")]
  pub dynamic_import: bool,
  #[serde(default = "default_stem_config_file")]
  pub stem_config_file: String,
  /// Report each distinct serialization warning only once per process.
  #[serde(default = "default_true")]
  pub warn_once: bool,
}

impl Default for PagesConfig {
  fn default() -> Self {
    Self {
      dynamic_import: true,
      stem_config_file: default_stem_config_file(),
      warn_once: true,
    }
  }
}

/// Runtime capabilities, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
  pub dynamic_import: bool,
}

impl PagesConfig {
  pub fn from_toml_str(content: &str) -> Result<Self, PagesError> {
    #[derive(Deserialize)]
    struct SeamToml {
      #[serde(default)]
      pages: Option<PagesConfig>,
    }
    let doc: SeamToml =
      toml::from_str(content).map_err(|e| PagesError::Config { message: e.to_string() })?;
    let config = doc.pages.unwrap_or_default();
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), PagesError> {
    let file = &self.stem_config_file;
    if file.is_empty() {
      return Err(PagesError::Config { message: "pages.stem_config_file must not be empty".into() });
    }
    if file.starts_with('/') || file.contains('\\') || file.split('/').any(|s| s == "..") {
      return Err(PagesError::Config {
        message: format!("pages.stem_config_file \"{file}\" must be a relative forward-slash path"),
      });
    }
    Ok(())
  }

  pub fn capabilities(&self) -> Capabilities {
    Capabilities { dynamic_import: self.dynamic_import }
  }
}

/// Read the `[pages]` section from a `seam.toml` file.
pub fn load_pages_config(path: &Path) -> Result<PagesConfig, PagesError> {
  let content = std::fs::read_to_string(path).map_err(|e| PagesError::Config {
    message: format!("failed to read {}: {e}", path.display()),
  })?;
  PagesConfig::from_toml_str(&content).map_err(|e| match e {
    PagesError::Config { message } => {
      PagesError::Config { message: format!("failed to parse {}: {message}", path.display()) }
    }
    other => other,
  })
}

fn default_true() -> bool {
  true
}

fn default_stem_config_file() -> String {
  DEFAULT_STEM_CONFIG_FILE.to_string()
}
