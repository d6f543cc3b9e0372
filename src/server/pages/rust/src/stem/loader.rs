/* src/server/pages/rust/src/stem/loader.rs */

use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;

use crate::config::{Capabilities, PagesConfig};
use crate::diagnostics::{Diagnostic, Diagnostics, StemPackageInfo};
use crate::errors::PagesError;
use crate::value::{PageObject, PageValue};

use super::types::{StemConfig, StemDiscovery, StemPackage};

/// Collects the configuration objects contributed by stem packages.
pub struct StemConfigLoader {
  discovery: Arc<dyn StemDiscovery>,
  capabilities: Capabilities,
  config_file: String,
  diagnostics: Diagnostics,
}

impl StemConfigLoader {
  pub fn new(discovery: Arc<dyn StemDiscovery>, config: &PagesConfig) -> Self {
    Self {
      discovery,
      capabilities: config.capabilities(),
      config_file: config.stem_config_file.clone(),
      diagnostics: Diagnostics::tracing(config.warn_once),
    }
  }

  pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
    self.diagnostics = diagnostics;
    self
  }

  /// Probe every stem package under `root` concurrently.
  ///
  /// Packages without a config file are skipped. Any other failure aborts
  /// the whole pass. Configs are returned in completion order.
  pub async fn load(&self, root: &Path) -> Result<Vec<StemConfig>, PagesError> {
    if !self.capabilities.dynamic_import {
      return Ok(Vec::new());
    }

    let packages = self.discovery.stem_packages(root).await?;
    self.diagnostics.emit(Diagnostic::StemPackagesFound {
      packages: packages
        .iter()
        .map(|p| StemPackageInfo {
          name: p.name.clone(),
          root_dir: p.root_dir.display().to_string(),
        })
        .collect(),
    });

    let mut pending: FuturesUnordered<_> =
      packages.into_iter().map(|package| self.probe(package)).collect();
    let mut configs = Vec::new();
    while let Some(result) = pending.next().await {
      if let Some(config) = result? {
        configs.push(config);
      }
    }
    Ok(configs)
  }

  async fn probe(&self, package: StemPackage) -> Result<Option<StemConfig>, PagesError> {
    let file = self.config_file.as_str();
    let module = (package.load_module)(file)
      .await
      .map_err(|e| PagesError::stem(&package.name, format!("failed to load {file}: {e}")))?;
    let Some(module) = module else {
      self.diagnostics.emit(Diagnostic::StemConfigMissing { package_name: package.name });
      return Ok(None);
    };

    let config: PageObject = match module.get("default") {
      Some(PageValue::Object(map)) => map.clone(),
      Some(other) => {
        return Err(PagesError::stem(
          &package.name,
          format!("default export of {file} is a {}, expected an object", other.kind()),
        ));
      }
      None => {
        return Err(PagesError::stem(&package.name, format!("{file} has no default export")));
      }
    };

    self.diagnostics.emit(Diagnostic::StemConfigLoaded { package_name: package.name.clone() });
    Ok(Some(StemConfig { package_name: package.name, config }))
  }
}
