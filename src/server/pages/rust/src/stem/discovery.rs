/* src/server/pages/rust/src/stem/discovery.rs */

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::errors::PagesError;
use crate::value::{BoxFuture, PageValue};

use super::types::{StemDiscovery, StemModuleLoader, StemPackage, is_stem_package_name};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
  #[serde(default)]
  dependencies: BTreeMap<String, serde_json::Value>,
  #[serde(default)]
  dev_dependencies: BTreeMap<String, serde_json::Value>,
}

/// Stem packages declared in `<root>/package.json` and installed under
/// `<root>/node_modules`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeModulesDiscovery;

impl StemDiscovery for NodeModulesDiscovery {
  fn stem_packages(&self, root: &Path) -> BoxFuture<Result<Vec<StemPackage>, PagesError>> {
    let root = root.to_path_buf();
    Box::pin(async move {
      let manifest_path = root.join("package.json");
      let content = match tokio::fs::read_to_string(&manifest_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
          return Err(PagesError::Config {
            message: format!("failed to read {}: {e}", manifest_path.display()),
          });
        }
      };
      let manifest: PackageManifest = serde_json::from_str(&content).map_err(|e| {
        PagesError::Config { message: format!("failed to parse {}: {e}", manifest_path.display()) }
      })?;

      let names: BTreeSet<&String> = manifest
        .dependencies
        .keys()
        .chain(manifest.dev_dependencies.keys())
        .filter(|name| is_stem_package_name(name))
        .collect();

      let mut packages = Vec::with_capacity(names.len());
      for name in names {
        let root_dir = root.join("node_modules").join(name);
        if !tokio::fs::metadata(&root_dir).await.is_ok_and(|m| m.is_dir()) {
          return Err(PagesError::stem(
            name,
            format!("declared in package.json but not installed at {}", root_dir.display()),
          ));
        }
        packages.push(StemPackage {
          name: name.clone(),
          load_module: json_module_loader(root_dir.clone()),
          root_dir,
        });
      }
      Ok(packages)
    })
  }
}

/// Load JSON files relative to `root_dir`; the parsed document becomes the
/// module's `default` export.
pub fn json_module_loader(root_dir: PathBuf) -> StemModuleLoader {
  Arc::new(move |relative: &str| -> BoxFuture<Result<Option<PageValue>, String>> {
    let path = root_dir.join(relative);
    Box::pin(async move {
      let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
      };
      let json: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("failed to parse {}: {e}", path.display()))?;
      Ok(Some(PageValue::object([("default", PageValue::from(json))])))
    })
  })
}
