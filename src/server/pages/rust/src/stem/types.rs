/* src/server/pages/rust/src/stem/types.rs */

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::PagesError;
use crate::value::{BoxFuture, PageObject, PageValue};

/// Resolve a module relative to a package root. `Ok(None)` when the file
/// does not exist.
pub type StemModuleLoader =
  Arc<dyn Fn(&str) -> BoxFuture<Result<Option<PageValue>, String>> + Send + Sync>;

/// A dependency package that opts in to extending page-file discovery.
#[derive(Clone)]
pub struct StemPackage {
  pub name: String,
  pub root_dir: PathBuf,
  pub load_module: StemModuleLoader,
}

impl fmt::Debug for StemPackage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StemPackage")
      .field("name", &self.name)
      .field("root_dir", &self.root_dir)
      .finish_non_exhaustive()
  }
}

/// Configuration object contributed by one stem package.
#[derive(Debug, Clone, PartialEq)]
pub struct StemConfig {
  pub package_name: String,
  pub config: PageObject,
}

/// Finds the stem packages a project depends on.
pub trait StemDiscovery: Send + Sync {
  fn stem_packages(&self, root: &Path) -> BoxFuture<Result<Vec<StemPackage>, PagesError>>;
}

/// `stem`, `stem-*`, `@scope/stem` and `@scope/stem-*`.
pub fn is_stem_package_name(name: &str) -> bool {
  let unscoped = match name.strip_prefix('@') {
    Some(scoped) => match scoped.split_once('/') {
      Some((_, rest)) => rest,
      None => return false,
    },
    None => name,
  };
  unscoped == "stem" || unscoped.starts_with("stem-")
}
