/* src/server/pages/rust/src/registry.rs */

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::Shared;

use crate::errors::PagesError;
use crate::exports::assert_export_values;
use crate::file_type::{
  Env, FileType, is_ancestor_default_page, is_default_file_path, is_error_page_id,
  is_renderer_file_path, page_id_of,
};
use crate::glob::{GlobResult, GlobSection, GlobValue, export_names_of};
use crate::value::{BoxFuture, Callable, PageObject, PageValue};

type SharedLoad<T> = Shared<BoxFuture<Result<Arc<T>, PagesError>>>;

/// Turns a freshly loaded module into the slot's value.
type Finish<T> = fn(&str, PageValue) -> Result<T, PagesError>;

enum LoadState<T> {
  Unavailable,
  NotLoaded(Callable),
  Loading(SharedLoad<T>),
  Loaded(Arc<T>),
  Failed(PagesError),
}

/// One lazily loaded capability of a page file.
///
/// The loader runs at most once: concurrent callers await the same shared
/// future, and both success and failure are stored for later callers.
struct LoadSlot<T> {
  state: Mutex<LoadState<T>>,
}

impl<T: Send + Sync + 'static> LoadSlot<T> {
  fn new() -> Self {
    Self { state: Mutex::new(LoadState::Unavailable) }
  }

  fn lock(&self) -> MutexGuard<'_, LoadState<T>> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Attach a loader unless the slot already has one or a value.
  fn set_loader(&self, loader: Callable) {
    let mut state = self.lock();
    if matches!(*state, LoadState::Unavailable) {
      *state = LoadState::NotLoaded(loader);
    }
  }

  /// Store an eagerly resolved value unless one is already present.
  fn set_loaded(&self, value: T) {
    let mut state = self.lock();
    if matches!(*state, LoadState::Unavailable | LoadState::NotLoaded(_)) {
      *state = LoadState::Loaded(Arc::new(value));
    }
  }

  fn peek(&self) -> Option<Arc<T>> {
    match &*self.lock() {
      LoadState::Loaded(value) => Some(Arc::clone(value)),
      _ => None,
    }
  }

  fn has_source(&self) -> bool {
    !matches!(*self.lock(), LoadState::Unavailable)
  }

  async fn load(
    &self,
    file_path: &str,
    capability: &'static str,
    finish: Finish<T>,
  ) -> Result<Arc<T>, PagesError> {
    let pending = {
      let mut state = self.lock();
      match &*state {
        LoadState::Loaded(value) => return Ok(Arc::clone(value)),
        LoadState::Failed(err) => return Err(err.clone()),
        LoadState::Unavailable => {
          return Err(PagesError::MissingLoader { file_path: file_path.to_string(), capability });
        }
        LoadState::Loading(pending) => pending.clone(),
        LoadState::NotLoaded(loader) => {
          // Invoked on first poll, outside the lock.
          let loader = loader.clone();
          let path = file_path.to_string();
          let fut: BoxFuture<Result<Arc<T>, PagesError>> = Box::pin(async move {
            let module = loader
              .call()
              .await
              .map_err(|message| PagesError::ModuleLoad { file_path: path.clone(), message })?;
            finish(&path, module).map(Arc::new)
          });
          let pending = fut.shared();
          *state = LoadState::Loading(pending.clone());
          pending
        }
      }
    };

    let result = pending.await;
    let mut state = self.lock();
    if matches!(*state, LoadState::Loading(_)) {
      *state = match &result {
        Ok(value) => LoadState::Loaded(Arc::clone(value)),
        Err(err) => LoadState::Failed(err.clone()),
      };
    }
    result
  }
}

fn finish_file_exports(file_path: &str, module: PageValue) -> Result<PageObject, PagesError> {
  let kind = module.kind();
  let exports = module.into_object().ok_or_else(|| {
    PagesError::invalid_module(file_path, format!("module is a {kind}, expected an object"))
  })?;
  assert_export_values(file_path, &exports)?;
  Ok(exports)
}

fn finish_export_names(file_path: &str, module: PageValue) -> Result<Vec<String>, PagesError> {
  match module.as_object() {
    Some(obj) => export_names_of(file_path, obj),
    None => Err(PagesError::invalid_module(
      file_path,
      format!("export-names module is a {}, expected an object", module.kind()),
    )),
  }
}

/// A logical page file merged from every glob section that mentions it.
pub struct PageFile {
  file_path: String,
  file_type: FileType,
  page_id: String,
  is_default_page_file: bool,
  is_renderer_page_file: bool,
  is_error_page_file: bool,
  file_exports: LoadSlot<PageObject>,
  export_names: LoadSlot<Vec<String>>,
}

impl PageFile {
  pub fn new(file_path: impl Into<String>, file_type: FileType) -> Self {
    let file_path = file_path.into();
    let page_id = page_id_of(&file_path);
    Self {
      file_type,
      is_default_page_file: is_default_file_path(&file_path),
      is_renderer_page_file: is_renderer_file_path(&file_path),
      is_error_page_file: is_error_page_id(&page_id),
      page_id,
      file_path,
      file_exports: LoadSlot::new(),
      export_names: LoadSlot::new(),
    }
  }

  pub fn file_path(&self) -> &str {
    &self.file_path
  }

  pub fn file_type(&self) -> FileType {
    self.file_type
  }

  pub fn page_id(&self) -> &str {
    &self.page_id
  }

  pub fn is_default_page_file(&self) -> bool {
    self.is_default_page_file
  }

  pub fn is_renderer_page_file(&self) -> bool {
    self.is_renderer_page_file
  }

  pub fn is_error_page_file(&self) -> bool {
    self.is_error_page_file
  }

  /// Loaded exports, without triggering a load.
  pub fn file_exports(&self) -> Option<Arc<PageObject>> {
    self.file_exports.peek()
  }

  /// Loaded export names, without triggering a load.
  pub fn export_names(&self) -> Option<Arc<Vec<String>>> {
    self.export_names.peek()
  }

  pub fn has_file_loader(&self) -> bool {
    self.file_exports.has_source()
  }

  pub fn has_export_names_loader(&self) -> bool {
    self.export_names.has_source()
  }

  /// Load the module exports once; later calls return the stored result.
  pub async fn load_file(&self) -> Result<Arc<PageObject>, PagesError> {
    self.file_exports.load(&self.file_path, "file", finish_file_exports).await
  }

  /// Load the export names once; later calls return the stored result.
  pub async fn load_export_names(&self) -> Result<Arc<Vec<String>>, PagesError> {
    self.export_names.load(&self.file_path, "export names", finish_export_names).await
  }

  /// Whether this file contributes to the given page.
  pub fn is_relevant(&self, page_id: &str) -> bool {
    self.page_id == page_id
      || (self.is_default_page_file
        && (self.is_renderer_page_file || is_ancestor_default_page(page_id, &self.file_path)))
  }

  pub fn is_env(&self, env: Env) -> bool {
    self.file_type.is_env(env)
  }
}

impl fmt::Debug for PageFile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PageFile")
      .field("file_path", &self.file_path)
      .field("file_type", &self.file_type)
      .field("page_id", &self.page_id)
      .field("loaded", &self.file_exports.peek().is_some())
      .finish_non_exhaustive()
  }
}

/// All page files of one aggregation pass, keyed by file path.
#[derive(Debug, Default)]
pub struct PageFileRegistry {
  files: BTreeMap<String, Arc<PageFile>>,
}

impl PageFileRegistry {
  /// Merge validated glob sections. The first section to mention a path
  /// creates its entry; later sections only add missing capabilities.
  pub fn from_glob_result(glob: &GlobResult) -> Result<Self, PagesError> {
    let mut files: BTreeMap<String, Arc<PageFile>> = BTreeMap::new();
    for (section, entries) in glob.sections() {
      for entry in entries {
        let file = files
          .entry(entry.file_path.clone())
          .or_insert_with(|| Arc::new(PageFile::new(entry.file_path.clone(), entry.file_type)));
        if file.file_type != entry.file_type {
          return Err(PagesError::FileTypeMismatch {
            file_path: entry.file_path.clone(),
            expected: file.file_type,
            found: entry.file_type.to_string(),
          });
        }
        match &entry.value {
          GlobValue::Loader(loader) if section == GlobSection::PageFilesLazy => {
            file.file_exports.set_loader(loader.clone());
          }
          GlobValue::Loader(loader) => file.export_names.set_loader(loader.clone()),
          GlobValue::Exports(exports) => {
            assert_export_values(&entry.file_path, exports)?;
            file.file_exports.set_loaded(exports.clone());
          }
          GlobValue::ExportNames(names) => file.export_names.set_loaded(names.clone()),
        }
      }
    }

    if let Some(path) = files.keys().find(|p| p.contains('\\')) {
      return Err(PagesError::BackslashInPath { file_path: path.clone() });
    }
    Ok(Self { files })
  }

  pub fn get(&self, file_path: &str) -> Option<&Arc<PageFile>> {
    self.files.get(file_path)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Arc<PageFile>> {
    self.files.values()
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Ids of concrete pages (shared `_default` and renderer files excluded).
  pub fn page_ids(&self) -> BTreeSet<String> {
    self
      .iter()
      .filter(|f| {
        !f.is_default_page_file && !f.is_renderer_page_file && f.file_type != FileType::Css
      })
      .map(|f| f.page_id.clone())
      .collect()
  }

  /// Files contributing to `page_id` in `env`: shared defaults first, then by path.
  pub fn files_for_page(&self, page_id: &str, env: Env) -> Vec<Arc<PageFile>> {
    let mut files: Vec<Arc<PageFile>> =
      self.iter().filter(|f| f.is_env(env) && f.is_relevant(page_id)).cloned().collect();
    files.sort_by_key(|f| !f.is_default_page_file);
    files
  }
}
