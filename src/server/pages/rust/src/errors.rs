/* src/server/pages/rust/src/errors.rs */

use crate::file_type::FileType;

/// Every failure the page-file pipeline can surface.
///
/// `Clone` so a failed lazy load can be replayed to every later caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PagesError {
  #[error("malformed glob result: `{section}` {detail}")]
  Shape { section: String, detail: String },

  #[error("{}", stale_message(.found))]
  StaleArtifact { found: String },

  #[error("unknown file type `{file_type}` in `{section}`")]
  UnknownFileType { section: String, file_type: String },

  #[error("{file_path} is listed as `{expected}` but its name denotes `{found}`")]
  FileTypeMismatch { file_path: String, expected: FileType, found: String },

  #[error("`{section}` entry {file_path} is a {found}, expected a loader function")]
  InvalidLoader { section: String, file_path: String, found: String },

  #[error("invalid module for {file_path}: {detail}")]
  InvalidModule { file_path: String, detail: String },

  #[error("file path {file_path} contains a backslash; paths must be normalized to `/`")]
  BackslashInPath { file_path: String },

  #[error("failed to load {file_path}: {message}")]
  ModuleLoad { file_path: String, message: String },

  #[error("{file_path} exports `{export_name}` as a {found}, expected {expected}")]
  InvalidExportValue { file_path: String, export_name: String, expected: String, found: String },

  #[error("{file_path} has no {capability} loader")]
  MissingLoader { file_path: String, capability: &'static str },

  #[error("stem package {package_name}: {detail}")]
  StemConfig { package_name: String, detail: String },

  #[error("invalid page context: {detail}")]
  InvalidPageContext { detail: String },

  #[error("serialization failed: {message}")]
  Serialization { message: String },

  #[error("config error: {message}")]
  Config { message: String },
}

fn stale_message(found: &str) -> String {
  if found == "false" {
    "the generated page files are stale (the framework was re-installed or re-built); restart your app"
      .to_string()
  } else {
    format!("`isGeneratedFile` is {found}, expected `true`; regenerate the page files by restarting your app")
  }
}

impl PagesError {
  pub(crate) fn shape(section: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::Shape { section: section.into(), detail: detail.into() }
  }

  pub(crate) fn invalid_module(file_path: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::InvalidModule { file_path: file_path.into(), detail: detail.into() }
  }

  pub(crate) fn stem(package_name: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::StemConfig { package_name: package_name.into(), detail: detail.into() }
  }
}
