/* src/server/pages/rust/src/file_type.rs */

use std::fmt;

/// Page file kinds, keyed in glob results by their suffix tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileType {
  Page,
  PageClient,
  PageServer,
  PageRoute,
  Css,
}

/// Runtime environment a page file is loaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
  Client,
  Server,
}

impl FileType {
  pub const ALL: [FileType; 5] =
    [Self::Page, Self::PageClient, Self::PageServer, Self::PageRoute, Self::Css];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Page => ".page",
      Self::PageClient => ".page.client",
      Self::PageServer => ".page.server",
      Self::PageRoute => ".page.route",
      Self::Css => ".css",
    }
  }

  pub fn parse(tag: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|t| t.as_str() == tag)
  }

  /// Derive the file type from a file name.
  /// `index.page.server.ts` -> `.page.server`, `index.page.tsx` -> `.page`.
  pub fn from_file_path(file_path: &str) -> Option<Self> {
    let file_name = file_name(file_path);
    if file_name.ends_with(".css") {
      return Some(Self::Css);
    }
    let segments: Vec<&str> = file_name.split('.').collect();
    // The first segment is the base name, the last one the extension.
    let page_idx = segments.iter().skip(1).position(|s| *s == "page")? + 1;
    if page_idx + 1 >= segments.len() {
      return None;
    }
    let qualifier = &segments[page_idx + 1..segments.len() - 1];
    match qualifier {
      [] => Some(Self::Page),
      ["client"] => Some(Self::PageClient),
      ["server"] => Some(Self::PageServer),
      ["route"] => Some(Self::PageRoute),
      _ => None,
    }
  }

  pub fn is_env(self, env: Env) -> bool {
    match self {
      Self::PageClient | Self::Css => env == Env::Client,
      Self::PageServer => env == Env::Server,
      Self::Page | Self::PageRoute => true,
    }
  }
}

impl fmt::Display for FileType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

pub(crate) fn file_name(file_path: &str) -> &str {
  file_path.rsplit('/').next().unwrap_or(file_path)
}

/// Page id of a file: its path without the `.page...` suffix.
/// `/pages/index.page.server.js` -> `/pages/index`
pub fn page_id_of(file_path: &str) -> String {
  let name = file_name(file_path);
  let name_start = file_path.len() - name.len();
  match name.find(".page.").or_else(|| name.find('.')) {
    Some(cut) => file_path[..name_start + cut].to_string(),
    None => file_path.to_string(),
  }
}

pub fn is_error_page_id(page_id: &str) -> bool {
  page_id.contains("/_error")
}

pub(crate) fn is_default_file_path(file_path: &str) -> bool {
  file_name(file_path).starts_with("_default")
}

pub(crate) fn is_renderer_file_path(file_path: &str) -> bool {
  file_path.contains("/renderer/")
}

/// A `_default` file applies to every page below its own directory.
pub(crate) fn is_ancestor_default_page(page_id: &str, default_file_path: &str) -> bool {
  let dir = match default_file_path.rfind('/') {
    Some(idx) => &default_file_path[..idx],
    None => return true,
  };
  dir.is_empty() || page_id.starts_with(&format!("{dir}/"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_known_tags() {
    for t in FileType::ALL {
      assert_eq!(FileType::parse(t.as_str()), Some(t));
    }
    assert_eq!(FileType::parse(".page.shared"), None);
    assert_eq!(FileType::parse("page"), None);
  }

  #[test]
  fn file_type_from_path() {
    assert_eq!(FileType::from_file_path("/pages/index.page.tsx"), Some(FileType::Page));
    assert_eq!(FileType::from_file_path("/pages/index.page.client.ts"), Some(FileType::PageClient));
    assert_eq!(FileType::from_file_path("/pages/index.page.server.js"), Some(FileType::PageServer));
    assert_eq!(FileType::from_file_path("/pages/about.page.route.ts"), Some(FileType::PageRoute));
    assert_eq!(FileType::from_file_path("/renderer/style.css"), Some(FileType::Css));
  }

  #[test]
  fn file_type_rejects_unconventional_names() {
    assert_eq!(FileType::from_file_path("/pages/index.ts"), None);
    assert_eq!(FileType::from_file_path("/pages/index.page"), None);
    assert_eq!(FileType::from_file_path("/pages/index.page.edge.ts"), None);
  }

  #[test]
  fn env_membership() {
    assert!(FileType::Page.is_env(Env::Client));
    assert!(FileType::Page.is_env(Env::Server));
    assert!(FileType::PageClient.is_env(Env::Client));
    assert!(!FileType::PageClient.is_env(Env::Server));
    assert!(!FileType::PageServer.is_env(Env::Client));
    assert!(FileType::PageRoute.is_env(Env::Server));
    assert!(!FileType::Css.is_env(Env::Server));
  }

  #[test]
  fn page_ids() {
    assert_eq!(page_id_of("/pages/index.page.server.js"), "/pages/index");
    assert_eq!(page_id_of("/pages/about.page.tsx"), "/pages/about");
    assert_eq!(page_id_of("/renderer/style.css"), "/renderer/style");
    assert_eq!(page_id_of("/pages/my.page.dir/index.page.ts"), "/pages/my.page.dir/index");
    assert_eq!(page_id_of("/pages/v1.2/about.page.server.ts"), "/pages/v1.2/about");
  }

  #[test]
  fn default_and_renderer_paths() {
    assert!(is_default_file_path("/renderer/_default.page.server.ts"));
    assert!(!is_default_file_path("/pages/index.page.ts"));
    assert!(is_renderer_file_path("/renderer/_default.page.client.ts"));
    assert!(is_error_page_id("/pages/_error"));
  }

  #[test]
  fn ancestor_default_pages() {
    assert!(is_ancestor_default_page("/pages/admin/users", "/pages/admin/_default.page.ts"));
    assert!(!is_ancestor_default_page("/pages/index", "/pages/admin/_default.page.ts"));
    assert!(is_ancestor_default_page("/pages/index", "/_default.page.ts"));
  }
}
