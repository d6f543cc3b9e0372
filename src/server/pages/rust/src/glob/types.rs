/* src/server/pages/rust/src/glob/types.rs */

use crate::file_type::FileType;
use crate::value::{Callable, PageObject};

/// The four glob maps emitted by the bundler, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobSection {
  PageFilesLazy,
  PageFilesExportNamesLazy,
  PageFilesEager,
  PageFilesExportNamesEager,
}

impl GlobSection {
  /// Fixed order: the first section to mention a path creates its entry.
  pub const ORDER: [GlobSection; 4] = [
    Self::PageFilesLazy,
    Self::PageFilesExportNamesLazy,
    Self::PageFilesEager,
    Self::PageFilesExportNamesEager,
  ];

  pub fn key(self) -> &'static str {
    match self {
      Self::PageFilesLazy => "pageFilesLazy",
      Self::PageFilesExportNamesLazy => "pageFilesExportNamesLazy",
      Self::PageFilesEager => "pageFilesEager",
      Self::PageFilesExportNamesEager => "pageFilesExportNamesEager",
    }
  }

  pub fn is_lazy(self) -> bool {
    matches!(self, Self::PageFilesLazy | Self::PageFilesExportNamesLazy)
  }
}

/// Validated glob value, already narrowed to what its section allows.
#[derive(Debug, Clone)]
pub enum GlobValue {
  /// Lazy section: loader resolving the module (or its export-names module).
  Loader(Callable),
  /// `pageFilesEager`: module exports resolved at build time.
  Exports(PageObject),
  /// `pageFilesExportNamesEager`: the `exportNames` list.
  ExportNames(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct GlobEntry {
  pub file_path: String,
  pub file_type: FileType,
  pub value: GlobValue,
}

/// Typed form of the generated glob object. Only produced by
/// [`GlobResult::from_value`](super::GlobResult::from_value).
#[derive(Debug, Clone)]
pub struct GlobResult {
  pub(super) sections: Vec<(GlobSection, Vec<GlobEntry>)>,
}

impl GlobResult {
  /// Sections in processing order.
  pub fn sections(&self) -> impl Iterator<Item = (GlobSection, &[GlobEntry])> {
    self.sections.iter().map(|(section, entries)| (*section, entries.as_slice()))
  }

  pub fn entries(&self, section: GlobSection) -> &[GlobEntry] {
    self
      .sections
      .iter()
      .find(|(s, _)| *s == section)
      .map(|(_, entries)| entries.as_slice())
      .unwrap_or_default()
  }
}
