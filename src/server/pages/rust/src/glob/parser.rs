/* src/server/pages/rust/src/glob/parser.rs */

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::PagesError;
use crate::file_type::FileType;
use crate::registry::PageFileRegistry;
use crate::value::{PageObject, PageValue};

use super::types::{GlobEntry, GlobResult, GlobSection, GlobValue};

impl GlobResult {
  /// Validate the bundler-generated glob object into typed entries.
  ///
  /// This is the trust boundary: everything downstream assumes the shape
  /// checked here.
  pub fn from_value(raw: &PageValue) -> Result<Self, PagesError> {
    let Some(root) = raw.as_object() else {
      return Err(PagesError::shape("<root>", format!("is a {}, expected an object", raw.kind())));
    };

    match root.get("isGeneratedFile") {
      None => return Err(PagesError::shape("isGeneratedFile", "is missing")),
      Some(PageValue::Bool(true)) => {}
      Some(other) => return Err(PagesError::StaleArtifact { found: other.describe() }),
    }

    let mut section_maps = Vec::with_capacity(GlobSection::ORDER.len());
    for section in GlobSection::ORDER {
      let map = match root.get(section.key()) {
        Some(PageValue::Object(map)) => map,
        Some(other) => {
          return Err(PagesError::shape(
            section.key(),
            format!("is a {}, expected an object", other.kind()),
          ));
        }
        None => return Err(PagesError::shape(section.key(), "is missing")),
      };
      section_maps.push((section, map));
    }

    let (_, lazy) = section_maps[0];
    assert_minimal_page(lazy)?;

    let mut sections = Vec::with_capacity(section_maps.len());
    for (section, map) in section_maps {
      sections.push((section, parse_section(section, map)?));
    }
    Ok(Self { sections })
  }
}

/// A page needs at least a `.page` file plus a client- or server-specific one.
fn assert_minimal_page(lazy: &PageObject) -> Result<(), PagesError> {
  let key = GlobSection::PageFilesLazy.key();
  if !lazy.contains_key(FileType::Page.as_str()) {
    return Err(PagesError::shape(key, "has no `.page` files"));
  }
  if !lazy.contains_key(FileType::PageClient.as_str())
    && !lazy.contains_key(FileType::PageServer.as_str())
  {
    return Err(PagesError::shape(key, "has neither `.page.client` nor `.page.server` files"));
  }
  Ok(())
}

fn parse_section(section: GlobSection, map: &PageObject) -> Result<Vec<GlobEntry>, PagesError> {
  let mut entries = Vec::new();
  for (tag, files) in map {
    let Some(file_type) = FileType::parse(tag) else {
      return Err(PagesError::UnknownFileType {
        section: section.key().to_string(),
        file_type: tag.clone(),
      });
    };
    let Some(files) = files.as_object() else {
      return Err(PagesError::shape(
        format!("{}[{tag}]", section.key()),
        format!("is a {}, expected an object", files.kind()),
      ));
    };
    for (file_path, glob_value) in files {
      check_file_path(file_path, file_type)?;
      let value = parse_glob_value(section, file_path, glob_value)?;
      entries.push(GlobEntry { file_path: file_path.clone(), file_type, value });
    }
  }
  Ok(entries)
}

fn check_file_path(file_path: &str, file_type: FileType) -> Result<(), PagesError> {
  if file_path.contains('\\') {
    return Err(PagesError::BackslashInPath { file_path: file_path.to_string() });
  }
  match FileType::from_file_path(file_path) {
    Some(found) if found == file_type => Ok(()),
    found => Err(PagesError::FileTypeMismatch {
      file_path: file_path.to_string(),
      expected: file_type,
      found: found.map_or_else(|| "no page file type".to_string(), |t| t.to_string()),
    }),
  }
}

fn parse_glob_value(
  section: GlobSection,
  file_path: &str,
  value: &PageValue,
) -> Result<GlobValue, PagesError> {
  if section.is_lazy() {
    return match value.as_callable() {
      Some(loader) => Ok(GlobValue::Loader(loader.clone())),
      None => Err(PagesError::InvalidLoader {
        section: section.key().to_string(),
        file_path: file_path.to_string(),
        found: value.kind().to_string(),
      }),
    };
  }
  let Some(module) = value.as_object() else {
    return Err(PagesError::invalid_module(
      file_path,
      format!("eager module is a {}, expected an object", value.kind()),
    ));
  };
  match section {
    GlobSection::PageFilesExportNamesEager => {
      Ok(GlobValue::ExportNames(export_names_of(file_path, module)?))
    }
    _ => Ok(GlobValue::Exports(module.clone())),
  }
}

/// Extract `exportNames` from an export-names module.
pub(crate) fn export_names_of(
  file_path: &str,
  module: &PageObject,
) -> Result<Vec<String>, PagesError> {
  module.get("exportNames").and_then(PageValue::as_string_array).ok_or_else(|| {
    PagesError::invalid_module(file_path, "`exportNames` is missing or not an array of strings")
  })
}

/// Validate a generated glob object and merge it into a page file registry.
pub fn parse_glob_results(
  raw: &PageValue,
  diagnostics: &Diagnostics,
) -> Result<PageFileRegistry, PagesError> {
  let glob = GlobResult::from_value(raw)?;
  let registry = PageFileRegistry::from_glob_result(&glob)?;
  diagnostics.emit(Diagnostic::PageFilesParsed { count: registry.len() });
  Ok(registry)
}
