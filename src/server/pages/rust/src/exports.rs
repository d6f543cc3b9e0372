/* src/server/pages/rust/src/exports.rs */

use crate::errors::PagesError;
use crate::value::{PageObject, PageValue};

/// Exports that must be functions when a page file defines them.
pub const HOOK_EXPORTS: &[&str] = &[
  "render",
  "onBeforeRender",
  "onBeforePrerender",
  "prerender",
  "onRenderHtml",
  "onRenderClient",
  "guard",
];

/// Check the values a page file exports against what the renderer expects.
pub fn assert_export_values(file_path: &str, exports: &PageObject) -> Result<(), PagesError> {
  for (name, value) in exports {
    let expected = if HOOK_EXPORTS.contains(&name.as_str()) {
      (!value.is_callable()).then_some("a function")
    } else {
      match name.as_str() {
        "doNotPrerender" => (!matches!(value, PageValue::Bool(_))).then_some("a boolean"),
        "passToClient" => value.as_string_array().is_none().then_some("an array of strings"),
        _ => None,
      }
    };
    if let Some(expected) = expected {
      return Err(PagesError::InvalidExportValue {
        file_path: file_path.to_string(),
        export_name: name.clone(),
        expected: expected.to_string(),
        found: value.kind().to_string(),
      });
    }
  }
  Ok(())
}
