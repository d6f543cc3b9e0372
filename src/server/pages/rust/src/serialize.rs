/* src/server/pages/rust/src/serialize.rs */

use std::collections::HashSet;

use crate::codec::{self, Serializer};
use crate::context::{PageContext, add_is404_to_page_props};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::PagesError;
use crate::escape::escape_inline_json;
use crate::value::{PageObject, PageValue};

/// Always sent to the client, whatever the page declares.
pub const PASS_TO_CLIENT_BUILT_IN: &[&str] = &["abortReason", "_urlRewrite"];

/// Additionally sent when rendering the error page.
pub const PASS_TO_CLIENT_BUILT_IN_ERROR: &[&str] = &["pageProps", "is404", "_isError"];

/// Replaces a pass-through value that cannot be serialized.
pub const NOT_SERIALIZABLE: &str = "not-serializable";

/// Serialize the client-visible subset of a page context.
///
/// The output always holds `_pageId` plus every pass-through key, absent
/// ones as `undefined`. A property that cannot be serialized is replaced by
/// [`NOT_SERIALIZABLE`] and reported as a warning instead of failing the render.
pub fn serialize_page_context_client_side(
  ctx: &mut PageContext,
  serializer: &dyn Serializer,
  diagnostics: &Diagnostics,
) -> Result<String, PagesError> {
  let pass_to_client = pass_to_client_props(ctx)?;

  let mut client = PageObject::new();
  client.insert("_pageId".to_string(), PageValue::String(ctx.page_id.clone()));
  for prop in &pass_to_client {
    client.insert(prop.clone(), ctx.get(prop));
  }

  let serialized = match serializer.serialize(&PageValue::Object(client.clone()), None) {
    Ok(serialized) => serialized,
    Err(_) => {
      let mut has_warned = false;
      for prop in &pass_to_client {
        let quoted = serde_json::Value::from(prop.as_str()).to_string();
        let var_name = format!("pageContext[{quoted}]");
        let Err(err) = serializer.serialize(&ctx.get(prop), Some(&var_name)) else {
          continue;
        };
        has_warned = true;
        client.insert(prop.clone(), PageValue::String(NOT_SERIALIZABLE.to_string()));
        diagnostics.emit(Diagnostic::PropNotSerializable {
          prop: prop.clone(),
          message: format!(
            "{var_name} cannot be serialized and, therefore, cannot be passed to the client. \
             Make sure that {var_name} is serializable, or remove {quoted} from passToClient. \
             Serialization error: {}",
            lowercase_first_letter(err.message())
          ),
        });
      }
      if !has_warned {
        return Err(PagesError::Serialization {
          message: "page context failed to serialize but no single property did".to_string(),
        });
      }
      serializer
        .serialize(&PageValue::Object(client), None)
        .map_err(|e| PagesError::Serialization { message: e.to_string() })?
    }
  };

  Ok(escape_inline_json(&serialized))
}

/// User-declared props plus built-ins, first occurrence wins.
fn pass_to_client_props(ctx: &mut PageContext) -> Result<Vec<String>, PagesError> {
  let mut props: Vec<String> = ctx.pass_to_client.clone();
  props.extend(PASS_TO_CLIENT_BUILT_IN.iter().map(|p| (*p).to_string()));

  if ctx.is_error_page() {
    add_is404_to_page_props(ctx)?;
    props.extend(PASS_TO_CLIENT_BUILT_IN_ERROR.iter().map(|p| (*p).to_string()));
  }

  let mut seen = HashSet::new();
  props.retain(|p| p != "_pageId" && seen.insert(p.clone()));
  Ok(props)
}

/// Decode a payload produced by [`serialize_page_context_client_side`].
pub fn parse_page_context_client_side(payload: &str) -> Result<PageObject, PagesError> {
  let value =
    codec::parse(payload).map_err(|e| PagesError::Serialization { message: e.to_string() })?;
  let kind = value.kind();
  value.into_object().ok_or_else(|| PagesError::Serialization {
    message: format!("page context payload is a {kind}, expected an object"),
  })
}

fn lowercase_first_letter(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_lowercase().chain(chars).collect(),
    None => String::new(),
  }
}
