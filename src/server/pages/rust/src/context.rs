/* src/server/pages/rust/src/context.rs */

use crate::errors::PagesError;
use crate::file_type::is_error_page_id;
use crate::value::{PageObject, PageValue};

/// Per-page configuration relevant to client serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
  pub page_id: String,
  pub is_error_page: bool,
}

/// Server-side page context as seen by the client serializer.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
  pub page_id: String,
  /// Property names the page allows to reach the client.
  pub pass_to_client: Vec<String>,
  pub page_configs: Vec<PageConfig>,
  pub is404: Option<bool>,
  /// Every other property (`pageProps`, `abortReason`, user data...).
  pub props: PageObject,
}

impl PageContext {
  pub fn new(page_id: impl Into<String>) -> Self {
    Self { page_id: page_id.into(), ..Self::default() }
  }

  pub fn pass_to_client<I, S>(mut self, props: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.pass_to_client.extend(props.into_iter().map(Into::into));
    self
  }

  pub fn page_config(mut self, config: PageConfig) -> Self {
    self.page_configs.push(config);
    self
  }

  pub fn is404(mut self, is404: bool) -> Self {
    self.is404 = Some(is404);
    self
  }

  pub fn prop(mut self, name: impl Into<String>, value: impl Into<PageValue>) -> Self {
    self.props.insert(name.into(), value.into());
    self
  }

  /// Property lookup; absent properties read as `undefined`.
  pub fn get(&self, prop: &str) -> PageValue {
    match prop {
      "_pageId" => PageValue::String(self.page_id.clone()),
      "is404" => self.is404.map_or(PageValue::Null, PageValue::Bool),
      _ => self.props.get(prop).cloned().unwrap_or_default(),
    }
  }

  pub fn is_error_page(&self) -> bool {
    is_error_page(&self.page_id, &self.page_configs)
  }
}

/// With page configs the matching config decides; otherwise the page id does.
pub fn is_error_page(page_id: &str, page_configs: &[PageConfig]) -> bool {
  if page_configs.is_empty() {
    return is_error_page_id(page_id);
  }
  page_configs.iter().any(|c| c.page_id == page_id && c.is_error_page)
}

/// Expose `is404` to the error page component through `pageProps.is404`.
pub fn add_is404_to_page_props(ctx: &mut PageContext) -> Result<(), PagesError> {
  let Some(is404) = ctx.is404 else {
    return Err(PagesError::InvalidPageContext {
      detail: "`is404` must be a boolean when rendering the error page".to_string(),
    });
  };
  let page_props =
    ctx.props.entry("pageProps".to_string()).or_insert_with(|| PageValue::Object(PageObject::new()));
  if page_props.is_undefined() {
    *page_props = PageValue::Object(PageObject::new());
  }
  let kind = page_props.kind();
  let Some(props) = page_props.as_object_mut() else {
    return Err(PagesError::InvalidPageContext {
      detail: format!("`pageProps` is a {kind}, expected an object"),
    });
  };
  props.entry("is404".to_string()).or_insert(PageValue::Bool(is404));
  Ok(())
}
