/* src/server/pages/rust/src/glob/tests.rs */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::diagnostics::{Diagnostic, Diagnostics, MemorySink};
use crate::errors::PagesError;
use crate::file_type::{Env, FileType};
use crate::value::{PageObject, PageValue};

fn loader(module: PageValue) -> PageValue {
  PageValue::function(move || {
    let module = module.clone();
    async move { Ok(module) }
  })
}

fn counting_loader(counter: Arc<AtomicUsize>, module: PageValue) -> PageValue {
  PageValue::function(move || {
    counter.fetch_add(1, Ordering::SeqCst);
    let module = module.clone();
    async move { Ok(module) }
  })
}

fn files(entries: Vec<(&str, PageValue)>) -> PageValue {
  PageValue::object(entries)
}

fn empty() -> PageValue {
  PageValue::Object(PageObject::new())
}

fn export_names(names: &[&str]) -> PageValue {
  let names: Vec<String> = names.iter().map(|n| (*n).to_string()).collect();
  PageValue::object([("exportNames", PageValue::from(names))])
}

/// A minimal valid glob object for one page plus a shared renderer.
fn glob_object() -> PageObject {
  let lazy = PageValue::object([
    (
      ".page",
      files(vec![
        ("/pages/index.page.tsx", loader(PageValue::object([("title", PageValue::from("Home"))]))),
        ("/renderer/_default.page.tsx", loader(empty())),
      ]),
    ),
    (
      ".page.server",
      files(vec![(
        "/pages/index.page.server.ts",
        loader(PageValue::object([(
          "onBeforeRender",
          PageValue::function(|| async { Ok(PageValue::Undefined) }),
        )])),
      )]),
    ),
  ]);
  let export_names_lazy = PageValue::object([(
    ".page.server",
    files(vec![("/pages/index.page.server.ts", loader(export_names(&["onBeforeRender"])))]),
  )]);
  let eager = PageValue::object([(
    ".page.route",
    files(vec![("/pages/index.page.route.ts", PageValue::object([("default", PageValue::from("/"))]))]),
  )]);
  let export_names_eager = PageValue::object([(
    ".page",
    files(vec![("/pages/index.page.tsx", export_names(&["Page", "title"]))]),
  )]);

  let mut obj = PageObject::new();
  obj.insert("isGeneratedFile".into(), PageValue::Bool(true));
  obj.insert("pageFilesLazy".into(), lazy);
  obj.insert("pageFilesExportNamesLazy".into(), export_names_lazy);
  obj.insert("pageFilesEager".into(), eager);
  obj.insert("pageFilesExportNamesEager".into(), export_names_eager);
  obj
}

fn parse(obj: PageObject) -> Result<crate::registry::PageFileRegistry, PagesError> {
  parse_glob_results(&PageValue::Object(obj), &Diagnostics::new(Arc::new(MemorySink::new()), true))
}

#[test]
fn merges_sections_per_file_path() {
  let registry = parse(glob_object()).unwrap();
  let paths: Vec<&str> = registry.iter().map(|f| f.file_path()).collect();
  assert_eq!(
    paths,
    vec![
      "/pages/index.page.route.ts",
      "/pages/index.page.server.ts",
      "/pages/index.page.tsx",
      "/renderer/_default.page.tsx",
    ]
  );

  let page = registry.get("/pages/index.page.tsx").unwrap();
  assert_eq!(page.file_type(), FileType::Page);
  assert!(page.has_file_loader());
  assert_eq!(*page.export_names().unwrap(), vec!["Page".to_string(), "title".to_string()]);
  assert!(page.file_exports().is_none());

  let route = registry.get("/pages/index.page.route.ts").unwrap();
  assert_eq!(route.file_type(), FileType::PageRoute);
  assert_eq!(route.file_exports().unwrap()["default"], PageValue::from("/"));
  assert!(!route.has_export_names_loader());
}

#[test]
fn file_types_match_their_tags() {
  let registry = parse(glob_object()).unwrap();
  for file in registry.iter() {
    assert_eq!(FileType::from_file_path(file.file_path()), Some(file.file_type()));
    assert!(!file.file_path().contains('\\'));
  }
}

#[tokio::test]
async fn lazy_loaders_run_once() {
  let calls = Arc::new(AtomicUsize::new(0));
  let mut obj = glob_object();
  obj.insert(
    "pageFilesLazy".into(),
    PageValue::object([
      (
        ".page",
        files(vec![(
          "/pages/index.page.tsx",
          counting_loader(calls.clone(), PageValue::object([("title", PageValue::from("Home"))])),
        )]),
      ),
      (".page.client", empty()),
    ]),
  );
  let registry = parse(obj).unwrap();
  let page = registry.get("/pages/index.page.tsx").unwrap();

  let first = page.load_file().await.unwrap();
  let second = page.load_file().await.unwrap();
  assert_eq!(calls.load(Ordering::SeqCst), 1);
  assert_eq!(first, second);
  assert_eq!(page.file_exports().unwrap()["title"], PageValue::from("Home"));
}

#[tokio::test]
async fn lazy_export_names_load_on_demand() {
  let registry = parse(glob_object()).unwrap();
  let server = registry.get("/pages/index.page.server.ts").unwrap();
  assert!(server.export_names().is_none());
  let names = server.load_export_names().await.unwrap();
  assert_eq!(*names, vec!["onBeforeRender".to_string()]);
}

#[test]
fn missing_section_is_a_shape_error() {
  let mut obj = glob_object();
  obj.remove("pageFilesLazy");
  let err = parse(obj).unwrap_err();
  assert_eq!(err, PagesError::shape("pageFilesLazy", "is missing"));
}

#[test]
fn non_object_section_is_a_shape_error() {
  let mut obj = glob_object();
  obj.insert("pageFilesEager".into(), PageValue::Null);
  assert!(matches!(parse(obj), Err(PagesError::Shape { section, .. }) if section == "pageFilesEager"));
}

#[test]
fn stale_artifact_detected() {
  let mut obj = glob_object();
  obj.insert("isGeneratedFile".into(), PageValue::Bool(false));
  let err = parse(obj).unwrap_err();
  assert_eq!(err, PagesError::StaleArtifact { found: "false".into() });
  assert!(err.to_string().contains("restart"));
}

#[test]
fn non_boolean_marker_is_stale_too() {
  let mut obj = glob_object();
  obj.insert("isGeneratedFile".into(), PageValue::from("yes"));
  assert!(matches!(parse(obj), Err(PagesError::StaleArtifact { .. })));
}

#[test]
fn missing_marker_is_a_shape_error() {
  let mut obj = glob_object();
  obj.remove("isGeneratedFile");
  assert!(matches!(parse(obj), Err(PagesError::Shape { .. })));
}

#[test]
fn requires_minimal_page_signature() {
  let mut obj = glob_object();
  obj.insert(
    "pageFilesLazy".into(),
    PageValue::object([(".page", files(vec![("/pages/a.page.tsx", loader(empty()))]))]),
  );
  let err = parse(obj).unwrap_err();
  assert!(err.to_string().contains("neither `.page.client` nor `.page.server`"));

  let mut obj = glob_object();
  obj.insert("pageFilesLazy".into(), PageValue::object([(".page.client", empty())]));
  assert!(parse(obj).unwrap_err().to_string().contains("no `.page` files"));
}

#[test]
fn unknown_file_type_rejected() {
  let mut obj = glob_object();
  obj.insert(
    "pageFilesEager".into(),
    PageValue::object([(".page.edge", files(vec![("/pages/a.page.edge.ts", empty())]))]),
  );
  assert_eq!(
    parse(obj).unwrap_err(),
    PagesError::UnknownFileType {
      section: "pageFilesEager".into(),
      file_type: ".page.edge".into(),
    }
  );
}

#[test]
fn lazy_value_must_be_callable() {
  let mut obj = glob_object();
  obj.insert(
    "pageFilesExportNamesLazy".into(),
    PageValue::object([(".page", files(vec![("/pages/index.page.tsx", empty())]))]),
  );
  assert!(matches!(parse(obj), Err(PagesError::InvalidLoader { found, .. }) if found == "object"));
}

#[test]
fn tag_and_file_name_must_agree() {
  let mut obj = glob_object();
  obj.insert(
    "pageFilesEager".into(),
    PageValue::object([(".page.client", files(vec![("/pages/index.page.server.ts", empty())]))]),
  );
  assert_eq!(
    parse(obj).unwrap_err(),
    PagesError::FileTypeMismatch {
      file_path: "/pages/index.page.server.ts".into(),
      expected: FileType::PageClient,
      found: ".page.server".into(),
    }
  );
}

#[test]
fn backslash_paths_fail_fast() {
  let mut obj = glob_object();
  obj.insert(
    "pageFilesEager".into(),
    PageValue::object([(".page", files(vec![("\\pages\\index.page.tsx", empty())]))]),
  );
  assert!(matches!(parse(obj), Err(PagesError::BackslashInPath { .. })));
}

#[test]
fn eager_export_names_shape_checked() {
  let mut obj = glob_object();
  obj.insert(
    "pageFilesExportNamesEager".into(),
    PageValue::object([(
      ".page",
      files(vec![("/pages/index.page.tsx", PageValue::object([("exportNames", PageValue::from("Page"))]))]),
    )]),
  );
  assert!(matches!(parse(obj), Err(PagesError::InvalidModule { .. })));
}

#[test]
fn eager_exports_are_validated() {
  let mut obj = glob_object();
  obj.insert(
    "pageFilesEager".into(),
    PageValue::object([(
      ".page.route",
      files(vec![("/pages/a.page.route.ts", PageValue::object([("guard", PageValue::from("no"))]))]),
    )]),
  );
  assert!(matches!(parse(obj), Err(PagesError::InvalidExportValue { .. })));
}

#[test]
fn sections_keep_processing_order() {
  let glob = GlobResult::from_value(&PageValue::Object(glob_object())).unwrap();
  let order: Vec<GlobSection> = glob.sections().map(|(s, _)| s).collect();
  assert_eq!(order, GlobSection::ORDER.to_vec());
  assert_eq!(glob.entries(GlobSection::PageFilesEager).len(), 1);
}

#[test]
fn parse_emits_count() {
  let sink = Arc::new(MemorySink::new());
  parse_glob_results(&PageValue::Object(glob_object()), &Diagnostics::new(sink.clone(), true))
    .unwrap();
  assert_eq!(sink.events(), vec![Diagnostic::PageFilesParsed { count: 4 }]);
}

#[test]
fn files_for_page_by_env() {
  let registry = parse(glob_object()).unwrap();
  let server: Vec<String> = registry
    .files_for_page("/pages/index", Env::Server)
    .iter()
    .map(|f| f.file_path().to_string())
    .collect();
  assert_eq!(
    server,
    vec![
      "/renderer/_default.page.tsx",
      "/pages/index.page.route.ts",
      "/pages/index.page.server.ts",
      "/pages/index.page.tsx",
    ]
  );
  let client = registry.files_for_page("/pages/index", Env::Client);
  assert!(client.iter().all(|f| f.file_type() != FileType::PageServer));
  assert_eq!(registry.page_ids().into_iter().collect::<Vec<_>>(), vec!["/pages/index"]);
}
