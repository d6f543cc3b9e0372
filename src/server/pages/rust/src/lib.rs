/* src/server/pages/rust/src/lib.rs */

pub mod codec;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod errors;
pub mod escape;
pub mod exports;
pub mod file_type;
pub mod glob;
pub mod registry;
pub mod serialize;
pub mod stem;
pub mod value;

// Re-exports for ergonomic use
pub use codec::{JsonSerializer, SerializeError, Serializer};
pub use config::{Capabilities, DEFAULT_STEM_CONFIG_FILE, PagesConfig, load_pages_config};
pub use context::{PageConfig, PageContext, add_is404_to_page_props, is_error_page};
pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, MemorySink, TracingSink};
pub use errors::PagesError;
pub use escape::escape_inline_json;
pub use file_type::{Env, FileType, page_id_of};
pub use glob::{GlobResult, parse_glob_results};
pub use registry::{PageFile, PageFileRegistry};
pub use serialize::{
  NOT_SERIALIZABLE, parse_page_context_client_side, serialize_page_context_client_side,
};
pub use stem::{
  NodeModulesDiscovery, StemConfig, StemConfigLoader, StemDiscovery, StemPackage,
  is_stem_package_name,
};
pub use value::{BoxFuture, Callable, PageObject, PageValue};
