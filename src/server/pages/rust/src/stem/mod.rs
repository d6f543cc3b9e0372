/* src/server/pages/rust/src/stem/mod.rs */

// Stem packages: dependencies that extend page-file discovery and ship their
// own configuration file.

mod discovery;
mod loader;
mod types;


pub use discovery::{NodeModulesDiscovery, json_module_loader};
pub use loader::StemConfigLoader;
pub use types::{StemConfig, StemDiscovery, StemModuleLoader, StemPackage, is_stem_package_name};
