/* src/server/pages/rust/src/glob/mod.rs */

// Parse the glob maps generated by the bundler into a page file registry.
// Four sections (lazy/eager x exports/export names) are validated, then
// merged per file path.

mod parser;
mod types;

#[cfg(test)]
mod tests;

pub(crate) use parser::export_names_of;
pub use parser::parse_glob_results;
pub use types::{GlobEntry, GlobResult, GlobSection, GlobValue};
