//! Pipeline stages and entry points.
//!
//! - `paginate`: dedupe and page slicing
//! - `process`: strategies → normalizer → classifier for one document
//! - `search`: single-source, fan-out and offline extraction
//! - `sources`: source table maintenance

pub mod paginate;
pub mod process;
pub mod search;
pub mod sources;

pub use search::{run_extract_file, run_fanout, run_search, to_json};
pub use sources::{list_sources, run_add_source, run_remove_source};
