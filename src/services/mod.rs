//! Service layer for the image scraper.
//!
//! - Chrome/content image classification (`ImageClassifier`)
//! - Source lookup (`SourceRegistry`, `InMemoryRegistry`)
//! - Fetching and multi-source fan-out (`ImageExtractor`)

pub mod classifier;
mod extractor;
pub mod registry;

pub use classifier::{ElementMeta, ImageClassifier};
pub use extractor::ImageExtractor;
pub use registry::{InMemoryRegistry, SourceRegistry};
