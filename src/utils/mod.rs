//! Utility functions and helpers.

pub mod http;
pub mod url;

pub use self::http::{FetchedPage, Fetcher, HttpFetcher};
pub use self::url::{TemplateVars, build_search_url, normalize};
