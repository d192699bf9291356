// src/models/mod.rs

//! Domain models for the image scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod image;
mod source;

// Re-export all public types
pub use config::{ClassifierConfig, Config, FanoutConfig, HttpConfig, validate_source};
pub use image::{
    EngineFailure, EngineOutcome, EngineResult, FanoutReport, ImageResult, PaginationInfo,
    SafeSearch, SearchRequest,
};
pub use source::{ChainMode, SafeSearchValues, SourceDescriptor, StrategyKind, TokenStep};
