// src/models/image.rs

//! Extraction results and their wire shapes.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A content image returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    /// 1-based position within the returned page
    pub id: usize,

    /// Absolute http(s) URL of the image
    pub url: String,

    /// Thumbnail URL (same as `url` when the source has none)
    pub thumbnail: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Source id the image came from
    pub source: String,
}

/// Pagination metadata for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub has_next_page: bool,
    pub next_page: usize,
    /// Deduplicated candidate count before slicing
    pub total: usize,
}

/// Successful extraction from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResult {
    pub engine: String,
    /// The search URL that was fetched
    pub url: String,
    pub images: Vec<ImageResult>,
    pub pagination: PaginationInfo,
}

/// Failed extraction from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    pub engine: String,
    pub error: String,
}

/// Outcome of querying one source: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EngineOutcome {
    Success(EngineResult),
    Failure(EngineFailure),
}

impl EngineOutcome {
    /// Build a failure outcome from any displayable error.
    pub fn failure(engine: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Failure(EngineFailure {
            engine: engine.into(),
            error: error.to_string(),
        })
    }

    pub fn engine(&self) -> &str {
        match self {
            Self::Success(result) => &result.engine,
            Self::Failure(failure) => &failure.engine,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Number of images on the returned page (zero for failures).
    pub fn image_count(&self) -> usize {
        match self {
            Self::Success(result) => result.images.len(),
            Self::Failure(_) => 0,
        }
    }
}

/// Aggregate of a multi-source search.
///
/// `results` are in completion order, not request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanoutReport {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub total_sources: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_images: usize,
    pub results: Vec<EngineOutcome>,
}

impl FanoutReport {
    /// Summarize a set of outcomes.
    pub fn new(query: impl Into<String>, results: Vec<EngineOutcome>) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            query: query.into(),
            timestamp: Utc::now(),
            total_sources: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            total_images: results.iter().map(EngineOutcome::image_count).sum(),
            results,
        }
    }
}

/// Safe-search level requested from the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    On,
    #[default]
    Moderate,
    Off,
}

impl FromStr for SafeSearch {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "strict" => Ok(Self::On),
            "moderate" => Ok(Self::Moderate),
            "off" => Ok(Self::Off),
            other => Err(AppError::validation(format!(
                "Unknown safe-search level '{other}'"
            ))),
        }
    }
}

/// Query plus the requested page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub page: usize,
    pub limit: usize,
    pub safe_search: SafeSearch,
}

impl SearchRequest {
    /// Build a request; page and limit below 1 are raised to 1.
    pub fn new(query: impl Into<String>, page: usize, limit: usize) -> Self {
        Self {
            query: query.into(),
            page: page.max(1),
            limit: limit.max(1),
            safe_search: SafeSearch::default(),
        }
    }

    pub fn with_safe_search(mut self, level: SafeSearch) -> Self {
        self.safe_search = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_untagged() {
        let failure = EngineOutcome::failure("bing", "HTTP status 429");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "engine": "bing", "error": "HTTP status 429" })
        );

        let success = EngineOutcome::Success(EngineResult {
            engine: "pexels".into(),
            url: "https://www.pexels.com/search/cat".into(),
            images: vec![ImageResult {
                id: 1,
                url: "https://images.pexels.com/p/1.jpg".into(),
                thumbnail: "https://images.pexels.com/p/1.jpg".into(),
                title: None,
                width: Some(640),
                height: None,
                source: "pexels".into(),
            }],
            pagination: PaginationInfo {
                current_page: 1,
                has_next_page: false,
                next_page: 2,
                total: 1,
            },
        });
        let json = serde_json::to_value(&success).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["pagination"]["hasNextPage"], false);
        assert_eq!(json["images"][0]["width"], 640);
        assert!(json["images"][0].get("title").is_none());
    }

    #[test]
    fn test_report_counts() {
        let report = FanoutReport::new(
            "gatos",
            vec![
                EngineOutcome::failure("a", "boom"),
                EngineOutcome::failure("b", "boom"),
            ],
        );
        assert_eq!(report.total_sources, 2);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 2);
        assert_eq!(report.total_images, 0);
    }

    #[test]
    fn test_search_request_clamps() {
        let request = SearchRequest::new("x", 0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 1);
        assert_eq!(request.safe_search, SafeSearch::Moderate);
    }

    #[test]
    fn test_safe_search_from_str() {
        assert_eq!("Strict".parse::<SafeSearch>().unwrap(), SafeSearch::On);
        assert_eq!("off".parse::<SafeSearch>().unwrap(), SafeSearch::Off);
        assert!("maybe".parse::<SafeSearch>().is_err());
    }
}
