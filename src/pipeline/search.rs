// src/pipeline/search.rs

//! Search entry points.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::models::{EngineOutcome, EngineResult, FanoutReport, SearchRequest};
use crate::services::ImageExtractor;

/// Query one source.
pub async fn run_search(
    extractor: &ImageExtractor,
    source_id: &str,
    request: &SearchRequest,
) -> Result<EngineOutcome> {
    log::info!(
        "Searching '{}' on {} (page {}, limit {})",
        request.query,
        source_id,
        request.page,
        request.limit
    );
    extractor.extract_one(source_id, request).await
}

/// Query several sources, or every registered source when `source_ids` is empty.
pub async fn run_fanout(
    extractor: &ImageExtractor,
    source_ids: &[String],
    request: &SearchRequest,
    concurrency: usize,
) -> FanoutReport {
    if source_ids.is_empty() {
        extractor.extract_all(request, concurrency).await
    } else {
        extractor.extract_many(source_ids, request, concurrency).await
    }
}

/// Run the pipeline over a saved search page. No network access.
pub async fn run_extract_file(
    extractor: &ImageExtractor,
    source_id: &str,
    path: &Path,
    url: &str,
    request: &SearchRequest,
) -> Result<EngineResult> {
    let body = tokio::fs::read_to_string(path).await?;
    let content_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.eq_ignore_ascii_case("json"))
        .map(|_| "application/json");

    log::info!("Extracting {} as {} ({} bytes)", path.display(), source_id, body.len());
    extractor.extract_document(source_id, url, &body, content_type, request)
}

/// Serialize a result for stdout.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
