// src/services/extractor.rs

//! Image extractor service.
//!
//! Fetches search pages from registered sources and runs each document
//! through the extraction pipeline. Multi-source searches fan out with
//! bounded concurrency; one source failing never fails the search.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use regex::Regex;

use crate::error::{AppError, Result};

use crate::models::{
    Config, EngineOutcome, EngineResult, FanoutConfig, FanoutReport, SearchRequest,
    SourceDescriptor, StrategyKind,
};
use crate::pipeline::process::process_with;
use crate::services::classifier::ImageClassifier;
use crate::services::registry::{InMemoryRegistry, SourceRegistry};
use crate::strategies::Document;
use crate::utils::http::{FetchedPage, Fetcher, HttpFetcher};
use crate::utils::url::{TemplateVars, build_search_url};

/// Fan-out coordinator over the source registry.
pub struct ImageExtractor {
    registry: Arc<dyn SourceRegistry>,
    fetcher: Arc<dyn Fetcher>,
    classifier: ImageClassifier,
    fanout: FanoutConfig,
}

impl ImageExtractor {
    pub fn new(
        registry: Arc<dyn SourceRegistry>,
        fetcher: Arc<dyn Fetcher>,
        classifier: ImageClassifier,
        fanout: FanoutConfig,
    ) -> Self {
        Self {
            registry,
            fetcher,
            classifier,
            fanout,
        }
    }

    /// Build an extractor with a reqwest fetcher and the configured sources.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.http)?;
        let registry = InMemoryRegistry::new(config.sources.iter().cloned());

        Ok(Self::new(
            Arc::new(registry),
            Arc::new(fetcher),
            ImageClassifier::new(config.classifier.clone()),
            config.fanout.clone(),
        ))
    }

    pub fn registry(&self) -> &Arc<dyn SourceRegistry> {
        &self.registry
    }

    /// Query a single source.
    ///
    /// Only an unknown `source_id` is an error; fetch and parse problems
    /// come back as [`EngineOutcome::Failure`].
    pub async fn extract_one(
        &self,
        source_id: &str,
        request: &SearchRequest,
    ) -> Result<EngineOutcome> {
        let source = self
            .registry
            .get(source_id)
            .ok_or_else(|| AppError::invalid_source(source_id))?;

        let outcome = match self.search(&source, request).await {
            Ok(result) => {
                log::info!(
                    "[{}] {} images (total {})",
                    source.id,
                    result.images.len(),
                    result.pagination.total
                );
                EngineOutcome::Success(result)
            }
            Err(error) => {
                log::warn!("[{}] Extraction failed: {}", source.id, error);
                EngineOutcome::failure(&source.id, error)
            }
        };

        Ok(outcome)
    }

    /// Query many sources with at most `concurrency` fetches in flight.
    ///
    /// Unknown ids are reported as failures. Results are in completion order.
    pub async fn extract_many(
        &self,
        source_ids: &[String],
        request: &SearchRequest,
        concurrency: usize,
    ) -> FanoutReport {
        let concurrency = concurrency.max(1);
        log::info!(
            "Searching {} sources for '{}' (concurrency {})",
            source_ids.len(),
            request.query,
            concurrency
        );

        let results: Vec<EngineOutcome> = stream::iter(source_ids)
            .map(|id| async move {
                match self.extract_one(id, request).await {
                    Ok(outcome) => outcome,
                    Err(error) => {
                        log::warn!("[{id}] {error}");
                        EngineOutcome::failure(id.as_str(), error)
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let report = FanoutReport::new(request.query.clone(), results);
        log::info!(
            "Search complete: {}/{} sources succeeded, {} images",
            report.succeeded,
            report.total_sources,
            report.total_images
        );
        report
    }

    /// Query every registered source.
    pub async fn extract_all(&self, request: &SearchRequest, concurrency: usize) -> FanoutReport {
        let ids: Vec<String> = self
            .registry
            .list()
            .into_iter()
            .map(|source| source.id)
            .collect();
        self.extract_many(&ids, request, concurrency).await
    }

    /// Run the pipeline over a document that was already fetched.
    pub fn extract_document(
        &self,
        source_id: &str,
        url: &str,
        body: &str,
        content_type: Option<&str>,
        request: &SearchRequest,
    ) -> Result<EngineResult> {
        let source = self
            .registry
            .get(source_id)
            .ok_or_else(|| AppError::invalid_source(source_id))?;
        let document = Document::parse(body, content_type);
        self.process(&source, &source.strategies, url, &document, request)
    }

    /// Fetch and extract, going through the token page first when the
    /// source has one.
    async fn search(
        &self,
        source: &SourceDescriptor,
        request: &SearchRequest,
    ) -> Result<EngineResult> {
        let vars = TemplateVars {
            safe: source.safe_search.value(request.safe_search),
            ..TemplateVars::new(&request.query, request.page)
        };

        let token = match &source.token {
            Some(step) => {
                let token_url = build_search_url(&step.url_template, &vars);
                let page = self.fetch_ok(&source.id, &token_url).await?;
                match capture_token(&step.pattern, &page.body)? {
                    Some(token) => Some(token),
                    None => {
                        log::warn!(
                            "[{}] No token in {}, extracting the token page instead",
                            source.id,
                            token_url
                        );
                        let document = Document::parse(&page.body, page.content_type.as_deref());
                        return self.process(
                            source,
                            &step.fallback,
                            &token_url,
                            &document,
                            request,
                        );
                    }
                }
            }
            None => None,
        };

        let url = build_search_url(
            &source.url_template,
            &TemplateVars {
                token: token.as_deref(),
                ..vars
            },
        );
        let page = self.fetch_ok(&source.id, &url).await?;
        let document = Document::parse(&page.body, page.content_type.as_deref());
        self.process(source, &source.strategies, &url, &document, request)
    }

    async fn fetch_ok(&self, source_id: &str, url: &str) -> Result<FetchedPage> {
        log::debug!("[{source_id}] Fetching {url}");
        let page = self.fetcher.fetch(url).await?;
        if !page.is_success() {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: page.status,
            });
        }
        Ok(page)
    }

    fn process(
        &self,
        source: &SourceDescriptor,
        strategies: &[StrategyKind],
        url: &str,
        document: &Document,
        request: &SearchRequest,
    ) -> Result<EngineResult> {
        process_with(
            source,
            strategies,
            url,
            document,
            request,
            &self.classifier,
            &self.fanout,
        )
        .map_err(|e| AppError::extraction(&source.id, e))
    }
}

/// First capture group of `pattern` in `body`.
fn capture_token(pattern: &str, body: &str) -> Result<Option<String>> {
    let regex = Regex::new(pattern)
        .map_err(|e| AppError::validation(format!("Invalid token pattern '{pattern}': {e}")))?;
    Ok(regex
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|token| !token.is_empty()))
}
