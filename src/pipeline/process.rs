// src/pipeline/process.rs

//! Single-document pipeline.
//!
//! strategies → normalizer → classifier → dedupe → paginate

use crate::error::Result;
use crate::models::{
    ChainMode, EngineResult, FanoutConfig, ImageResult, SearchRequest, SourceDescriptor,
    StrategyKind,
};
use crate::pipeline::paginate::{dedupe_by_key, paginate};
use crate::services::ImageClassifier;
use crate::strategies::{self, Document, ExtractionStrategy, RawCandidate};
use crate::utils::url::normalize;

/// Pull at most `budget` raw candidates through the chain and keep the
/// content images, deduplicated by URL in first-seen order.
///
/// With [`ChainMode::FirstMatch`] each strategy gets the full budget on its
/// own and the first one that keeps any image wins.
///
/// Returned images carry `id == 0`; ids are assigned per page.
pub fn collect_images(
    document: &Document,
    base_url: &str,
    source_id: &str,
    chain: &[Box<dyn ExtractionStrategy>],
    mode: ChainMode,
    classifier: &ImageClassifier,
    budget: usize,
) -> Vec<ImageResult> {
    match mode {
        ChainMode::All => {
            let candidates = chain
                .iter()
                .flat_map(|strategy| strategy.candidates(document))
                .take(budget);
            keep_content(candidates, base_url, source_id, classifier)
        }
        ChainMode::FirstMatch => chain
            .iter()
            .map(|strategy| {
                let candidates = strategy.candidates(document).take(budget);
                let images = keep_content(candidates, base_url, source_id, classifier);
                log::debug!(
                    "[{source_id}] {} kept {} images",
                    strategy.name(),
                    images.len()
                );
                images
            })
            .find(|images| !images.is_empty())
            .unwrap_or_default(),
    }
}

fn keep_content(
    candidates: impl Iterator<Item = RawCandidate>,
    base_url: &str,
    source_id: &str,
    classifier: &ImageClassifier,
) -> Vec<ImageResult> {
    let mut dropped = 0usize;
    let images = candidates.filter_map(|candidate| {
        let kept = normalize(Some(&candidate.url), base_url).filter(|url| {
            let meta = (!candidate.meta.is_empty()).then_some(&candidate.meta);
            !classifier.is_system_image(url, meta)
        });
        let Some(url) = kept else {
            dropped += 1;
            return None;
        };

        let thumbnail =
            normalize(candidate.thumbnail.as_deref(), base_url).unwrap_or_else(|| url.clone());

        Some(ImageResult {
            id: 0,
            url,
            thumbnail,
            title: candidate.title,
            width: candidate.width,
            height: candidate.height,
            source: source_id.to_string(),
        })
    });

    let images = dedupe_by_key(images, |image| image.url.clone());
    log::debug!(
        "[{source_id}] {} images kept, {dropped} candidates dropped",
        images.len()
    );
    images
}

/// Run the full pipeline over one fetched document with `source`'s chain.
///
/// Fails only when the strategy chain cannot be built.
pub fn process_document(
    source: &SourceDescriptor,
    url: &str,
    document: &Document,
    request: &SearchRequest,
    classifier: &ImageClassifier,
    fanout: &FanoutConfig,
) -> Result<EngineResult> {
    process_with(
        source,
        &source.strategies,
        url,
        document,
        request,
        classifier,
        fanout,
    )
}

/// Like [`process_document`], with an explicit strategy list.
pub fn process_with(
    source: &SourceDescriptor,
    strategies: &[StrategyKind],
    url: &str,
    document: &Document,
    request: &SearchRequest,
    classifier: &ImageClassifier,
    fanout: &FanoutConfig,
) -> Result<EngineResult> {
    let chain = strategies::build_chain(strategies)?;
    let budget = fanout.candidate_budget(request.page, request.limit);

    let images = collect_images(
        document,
        url,
        &source.id,
        &chain,
        source.chain,
        classifier,
        budget,
    );
    let page = paginate(images, request.page, request.limit);

    let images = page
        .data
        .into_iter()
        .enumerate()
        .map(|(index, image)| ImageResult {
            id: index + 1,
            ..image
        })
        .collect();

    Ok(EngineResult {
        engine: source.id.clone(),
        url: url.to_string(),
        images,
        pagination: page.pagination,
    })
}
