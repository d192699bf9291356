//! Generic `<img>` scan.

use std::iter;
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::{Document, ExtractionStrategy, RawCandidate, parse_dimension};
use crate::services::classifier::ElementMeta;

static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("IMG is a valid static selector"));

/// Attributes holding the image location, in order of preference.
const SOURCE_ATTRS: &[&str] = &["src", "data-src", "data-lazy"];

/// Every image element in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomScan;

impl ExtractionStrategy for DomScan {
    fn name(&self) -> &'static str {
        "dom"
    }

    fn candidates<'a>(
        &'a self,
        document: &'a Document,
    ) -> Box<dyn Iterator<Item = RawCandidate> + 'a> {
        match document.html() {
            Some(html) => Box::new(html.select(&IMG).filter_map(image_candidate)),
            None => Box::new(iter::empty()),
        }
    }
}

fn image_candidate(img: ElementRef<'_>) -> Option<RawCandidate> {
    let el = img.value();
    let url = SOURCE_ATTRS
        .iter()
        .filter_map(|attr| el.attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())?;

    let owned = |name: &str| el.attr(name).map(str::to_string);
    let meta = ElementMeta {
        class: owned("class"),
        alt: owned("alt"),
        role: owned("role"),
    };

    Some(RawCandidate {
        url: url.to_string(),
        thumbnail: None,
        title: meta
            .alt
            .as_deref()
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(str::to_string),
        width: el.attr("width").and_then(parse_dimension),
        height: el.attr("height").and_then(parse_dimension),
        meta,
    })
}
