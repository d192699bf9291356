//! Linked-thumbnail scan.
//!
//! Result containers (Bing's `.imgpt`) hold a thumbnail `<img>` and sit
//! inside an anchor pointing at the result.

use std::iter;
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::{Document, ExtractionStrategy, RawCandidate};
use crate::error::{AppError, Result};
use crate::services::classifier::ElementMeta;

static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("IMG is a valid static selector"));

/// Elements matching `selector`; the URL is the enclosing link, else the
/// thumbnail itself.
#[derive(Debug, Clone)]
pub struct LinkedScan {
    selector: Selector,
}

impl LinkedScan {
    pub fn new(selector: &str) -> Result<Self> {
        let parsed =
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        Ok(Self { selector: parsed })
    }
}

impl ExtractionStrategy for LinkedScan {
    fn name(&self) -> &'static str {
        "linked"
    }

    fn candidates<'a>(
        &'a self,
        document: &'a Document,
    ) -> Box<dyn Iterator<Item = RawCandidate> + 'a> {
        match document.html() {
            Some(html) => Box::new(html.select(&self.selector).filter_map(linked_candidate)),
            None => Box::new(iter::empty()),
        }
    }
}

fn linked_candidate(container: ElementRef<'_>) -> Option<RawCandidate> {
    let img = container.select(&IMG).next();
    let parent = container.parent().and_then(ElementRef::wrap);
    let thumbnail = attr(img, "src").or_else(|| attr(img, "data-src"));
    let url = attr(parent, "href").or_else(|| thumbnail.clone())?;

    Some(RawCandidate {
        url,
        thumbnail,
        title: attr(img, "alt"),
        meta: ElementMeta {
            class: attr(img, "class"),
            alt: attr(img, "alt"),
            role: attr(img, "role"),
        },
        ..RawCandidate::default()
    })
}

fn attr(el: Option<ElementRef<'_>>, name: &str) -> Option<String> {
    el.and_then(|e| e.value().attr(name))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
