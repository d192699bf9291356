//! Inline-script regex scan.
//!
//! Engines like Google Images ship results as serialized data inside
//! `<script>` callbacks rather than as DOM elements.

use std::iter;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use super::{Document, ExtractionStrategy, RawCandidate};

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("SCRIPT is a valid static selector"));

static QUOTED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(https?:\\?/\\?/[^"\s]*)""#)
        .expect("QUOTED_URL is a valid static regex pattern")
});

static IMAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:jpg|jpeg|png|gif|webp)")
        .expect("IMAGE_EXTENSION is a valid static regex pattern")
});

/// Quoted URLs inside scripts that contain `marker`.
///
/// A URL is kept when it carries an image extension or contains one of the
/// `accept` substrings (e.g. extension-less `encrypted-tbn` thumbnails).
#[derive(Debug, Clone)]
pub struct ScriptScan {
    marker: String,
    accept: Vec<String>,
}

impl ScriptScan {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            accept: Vec::new(),
        }
    }

    pub fn accepting(mut self, accept: Vec<String>) -> Self {
        self.accept = accept
            .into_iter()
            .map(|a| a.to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        self
    }

    fn keeps(&self, url: &str) -> bool {
        if IMAGE_EXTENSION.is_match(url) {
            return true;
        }
        let lower = url.to_lowercase();
        self.accept.iter().any(|a| lower.contains(a.as_str()))
    }
}

impl ExtractionStrategy for ScriptScan {
    fn name(&self) -> &'static str {
        "script"
    }

    fn candidates<'a>(
        &'a self,
        document: &'a Document,
    ) -> Box<dyn Iterator<Item = RawCandidate> + 'a> {
        let Some(html) = document.html() else {
            return Box::new(iter::empty());
        };

        Box::new(
            html.select(&SCRIPT)
                .map(|script| script.text().collect::<String>())
                .filter(|body| body.contains(self.marker.as_str()))
                .flat_map(|body| {
                    QUOTED_URL
                        .captures_iter(&body)
                        .filter_map(|caps| caps.get(1))
                        .map(|m| unescape_js(m.as_str()))
                        .filter(|url| self.keeps(url))
                        .map(RawCandidate::new)
                        .collect::<Vec<_>>()
                }),
        )
    }
}

/// Undo the escapes JS serializers apply inside string literals.
fn unescape_js(raw: &str) -> String {
    raw.replace("\\u003d", "=")
        .replace("\\u003D", "=")
        .replace("\\u0026", "&")
        .replace("\\/", "/")
}
