//! Embedded-metadata scan.
//!
//! Some engines (Bing's `a.iusc[m]`) attach a JSON blob per result:
//! `{"murl": full image, "turl": thumbnail, "t": title, "w": .., "h": ..}`.

use std::iter;

use scraper::Selector;
use serde_json::Value;

use super::{Document, ExtractionStrategy, RawCandidate, json_dimension, json_text};
use crate::error::{AppError, Result};

/// Elements matching `selector` whose `attr` carries result metadata.
#[derive(Debug, Clone)]
pub struct MetadataScan {
    selector: Selector,
    attr: String,
}

impl MetadataScan {
    pub fn new(selector: &str, attr: &str) -> Result<Self> {
        let selector =
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        Ok(Self {
            selector,
            attr: attr.to_string(),
        })
    }
}

impl ExtractionStrategy for MetadataScan {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn candidates<'a>(
        &'a self,
        document: &'a Document,
    ) -> Box<dyn Iterator<Item = RawCandidate> + 'a> {
        let Some(html) = document.html() else {
            return Box::new(iter::empty());
        };

        Box::new(
            html.select(&self.selector)
                .filter_map(|el| el.value().attr(&self.attr))
                .filter_map(parse_blob),
        )
    }
}

/// Decode one blob; malformed or URL-less blobs are skipped.
fn parse_blob(raw: &str) -> Option<RawCandidate> {
    let blob: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Skipping malformed metadata blob: {e}");
            return None;
        }
    };

    Some(RawCandidate {
        url: json_text(&blob, "murl")?,
        thumbnail: json_text(&blob, "turl"),
        title: json_text(&blob, "t"),
        width: json_dimension(&blob, "w"),
        height: json_dimension(&blob, "h"),
        ..RawCandidate::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="results">
            <a class="iusc" m='{"murl":"https://img.example.com/cat.jpg","turl":"https://th.example.com/cat","t":"Cat","w":1024,"h":"768"}'></a>
            <a class="iusc" m='{not json'></a>
            <a class="iusc" m='{"turl":"https://th.example.com/no-full"}'></a>
            <a class="iusc"></a>
            <a class="other" m='{"murl":"https://img.example.com/skip.jpg"}'></a>
            <a class="iusc" m='{"murl":"https://img.example.com/dog.png"}'></a>
        </div>"#;

    #[test]
    fn test_bad_blobs_are_skipped_not_fatal() {
        let doc = Document::parse(PAGE, None);
        let scan = MetadataScan::new("a.iusc", "m").unwrap();
        let found: Vec<_> = scan.candidates(&doc).collect();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].url, "https://img.example.com/cat.jpg");
        assert_eq!(found[0].thumbnail.as_deref(), Some("https://th.example.com/cat"));
        assert_eq!(found[0].title.as_deref(), Some("Cat"));
        assert_eq!(found[0].width, Some(1024));
        assert_eq!(found[0].height, Some(768));
        assert_eq!(found[1].url, "https://img.example.com/dog.png");
        assert_eq!(found[1].thumbnail, None);
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            MetadataScan::new("a[[", "m"),
            Err(AppError::Selector { .. })
        ));
    }
}
