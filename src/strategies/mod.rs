//! Extraction strategies.
//!
//! Each strategy turns a parsed search page into a lazy, finite stream of
//! [`RawCandidate`]s. Sources pick a chain of strategies in their
//! descriptor; adding a source never means writing a new pipeline.
//!
//! - `dom`: generic `<img>` scan
//! - `metadata`: JSON blobs carried in element attributes
//! - `linked`: result containers linking to the full image
//! - `script`: quoted image URLs inside marked `<script>` bodies
//! - `json_tree`: recursive walk over a JSON response
//! - `json_fields`: field-mapped result list in a JSON response

mod dom;
mod json_fields;
mod json_tree;
mod linked;
mod metadata;
mod script;

use scraper::Html;
use serde_json::Value;

use crate::error::Result;
use crate::models::StrategyKind;
use crate::services::classifier::ElementMeta;

pub use dom::DomScan;
pub use json_fields::{FieldMap, JsonFieldScan};
pub use json_tree::JsonTreeWalk;
pub use linked::LinkedScan;
pub use metadata::MetadataScan;
pub use script::ScriptScan;

/// Anti-hijacking prefix some engines put in front of JSON bodies.
const XSSI_GUARD: &str = ")]}'";

/// Top-level JSON fields some engines use to ship an HTML fragment.
const EMBEDDED_HTML_FIELDS: &[&str] = &["data", "html"];

/// A fetched page, parsed once and shared by every strategy in the chain.
#[derive(Debug)]
pub enum Document {
    Html(Html),
    /// JSON body; `embedded` holds an HTML fragment found in a known field
    Json {
        value: Value,
        embedded: Option<Html>,
    },
}

impl Document {
    /// Parse a response body.
    ///
    /// Bodies declared as JSON, or that start like JSON, are parsed with
    /// serde_json; anything else (including JSON that fails to parse) is
    /// treated as HTML.
    pub fn parse(body: &str, content_type: Option<&str>) -> Self {
        let trimmed = body.trim_start();
        let unguarded = trimmed
            .strip_prefix(XSSI_GUARD)
            .map(str::trim_start)
            .unwrap_or(trimmed);

        let declared_json =
            content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        if declared_json || unguarded.starts_with('{') || unguarded.starts_with('[') {
            match serde_json::from_str::<Value>(unguarded) {
                Ok(value) => {
                    let embedded = embedded_html(&value).map(Html::parse_document);
                    return Self::Json { value, embedded };
                }
                Err(e) => log::debug!("Body is not JSON ({e}), parsing as HTML"),
            }
        }

        Self::Html(Html::parse_document(body))
    }

    /// The HTML tree: the page itself, or the fragment embedded in a JSON body.
    pub fn html(&self) -> Option<&Html> {
        match self {
            Self::Html(html) => Some(html),
            Self::Json { embedded, .. } => embedded.as_ref(),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json { value, .. } => Some(value),
            Self::Html(_) => None,
        }
    }
}

fn embedded_html(value: &Value) -> Option<&str> {
    EMBEDDED_HTML_FIELDS
        .iter()
        .filter_map(|field| value.get(field)?.as_str())
        .find(|text| text.trim_start().starts_with('<'))
}

/// An unresolved image reference pulled out of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCandidate {
    /// Attribute or script value as found (may be relative)
    pub url: String,
    pub thumbnail: Option<String>,
    pub title: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub meta: ElementMeta,
}

impl RawCandidate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Source-specific way of finding image candidates in a document.
///
/// Implementations yield nothing for document kinds they do not understand.
/// The returned iterator is consumed at most once and may be dropped early;
/// strategies must not scan ahead of what is pulled.
pub trait ExtractionStrategy {
    fn name(&self) -> &'static str;

    fn candidates<'a>(&'a self, document: &'a Document)
    -> Box<dyn Iterator<Item = RawCandidate> + 'a>;
}

/// Instantiate one configured strategy.
pub fn build(kind: &StrategyKind) -> Result<Box<dyn ExtractionStrategy>> {
    Ok(match kind {
        StrategyKind::Dom => Box::new(DomScan),
        StrategyKind::Metadata { selector, attr } => Box::new(MetadataScan::new(selector, attr)?),
        StrategyKind::Linked { selector } => Box::new(LinkedScan::new(selector)?),
        StrategyKind::Script { marker, accept } => {
            Box::new(ScriptScan::new(marker.clone()).accepting(accept.clone()))
        }
        StrategyKind::JsonTree => Box::new(JsonTreeWalk),
        StrategyKind::JsonFields {
            items,
            url,
            thumbnail,
            title,
            width,
            height,
        } => Box::new(JsonFieldScan::new(FieldMap {
            items: items.clone(),
            url: url.clone(),
            thumbnail: thumbnail.clone(),
            title: title.clone(),
            width: width.clone(),
            height: height.clone(),
        })),
    })
}

/// Instantiate a source's strategy chain in order.
pub fn build_chain(kinds: &[StrategyKind]) -> Result<Vec<Box<dyn ExtractionStrategy>>> {
    kinds.iter().map(build).collect()
}

/// Parse a `u32` out of a loosely typed attribute or JSON value.
fn parse_dimension(raw: &str) -> Option<u32> {
    let raw = raw.trim().trim_end_matches("px");
    raw.parse::<u32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u32))
}

/// Trimmed, non-empty string field of a JSON object.
fn json_text(object: &Value, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Dimension field given either as a number or a string.
fn json_dimension(object: &Value, key: &str) -> Option<u32> {
    match object.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v as u32)),
        Value::String(s) => parse_dimension(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_html_document() {
        let doc = Document::parse("<html><body><img src='a.jpg'></body></html>", None);
        assert!(doc.html().is_some());
    }

    #[test]
    fn test_parse_json_document() {
        let doc = Document::parse(r#"{"results": []}"#, Some("text/html"));
        assert!(doc.json().is_some());

        let doc = Document::parse(")]}'\n[[\"x\"]]", None);
        assert!(doc.json().is_some());
    }

    #[test]
    fn test_json_with_embedded_html() {
        let doc = Document::parse(
            r#"{"data": "<div><img src='https://img.test/a.jpg'></div>", "count": 1}"#,
            Some("application/json"),
        );
        assert!(doc.json().is_some());
        let found: Vec<_> = DomScan.candidates(&doc).map(|c| c.url).collect();
        assert_eq!(found, vec!["https://img.test/a.jpg"]);

        let plain = Document::parse(r#"{"data": "no markup here"}"#, None);
        assert!(plain.html().is_none());
    }

    #[test]
    fn test_declared_json_that_fails_falls_back_to_html() {
        let doc = Document::parse("<html>oops</html>", Some("application/json"));
        assert!(doc.html().is_some());
    }

    #[test]
    fn test_build_chain_preserves_order() {
        let chain = build_chain(&[StrategyKind::script(), StrategyKind::Dom]).unwrap();
        let names: Vec<_> = chain.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["script", "dom"]);
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("640"), Some(640));
        assert_eq!(parse_dimension(" 480px"), Some(480));
        assert_eq!(parse_dimension("199.7"), Some(199));
        assert_eq!(parse_dimension("auto"), None);
    }
}
