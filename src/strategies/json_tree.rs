//! Structured-JSON tree walk.
//!
//! Looks for `[full_url, [thumbnail, ..], ..]` tuples anywhere in a nested
//! JSON response.

use std::iter;

use serde_json::Value;

use super::{Document, ExtractionStrategy, RawCandidate};

/// Depth-first, pre-order walk over arrays and object values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTreeWalk;

impl ExtractionStrategy for JsonTreeWalk {
    fn name(&self) -> &'static str {
        "json_tree"
    }

    fn candidates<'a>(
        &'a self,
        document: &'a Document,
    ) -> Box<dyn Iterator<Item = RawCandidate> + 'a> {
        match document.json() {
            Some(root) => Box::new(Walk { stack: vec![root] }),
            None => Box::new(iter::empty()),
        }
    }
}

/// Explicit-stack walker; only advances as far as the consumer pulls.
struct Walk<'a> {
    stack: Vec<&'a Value>,
}

impl Iterator for Walk<'_> {
    type Item = RawCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            let found = match node {
                Value::Array(items) => {
                    // Children of a match are still visited.
                    self.stack.extend(items.iter().rev());
                    match_tuple(items)
                }
                Value::Object(map) => {
                    self.stack.extend(map.values().rev());
                    None
                }
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

fn match_tuple(items: &[Value]) -> Option<RawCandidate> {
    let url = items.first()?.as_str().filter(|s| s.starts_with("http"))?;
    let thumbs = items.get(1)?.as_array()?;

    Some(RawCandidate {
        thumbnail: thumbs.first().and_then(Value::as_str).map(str::to_string),
        ..RawCandidate::new(url)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(json: &str) -> Vec<RawCandidate> {
        let doc = Document::parse(json, Some("application/json"));
        JsonTreeWalk.candidates(&doc).collect()
    }

    #[test]
    fn test_preorder_document_order() {
        let found = walk(
            r#"[
                ["https://a.com/1.jpg", ["https://t.com/1"]],
                [0, [["https://a.com/2.jpg", ["https://t.com/2", 90, 90]]]],
                {"meta": ["https://a.com/3.jpg", []]},
                ["not-a-url", ["https://t.com/x"]],
                ["https://a.com/4.jpg", "not-an-array"]
            ]"#,
        );
        let urls: Vec<_> = found.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://a.com/1.jpg", "https://a.com/2.jpg", "https://a.com/3.jpg"]
        );
        assert_eq!(found[0].thumbnail.as_deref(), Some("https://t.com/1"));
        assert_eq!(found[2].thumbnail, None);
    }

    #[test]
    fn test_object_values_follow_document_order() {
        let found = walk(
            r#"{"zeta": [["https://a.com/first.jpg", ["t"]]],
                "alpha": [["https://a.com/second.jpg", ["t"]]]}"#,
        );
        let urls: Vec<_> = found.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com/first.jpg", "https://a.com/second.jpg"]);
    }

    #[test]
    fn test_nested_match_inside_match() {
        let found = walk(r#"["https://a.com/outer.jpg", ["https://a.com/inner.jpg", ["t"]]]"#);
        let urls: Vec<_> = found.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com/outer.jpg", "https://a.com/inner.jpg"]);
    }

    #[test]
    fn test_walk_is_lazy() {
        let items: Vec<String> = (0..1000)
            .map(|i| format!(r#"["https://a.com/{i}.jpg", ["t"]]"#))
            .collect();
        let json = format!("[{}]", items.join(","));
        let doc = Document::parse(&json, None);

        let mut walker = Walk {
            stack: vec![doc.json().unwrap()],
        };
        let first: Vec<_> = walker.by_ref().take(2).map(|c| c.url).collect();
        assert_eq!(first, vec!["https://a.com/0.jpg", "https://a.com/1.jpg"]);
        // Unvisited siblings remain on the stack.
        assert!(walker.stack.len() > 900);
    }

    #[test]
    fn test_html_document_yields_nothing() {
        let doc = Document::parse("<html><body></body></html>", None);
        assert_eq!(JsonTreeWalk.candidates(&doc).count(), 0);
    }
}
