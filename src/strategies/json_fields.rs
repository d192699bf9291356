//! Field-mapped JSON result list.
//!
//! Image APIs such as DuckDuckGo's `i.js` answer with
//! `{"results": [{"image", "thumbnail", "title", "width", "height"}, ..]}`.

use std::iter;

use serde_json::Value;

use super::{Document, ExtractionStrategy, RawCandidate, json_dimension, json_text};

/// Where the result array lives and what each field is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    /// JSON pointer to the array (`""` for the root)
    pub items: String,
    pub url: String,
    pub thumbnail: String,
    pub title: String,
    pub width: String,
    pub height: String,
}

#[derive(Debug, Clone)]
pub struct JsonFieldScan {
    fields: FieldMap,
}

impl JsonFieldScan {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    fn read(&self, item: &Value) -> Option<RawCandidate> {
        let fields = &self.fields;
        Some(RawCandidate {
            url: json_text(item, &fields.url)?,
            thumbnail: json_text(item, &fields.thumbnail),
            title: json_text(item, &fields.title),
            width: json_dimension(item, &fields.width),
            height: json_dimension(item, &fields.height),
            ..RawCandidate::default()
        })
    }
}

impl ExtractionStrategy for JsonFieldScan {
    fn name(&self) -> &'static str {
        "json_fields"
    }

    fn candidates<'a>(
        &'a self,
        document: &'a Document,
    ) -> Box<dyn Iterator<Item = RawCandidate> + 'a> {
        let items = document
            .json()
            .and_then(|root| root.pointer(&self.fields.items))
            .and_then(Value::as_array);

        match items {
            Some(items) => Box::new(items.iter().filter_map(|item| self.read(item))),
            None => Box::new(iter::empty()),
        }
    }
}
