// src/models/source.rs

//! Image source descriptors.

use serde::{Deserialize, Serialize};

use crate::models::SafeSearch;

/// One external site the scraper can query for images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Unique registry key (e.g., "bing", "unsplash")
    pub id: String,

    /// Search URL with `{query}` and optional `{page}`, `{safe}` and
    /// `{token}` placeholders
    pub url_template: String,

    /// Extraction strategies, consumed in order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,

    /// How the strategy chain is combined
    #[serde(default, skip_serializing_if = "ChainMode::is_default")]
    pub chain: ChainMode,

    /// Values substituted for `{safe}`
    #[serde(default, skip_serializing_if = "SafeSearchValues::is_default")]
    pub safe_search: SafeSearchValues,

    /// Page fetched first to obtain a session token for `{token}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenStep>,
}

impl SourceDescriptor {
    /// Create a source that uses the generic `<img>` scan.
    pub fn new(id: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url_template: url_template.into(),
            strategies: default_strategies(),
            chain: ChainMode::default(),
            safe_search: SafeSearchValues::default(),
            token: None,
        }
    }

    /// Replace the strategy chain.
    pub fn with_strategies(mut self, strategies: Vec<StrategyKind>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_chain(mut self, chain: ChainMode) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_safe_search(mut self, values: SafeSearchValues) -> Self {
        self.safe_search = values;
        self
    }

    pub fn with_token(mut self, token: TokenStep) -> Self {
        self.token = Some(token);
        self
    }
}

fn default_strategies() -> Vec<StrategyKind> {
    vec![StrategyKind::Dom]
}

/// Combination of a source's strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainMode {
    /// Every strategy contributes, in order
    #[default]
    All,

    /// Strategies are fallbacks: the first one that keeps any image wins
    FirstMatch,
}

impl ChainMode {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-source spelling of the three safe-search levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeSearchValues {
    pub on: String,
    pub moderate: String,
    pub off: String,
}

impl SafeSearchValues {
    pub fn new(on: &str, moderate: &str, off: &str) -> Self {
        Self {
            on: on.to_string(),
            moderate: moderate.to_string(),
            off: off.to_string(),
        }
    }

    pub fn value(&self, level: SafeSearch) -> &str {
        match level {
            SafeSearch::On => &self.on,
            SafeSearch::Moderate => &self.moderate,
            SafeSearch::Off => &self.off,
        }
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for SafeSearchValues {
    fn default() -> Self {
        Self::new("on", "moderate", "off")
    }
}

/// Preliminary request that yields a token for the search URL.
///
/// When `pattern` finds no token, the token page itself is run through
/// `fallback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStep {
    /// URL with the same placeholders as the search template, minus `{token}`
    pub url_template: String,

    /// Regex whose first capture group is the token
    pub pattern: String,

    #[serde(default = "default_strategies")]
    pub fallback: Vec<StrategyKind>,
}

impl TokenStep {
    pub fn new(url_template: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            pattern: pattern.into(),
            fallback: default_strategies(),
        }
    }
}

/// Configurable extraction strategy variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyKind {
    /// Generic `<img>` scan
    Dom,

    /// JSON blobs carried in an attribute of matching elements
    Metadata {
        #[serde(default = "default_metadata_selector")]
        selector: String,
        #[serde(default = "default_metadata_attr")]
        attr: String,
    },

    /// Result containers linking to the full image, with a thumbnail `<img>` inside
    Linked {
        #[serde(default = "default_linked_selector")]
        selector: String,
    },

    /// Quoted URLs inside marked `<script>` bodies
    Script {
        #[serde(default = "default_script_marker")]
        marker: String,
        /// Substrings that admit a URL without an image extension
        #[serde(default = "default_script_accept")]
        accept: Vec<String>,
    },

    /// Recursive walk over a JSON response
    JsonTree,

    /// Array of result objects in a JSON response, read field by field
    JsonFields {
        /// JSON pointer to the result array
        #[serde(default = "default_json_items")]
        items: String,
        #[serde(default = "default_json_url")]
        url: String,
        #[serde(default = "default_json_thumbnail")]
        thumbnail: String,
        #[serde(default = "default_json_title")]
        title: String,
        #[serde(default = "default_json_width")]
        width: String,
        #[serde(default = "default_json_height")]
        height: String,
    },
}

impl StrategyKind {
    /// Metadata scan with the default anchor selector and attribute.
    pub fn metadata() -> Self {
        Self::Metadata {
            selector: default_metadata_selector(),
            attr: default_metadata_attr(),
        }
    }

    pub fn linked() -> Self {
        Self::Linked {
            selector: default_linked_selector(),
        }
    }

    /// Script scan with the default data-callback marker.
    pub fn script() -> Self {
        Self::Script {
            marker: default_script_marker(),
            accept: default_script_accept(),
        }
    }

    /// Field mapping for `{"results": [{"image", "thumbnail", "title", "width", "height"}]}`.
    pub fn json_fields() -> Self {
        Self::JsonFields {
            items: default_json_items(),
            url: default_json_url(),
            thumbnail: default_json_thumbnail(),
            title: default_json_title(),
            width: default_json_width(),
            height: default_json_height(),
        }
    }

    /// Parse a short strategy name as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "dom" => Some(Self::Dom),
            "metadata" => Some(Self::metadata()),
            "linked" => Some(Self::linked()),
            "script" => Some(Self::script()),
            "json_tree" | "json-tree" | "json" => Some(Self::JsonTree),
            "json_fields" | "json-fields" => Some(Self::json_fields()),
            _ => None,
        }
    }
}

fn default_metadata_selector() -> String {
    "a.iusc".to_string()
}

fn default_metadata_attr() -> String {
    "m".to_string()
}

fn default_linked_selector() -> String {
    ".imgpt".to_string()
}

fn default_script_marker() -> String {
    "AF_initDataCallback".to_string()
}

fn default_script_accept() -> Vec<String> {
    vec!["encrypted-tbn".to_string()]
}

fn default_json_items() -> String {
    "/results".to_string()
}

fn default_json_url() -> String {
    "image".to_string()
}

fn default_json_thumbnail() -> String {
    "thumbnail".to_string()
}

fn default_json_title() -> String {
    "title".to_string()
}

fn default_json_width() -> String {
    "width".to_string()
}

fn default_json_height() -> String {
    "height".to_string()
}
