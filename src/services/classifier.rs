//! Image classifier service.
//!
//! Separates UI chrome (logos, icons, flags, sprites, tracking pixels) from
//! content images. Search-result pages mix both without any reliable
//! structural marker, so the decision is a cascade of URL and attribute
//! heuristics evaluated in a fixed order.

use url::Url;

use crate::models::ClassifierConfig;

/// Built-in heuristic tables. Bump [`blocklist::VERSION`] on any change.
///
/// `KEYWORDS` are matched as whole words of the host and path, so `static`
/// blocks `/static/x.png` but not `live.staticflickr.com`.
pub mod blocklist {
    pub const VERSION: u32 = 4;

    pub const KEYWORDS: &[&str] = &[
        "logo", "icon", "icons", "sprite", "favicon", "flag", "flags", "_next", "static",
        "assets", "branding", "header", "footer", "menu", "navbar", "ui", "brand", "region",
        "regions",
    ];

    /// Chrome hosts and asset paths of the built-in search engines.
    pub const CHROME_PATTERNS: &[&str] = &[
        "mm.bing.net",
        "bing.com/th",
        "google.com/images",
        "duckduckgo.com/assets",
        "tia.png",
    ];

    pub const BLOCKED_EXTENSIONS: &[&str] = &[".svg", ".ico", ".gif"];

    pub const METADATA_KEYWORDS: &[&str] = &["logo", "icon"];

    pub const PIXEL_SIGNATURES: &[&str] = &["AAAAEAAAAB"];

    pub const DATA_URI_MAX_LEN: usize = 200;

    pub const MIN_DIMENSION: u32 = 100;
}

/// Element attributes that travel with a candidate URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementMeta {
    pub class: Option<String>,
    pub alt: Option<String>,
    pub role: Option<String>,
}

impl ElementMeta {
    pub fn is_empty(&self) -> bool {
        self.class.is_none() && self.alt.is_none() && self.role.is_none()
    }
}

/// Decides whether an image URL is system chrome.
#[derive(Debug, Clone)]
pub struct ImageClassifier {
    config: ClassifierConfig,
}

impl ImageClassifier {
    /// Create a classifier. List entries are lower-cased once here.
    pub fn new(mut config: ClassifierConfig) -> Self {
        for list in [
            &mut config.keywords,
            &mut config.chrome_patterns,
            &mut config.blocked_extensions,
            &mut config.metadata_keywords,
        ] {
            for entry in list.iter_mut() {
                *entry = entry.to_lowercase();
            }
            list.retain(|entry| !entry.is_empty());
        }
        Self { config }
    }

    /// Returns `true` when the image must be excluded from results.
    pub fn is_system_image(&self, url: &str, meta: Option<&ElementMeta>) -> bool {
        let lower = url.to_lowercase();

        self.is_tracking_pixel(url, &lower)
            || self.has_blocked_extension(&lower)
            || self.is_too_small(url)
            || self.matches_blocklist(&lower)
            || meta.is_some_and(|m| self.is_chrome_element(m))
    }

    /// Rule 1: short or known-signature inline images.
    fn is_tracking_pixel(&self, url: &str, lower: &str) -> bool {
        lower.starts_with("data:image")
            && (url.len() < self.config.data_uri_max_len
                || self
                    .config
                    .pixel_signatures
                    .iter()
                    .any(|sig| url.contains(sig.as_str())))
    }

    /// Rule 2: extension of the path, ignoring query and fragment.
    fn has_blocked_extension(&self, lower: &str) -> bool {
        let path = lower
            .split(['?', '#'])
            .next()
            .unwrap_or(lower);
        self.config
            .blocked_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }

    /// Rule 3: `w`/`h` query hints below the threshold.
    fn is_too_small(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        parsed.query_pairs().any(|(key, value)| {
            (key.eq_ignore_ascii_case("w") || key.eq_ignore_ascii_case("h"))
                && leading_number(&value).is_some_and(|px| px < self.config.min_dimension)
        })
    }

    /// Rule 4: keyword words and chrome-host substrings.
    fn matches_blocklist(&self, lower: &str) -> bool {
        if self
            .config
            .chrome_patterns
            .iter()
            .any(|pattern| lower.contains(pattern.as_str()))
        {
            return true;
        }

        let location = host_and_path(lower);
        words(&location).any(|word| self.config.keywords.iter().any(|k| k == word))
    }

    /// Rule 5: element attributes.
    fn is_chrome_element(&self, meta: &ElementMeta) -> bool {
        let attr_matches = |value: &Option<String>| {
            value.as_deref().is_some_and(|v| {
                let v = v.to_lowercase();
                self.config
                    .metadata_keywords
                    .iter()
                    .any(|k| v.contains(k.as_str()))
            })
        };

        attr_matches(&meta.class)
            || attr_matches(&meta.alt)
            || meta
                .role
                .as_deref()
                .is_some_and(|r| r.trim().eq_ignore_ascii_case("presentation"))
    }
}

/// Host plus path, without scheme, query or fragment.
fn host_and_path(lower: &str) -> String {
    match Url::parse(lower) {
        Ok(parsed) => format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path()),
        Err(_) => lower.split(['?', '#']).next().unwrap_or(lower).to_string(),
    }
}

/// Words of a URL location: runs of alphanumerics and `_`, each also split on
/// `_`, with trailing digits dropped (`icon32` -> `icon`). `_next` stays whole.
fn words(location: &str) -> impl Iterator<Item = &str> {
    location
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .flat_map(|token| std::iter::once(token).chain(token.split('_')))
        .map(|word| word.trim_end_matches(|c: char| c.is_ascii_digit()))
        .filter(|word| !word.is_empty())
}

/// Numeric prefix of a query value (`50px` -> 50, `50.5` -> 50).
fn leading_number(value: &str) -> Option<u32> {
    let value = value.trim_start();
    let digits = value
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value, |end| &value[..end]);
    digits.parse().ok()
}

impl Default for ImageClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}
