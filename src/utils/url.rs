// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;
use url::form_urlencoded::byte_serialize;

/// Resolve a raw attribute value into an absolute http(s) URL.
///
/// Returns `None` for missing or empty values, inline `data:image` payloads,
/// references that cannot be resolved against `base`, and anything that
/// resolves to a non-http scheme.
///
/// # Examples
/// ```
/// use imgscrape::utils::url::normalize;
///
/// assert_eq!(
///     normalize(Some("/a.jpg"), "https://x.com/y"),
///     Some("https://x.com/a.jpg".to_string())
/// );
/// ```
pub fn normalize(raw: Option<&str>, base: &str) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("data:image") {
        return None;
    }

    // Protocol-relative
    if raw.starts_with("//") {
        return Some(format!("https:{raw}"));
    }

    // Already absolute
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(raw.to_string());
    }

    let resolved = Url::parse(base).ok()?.join(raw).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Percent-encode a query for use anywhere in a URL.
///
/// Spaces become `%20` so the result is valid in both paths and query strings.
pub fn encode_component(value: &str) -> String {
    // byte_serialize escapes a literal '+', so any '+' left is a space
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Values substituted into a source URL template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub query: &'a str,
    pub page: usize,
    pub safe: &'a str,
    pub token: Option<&'a str>,
}

impl<'a> TemplateVars<'a> {
    pub fn new(query: &'a str, page: usize) -> Self {
        Self {
            query,
            page,
            safe: "",
            token: None,
        }
    }
}

/// Fill a source URL template.
///
/// `{query}` is percent-encoded, `{page}` is 1-based, `{safe}` and `{token}`
/// are encoded the same way as the query.
///
/// # Examples
/// ```
/// use imgscrape::utils::url::{TemplateVars, build_search_url};
///
/// assert_eq!(
///     build_search_url("https://s.com/?paged={page}&q={query}", &TemplateVars::new("red car", 2)),
///     "https://s.com/?paged=2&q=red%20car"
/// );
/// ```
pub fn build_search_url(template: &str, vars: &TemplateVars<'_>) -> String {
    template
        .replace("{query}", &encode_component(vars.query))
        .replace("{page}", &vars.page.max(1).to_string())
        .replace("{safe}", &encode_component(vars.safe))
        .replace("{token}", &encode_component(vars.token.unwrap_or_default()))
}
