//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{ChainMode, SafeSearchValues, SourceDescriptor, StrategyKind, TokenStep};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Multi-source search settings
    #[serde(default)]
    pub fanout: FanoutConfig,

    /// Chrome/system image heuristics
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Source table loaded into the registry at startup
    #[serde(default = "defaults::default_sources")]
    pub sources: Vec<SourceDescriptor>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Write configuration back to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.fanout.max_concurrent == 0 {
            return Err(AppError::validation("fanout.max_concurrent must be > 0"));
        }
        if self.fanout.default_limit == 0 {
            return Err(AppError::validation("fanout.default_limit must be > 0"));
        }
        if self.fanout.candidate_multiplier == 0 {
            return Err(AppError::validation(
                "fanout.candidate_multiplier must be > 0",
            ));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            validate_source(source)?;
            if !seen.insert(source.id.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate source id '{}'",
                    source.id
                )));
            }
        }
        Ok(())
    }
}

/// Check a single source entry.
pub fn validate_source(source: &SourceDescriptor) -> Result<()> {
    if source.id.trim().is_empty() {
        return Err(AppError::validation("Source id is empty"));
    }
    if !source.url_template.contains("{query}") {
        return Err(AppError::validation(format!(
            "Source '{}' template has no {{query}} placeholder",
            source.id
        )));
    }
    if source.strategies.is_empty() {
        return Err(AppError::validation(format!(
            "Source '{}' has no strategies",
            source.id
        )));
    }
    validate_selectors(&source.strategies)?;

    match &source.token {
        Some(step) => {
            if !step.url_template.contains("{query}") {
                return Err(AppError::validation(format!(
                    "Source '{}' token page has no {{query}} placeholder",
                    source.id
                )));
            }
            let pattern = Regex::new(&step.pattern).map_err(|e| {
                AppError::validation(format!("Source '{}' token pattern: {e}", source.id))
            })?;
            if pattern.captures_len() < 2 {
                return Err(AppError::validation(format!(
                    "Source '{}' token pattern has no capture group",
                    source.id
                )));
            }
            if step.fallback.is_empty() {
                return Err(AppError::validation(format!(
                    "Source '{}' token fallback has no strategies",
                    source.id
                )));
            }
            validate_selectors(&step.fallback)?;
        }
        None if source.url_template.contains("{token}") => {
            return Err(AppError::validation(format!(
                "Source '{}' template uses {{token}} without a token step",
                source.id
            )));
        }
        None => {}
    }
    Ok(())
}

fn validate_selectors(strategies: &[StrategyKind]) -> Result<()> {
    for strategy in strategies {
        let selector = match strategy {
            StrategyKind::Metadata { selector, .. } | StrategyKind::Linked { selector } => selector,
            _ => continue,
        };
        Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
    }
    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            fanout: FanoutConfig::default(),
            classifier: ClassifierConfig::default(),
            sources: defaults::default_sources(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept header
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Accept-Language header; several sources vary markup by locale
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Multi-source search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Maximum sources fetched at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Page size when the caller gives none
    #[serde(default = "defaults::default_limit")]
    pub default_limit: usize,

    /// Raw candidates scanned per document, as a multiple of `page * limit`
    #[serde(default = "defaults::candidate_multiplier")]
    pub candidate_multiplier: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            default_limit: defaults::default_limit(),
            candidate_multiplier: defaults::candidate_multiplier(),
        }
    }
}

impl FanoutConfig {
    /// Upper bound on raw candidates pulled from one document.
    pub fn candidate_budget(&self, page: usize, limit: usize) -> usize {
        page.max(1)
            .saturating_mul(limit.max(1))
            .saturating_mul(self.candidate_multiplier.max(1))
    }
}

/// Heuristics used to tell UI chrome from content images.
///
/// Defaults come from the versioned constants in
/// [`crate::services::classifier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Substrings that mark a URL as chrome
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,

    /// Known chrome hosts and asset paths
    #[serde(default = "defaults::chrome_patterns")]
    pub chrome_patterns: Vec<String>,

    /// Path extensions never treated as content
    #[serde(default = "defaults::blocked_extensions")]
    pub blocked_extensions: Vec<String>,

    /// Substrings checked against `class` and `alt`
    #[serde(default = "defaults::metadata_keywords")]
    pub metadata_keywords: Vec<String>,

    /// Payload fragments of known 1x1 pixels
    #[serde(default = "defaults::pixel_signatures")]
    pub pixel_signatures: Vec<String>,

    /// Data URIs shorter than this are tracking pixels
    #[serde(default = "defaults::data_uri_max_len")]
    pub data_uri_max_len: usize,

    /// `w`/`h` query hints below this are icon-sized
    #[serde(default = "defaults::min_dimension")]
    pub min_dimension: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keywords: defaults::keywords(),
            chrome_patterns: defaults::chrome_patterns(),
            blocked_extensions: defaults::blocked_extensions(),
            metadata_keywords: defaults::metadata_keywords(),
            pixel_signatures: defaults::pixel_signatures(),
            data_uri_max_len: defaults::data_uri_max_len(),
            min_dimension: defaults::min_dimension(),
        }
    }
}

mod defaults {
    use crate::models::{ChainMode, SafeSearchValues, SourceDescriptor, StrategyKind, TokenStep};
    use crate::services::classifier::blocklist;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".into()
    }
    pub fn accept_language() -> String {
        "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7".into()
    }
    pub fn timeout() -> u64 {
        15
    }

    // Fan-out defaults
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn default_limit() -> usize {
        20
    }
    pub fn candidate_multiplier() -> usize {
        4
    }

    // Classifier defaults
    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }
    pub fn keywords() -> Vec<String> {
        owned(blocklist::KEYWORDS)
    }
    pub fn chrome_patterns() -> Vec<String> {
        owned(blocklist::CHROME_PATTERNS)
    }
    pub fn blocked_extensions() -> Vec<String> {
        owned(blocklist::BLOCKED_EXTENSIONS)
    }
    pub fn metadata_keywords() -> Vec<String> {
        owned(blocklist::METADATA_KEYWORDS)
    }
    pub fn pixel_signatures() -> Vec<String> {
        owned(blocklist::PIXEL_SIGNATURES)
    }
    pub fn data_uri_max_len() -> usize {
        blocklist::DATA_URI_MAX_LEN
    }
    pub fn min_dimension() -> u32 {
        blocklist::MIN_DIMENSION
    }

    // Source defaults
    pub fn default_sources() -> Vec<SourceDescriptor> {
        let generic = [
            ("wikipedia", "https://pt.wikipedia.org/wiki/{query}"),
            ("unsplash", "https://unsplash.com/s/photos/{query}"),
            ("pexels", "https://www.pexels.com/search/{query}"),
            ("flickr", "https://www.flickr.com/search/?text={query}"),
            ("pixabay", "https://pixabay.com/images/search/{query}"),
            ("brave", "https://search.brave.com/images?q={query}"),
            ("yandex", "https://yandex.com/images/search?text={query}"),
            ("gaprisa", "https://www.gaprisa.com.br/catalogsearch/result/?q={query}"),
            ("autoexperts", "https://www.autoexperts.parts/pt/br/search?q={query}"),
            ("cuiaba", "https://www.cuiabadistribuidora.com.br/produtos/bp.asp?busca={query}"),
            ("alagoas", "https://www.alagoasdistribuidora.com.br/produtos/bp.asp?busca={query}"),
            ("bahia", "https://www.bahiadistribuidora.com.br/produtos/bp.asp?busca={query}"),
            ("ceara", "https://www.cearadistribuidora.com.br/produtos/bp.asp?busca={query}"),
            (
                "espirito-santo",
                "https://www.espiritosantodistribuidora.com.br/produtos/bp.asp?busca={query}",
            ),
            ("goias", "https://www.goiasedistribuidora.com.br/produtos/bp.asp?busca={query}"),
            ("maranhao", "https://www.maranhaodistribuidora.com.br/produtos/bp.asp?busca={query}"),
            (
                "mato-grosso",
                "https://www.matogrossodistribuidora.com.br/produtos/bp.asp?busca={query}",
            ),
            (
                "mato-grosso-do-sul",
                "https://www.matogrossodosuldistribuidora.com.br/produtos/bp.asp?busca={query}",
            ),
            ("hipervarejo", "https://www.hipervarejo.com.br/search?paged={page}&q={query}"),
            ("jbs", "https://www.jbs.com.br/produtos/bp.asp?busca={query}"),
            ("jocar", "https://www.jocar.com.br/{query}"),
        ];

        let mut sources: Vec<SourceDescriptor> = generic
            .iter()
            .map(|(id, template)| SourceDescriptor::new(*id, *template))
            .collect();

        sources.push(
            SourceDescriptor::new(
                "google",
                "https://www.google.com/search?q={query}&tbm=isch&safe={safe}",
            )
            .with_strategies(vec![StrategyKind::script(), StrategyKind::Dom]),
        );
        // JSON envelope whose `data` field carries the result markup.
        sources.push(
            SourceDescriptor::new(
                "google-imagelist",
                "https://www.google.com/async/imagelist?q={query}&ijn=0&safe={safe}&async=_id:rg_s,_pms:s,_fmt:json",
            )
            .with_strategies(vec![StrategyKind::Dom]),
        );
        sources.push(
            SourceDescriptor::new(
                "bing",
                "https://www.bing.com/images/search?q={query}&safeSearch={safe}",
            )
            .with_strategies(vec![
                StrategyKind::metadata(),
                StrategyKind::linked(),
                StrategyKind::Dom,
            ])
            .with_chain(ChainMode::FirstMatch)
            .with_safe_search(SafeSearchValues::new("Strict", "Moderate", "Off")),
        );
        sources.push(
            SourceDescriptor::new(
                "duckduckgo",
                "https://duckduckgo.com/i.js?l=us-en&o=json&q={query}&vqd={token}&f=,,,&p={safe}",
            )
            .with_strategies(vec![StrategyKind::json_fields()])
            .with_safe_search(SafeSearchValues::new("1", "1", "-1"))
            .with_token(TokenStep::new(
                "https://duckduckgo.com/?q={query}&iax=images&ia=images",
                r#"vqd=['"]([^'"]+)['"]"#,
            )),
        );

        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.fanout.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_sources() {
        let mut config = Config::default();
        config
            .sources
            .push(SourceDescriptor::new("bing", "https://example.com/?q={query}"));
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_rejects_template_without_query() {
        let source = SourceDescriptor::new("static", "https://example.com/gallery");
        assert!(validate_source(&source).is_err());
    }

    #[test]
    fn validate_rejects_bad_metadata_selector() {
        let source = SourceDescriptor::new("odd", "https://example.com/?q={query}")
            .with_strategies(vec![StrategyKind::Metadata {
                selector: "[[broken".to_string(),
                attr: "m".to_string(),
            }]);
        assert!(matches!(
            validate_source(&source),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn candidate_budget_scales_with_page() {
        let fanout = FanoutConfig::default();
        assert_eq!(fanout.candidate_budget(1, 10), 40);
        assert_eq!(fanout.candidate_budget(3, 10), 120);
        assert_eq!(fanout.candidate_budget(0, 0), 4);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [http]
            timeout_secs = 20

            [classifier]
            min_dimension = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.http.timeout_secs, 20);
        assert_eq!(config.http.accept_language, defaults::accept_language());
        assert_eq!(config.classifier.min_dimension, 64);
        assert!(config.classifier.keywords.iter().any(|k| k == "logo"));
        assert!(config.sources.iter().any(|s| s.id == "google"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("imgscrape.toml");

        let mut config = Config::default();
        config.sources.retain(|s| s.id == "bing");
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.sources, config.sources);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_linked_selector() {
        let source = SourceDescriptor::new("odd", "https://example.com/?q={query}")
            .with_strategies(vec![StrategyKind::Linked {
                selector: "..".to_string(),
            }]);
        assert!(matches!(
            validate_source(&source),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_token_step() {
        let base = SourceDescriptor::new("tok", "https://example.com/?q={query}&t={token}");
        assert!(matches!(
            validate_source(&base),
            Err(AppError::Validation(_))
        ));

        let ok = base
            .clone()
            .with_token(TokenStep::new("https://example.com/?q={query}", "t=(\\w+)"));
        assert!(validate_source(&ok).is_ok());

        let no_group = base
            .clone()
            .with_token(TokenStep::new("https://example.com/?q={query}", "t=\\w+"));
        assert!(validate_source(&no_group).is_err());

        let bad_regex = base
            .clone()
            .with_token(TokenStep::new("https://example.com/?q={query}", "t=("));
        assert!(validate_source(&bad_regex).is_err());

        let no_query = base.with_token(TokenStep::new("https://example.com/", "t=(\\w+)"));
        assert!(validate_source(&no_query).is_err());
    }

    #[test]
    fn default_sources_cover_engine_modes() {
        let sources = defaults::default_sources();
        let find = |id: &str| sources.iter().find(|s| s.id == id).unwrap();

        assert_eq!(find("bing").chain, ChainMode::FirstMatch);
        assert!(find("duckduckgo").token.is_some());
        assert!(find("google").url_template.contains("{safe}"));
        assert!(sources.iter().any(|s| s.id == "google-imagelist"));
        for source in &sources {
            validate_source(source).unwrap();
        }
    }
}
