// src/pipeline/sources.rs

//! Source table maintenance.
//!
//! Edits go through a [`SourceRegistry`] seeded from the config, then the
//! resulting table is validated and written back to the config file.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Config, SourceDescriptor, validate_source};
use crate::services::{InMemoryRegistry, SourceRegistry};

/// Configured sources, sorted by id.
pub fn list_sources(config: &Config) -> Vec<SourceDescriptor> {
    InMemoryRegistry::new(config.sources.iter().cloned()).list()
}

/// Add or replace a source and save the config.
///
/// Returns `true` when an existing source with the same id was replaced.
pub fn run_add_source(config: &mut Config, path: &Path, source: SourceDescriptor) -> Result<bool> {
    validate_source(&source)?;
    let id = source.id.clone();

    let replaced = edit_sources(config, path, |registry| {
        let replaced = registry.get(&source.id).is_some();
        registry.set(source);
        Ok(replaced)
    })?;

    log::info!(
        "{} source '{}' in {}",
        if replaced { "Updated" } else { "Added" },
        id,
        path.display()
    );
    Ok(replaced)
}

/// Remove a source and save the config.
pub fn run_remove_source(config: &mut Config, path: &Path, id: &str) -> Result<()> {
    edit_sources(config, path, |registry| {
        if registry.delete(id) {
            Ok(())
        } else {
            Err(AppError::invalid_source(id))
        }
    })?;

    log::info!("Removed source '{}' from {}", id, path.display());
    Ok(())
}

fn edit_sources<T>(
    config: &mut Config,
    path: &Path,
    edit: impl FnOnce(&dyn SourceRegistry) -> Result<T>,
) -> Result<T> {
    let registry = InMemoryRegistry::new(config.sources.iter().cloned());
    let value = edit(&registry)?;

    let mut updated = config.clone();
    updated.sources = registry.list();
    updated.validate()?;
    updated.save(path)?;

    *config = updated;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrategyKind;

    fn small_config() -> Config {
        Config {
            sources: vec![
                SourceDescriptor::new("wiki", "https://wiki.test/?q={query}"),
                SourceDescriptor::new("bing", "https://bing.test/?q={query}")
                    .with_strategies(vec![StrategyKind::metadata()]),
            ],
            ..Config::default()
        }
    }

    #[test]
    fn test_list_is_sorted() {
        let ids: Vec<_> = list_sources(&small_config())
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["bing", "wiki"]);
    }

    #[test]
    fn test_add_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgscrape.toml");
        let mut config = small_config();

        let replaced = run_add_source(
            &mut config,
            &path,
            SourceDescriptor::new("pexels", "https://pexels.test/search/{query}/"),
        )
        .unwrap();
        assert!(!replaced);

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.sources.len(), 3);
        assert!(reloaded.sources.iter().any(|s| s.id == "pexels"));
        assert_eq!(reloaded.sources, config.sources);
    }

    #[test]
    fn test_add_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgscrape.toml");
        let mut config = small_config();

        let replaced = run_add_source(
            &mut config,
            &path,
            SourceDescriptor::new("wiki", "https://wiki2.test/?q={query}"),
        )
        .unwrap();
        assert!(replaced);
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_add_rejects_template_without_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgscrape.toml");
        let mut config = small_config();

        let result = run_add_source(
            &mut config,
            &path,
            SourceDescriptor::new("broken", "https://broken.test/"),
        );
        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgscrape.toml");
        let mut config = small_config();

        run_remove_source(&mut config, &path, "wiki").unwrap();
        assert_eq!(Config::load(&path).unwrap().sources.len(), 1);

        let err = run_remove_source(&mut config, &path, "wiki").unwrap_err();
        assert!(matches!(err, AppError::InvalidSource(_)));
    }

    #[test]
    fn test_remove_last_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgscrape.toml");
        let mut config = small_config();

        run_remove_source(&mut config, &path, "wiki").unwrap();
        assert!(run_remove_source(&mut config, &path, "bing").is_err());
        assert_eq!(config.sources.len(), 1);
    }
}
