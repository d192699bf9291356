//! Source registry.
//!
//! Maps source ids to their descriptors. The extractor only sees the
//! [`SourceRegistry`] trait, so tests and embedders can supply a fixed table.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::models::SourceDescriptor;

/// Process-wide lookup of image sources.
///
/// Reads and writes are not ordered against an in-flight search; the last
/// write wins.
pub trait SourceRegistry: Send + Sync {
    /// Descriptor for `id`, cloned out of the registry.
    fn get(&self, id: &str) -> Option<SourceDescriptor>;

    /// All descriptors, sorted by id.
    fn list(&self) -> Vec<SourceDescriptor>;

    /// Insert or replace a descriptor.
    fn set(&self, source: SourceDescriptor);

    /// Remove a descriptor; `false` if it was not registered.
    fn delete(&self, id: &str) -> bool;

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// [`SourceRegistry`] backed by a locked `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    sources: RwLock<HashMap<String, SourceDescriptor>>,
}

impl InMemoryRegistry {
    pub fn new(sources: impl IntoIterator<Item = SourceDescriptor>) -> Self {
        let sources = sources
            .into_iter()
            .map(|source| (source.id.clone(), source))
            .collect();
        Self {
            sources: RwLock::new(sources),
        }
    }
}

impl SourceRegistry for InMemoryRegistry {
    fn get(&self, id: &str) -> Option<SourceDescriptor> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn list(&self) -> Vec<SourceDescriptor> {
        let mut sources: Vec<_> = self
            .sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        sources.sort_by(|a, b| a.id.cmp(&b.id));
        sources
    }

    fn set(&self, source: SourceDescriptor) {
        log::debug!("Registering source '{}' -> {}", source.id, source.url_template);
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source.id.clone(), source);
    }

    fn delete(&self, id: &str) -> bool {
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    fn len(&self) -> usize {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
