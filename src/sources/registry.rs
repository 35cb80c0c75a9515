//! Registry for managing database adapters.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;

use super::{Source, SourceError};

bitflags::bitflags! {
    /// Operations that a source can support
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SourceCapabilities: u32 {
        const SEARCH = 1 << 0;
        const LOOKUP = 1 << 1;
        const ANNOTATE = 1 << 2;
        const AUTOCOMPLETE = 1 << 3;
        const LINKS = 1 << 4;
        const FETCH_RAW = 1 << 5;
        const FULLTEXT = 1 << 6;
    }
}

impl SourceCapabilities {
    /// Names of the contained capabilities, for the `list_databases` tool
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(SourceCapabilities::SEARCH) {
            names.push("search");
        }
        if self.contains(SourceCapabilities::LOOKUP) {
            names.push("lookup");
        }
        if self.contains(SourceCapabilities::ANNOTATE) {
            names.push("annotate");
        }
        if self.contains(SourceCapabilities::AUTOCOMPLETE) {
            names.push("autocomplete");
        }
        if self.contains(SourceCapabilities::LINKS) {
            names.push("links");
        }
        if self.contains(SourceCapabilities::FETCH_RAW) {
            names.push("fetch_raw");
        }
        if self.contains(SourceCapabilities::FULLTEXT) {
            names.push("fulltext");
        }
        names
    }
}

/// Registry for all available database adapters
///
/// Owns one instance of each source; shared immutably (`Arc`) with the tool
/// layer after startup.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Create a new registry with all compiled-in sources
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let mut registry = Self {
            sources: HashMap::new(),
        };

        #[cfg(feature = "source-cellosaurus")]
        registry.register(Arc::new(super::CellosaurusSource::new(config)?));
        #[cfg(feature = "source-pubmed")]
        registry.register(Arc::new(super::PubMedSource::new(config)?));
        #[cfg(feature = "source-pubtator3")]
        registry.register(Arc::new(super::PubTator3Source::new(config)?));
        #[cfg(feature = "source-pubchem")]
        registry.register(Arc::new(super::PubChemSource::new(config)?));
        #[cfg(feature = "source-entrez")]
        registry.register(Arc::new(super::EntrezSource::new(config)?));

        Ok(registry)
    }

    /// Register a new source
    pub fn register(&mut self, source: Arc<dyn Source>) {
        self.sources.insert(source.id().to_string(), source);
    }

    /// Get a source by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Source>> {
        self.sources.get(id)
    }

    /// Get a source by ID, returning an error if not found
    pub fn get_required(&self, id: &str) -> Result<&Arc<dyn Source>, SourceError> {
        self.get(id).ok_or_else(|| {
            SourceError::InvalidRequest(format!(
                "unknown database '{}', expected one of: {}",
                id,
                self.ids().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    /// Get all registered sources
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.values()
    }

    /// Get all source IDs
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(|s| s.as_str())
    }

    /// Get sources that support a specific capability
    pub fn with_capability(&self, capability: SourceCapabilities) -> Vec<&Arc<dyn Source>> {
        self.all()
            .filter(|s| s.capabilities().contains(capability))
            .collect()
    }

    /// Check if a source exists
    pub fn has(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    /// Get the number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
