//! Chained source with fallback behavior

use std::sync::Arc;

use super::traits::{SourceHit, ValueSource};

/// Tries each source in order; the first non-blank value wins
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tapstack_core::sources::{ChainSource, MemorySource, ValueSource};
///
/// let env: Arc<dyn ValueSource> = Arc::new(MemorySource::named("env").with("OWNER", " "));
/// let ctx: Arc<dyn ValueSource> = Arc::new(MemorySource::named("context").with("OWNER", "platform"));
///
/// let chain = ChainSource::new(vec![env, ctx]);
/// let hit = chain.find("OWNER").unwrap();
/// assert_eq!(hit.value, "platform");
/// assert_eq!(hit.source, "context");
/// ```
pub struct ChainSource {
    sources: Vec<Arc<dyn ValueSource>>,
}

impl ChainSource {
    /// Create a chain; sources are tried in the given order
    ///
    /// # Panics
    ///
    /// Panics if `sources` is empty.
    pub fn new(sources: Vec<Arc<dyn ValueSource>>) -> Self {
        if sources.is_empty() {
            panic!("ChainSource requires at least one source");
        }
        Self { sources }
    }

    pub fn sources(&self) -> &[Arc<dyn ValueSource>] {
        &self.sources
    }

    /// First non-blank value for `key`, with the source that produced it
    pub fn find(&self, key: &str) -> Option<SourceHit> {
        self.sources.iter().find_map(|s| s.lookup(key))
    }
}

impl ValueSource for ChainSource {
    fn name(&self) -> &str {
        "chain"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.find(key).map(|hit| hit.value)
    }
}

impl std::fmt::Debug for ChainSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("ChainSource").field("sources", &names).finish()
    }
}
