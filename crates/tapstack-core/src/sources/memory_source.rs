//! Fixed in-memory source

use std::collections::HashMap;

use super::traits::ValueSource;

/// Source holding a fixed set of values
///
/// A test helper: the resolver never builds one. Tests and examples use it to
/// stand in for the environment or context when exercising [`ChainSource`].
///
/// [`ChainSource`]: super::ChainSource
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    values: HashMap<String, String>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Empty source reporting itself under `name`
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ValueSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
