//! Immutable snapshot of environment variables

use std::collections::BTreeMap;

/// Environment variables captured at a single point in time
///
/// The resolver never calls `std::env::var` itself; it is handed one of these
/// so that tests can describe the environment they want without touching
/// process-global state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// An empty environment
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are left out.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build a snapshot from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Return a copy with one more variable set
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Return a copy with a variable removed
    pub fn without(mut self, key: &str) -> Self {
        self.vars.remove(key);
        self
    }

    /// Raw value of a variable (may be blank)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
