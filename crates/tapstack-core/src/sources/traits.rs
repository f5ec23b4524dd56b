//! Core trait for configuration value sources

/// Whether a raw value counts as absent
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// A value found in a source, with the source that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHit {
    /// Trimmed value
    pub value: String,
    /// Name of the source (`env`, `context`, `file`, ...)
    pub source: String,
    /// Key looked up in that source
    pub key: String,
}

/// Read-only lookup of configuration values by key
///
/// # Example
///
/// ```
/// use tapstack_core::config::EnvSnapshot;
/// use tapstack_core::sources::{EnvSource, ValueSource};
///
/// let source = EnvSource::new(EnvSnapshot::from_pairs([("OWNER", "  ")]));
/// assert_eq!(source.get("owner").as_deref(), Some("  "));
/// assert!(!source.has("owner"));
/// ```
pub trait ValueSource: Send + Sync {
    /// Short name used when reporting where a value came from
    fn name(&self) -> &str;

    /// Raw value for `key`, which may be blank
    fn get(&self, key: &str) -> Option<String>;

    /// Whether `key` has a non-blank value
    fn has(&self, key: &str) -> bool {
        self.get(key).map(|v| !is_blank(&v)).unwrap_or(false)
    }

    /// Trimmed, non-blank value for `key`
    fn lookup(&self, key: &str) -> Option<SourceHit> {
        let value = self.get(key)?;
        if is_blank(&value) {
            return None;
        }
        Some(SourceHit {
            value: value.trim().to_string(),
            source: self.name().to_string(),
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" x "));
    }
}
