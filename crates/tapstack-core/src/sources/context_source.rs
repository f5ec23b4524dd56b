//! Context map source

use crate::config::ContextMap;

use super::traits::ValueSource;

/// Source backed by a [`ContextMap`]
///
/// Keys are camelCase context keys (`projectName`, `region`, ...). Non-string
/// values are rendered as text, `null` is absent.
#[derive(Debug, Clone, Default)]
pub struct ContextSource {
    context: ContextMap,
}

impl ContextSource {
    pub fn new(context: ContextMap) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ContextMap {
        &self.context
    }
}

impl ValueSource for ContextSource {
    fn name(&self) -> &str {
        "context"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.context.get_string(key)
    }
}
