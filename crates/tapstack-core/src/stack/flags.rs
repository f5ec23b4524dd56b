//! Context-only feature flags

use serde::Serialize;

use crate::config::ContextMap;

/// Switches read from the context map only
///
/// `enableCloudTrail` has no environment variable; it is a boolean context
/// value defaulting to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFlags {
    pub enable_cloud_trail: bool,
}

impl StackFlags {
    pub const CLOUD_TRAIL_KEY: &'static str = "enableCloudTrail";

    /// Read flags from context; unrecognised values count as `false`
    pub fn from_context(context: &ContextMap) -> Self {
        Self {
            enable_cloud_trail: context.get_bool(Self::CLOUD_TRAIL_KEY).unwrap_or(false),
        }
    }

    pub fn with_cloud_trail(mut self, enabled: bool) -> Self {
        self.enable_cloud_trail = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_disabled() {
        assert!(!StackFlags::from_context(&ContextMap::new()).enable_cloud_trail);
    }

    #[test]
    fn test_reads_bool_and_string() {
        let on = ContextMap::new().with("enableCloudTrail", true);
        assert!(StackFlags::from_context(&on).enable_cloud_trail);

        let text = ContextMap::new().with("enableCloudTrail", "True");
        assert!(StackFlags::from_context(&text).enable_cloud_trail);

        let junk = ContextMap::new().with("enableCloudTrail", "sometimes");
        assert!(!StackFlags::from_context(&junk).enable_cloud_trail);
    }
}
