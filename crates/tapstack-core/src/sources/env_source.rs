//! Environment variable source

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::config::EnvSnapshot;

use super::traits::{is_blank, SourceHit, ValueSource};

/// Mapping from context keys to the environment variables that carry them,
/// in priority order
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("projectName", vec!["PROJECT_NAME"]);
    m.insert("environment", vec!["ENVIRONMENT"]);
    m.insert("environmentSuffix", vec!["ENVIRONMENT_SUFFIX"]);
    m.insert("officeCidr", vec!["OFFICE_CIDR"]);
    m.insert("alertEmail", vec!["ALERT_EMAIL"]);
    m.insert("region", vec!["AWS_REGION", "AWS_DEFAULT_REGION"]);
    m.insert("owner", vec!["OWNER"]);
    m.insert("costCenter", vec!["COST_CENTER"]);
    m.insert("artifactBucketName", vec!["ARTIFACT_BUCKET_NAME"]);
    m.insert("extraEgressPorts", vec!["EXTRA_EGRESS_PORTS"]);
    // enableCloudTrail has no environment variable
    m
});

/// Source backed by an [`EnvSnapshot`]
///
/// Lookups use context keys (`projectName`, `region`, ...), which are mapped
/// to their environment variables:
/// - `projectName` → `PROJECT_NAME`
/// - `region` → `AWS_REGION`, then `AWS_DEFAULT_REGION`
/// - etc.
///
/// Keys with no mapping are looked up as variable names directly.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    env: EnvSnapshot,
}

impl EnvSource {
    pub fn new(env: EnvSnapshot) -> Self {
        Self { env }
    }

    /// Source over the current process environment
    pub fn from_process() -> Self {
        Self::new(EnvSnapshot::capture())
    }

    /// Environment variable names consulted for a context key
    pub fn env_vars_for(key: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(key).map(|v| v.as_slice())
    }

    fn candidates<'a>(key: &'a str) -> Vec<&'a str> {
        match Self::env_vars_for(key) {
            Some(vars) => vars.to_vec(),
            None => vec![key],
        }
    }
}

impl ValueSource for EnvSource {
    fn name(&self) -> &str {
        "env"
    }

    /// First non-blank mapped variable, or the last raw (blank) one seen
    fn get(&self, key: &str) -> Option<String> {
        let mut blank = None;
        for var in Self::candidates(key) {
            if let Some(value) = self.env.get(var) {
                if !is_blank(value) {
                    return Some(value.to_string());
                }
                blank = Some(value.to_string());
            }
        }
        blank
    }

    /// Reports the variable that actually supplied the value
    fn lookup(&self, key: &str) -> Option<SourceHit> {
        Self::candidates(key).into_iter().find_map(|var| {
            let value = self.env.get(var)?;
            if is_blank(value) {
                return None;
            }
            Some(SourceHit {
                value: value.trim().to_string(),
                source: self.name().to_string(),
                key: var.to_string(),
            })
        })
    }
}
