//! Ranked resolution of stack configuration fields
//!
//! Every field is looked up in priority order, first non-blank value wins:
//! 1. Environment variables (`PROJECT_NAME`, ...)
//! 2. Context map (`projectName`, ...)
//! 3. Hard-coded default
//!
//! Region has two environment variables (`AWS_REGION`, then
//! `AWS_DEFAULT_REGION`) and consults the region override file between the
//! context map and the default.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigResult, ContextMap, EnvSnapshot};
use crate::{log_debug, log_error, log_info, log_warn};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::sources::{
    is_blank, ChainSource, ContextSource, EnvSource, RegionFileRead, RegionFileSource,
    SourceHit, ValueSource, DEFAULT_REGION_FILE,
};

use super::ports::parse_ports;
use super::resolved::{FieldOrigin, ResolvedConfiguration};

/// Default values for fields no source supplies
pub mod defaults {
    pub const PROJECT_NAME: &str = "webapp";
    pub const ENVIRONMENT: &str = "prod";
    pub const ENVIRONMENT_SUFFIX: &str = "";
    pub const OFFICE_CIDR: &str = "203.0.113.0/24";
    pub const ALERT_EMAIL: &str = "devops@company.com";
    pub const REGION: &str = "eu-north-1";
    pub const OWNER: &str = "cloud-team";
    pub const COST_CENTER: &str = "DevOps";
}

/// Everything resolution reads, materialised up front
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverInputs {
    pub env: EnvSnapshot,
    pub context: ContextMap,
    /// Region override file; only read when no other region source is set
    pub region_file: PathBuf,
}

impl ResolverInputs {
    /// Inputs with the region file at `lib/AWS_REGION` (relative to the
    /// working directory)
    pub fn new(env: EnvSnapshot, context: ContextMap) -> Self {
        Self {
            env,
            context,
            region_file: PathBuf::from(DEFAULT_REGION_FILE),
        }
    }

    /// Inputs from the current process environment
    pub fn from_process(context: ContextMap) -> Self {
        Self::new(EnvSnapshot::capture(), context)
    }

    pub fn with_region_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.region_file = path.into();
        self
    }

    /// Region file under `project_dir`
    pub fn with_project_dir(self, project_dir: impl AsRef<Path>) -> Self {
        let path = project_dir.as_ref().join(DEFAULT_REGION_FILE);
        self.with_region_file(path)
    }
}

/// Resolves a [`ResolvedConfiguration`] from [`ResolverInputs`]
///
/// # Example
///
/// ```
/// use tapstack_core::config::{ContextMap, EnvSnapshot};
/// use tapstack_core::resolver::{ConfigurationResolver, ResolverInputs};
///
/// let inputs = ResolverInputs::new(
///     EnvSnapshot::from_pairs([("PROJECT_NAME", "acme")]),
///     ContextMap::new().with("projectName", "other").with("environment", "qa"),
/// )
/// .with_region_file("/nonexistent/AWS_REGION");
///
/// let config = ConfigurationResolver::new(inputs).resolve().unwrap();
/// assert_eq!(config.project_name(), "acme");
/// assert_eq!(config.resource_name("vpc"), "acme-qa-vpc");
/// ```
pub struct ConfigurationResolver {
    inputs: ResolverInputs,
    logger: SharedLogger,
}

impl ConfigurationResolver {
    pub fn new(inputs: ResolverInputs) -> Self {
        Self {
            inputs,
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    pub fn with_logger(inputs: ResolverInputs, logger: SharedLogger) -> Self {
        Self { inputs, logger }
    }

    pub fn inputs(&self) -> &ResolverInputs {
        &self.inputs
    }

    /// Resolve every field
    ///
    /// Fails only on a malformed extra egress port; in that case no
    /// configuration is returned at all.
    pub fn resolve(&self) -> ConfigResult<ResolvedConfiguration> {
        let env: Arc<dyn ValueSource> = Arc::new(EnvSource::new(self.inputs.env.clone()));
        let context: Arc<dyn ValueSource> = Arc::new(ContextSource::new(self.inputs.context.clone()));
        let chain = ChainSource::new(vec![env, context]);

        let mut origins = Vec::new();
        let project_name = self.resolve_field(&chain, "projectName", defaults::PROJECT_NAME, &mut origins);
        let environment = self.resolve_field(&chain, "environment", defaults::ENVIRONMENT, &mut origins);
        let environment_suffix =
            self.resolve_field(&chain, "environmentSuffix", defaults::ENVIRONMENT_SUFFIX, &mut origins);
        let office_cidr = self.resolve_field(&chain, "officeCidr", defaults::OFFICE_CIDR, &mut origins);
        let alert_email = self.resolve_field(&chain, "alertEmail", defaults::ALERT_EMAIL, &mut origins);
        let region = self.resolve_region(&chain, &mut origins);
        let owner = self.resolve_field(&chain, "owner", defaults::OWNER, &mut origins);
        let cost_center = self.resolve_field(&chain, "costCenter", defaults::COST_CENTER, &mut origins);

        let artifact_bucket_name = self.resolve_optional(&chain, "artifactBucketName", &mut origins);
        let ports_raw = self.resolve_optional(&chain, "extraEgressPorts", &mut origins);
        let extra_egress_ports = parse_ports(ports_raw.as_deref()).map_err(|e| {
            log_error!(self.logger, "configuration rejected: {}", e);
            e
        })?;

        let config = ResolvedConfiguration {
            project_name,
            environment,
            environment_suffix,
            office_cidr,
            alert_email,
            region,
            owner,
            cost_center,
            artifact_bucket_name,
            extra_egress_ports,
            origins,
        };

        log_info!(
            self.logger,
            "resolved {} in {} ({} extra egress ports)",
            config.stack_id(),
            config.region(),
            config.extra_egress_ports().len()
        );
        Ok(config)
    }

    fn resolve_field(
        &self,
        chain: &ChainSource,
        key: &str,
        default: &str,
        origins: &mut Vec<FieldOrigin>,
    ) -> String {
        match chain.find(key) {
            Some(hit) => self.record_hit(key, hit, origins),
            None => self.record_default(key, default, origins),
        }
    }

    fn resolve_optional(
        &self,
        chain: &ChainSource,
        key: &str,
        origins: &mut Vec<FieldOrigin>,
    ) -> Option<String> {
        match chain.find(key) {
            Some(hit) => Some(self.record_hit(key, hit, origins)),
            None => {
                log_debug!(self.logger, "{} not set", key);
                origins.push(FieldOrigin {
                    field: key.to_string(),
                    source: "default".to_string(),
                    key: None,
                });
                None
            }
        }
    }

    /// Env (both variables) → context → override file → default
    fn resolve_region(&self, chain: &ChainSource, origins: &mut Vec<FieldOrigin>) -> String {
        if let Some(hit) = chain.find("region") {
            return self.record_hit("region", hit, origins);
        }

        let file = RegionFileSource::new(&self.inputs.region_file);
        match file.read() {
            RegionFileRead::Value(value) if !is_blank(&value) => {
                let hit = SourceHit {
                    value,
                    source: "file".to_string(),
                    key: file.path().display().to_string(),
                };
                return self.record_hit("region", hit, origins);
            }
            RegionFileRead::Value(_) => {
                log_debug!(self.logger, "region file {} is blank", file.path().display());
            }
            RegionFileRead::Missing => {
                log_debug!(self.logger, "no region file at {}", file.path().display());
            }
            RegionFileRead::Unreadable(kind) => {
                log_warn!(
                    self.logger,
                    "ignoring unreadable region file {}: {:?}",
                    file.path().display(),
                    kind
                );
            }
        }

        self.record_default("region", defaults::REGION, origins)
    }

    fn record_hit(&self, field: &str, hit: SourceHit, origins: &mut Vec<FieldOrigin>) -> String {
        log_debug!(self.logger, "{} = {} (from {} {})", field, hit.value, hit.source, hit.key);
        origins.push(FieldOrigin {
            field: field.to_string(),
            source: hit.source,
            key: Some(hit.key),
        });
        hit.value
    }

    fn record_default(&self, field: &str, default: &str, origins: &mut Vec<FieldOrigin>) -> String {
        log_debug!(self.logger, "{} = {:?} (default)", field, default);
        origins.push(FieldOrigin {
            field: field.to_string(),
            source: "default".to_string(),
            key: None,
        });
        default.to_string()
    }
}

/// Resolve configuration with a silent logger
pub fn resolve(inputs: &ResolverInputs) -> ConfigResult<ResolvedConfiguration> {
    ConfigurationResolver::new(inputs.clone()).resolve()
}
