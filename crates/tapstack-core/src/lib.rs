//! TapStack Core
//!
//! Deployment configuration for the TapStack web application stack.
//! Every tunable (project name, environment, region, alert email, ...) is
//! resolved from the process environment, the deployment context, or a
//! built-in default, in that order. The resolved values drive resource naming,
//! the artifact bucket ARN, and the declarative stack plan.
//!
//! ## Resolving
//!
//! ```rust,no_run
//! use tapstack_core::{resolve, ContextLoader, ResolverInputs};
//!
//! let context = ContextLoader::new(".").with_override("environment=staging").load()?;
//! let inputs = ResolverInputs::from_process(context).with_project_dir(".");
//! let config = resolve(&inputs)?;
//!
//! assert_eq!(config.resource_name("vpc"), format!(
//!     "{}-{}-vpc",
//!     config.project_name(),
//!     config.environment()
//! ));
//! # Ok::<(), tapstack_core::ConfigError>(())
//! ```
//!
//! ## Verifying a deployment
//!
//! After deployment, `cfn-outputs/flat-outputs.json` can be checked offline
//! against the plan with [`outputs::load_and_verify`].

pub mod config;
pub mod sources;
pub mod logging;
pub mod resolver;
pub mod stack;
pub mod outputs;

// Re-export commonly used types
pub use config::{ConfigError, ConfigResult, ContextLoader, ContextMap, EnvSnapshot};

pub use sources::{
    ValueSource, SourceHit,
    EnvSource, ContextSource, RegionFileSource, MemorySource, ChainSource,
};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, SharedLogger};

pub use resolver::{
    ConfigurationResolver, ResolverInputs, ResolvedConfiguration, FieldOrigin,
    resolve, parse_ports,
};

pub use stack::{StackFlags, StackPlan, StackPlanBuilder, ResourceKind};

pub use outputs::{FlatOutputs, Verifier, VerificationReport, CheckOutcome};
