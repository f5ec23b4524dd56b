//! Declarative stack plan
//!
//! A provider-agnostic manifest of what the stack declares: named resources
//! with opaque JSON properties, stack-wide tags, and exported outputs. Every
//! logical id and export name goes through
//! [`ResolvedConfiguration::resource_name`](crate::resolver::ResolvedConfiguration::resource_name).

mod flags;
mod plan;
mod builder;

pub use flags::StackFlags;
pub use plan::{StackPlan, PlannedResource, PlannedOutput, ResourceKind};
pub use builder::{StackPlanBuilder, VPC_CIDR, AZ_COUNT};
