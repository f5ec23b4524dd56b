//! Stack configuration resolution
//!
//! Turns an environment snapshot, a context map and the optional region
//! override file into one immutable [`ResolvedConfiguration`].

mod ports;
mod resolved;
mod config_resolver;

pub use ports::parse_ports;
pub use resolved::{ResolvedConfiguration, FieldOrigin, DEFAULT_PARTITION};
pub use config_resolver::{ConfigurationResolver, ResolverInputs, resolve, defaults};
