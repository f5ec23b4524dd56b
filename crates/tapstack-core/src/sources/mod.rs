//! Ranked value sources for configuration fields
//!
//! Each configuration field is looked up in a chain of sources:
//! - `EnvSource`: an environment snapshot
//! - `ContextSource`: the deployment context map
//! - `RegionFileSource`: the single-line region override file
//! - `MemorySource`: fixed values, mostly for tests
//! - `ChainSource`: tries sources in order, first non-blank value wins

mod traits;
mod env_source;
mod context_source;
mod file_source;
mod memory_source;
mod chain_source;

pub use traits::{ValueSource, SourceHit, is_blank};
pub use env_source::EnvSource;
pub use context_source::ContextSource;
pub use file_source::{RegionFileSource, RegionFileRead, DEFAULT_REGION_FILE};
pub use memory_source::MemorySource;
pub use chain_source::ChainSource;
