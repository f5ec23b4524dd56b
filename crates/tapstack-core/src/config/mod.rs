//! Configuration inputs
//!
//! Everything the resolver reads is materialised here before resolution runs:
//! - `EnvSnapshot`: the process environment, captured once
//! - `ContextMap`: structured deployment context (files + CLI overrides)
//! - `ContextLoader`: assembles a `ContextMap` from the usual locations

mod traits;
mod env;
mod context;
mod loader;

pub use traits::{ConfigError, ConfigResult};
pub use env::EnvSnapshot;
pub use context::ContextMap;
pub use loader::{ContextLoader, ContextLayer};
