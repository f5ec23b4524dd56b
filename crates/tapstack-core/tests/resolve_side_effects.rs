//! Resolution must not write anything outside the injected logger.
//!
//! Kept in its own test binary because it changes `TMPDIR` for the process.

use std::fs;
use std::sync::Arc;

use tapstack_core::config::{ContextMap, EnvSnapshot};
use tapstack_core::logging::{LogLevel, MemoryLogger, SharedLogger};
use tapstack_core::resolver::{resolve, ConfigurationResolver, ResolverInputs};
use tempfile::tempdir;

#[test]
fn test_resolve_writes_no_files() {
    let tmp = tempdir().unwrap();
    std::env::set_var("TMPDIR", tmp.path());
    std::env::remove_var("TAPSTACK_DEBUG");

    let inputs = ResolverInputs::new(
        EnvSnapshot::from_pairs([("EXTRA_EGRESS_PORTS", "8080")]),
        ContextMap::new().with("environment", "qa"),
    )
    .with_region_file(tmp.path().join("lib/AWS_REGION"));

    let config = resolve(&inputs).unwrap();
    assert_eq!(config.resource_name("vpc"), "webapp-qa-vpc");

    let memory = Arc::new(MemoryLogger::new());
    let logger: SharedLogger = memory.clone();
    ConfigurationResolver::with_logger(inputs, logger).resolve().unwrap();
    assert!(memory.contains(LogLevel::Info, "resolved TapStack in eu-north-1"));

    let created: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
    assert!(created.is_empty(), "resolution created {:?}", created);
}
