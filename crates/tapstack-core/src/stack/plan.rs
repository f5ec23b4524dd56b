//! Stack plan data types

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use super::flags::StackFlags;

/// Kind of a planned resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    EncryptionKey,
    Network,
    SecurityGroup,
    LogBucket,
    AuditTrail,
    AlertTopic,
    InstanceRole,
    Instance,
    CpuAlarm,
    DatabaseSubnetGroup,
    DatabaseParameterGroup,
    Database,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::EncryptionKey => "encryption-key",
            ResourceKind::Network => "network",
            ResourceKind::SecurityGroup => "security-group",
            ResourceKind::LogBucket => "log-bucket",
            ResourceKind::AuditTrail => "audit-trail",
            ResourceKind::AlertTopic => "alert-topic",
            ResourceKind::InstanceRole => "instance-role",
            ResourceKind::Instance => "instance",
            ResourceKind::CpuAlarm => "cpu-alarm",
            ResourceKind::DatabaseSubnetGroup => "database-subnet-group",
            ResourceKind::DatabaseParameterGroup => "database-parameter-group",
            ResourceKind::Database => "database",
        }
    }
}

/// One resource the stack declares
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedResource {
    pub logical_id: String,
    pub kind: ResourceKind,
    pub properties: Value,
}

/// One exported value the stack promises in its flat outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedOutput {
    /// Key in the flat output mapping (`VpcId`, `PrivateSubnet1`, ...)
    pub key: String,
    pub description: String,
    pub export_name: String,
}

/// Everything the stack declares, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackPlan {
    pub stack_id: String,
    pub region: String,
    pub flags: StackFlags,
    pub tags: BTreeMap<String, String>,
    pub resources: Vec<PlannedResource>,
    pub outputs: Vec<PlannedOutput>,
}

impl StackPlan {
    pub fn resource(&self, logical_id: &str) -> Option<&PlannedResource> {
        self.resources.iter().find(|r| r.logical_id == logical_id)
    }

    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = &PlannedResource> {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    pub fn output(&self, key: &str) -> Option<&PlannedOutput> {
        self.outputs.iter().find(|o| o.key == key)
    }

    pub fn output_keys(&self) -> Vec<&str> {
        self.outputs.iter().map(|o| o.key.as_str()).collect()
    }

    /// Whether no two resources share a logical id
    pub fn logical_ids_are_unique(&self) -> bool {
        let mut seen = HashSet::new();
        self.resources.iter().all(|r| seen.insert(r.logical_id.as_str()))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
