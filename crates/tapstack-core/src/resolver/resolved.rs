//! The resolved, immutable stack configuration

use serde::Serialize;

/// Partition used by [`ResolvedConfiguration::artifact_bucket_arn`]
pub const DEFAULT_PARTITION: &str = "aws";

/// Where a field's value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOrigin {
    /// Context key of the field (`projectName`, `region`, ...)
    pub field: String,
    /// `env`, `context`, `file` or `default`
    pub source: String,
    /// Variable or key that supplied the value; `None` for defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl FieldOrigin {
    pub fn is_default(&self) -> bool {
        self.source == "default"
    }
}

/// Deployment parameters for one stack, resolved once per process
///
/// Fields are only readable; the rest of the system names every resource via
/// [`resource_name`](Self::resource_name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfiguration {
    pub(crate) project_name: String,
    pub(crate) environment: String,
    pub(crate) environment_suffix: String,
    pub(crate) office_cidr: String,
    pub(crate) alert_email: String,
    pub(crate) region: String,
    pub(crate) owner: String,
    pub(crate) cost_center: String,
    pub(crate) artifact_bucket_name: Option<String>,
    pub(crate) extra_egress_ports: Vec<i32>,
    #[serde(skip)]
    pub(crate) origins: Vec<FieldOrigin>,
}

impl ResolvedConfiguration {
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn environment_suffix(&self) -> &str {
        &self.environment_suffix
    }

    /// Office network range, used verbatim as an ingress filter
    pub fn office_cidr(&self) -> &str {
        &self.office_cidr
    }

    /// Alert subscription address, used verbatim
    pub fn alert_email(&self) -> &str {
        &self.alert_email
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn cost_center(&self) -> &str {
        &self.cost_center
    }

    pub fn artifact_bucket_name(&self) -> Option<&str> {
        self.artifact_bucket_name.as_deref()
    }

    pub fn extra_egress_ports(&self) -> &[i32] {
        &self.extra_egress_ports
    }

    /// Stack identifier: `TapStack` followed by the environment suffix
    pub fn stack_id(&self) -> String {
        format!("TapStack{}", self.environment_suffix)
    }

    /// `<projectName>-<environment>-<label>`
    ///
    /// Callers are responsible for passing distinct labels.
    pub fn resource_name(&self, label: &str) -> String {
        format!("{}-{}-{}", self.project_name, self.environment, label)
    }

    /// Object ARN pattern for the artifact bucket in the `aws` partition
    pub fn artifact_bucket_arn(&self) -> String {
        self.artifact_bucket_arn_in(DEFAULT_PARTITION)
    }

    /// Object ARN pattern for the artifact bucket in `partition`
    ///
    /// With a bucket name: `arn:<partition>:s3:::<name>/*`. Without one, every
    /// bucket carrying the project/environment prefix:
    /// `arn:<partition>:s3:::<project>-<environment>-*/*`.
    pub fn artifact_bucket_arn_in(&self, partition: &str) -> String {
        match self.artifact_bucket_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("arn:{}:s3:::{}/*", partition, name),
            _ => format!(
                "arn:{}:s3:::{}-{}-*/*",
                partition, self.project_name, self.environment
            ),
        }
    }

    /// Origin of every field, in resolution order
    pub fn origins(&self) -> &[FieldOrigin] {
        &self.origins
    }

    /// Origin of one field by context key
    pub fn origin(&self, field: &str) -> Option<&FieldOrigin> {
        self.origins.iter().find(|o| o.field == field)
    }
}
