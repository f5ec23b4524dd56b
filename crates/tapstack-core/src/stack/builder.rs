//! Builds a [`StackPlan`] from a resolved configuration

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::{log_debug, log_info};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::resolver::ResolvedConfiguration;

use super::flags::StackFlags;
use super::plan::{PlannedOutput, PlannedResource, ResourceKind, StackPlan};

/// Address range of the stack network
pub const VPC_CIDR: &str = "10.0.0.0/16";

/// Availability zones used; one public and one private subnet per zone
pub const AZ_COUNT: usize = 2;

const HTTPS: i32 = 443;
const HTTP: i32 = 80;
const MYSQL: i32 = 3306;

/// Declares the stack's resources and outputs in a fixed order
///
/// # Example
///
/// ```
/// use tapstack_core::config::{ContextMap, EnvSnapshot};
/// use tapstack_core::resolver::{resolve, ResolverInputs};
/// use tapstack_core::stack::{StackFlags, StackPlan};
///
/// let inputs = ResolverInputs::new(EnvSnapshot::empty(), ContextMap::new())
///     .with_region_file("/nonexistent/AWS_REGION");
/// let config = resolve(&inputs).unwrap();
///
/// let plan = StackPlan::build(&config, StackFlags::default());
/// assert!(plan.resource("webapp-prod-vpc").is_some());
/// assert!(plan.output("CloudTrailBucketName").is_none());
/// ```
pub struct StackPlanBuilder<'a> {
    config: &'a ResolvedConfiguration,
    flags: StackFlags,
    logger: SharedLogger,
    resources: Vec<PlannedResource>,
    outputs: Vec<PlannedOutput>,
}

impl StackPlan {
    /// Build a plan with a silent logger
    pub fn build(config: &ResolvedConfiguration, flags: StackFlags) -> StackPlan {
        StackPlanBuilder::new(config, flags).build()
    }
}

impl<'a> StackPlanBuilder<'a> {
    pub fn new(config: &'a ResolvedConfiguration, flags: StackFlags) -> Self {
        Self {
            config,
            flags,
            logger: Arc::new(NoOpLogger::new()),
            resources: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(mut self) -> StackPlan {
        let kms_key = self.encryption_key();
        let vpc = self.network();
        let web_sg = self.web_security_group(&vpc);
        let rds_sg = self.database_security_group(&vpc, &web_sg);

        let trail_bucket = if self.flags.enable_cloud_trail {
            let bucket = self.trail_bucket(&kms_key);
            self.audit_trail(&bucket);
            Some(bucket)
        } else {
            None
        };

        let topic = self.alert_topic();
        let role = self.instance_role();
        let instances = self.instances(&vpc, &web_sg, &role);
        self.cpu_alarms(&instances, &topic);
        self.database(&vpc, &rds_sg, &kms_key);

        self.declare_outputs(&instances, trail_bucket.is_some());

        log_info!(
            self.logger,
            "planned {} resources and {} outputs for {}",
            self.resources.len(),
            self.outputs.len(),
            self.config.stack_id()
        );
        crate::logging::debug(
            "stack_plan",
            &format!("cloud trail enabled: {}", self.flags.enable_cloud_trail),
        );

        StackPlan {
            stack_id: self.config.stack_id(),
            region: self.config.region().to_string(),
            flags: self.flags,
            tags: self.tags(),
            resources: self.resources,
            outputs: self.outputs,
        }
    }

    fn name(&self, label: &str) -> String {
        self.config.resource_name(label)
    }

    /// Declare a resource and return its logical id
    fn declare(&mut self, label: &str, kind: ResourceKind, properties: Value) -> String {
        let logical_id = self.name(label);
        log_debug!(self.logger, "declare {} {}", kind.as_str(), logical_id);
        self.resources.push(PlannedResource {
            logical_id: logical_id.clone(),
            kind,
            properties,
        });
        logical_id
    }

    fn tags(&self) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();
        tags.insert("Project".to_string(), self.config.project_name().to_string());
        tags.insert("Environment".to_string(), self.config.environment().to_string());
        tags.insert("ManagedBy".to_string(), "CDK".to_string());
        tags.insert("Owner".to_string(), self.config.owner().to_string());
        tags.insert("CostCenter".to_string(), self.config.cost_center().to_string());
        tags
    }

    fn encryption_key(&mut self) -> String {
        self.declare(
            "kms-key",
            ResourceKind::EncryptionKey,
            json!({
                "description": "KMS key for encrypting resources",
                "enableKeyRotation": true,
            }),
        )
    }

    fn network(&mut self) -> String {
        let public = self.name("public-subnet");
        let private = self.name("private-subnet");
        self.declare(
            "vpc",
            ResourceKind::Network,
            json!({
                "cidr": VPC_CIDR,
                "maxAzs": AZ_COUNT,
                "natGateways": AZ_COUNT,
                "subnets": [
                    { "name": public, "type": "public", "cidrMask": 24 },
                    { "name": private, "type": "private-with-egress", "cidrMask": 24 },
                ],
            }),
        )
    }

    fn web_security_group(&mut self, vpc: &str) -> String {
        let mut egress = vec![
            rule("0.0.0.0/0", HTTPS, "Allow HTTPS egress"),
            rule("0.0.0.0/0", HTTP, "Allow HTTP egress"),
        ];
        for port in self.config.extra_egress_ports() {
            egress.push(rule("0.0.0.0/0", *port, &format!("Additional egress port {}", port)));
        }

        let office = self.config.office_cidr();
        let ingress = vec![
            rule(office, HTTP, "Allow HTTP from office"),
            rule(office, HTTPS, "Allow HTTPS from office"),
        ];

        self.declare(
            "web-sg",
            ResourceKind::SecurityGroup,
            json!({
                "vpc": vpc,
                "description": "Security group for web servers",
                "allowAllOutbound": false,
                "egress": egress,
                "ingress": ingress,
            }),
        )
    }

    fn database_security_group(&mut self, vpc: &str, web_sg: &str) -> String {
        self.declare(
            "rds-sg",
            ResourceKind::SecurityGroup,
            json!({
                "vpc": vpc,
                "description": "Security group for RDS instances",
                "allowAllOutbound": false,
                "egress": [],
                "ingress": [{
                    "peerSecurityGroup": web_sg,
                    "port": MYSQL,
                    "description": "Allow MySQL access from web servers",
                }],
            }),
        )
    }

    fn trail_bucket(&mut self, kms_key: &str) -> String {
        let bucket_name = self.name("cloudtrail-logs-2");
        self.declare(
            "cloudtrail-bucket",
            ResourceKind::LogBucket,
            json!({
                "bucketName": bucket_name,
                "encryptionKey": kms_key,
                "blockPublicAccess": true,
                "versioned": true,
                "lifecycleRules": [{ "id": "DeleteOldLogs", "expirationDays": 90 }],
            }),
        )
    }

    fn audit_trail(&mut self, bucket: &str) -> String {
        let trail_name = self.name("audit-trail");
        self.declare(
            "cloudtrail",
            ResourceKind::AuditTrail,
            json!({
                "trailName": trail_name,
                "bucket": bucket,
                "includeGlobalServiceEvents": true,
                "isMultiRegionTrail": true,
                "enableFileValidation": true,
            }),
        )
    }

    fn alert_topic(&mut self) -> String {
        let topic_name = self.name("devops-alerts");
        let email = self.config.alert_email().to_string();
        self.declare(
            "alert-topic",
            ResourceKind::AlertTopic,
            json!({
                "topicName": topic_name,
                "displayName": "DevOps Team Alerts",
                "subscriptions": [{ "protocol": "email", "endpoint": email }],
            }),
        )
    }

    fn instance_role(&mut self) -> String {
        let role_name = self.name("ec2-instance-role");
        let artifact_arn = self.config.artifact_bucket_arn();
        self.declare(
            "ec2-role",
            ResourceKind::InstanceRole,
            json!({
                "roleName": role_name,
                "assumedBy": "ec2.amazonaws.com",
                "managedPolicies": ["CloudWatchAgentServerPolicy", "AmazonSSMManagedInstanceCore"],
                "inlinePolicies": {
                    "S3AccessPolicy": [{
                        "effect": "Allow",
                        "actions": ["s3:GetObject", "s3:PutObject"],
                        "resources": [artifact_arn],
                    }],
                },
            }),
        )
    }

    /// One instance per private subnet
    fn instances(&mut self, vpc: &str, web_sg: &str, role: &str) -> Vec<String> {
        (1..=AZ_COUNT)
            .map(|i| {
                let instance_name = self.name(&format!("web-server-{}", i));
                self.declare(
                    &format!("web-instance-{}", i),
                    ResourceKind::Instance,
                    json!({
                        "instanceName": instance_name,
                        "instanceType": "t3.medium",
                        "machineImage": "amazon-linux-2",
                        "vpc": vpc,
                        "privateSubnetIndex": i - 1,
                        "securityGroup": web_sg,
                        "role": role,
                    }),
                )
            })
            .collect()
    }

    fn cpu_alarms(&mut self, instances: &[String], topic: &str) {
        for (i, instance) in instances.iter().enumerate() {
            let n = i + 1;
            let alarm_name = self.name(&format!("high-cpu-{}", n));
            self.declare(
                &format!("cpu-alarm-{}", n),
                ResourceKind::CpuAlarm,
                json!({
                    "alarmName": alarm_name,
                    "alarmDescription": format!("CPU utilization exceeds 80% for {}", instance),
                    "metric": {
                        "namespace": "AWS/EC2",
                        "metricName": "CPUUtilization",
                        "dimensions": { "InstanceId": instance },
                        "statistic": "Average",
                        "periodMinutes": 5,
                    },
                    "threshold": 80.0,
                    "comparisonOperator": "GreaterThanThreshold",
                    "evaluationPeriods": 2,
                    "treatMissingData": "breaching",
                    "alarmActions": [topic],
                }),
            );
        }
    }

    fn database(&mut self, vpc: &str, rds_sg: &str, kms_key: &str) -> String {
        let subnet_group_name = self.name("rds-subnets");
        let subnet_group = self.declare(
            "rds-subnet-group",
            ResourceKind::DatabaseSubnetGroup,
            json!({
                "subnetGroupName": subnet_group_name,
                "description": "Subnet group for RDS instances",
                "vpc": vpc,
                "subnetType": "private-with-egress",
            }),
        );

        let parameter_group = self.declare(
            "rds-params",
            ResourceKind::DatabaseParameterGroup,
            json!({
                "engine": "mysql",
                "engineVersion": "8.0",
                "description": "Custom parameter group for MySQL",
            }),
        );

        let identifier = self.name("mysql-db-2");
        self.declare(
            "rds-instance",
            ResourceKind::Database,
            json!({
                "instanceIdentifier": identifier,
                "engine": "mysql",
                "engineVersion": "8.0",
                "instanceType": "t3.micro",
                "vpc": vpc,
                "subnetGroup": subnet_group,
                "securityGroups": [rds_sg],
                "parameterGroup": parameter_group,
                "multiAz": true,
                "storageEncrypted": true,
                "storageEncryptionKey": kms_key,
                "allocatedStorage": 20,
                "maxAllocatedStorage": 100,
                "storageType": "gp2",
                "backupRetentionDays": 7,
                "deletionProtection": true,
                "databaseName": "webapp",
                "masterUsername": "admin",
                "monitoringIntervalSeconds": 60,
            }),
        )
    }

    fn output(&mut self, key: impl Into<String>, description: impl Into<String>, export_label: &str) {
        let export_name = self.name(export_label);
        self.outputs.push(PlannedOutput {
            key: key.into(),
            description: description.into(),
            export_name,
        });
    }

    fn declare_outputs(&mut self, instances: &[String], cloud_trail: bool) {
        self.output("VpcId", "VPC ID for the infrastructure", "vpc-id");
        self.output("VpcCidr", "VPC CIDR block", "vpc-cidr");

        for i in 1..=AZ_COUNT {
            self.output(
                format!("PrivateSubnet{}", i),
                format!("Private subnet {} ID", i),
                &format!("private-subnet-{}", i),
            );
        }
        for i in 1..=AZ_COUNT {
            self.output(
                format!("PublicSubnet{}", i),
                format!("Public subnet {} ID", i),
                &format!("public-subnet-{}", i),
            );
        }

        for i in 1..=instances.len() {
            self.output(
                format!("Ec2Instance{}Id", i),
                format!("EC2 instance {} ID", i),
                &format!("ec2-instance-{}-id", i),
            );
            self.output(
                format!("Ec2Instance{}PrivateIp", i),
                format!("EC2 instance {} private IP", i),
                &format!("ec2-instance-{}-private-ip", i),
            );
        }

        self.output("RdsInstanceId", "RDS instance identifier", "rds-instance-id");
        self.output("RdsEndpoint", "RDS instance endpoint", "rds-endpoint");
        self.output("RdsPort", "RDS instance port", "rds-port");

        if cloud_trail {
            self.output("CloudTrailBucketName", "CloudTrail S3 bucket name", "cloudtrail-bucket");
        }

        self.output("AlertTopicArn", "SNS topic ARN for alerts", "alert-topic-arn");
        self.output("KmsKeyId", "KMS key ID for encryption", "kms-key-id");
        self.output("KmsKeyArn", "KMS key ARN for encryption", "kms-key-arn");
        self.output("CloudTrailEnabled", "Whether CloudTrail is enabled", "cloudtrail-enabled");
        self.output("Region", "AWS region where resources are deployed", "region");
        self.output("Account", "AWS account ID", "account");
    }
}

fn rule(peer: &str, port: i32, description: &str) -> Value {
    json!({ "peer": peer, "port": port, "protocol": "tcp", "description": description })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContextMap, EnvSnapshot};
    use crate::logging::{LogLevel, MemoryLogger};
    use crate::resolver::{resolve, ResolverInputs};
    use tempfile::tempdir;

    fn config(env: &[(&str, &str)]) -> ResolvedConfiguration {
        let dir = tempdir().unwrap();
        let inputs = ResolverInputs::new(EnvSnapshot::from_pairs(env.iter().copied()), ContextMap::new())
            .with_project_dir(dir.path());
        resolve(&inputs).unwrap()
    }

    fn ports_of(rules: &Value) -> Vec<i64> {
        rules
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["port"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_default_plan_without_cloud_trail() {
        let plan = StackPlan::build(&config(&[]), StackFlags::default());

        assert_eq!(plan.stack_id, "TapStack");
        assert_eq!(plan.region, "eu-north-1");
        assert!(plan.resources_of(ResourceKind::LogBucket).next().is_none());
        assert!(plan.resources_of(ResourceKind::AuditTrail).next().is_none());
        assert!(plan.output("CloudTrailBucketName").is_none());
        assert!(plan.output("CloudTrailEnabled").is_some());

        assert_eq!(plan.resources_of(ResourceKind::Network).count(), 1);
        assert_eq!(plan.resources_of(ResourceKind::SecurityGroup).count(), 2);
        assert_eq!(plan.resources_of(ResourceKind::Instance).count(), 2);
        assert_eq!(plan.resources_of(ResourceKind::CpuAlarm).count(), 2);
        assert_eq!(plan.resources_of(ResourceKind::Database).count(), 1);
        assert!(plan.logical_ids_are_unique());
    }

    #[test]
    fn test_cloud_trail_adds_bucket_trail_and_output() {
        let plan = StackPlan::build(&config(&[]), StackFlags::default().with_cloud_trail(true));

        let bucket = plan.resource("webapp-prod-cloudtrail-bucket").unwrap();
        assert_eq!(bucket.properties["bucketName"], "webapp-prod-cloudtrail-logs-2");
        assert_eq!(bucket.properties["encryptionKey"], "webapp-prod-kms-key");

        let trail = plan.resource("webapp-prod-cloudtrail").unwrap();
        assert_eq!(trail.properties["trailName"], "webapp-prod-audit-trail");
        assert_eq!(trail.properties["bucket"], "webapp-prod-cloudtrail-bucket");

        let output = plan.output("CloudTrailBucketName").unwrap();
        assert_eq!(output.export_name, "webapp-prod-cloudtrail-bucket");
        assert!(plan.flags.enable_cloud_trail);
        assert!(plan.logical_ids_are_unique());
    }

    #[test]
    fn test_extra_egress_ports_follow_defaults_in_order() {
        let plan = StackPlan::build(
            &config(&[("EXTRA_EGRESS_PORTS", "8080 22,5432")]),
            StackFlags::default(),
        );
        let web_sg = plan.resource("webapp-prod-web-sg").unwrap();

        assert_eq!(ports_of(&web_sg.properties["egress"]), vec![443, 80, 8080, 22, 5432]);
        assert_eq!(
            web_sg.properties["egress"][2]["description"],
            "Additional egress port 8080"
        );
        assert_eq!(ports_of(&web_sg.properties["ingress"]), vec![80, 443]);
    }

    #[test]
    fn test_office_cidr_used_verbatim_for_ingress() {
        let plan = StackPlan::build(&config(&[("OFFICE_CIDR", "198.51.100.0/22")]), StackFlags::default());
        let web_sg = plan.resource("webapp-prod-web-sg").unwrap();
        for rule in web_sg.properties["ingress"].as_array().unwrap() {
            assert_eq!(rule["peer"], "198.51.100.0/22");
        }
    }

    #[test]
    fn test_database_group_only_admits_web_servers() {
        let plan = StackPlan::build(&config(&[]), StackFlags::default());
        let rds_sg = plan.resource("webapp-prod-rds-sg").unwrap();
        let ingress = rds_sg.properties["ingress"].as_array().unwrap();
        assert_eq!(ingress.len(), 1);
        assert_eq!(ingress[0]["port"], 3306);
        assert_eq!(ingress[0]["peerSecurityGroup"], "webapp-prod-web-sg");
    }

    #[test]
    fn test_tags() {
        let plan = StackPlan::build(
            &config(&[("OWNER", "sre"), ("COST_CENTER", "R&D"), ("PROJECT_NAME", "shop")]),
            StackFlags::default(),
        );
        assert_eq!(plan.tags["Project"], "shop");
        assert_eq!(plan.tags["Environment"], "prod");
        assert_eq!(plan.tags["ManagedBy"], "CDK");
        assert_eq!(plan.tags["Owner"], "sre");
        assert_eq!(plan.tags["CostCenter"], "R&D");
    }

    #[test]
    fn test_role_grants_artifact_arn() {
        let plan = StackPlan::build(&config(&[("ARTIFACT_BUCKET_NAME", "builds")]), StackFlags::default());
        let role = plan.resource("webapp-prod-ec2-role").unwrap();
        assert_eq!(
            role.properties["inlinePolicies"]["S3AccessPolicy"][0]["resources"][0],
            "arn:aws:s3:::builds/*"
        );
    }

    #[test]
    fn test_names_follow_project_and_environment() {
        let plan = StackPlan::build(
            &config(&[("PROJECT_NAME", "shop"), ("ENVIRONMENT", "dev"), ("ENVIRONMENT_SUFFIX", "pr7")]),
            StackFlags::default(),
        );
        assert_eq!(plan.stack_id, "TapStackpr7");
        assert!(plan.resources.iter().all(|r| r.logical_id.starts_with("shop-dev-")));
        assert!(plan.outputs.iter().all(|o| o.export_name.starts_with("shop-dev-")));
        assert_eq!(plan.output("VpcId").unwrap().export_name, "shop-dev-vpc-id");

        let alarm = plan.resource("shop-dev-cpu-alarm-2").unwrap();
        assert_eq!(alarm.properties["metric"]["dimensions"]["InstanceId"], "shop-dev-web-instance-2");
        assert_eq!(alarm.properties["alarmActions"][0], "shop-dev-alert-topic");
    }

    #[test]
    fn test_output_keys_in_order() {
        let plan = StackPlan::build(&config(&[]), StackFlags::default());
        assert_eq!(
            plan.output_keys(),
            vec![
                "VpcId", "VpcCidr", "PrivateSubnet1", "PrivateSubnet2", "PublicSubnet1",
                "PublicSubnet2", "Ec2Instance1Id", "Ec2Instance1PrivateIp", "Ec2Instance2Id",
                "Ec2Instance2PrivateIp", "RdsInstanceId", "RdsEndpoint", "RdsPort",
                "AlertTopicArn", "KmsKeyId", "KmsKeyArn", "CloudTrailEnabled", "Region", "Account",
            ]
        );
    }

    #[test]
    fn test_plan_serializes() {
        let plan = StackPlan::build(&config(&[]), StackFlags::default());
        let json = plan.to_json_pretty().unwrap();
        assert!(json.contains("\"stackId\": \"TapStack\""));
        assert!(json.contains("\"kind\": \"security-group\""));

        let yaml = plan.to_yaml().unwrap();
        assert!(yaml.contains("logicalId: webapp-prod-vpc"));
    }

    #[test]
    fn test_builder_logs_summary() {
        let config = config(&[]);
        let logger = Arc::new(MemoryLogger::new());
        StackPlanBuilder::new(&config, StackFlags::default())
            .with_logger(logger.clone())
            .build();
        assert!(logger.contains(LogLevel::Info, "resources"));
        assert!(logger.contains(LogLevel::Debug, "declare network webapp-prod-vpc"));
    }
}
