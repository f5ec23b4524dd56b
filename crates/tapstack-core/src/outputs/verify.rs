//! Offline verification of deployment outputs against a stack plan

use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::flat::{extract_id, FlatOutputs};
use crate::config::ConfigResult;
use crate::stack::{StackPlan, VPC_CIDR};

const VPC_ID: &str = r"\bvpc-[0-9a-f]+\b";
const SUBNET_ID: &str = r"\bsubnet-[0-9a-f]+\b";
const INSTANCE_ID: &str = r"\bi-[0-9a-f]+\b";

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum CheckOutcome {
    Passed,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub outcome: CheckOutcome,
}

/// All check results, in evaluation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub checks: Vec<CheckResult>,
}

impl VerificationReport {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Skipped(_)))
    }

    /// No check failed; skipped checks don't count against success
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn check(&self, name: &str) -> Option<&CheckOutcome> {
        self.checks.iter().find(|c| c.name == name).map(|c| &c.outcome)
    }

    fn count(&self, pred: impl Fn(&CheckOutcome) -> bool) -> usize {
        self.checks.iter().filter(|c| pred(&c.outcome)).count()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            match &check.outcome {
                CheckOutcome::Passed => writeln!(f, "PASS  {}", check.name)?,
                CheckOutcome::Failed(reason) => writeln!(f, "FAIL  {}: {}", check.name, reason)?,
                CheckOutcome::Skipped(reason) => writeln!(f, "SKIP  {}: {}", check.name, reason)?,
            }
        }
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}

/// Checks flat outputs against what a [`StackPlan`] says should exist
pub struct Verifier<'a> {
    plan: &'a StackPlan,
}

impl<'a> Verifier<'a> {
    pub fn new(plan: &'a StackPlan) -> Self {
        Self { plan }
    }

    pub fn verify(&self, outputs: &FlatOutputs) -> VerificationReport {
        let checks = vec![
            self.run("vpc", outputs, &["VpcId", "VpcCidr"], |o| {
                expect_ids(o, &["VpcId"], "vpc-", VPC_ID)?;
                let cidr = o.get_string("VpcCidr").unwrap_or_default();
                if cidr != VPC_CIDR {
                    return Err(format!("VpcCidr {:?} does not match {}", cidr, VPC_CIDR));
                }
                Ok(())
            }),
            self.run("private-subnets", outputs, &["PrivateSubnet1", "PrivateSubnet2"], |o| {
                expect_ids(o, &["PrivateSubnet1", "PrivateSubnet2"], "subnet-", SUBNET_ID)
            }),
            self.run("public-subnets", outputs, &["PublicSubnet1", "PublicSubnet2"], |o| {
                expect_ids(o, &["PublicSubnet1", "PublicSubnet2"], "subnet-", SUBNET_ID)
            }),
            self.run("ec2-instances", outputs, &["Ec2Instance1Id", "Ec2Instance2Id"], |o| {
                expect_ids(o, &["Ec2Instance1Id", "Ec2Instance2Id"], "i-", INSTANCE_ID)
            }),
            self.run("rds-instance", outputs, &["RdsInstanceId"], |o| {
                expect_non_empty(o, "RdsInstanceId")
            }),
            self.run("kms-key", outputs, &["KmsKeyId"], |o| expect_non_empty(o, "KmsKeyId")),
            self.run("alert-topic", outputs, &["AlertTopicArn"], |o| {
                let arn = o.get_string("AlertTopicArn").unwrap_or_default();
                if arn.starts_with("arn:") && arn.contains(":sns:") {
                    Ok(())
                } else {
                    Err(format!("AlertTopicArn {:?} is not an SNS topic ARN", arn))
                }
            }),
            self.run("cloudtrail-flag", outputs, &["CloudTrailEnabled"], |o| {
                let actual = o.get_string("CloudTrailEnabled").unwrap_or_default();
                let expected = self.plan.flags.enable_cloud_trail;
                if actual.trim().eq_ignore_ascii_case(&expected.to_string()) {
                    Ok(())
                } else {
                    Err(format!("CloudTrailEnabled is {:?}, expected {}", actual, expected))
                }
            }),
            self.run("region", outputs, &["Region"], |o| {
                let actual = o.get_string("Region").unwrap_or_default();
                if actual == self.plan.region {
                    Ok(())
                } else {
                    Err(format!("Region is {:?}, expected {:?}", actual, self.plan.region))
                }
            }),
        ];

        VerificationReport { checks }
    }

    fn run(
        &self,
        name: &'static str,
        outputs: &FlatOutputs,
        keys: &[&str],
        check: impl FnOnce(&FlatOutputs) -> Result<(), String>,
    ) -> CheckResult {
        let missing = outputs.missing_keys(keys);
        let outcome = if !missing.is_empty() {
            CheckOutcome::Skipped(format!("missing {}", missing.join(", ")))
        } else {
            match check(outputs) {
                Ok(()) => CheckOutcome::Passed,
                Err(reason) => CheckOutcome::Failed(reason),
            }
        };
        CheckResult { name, outcome }
    }
}

/// Every value under `keys` holds at least one id, and each id starts with `prefix`
///
/// Values may be lists (`["subnet-1", "subnet-2"]`, comma separated text, ...)
/// and ids may be embedded in ARNs; `pattern` pulls the bare id out first.
fn expect_ids(outputs: &FlatOutputs, keys: &[&str], prefix: &str, pattern: &str) -> Result<(), String> {
    for key in keys {
        let values = outputs.get_list(key);
        if values.is_empty() {
            return Err(format!("{} is empty", key));
        }
        for raw in &values {
            let id = extract_id(raw, pattern);
            if !id.starts_with(prefix) {
                return Err(format!("{} {:?} does not start with {:?}", key, raw, prefix));
            }
        }
    }
    Ok(())
}

fn expect_non_empty(outputs: &FlatOutputs, key: &str) -> Result<(), String> {
    match outputs.get_string(key) {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(format!("{} is empty", key)),
    }
}

/// Load outputs from `path` and verify them; `Ok(None)` when the file is absent
pub fn load_and_verify(
    path: impl AsRef<Path>,
    plan: &StackPlan,
) -> ConfigResult<Option<VerificationReport>> {
    let path = path.as_ref();
    let Some(outputs) = FlatOutputs::load(path)? else {
        crate::logging::info(
            "outputs",
            &format!("no outputs at {}, skipping verification", path.display()),
        );
        return Ok(None);
    };
    Ok(Some(Verifier::new(plan).verify(&outputs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContextMap, EnvSnapshot};
    use crate::resolver::{resolve, ResolverInputs};
    use crate::stack::StackFlags;
    use tempfile::tempdir;

    fn plan(cloud_trail: bool) -> StackPlan {
        let dir = tempdir().unwrap();
        let inputs = ResolverInputs::new(
            EnvSnapshot::from_pairs([("AWS_REGION", "us-west-2")]),
            ContextMap::new(),
        )
        .with_project_dir(dir.path());
        let config = resolve(&inputs).unwrap();
        StackPlan::build(&config, StackFlags::default().with_cloud_trail(cloud_trail))
    }

    fn deployed() -> FlatOutputs {
        FlatOutputs::new()
            .with("VpcId", "vpc-0a1b2c")
            .with("VpcCidr", "10.0.0.0/16")
            .with("PrivateSubnet1", "subnet-111")
            .with("PrivateSubnet2", "subnet-222")
            .with("PublicSubnet1", "subnet-333")
            .with("PublicSubnet2", "subnet-444")
            .with("Ec2Instance1Id", "i-0aaa")
            .with("Ec2Instance2Id", "i-0bbb")
            .with("RdsInstanceId", "webapp-prod-mysql-db-2")
            .with("KmsKeyId", "1234abcd-12ab-34cd-56ef-1234567890ab")
            .with("AlertTopicArn", "arn:aws:sns:us-west-2:123456789012:webapp-prod-devops-alerts")
            .with("CloudTrailEnabled", "False")
            .with("Region", "us-west-2")
    }

    #[test]
    fn test_all_checks_pass() {
        let plan = plan(false);
        let report = Verifier::new(&plan).verify(&deployed());

        assert_eq!(report.checks.len(), 9);
        assert_eq!(report.passed(), 9);
        assert!(report.is_success());
    }

    #[test]
    fn test_missing_keys_are_skipped() {
        let plan = plan(false);
        let outputs = FlatOutputs::new().with("VpcId", "vpc-1");
        let report = Verifier::new(&plan).verify(&outputs);

        assert_eq!(report.passed(), 0);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.skipped(), 9);
        assert!(report.is_success());
        assert_eq!(
            report.check("vpc"),
            Some(&CheckOutcome::Skipped("missing VpcCidr".into()))
        );
    }

    #[test]
    fn test_bad_values_fail() {
        let plan = plan(false);
        let outputs = deployed()
            .with("VpcCidr", "10.1.0.0/16")
            .with("Ec2Instance2Id", "ami-123")
            .with("AlertTopicArn", "arn:aws:sqs:us-west-2:1:queue")
            .with("KmsKeyId", "  ");
        let report = Verifier::new(&plan).verify(&outputs);

        assert!(!report.is_success());
        assert_eq!(report.failed(), 4);
        assert!(matches!(report.check("vpc"), Some(CheckOutcome::Failed(r)) if r.contains("10.1.0.0/16")));
        assert!(matches!(report.check("ec2-instances"), Some(CheckOutcome::Failed(_))));
        assert!(matches!(report.check("alert-topic"), Some(CheckOutcome::Failed(_))));
        assert!(matches!(report.check("kms-key"), Some(CheckOutcome::Failed(_))));
    }

    #[test]
    fn test_ids_in_lists_and_arns_are_accepted() {
        let plan = plan(false);
        let outputs = deployed()
            .with("VpcId", "arn:aws:ec2:us-west-2:123456789012:vpc/vpc-0a1b2c")
            .with("PrivateSubnet1", serde_json::json!(["subnet-111", "subnet-112"]))
            .with("PublicSubnet2", "subnet-444, subnet-445");
        let report = Verifier::new(&plan).verify(&outputs);

        assert_eq!(report.check("vpc"), Some(&CheckOutcome::Passed));
        assert_eq!(report.check("private-subnets"), Some(&CheckOutcome::Passed));
        assert_eq!(report.check("public-subnets"), Some(&CheckOutcome::Passed));
    }

    #[test]
    fn test_empty_or_bad_list_entries_fail() {
        let plan = plan(false);
        let outputs = deployed()
            .with("PrivateSubnet2", serde_json::json!([]))
            .with("PublicSubnet1", serde_json::json!(["subnet-333", "sg-0abc"]));
        let report = Verifier::new(&plan).verify(&outputs);

        assert!(matches!(
            report.check("private-subnets"),
            Some(CheckOutcome::Failed(r)) if r.contains("PrivateSubnet2 is empty")
        ));
        assert!(matches!(
            report.check("public-subnets"),
            Some(CheckOutcome::Failed(r)) if r.contains("sg-0abc")
        ));
    }

    #[test]
    fn test_cloudtrail_flag_must_match_plan() {
        let plan = plan(true);
        let report = Verifier::new(&plan).verify(&deployed());
        assert!(matches!(report.check("cloudtrail-flag"), Some(CheckOutcome::Failed(_))));

        let report = Verifier::new(&plan).verify(&deployed().with("CloudTrailEnabled", "TRUE"));
        assert_eq!(report.check("cloudtrail-flag"), Some(&CheckOutcome::Passed));
    }

    #[test]
    fn test_region_mismatch_fails() {
        let plan = plan(false);
        let report = Verifier::new(&plan).verify(&deployed().with("Region", "eu-north-1"));
        assert!(matches!(report.check("region"), Some(CheckOutcome::Failed(_))));
    }

    #[test]
    fn test_load_and_verify() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat-outputs.json");
        let plan = plan(false);

        assert!(load_and_verify(&path, &plan).unwrap().is_none());

        deployed().save(&path).unwrap();
        let report = load_and_verify(&path, &plan).unwrap().unwrap();
        assert!(report.is_success());
    }

    #[test]
    fn test_report_display() {
        let plan = plan(false);
        let report = Verifier::new(&plan).verify(&deployed().with("Region", "eu-north-1"));
        let text = report.to_string();

        assert!(text.contains("PASS  vpc"));
        assert!(text.contains("FAIL  region"));
        assert!(text.ends_with("8 passed, 1 failed, 0 skipped"));
    }
}
