//! Deployment outputs
//!
//! After deployment the stack's exported values land in a flat JSON object
//! (`cfn-outputs/flat-outputs.json`). This module reads and writes that file
//! and checks it against a [`StackPlan`](crate::stack::StackPlan).

mod flat;
mod verify;

pub use flat::{FlatOutputs, to_string_list, extract_id, DEFAULT_OUTPUTS_FILE};
pub use verify::{Verifier, VerificationReport, CheckResult, CheckOutcome, load_and_verify};
