use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use crate::check::{CheckDecision, CheckResult, GuardCheck, Violation};
use crate::checks::AttributePresenceCheck;
use crate::config::GuardMap;
use crate::error::{GuardError, GuardResult};

const FINGERPRINT_DOMAIN: &str = "recdiff-guard-v1";

// ---------------------------------------------------------------------------
// GuardReport
// ---------------------------------------------------------------------------

/// The outcome of running a document through the full guard pipeline.
#[derive(Clone, Debug)]
pub struct GuardReport {
    /// The first violation found, if any.
    pub violation: Option<Violation>,
    /// Hex BLAKE3 fingerprint of the guard configuration that was active.
    pub fingerprint: String,
    /// Per-check results in evaluation order.
    pub check_results: Vec<CheckResult>,
    /// Total wall-clock time for the pipeline evaluation.
    pub elapsed: Duration,
}

impl GuardReport {
    /// Returns `true` if every check passed.
    pub fn is_passed(&self) -> bool {
        self.violation.is_none()
    }
}

// ---------------------------------------------------------------------------
// DocumentGuard
// ---------------------------------------------------------------------------

/// A pipeline of checks a source document must pass before it is diffed.
pub struct DocumentGuard {
    checks: Vec<Box<dyn GuardCheck>>,
    fingerprint: String,
}

impl DocumentGuard {
    /// Create a guard with no checks. Every document passes.
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            fingerprint: String::new(),
        }
    }

    /// Build one [`AttributePresenceCheck`] per entry of `map`, in pointer
    /// order.
    pub fn from_map(map: &GuardMap) -> GuardResult<Self> {
        map.validate()?;
        let mut guard = Self::new();
        for (pointer, required) in map.iter() {
            guard.add_check(Box::new(AttributePresenceCheck::new(
                pointer.clone(),
                required.clone(),
            )));
        }
        guard.fingerprint = fingerprint(map)?;
        Ok(guard)
    }

    /// Append a check to the end of the pipeline.
    pub fn add_check(&mut self, check: Box<dyn GuardCheck>) {
        self.checks.push(check);
    }

    /// Number of checks in the pipeline.
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Fingerprint of the configuration this guard was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Evaluate a document through the full pipeline.
    ///
    /// The pipeline is **fail-fast**: the first failing check stops
    /// evaluation and its violation is recorded in the report.
    pub fn evaluate(&self, document: &Value) -> GuardResult<GuardReport> {
        let pipeline_start = Instant::now();
        let mut check_results = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let check_start = Instant::now();
            let decision = check.evaluate(document)?;
            let elapsed = check_start.elapsed();

            debug!(check = check.name(), passed = decision.is_pass(), "guard check evaluated");

            let violation = match decision {
                CheckDecision::Pass => None,
                CheckDecision::Fail(violation) => Some(violation),
            };

            check_results.push(CheckResult {
                check_name: check.name().to_string(),
                passed: violation.is_none(),
                violation: violation.clone(),
                elapsed,
            });

            if let Some(violation) = violation {
                warn!(check = check.name(), %violation, "document rejected by guard");
                return Ok(GuardReport {
                    violation: Some(violation),
                    fingerprint: self.fingerprint.clone(),
                    check_results,
                    elapsed: pipeline_start.elapsed(),
                });
            }
        }

        Ok(GuardReport {
            violation: None,
            fingerprint: self.fingerprint.clone(),
            check_results,
            elapsed: pipeline_start.elapsed(),
        })
    }
}

impl Default for DocumentGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Domain-separated BLAKE3 hash of the serialized guard map.
fn fingerprint(map: &GuardMap) -> GuardResult<String> {
    let data = serde_json::to_vec(map).map_err(|e| GuardError::Serialization(e.to_string()))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(FINGERPRINT_DOMAIN.as_bytes());
    hasher.update(b":");
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize().as_bytes()))
}
