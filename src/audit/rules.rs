//! The three rule shapes checks are built from.
//!
//! - Threshold-count: sum named counts, PASS when the sum reaches a threshold.
//! - Conjunctive-boolean: PASS only when every required sub-test holds.
//! - Coverage-ratio: PASS when more than a fraction of a reference set is found.
//!
//! Hazards (dangerous patterns) are applied on top of any shape and force FAIL.

use super::types::{CheckResult, Status};

/// Minimum coverage ratio, exclusive, for a coverage rule to pass.
pub const COVERAGE_PASS_RATIO: f64 = 0.7;

/// Messages for the two outcomes of a rule.
#[derive(Debug, Clone, Copy)]
pub struct Verdicts<'a> {
    pub pass: &'a str,
    pub warn: &'a str,
}

/// PASS iff the summed counts reach `threshold`.
///
/// Each count is recorded under its own key, the sum under `total_key`.
pub fn threshold_count(
    counts: &[(&str, usize)],
    threshold: usize,
    total_key: &str,
    msgs: Verdicts<'_>,
) -> CheckResult {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let status = if total >= threshold {
        Status::Pass
    } else {
        Status::Warn
    };
    let message = if status == Status::Pass {
        msgs.pass
    } else {
        msgs.warn
    };

    let mut result = CheckResult::new(status, message)
        .with(total_key, total)
        .with("threshold", threshold);
    for (key, n) in counts {
        result = result.with(*key, *n);
    }
    result
}

/// PASS iff every required sub-test is true. Informational sub-tests are
/// recorded but never gate the outcome.
pub fn conjunctive(
    required: &[(&str, bool)],
    informational: &[(&str, bool)],
    msgs: Verdicts<'_>,
) -> CheckResult {
    conjunctive_with(required, informational, msgs, Status::Warn)
}

/// Like [`conjunctive`] but with an explicit status for the failing case.
pub fn conjunctive_with(
    required: &[(&str, bool)],
    informational: &[(&str, bool)],
    msgs: Verdicts<'_>,
    otherwise: Status,
) -> CheckResult {
    let all = required.iter().all(|(_, ok)| *ok);
    let mut result = if all {
        CheckResult::pass(msgs.pass)
    } else {
        CheckResult::new(otherwise, msgs.warn)
    };
    for (key, ok) in required.iter().chain(informational) {
        result = result.with(*key, *ok);
    }
    result
}

/// PASS iff more than [`COVERAGE_PASS_RATIO`] of `expected` was found.
pub fn coverage_ratio(expected: &[&str], found: &[&str], msgs: Verdicts<'_>) -> CheckResult {
    let found: Vec<String> = expected
        .iter()
        .filter(|e| found.contains(*e))
        .map(|e| e.to_string())
        .collect();
    let ratio = if expected.is_empty() {
        1.0
    } else {
        found.len() as f64 / expected.len() as f64
    };

    let mut result = if ratio > COVERAGE_PASS_RATIO {
        CheckResult::pass(msgs.pass)
    } else {
        CheckResult::warn(msgs.warn)
    };
    result = result
        .with("found_count", found.len())
        .with("expected_count", expected.len())
        .with("coverage_percent", (ratio * 100.0).round() as usize)
        .with("found_elements", found);
    result
}

/// Force FAIL when any hazard was spotted, keeping the counts gathered so far.
pub fn with_hazards(
    result: CheckResult,
    key: &str,
    hazards: Vec<String>,
    message: &str,
) -> CheckResult {
    let failed = !hazards.is_empty();
    let mut result = result.with(key, hazards);
    if failed {
        result.status = Status::Fail;
        result.message = message.to_string();
    }
    result
}
