//! Aggregation and verdicts for themecheck.
//!
//! Tallies results per category and overall, computes the pass rate (0-100)
//! and maps it to a verdict.

use serde::{Deserialize, Serialize};

use crate::audit::{AuditOutcome, Category, CategoryResults, Status};

/// Verdict thresholds, inclusive lower bounds on the pass rate.
pub mod thresholds {
    pub const EXCELLENT_MIN: f64 = 80.0;
    pub const GOOD_MIN: f64 = 60.0;
}

/// Qualitative summary bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Excellent,
    Good,
    NeedsWork,
    /// Degenerate run: no results to rate
    NoChecksRan,
}

impl Verdict {
    /// Map a pass rate to a verdict, highest bucket first.
    pub fn from_pass_rate(pass_rate: f64) -> Verdict {
        match pass_rate {
            r if r >= thresholds::EXCELLENT_MIN => Verdict::Excellent,
            r if r >= thresholds::GOOD_MIN => Verdict::Good,
            _ => Verdict::NeedsWork,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Excellent => "EXCELLENT",
            Verdict::Good => "GOOD",
            Verdict::NeedsWork => "NEEDS_WORK",
            Verdict::NoChecksRan => "NO_CHECKS_RAN",
        }
    }

    /// One-line explanation shown next to the verdict.
    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Excellent => "Theme meets high security and quality standards.",
            Verdict::Good => "Theme is functional but has areas for improvement.",
            Verdict::NeedsWork => "Theme requires significant improvements.",
            Verdict::NoChecksRan => "No checks ran, nothing to rate.",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status counts for a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

impl Tally {
    fn add(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Pass => self.passed += 1,
            Status::Warn => self.warned += 1,
            Status::Fail => self.failed += 1,
        }
    }

    /// Percentage of PASS results, `None` when there are no results.
    pub fn pass_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.passed as f64 * 100.0 / self.total as f64)
    }
}

/// Tally for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryTally {
    pub category: Category,
    #[serde(flatten)]
    pub tally: Tally,
}

/// Derived summary of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
    /// Absent when no checks ran
    pub pass_rate: Option<f64>,
    pub verdict: Verdict,
    pub categories: Vec<CategoryTally>,
}

impl Summary {
    /// Whether the run meets a minimum pass rate. A run with no results never does.
    pub fn meets(&self, min_pass_rate: f64) -> bool {
        self.pass_rate.map(|r| r >= min_pass_rate).unwrap_or(false)
    }
}

fn tally_of(results: &CategoryResults) -> Tally {
    let mut tally = Tally::default();
    for o in &results.outcomes {
        tally.add(o.result.status);
    }
    tally
}

/// Aggregate a run's results into a summary.
pub fn aggregate(outcome: &AuditOutcome) -> Summary {
    let mut overall = Tally::default();
    let mut categories = Vec::new();

    for group in Category::ALL.iter().filter_map(|c| outcome.category(*c)) {
        let tally = tally_of(group);
        overall.total += tally.total;
        overall.passed += tally.passed;
        overall.warned += tally.warned;
        overall.failed += tally.failed;
        categories.push(CategoryTally {
            category: group.category,
            tally,
        });
    }

    let pass_rate = overall.pass_rate();
    let verdict = pass_rate
        .map(Verdict::from_pass_rate)
        .unwrap_or(Verdict::NoChecksRan);

    Summary {
        total: overall.total,
        passed: overall.passed,
        warned: overall.warned,
        failed: overall.failed,
        pass_rate,
        verdict,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{CheckOutcome, CheckResult};

    fn outcome_with(statuses: &[(Category, Status)]) -> AuditOutcome {
        let mut outcome = AuditOutcome::new();
        for (i, (category, status)) in statuses.iter().enumerate() {
            outcome.push(CheckOutcome {
                name: format!("check_{}", i),
                category: *category,
                result: CheckResult::new(*status, "test"),
            });
        }
        outcome
    }

    #[test]
    fn test_aggregate_counts() {
        let outcome = outcome_with(&[
            (Category::Security, Status::Pass),
            (Category::Security, Status::Fail),
            (Category::Accessibility, Status::Warn),
            (Category::Functionality, Status::Pass),
        ]);
        let summary = aggregate(&outcome);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.warned, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pass_rate, Some(50.0));
        assert_eq!(summary.verdict, Verdict::NeedsWork);

        assert_eq!(summary.categories.len(), 3);
        assert_eq!(summary.categories[0].category, Category::Security);
        assert_eq!(summary.categories[0].tally.failed, 1);
    }

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(Verdict::from_pass_rate(100.0), Verdict::Excellent);
        assert_eq!(Verdict::from_pass_rate(80.0), Verdict::Excellent);
        assert_eq!(Verdict::from_pass_rate(79.999), Verdict::Good);
        assert_eq!(Verdict::from_pass_rate(60.0), Verdict::Good);
        assert_eq!(Verdict::from_pass_rate(59.999), Verdict::NeedsWork);
        assert_eq!(Verdict::from_pass_rate(0.0), Verdict::NeedsWork);
    }

    #[test]
    fn test_boundaries_through_aggregation() {
        // 4 of 5 = 80%
        let mut statuses = vec![(Category::Security, Status::Pass); 4];
        statuses.push((Category::Security, Status::Warn));
        assert_eq!(aggregate(&outcome_with(&statuses)).verdict, Verdict::Excellent);

        // 3 of 5 = 60%
        statuses[0].1 = Status::Fail;
        let summary = aggregate(&outcome_with(&statuses));
        assert_eq!(summary.pass_rate, Some(60.0));
        assert_eq!(summary.verdict, Verdict::Good);
    }

    #[test]
    fn test_category_tallies_follow_report_order() {
        let outcome = outcome_with(&[
            (Category::Functionality, Status::Pass),
            (Category::Accessibility, Status::Fail),
            (Category::Security, Status::Warn),
        ]);
        let summary = aggregate(&outcome);
        let order: Vec<_> = summary.categories.iter().map(|c| c.category).collect();
        assert_eq!(order, Category::ALL.to_vec());
        assert_eq!(summary.categories[1].tally.failed, 1);
    }

    #[test]
    fn test_no_checks_ran() {
        let summary = aggregate(&AuditOutcome::new());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.pass_rate, None);
        assert_eq!(summary.verdict, Verdict::NoChecksRan);
        assert!(!summary.meets(0.0));
    }

    #[test]
    fn test_meets_threshold() {
        let outcome = outcome_with(&[
            (Category::Security, Status::Pass),
            (Category::Security, Status::Warn),
        ]);
        let summary = aggregate(&outcome);
        assert!(summary.meets(50.0));
        assert!(!summary.meets(50.1));
    }
}
