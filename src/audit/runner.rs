//! Audit runner that executes every registered check against a corpus.

use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

use crate::corpus::{Absence, Corpus, Role};
use crate::layout::Layout;

use super::registry::{self, Check, CheckContext};
use super::types::{AuditOutcome, CheckOutcome, CheckResult, Status};

/// Executes checks against a corpus snapshot.
pub struct Runner<'a> {
    layout: &'a Layout,
    parallel: bool,
}

impl<'a> Runner<'a> {
    /// Create a new runner. Checks run in parallel by default.
    pub fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            parallel: true,
        }
    }

    /// Set whether checks are evaluated one after another.
    pub fn sequential(mut self, sequential: bool) -> Self {
        self.parallel = !sequential;
        self
    }

    /// Run every registered check.
    pub fn run(&self, corpus: &Corpus) -> AuditOutcome {
        self.run_checks(corpus, registry::checks())
    }

    /// Run the given checks. Results keep the order of `checks` whatever
    /// the evaluation order was.
    pub fn run_checks(&self, corpus: &Corpus, checks: &[Check]) -> AuditOutcome {
        let ctx = CheckContext {
            corpus,
            layout: self.layout,
        };

        let outcomes: Vec<CheckOutcome> = if self.parallel {
            checks.par_iter().map(|c| evaluate(c, &ctx)).collect()
        } else {
            checks.iter().map(|c| evaluate(c, &ctx)).collect()
        };

        let mut result = AuditOutcome::new();
        for outcome in outcomes {
            result.push(outcome);
        }

        info!(checks = result.len(), parallel = self.parallel, "audit complete");
        result
    }
}

/// Evaluate one check, isolating absent artifacts and faults.
///
/// A panicking rule still goes through the process panic hook, so the
/// default hook prints the panic to stderr before the FAIL is recorded.
pub fn evaluate(check: &Check, ctx: &CheckContext<'_>) -> CheckOutcome {
    let missing: Vec<Role> = check
        .roles
        .iter()
        .copied()
        .filter(|r| !ctx.corpus.is_present(*r))
        .collect();

    let result = if missing.is_empty() {
        match panic::catch_unwind(AssertUnwindSafe(|| (check.rule)(ctx))) {
            Ok(Ok(result)) if check.roles.contains(&Role::AllTemplates) => {
                partial(check, result, ctx.corpus.skipped_templates())
            }
            Ok(Ok(result)) => result,
            Ok(Err(e)) => fault(check, format!("{:#}", e)),
            Err(payload) => fault(check, panic_message(payload.as_ref())),
        }
    } else {
        degraded(check, &missing, ctx.corpus)
    };

    debug!(check = check.name, status = %result.status, "check evaluated");
    CheckOutcome {
        name: check.name.to_string(),
        category: check.category,
        result,
    }
}

/// WARN result for a check whose inputs are not available.
fn degraded(check: &Check, missing: &[Role], corpus: &Corpus) -> CheckResult {
    let roles: Vec<String> = missing.iter().map(|r| r.to_string()).collect();
    let reasons: Vec<String> = missing
        .iter()
        .filter_map(|r| corpus.absence(*r))
        .map(|a| a.to_string())
        .collect();

    debug!(check = check.name, roles = ?roles, "required artifact unavailable");
    CheckResult::warn(format!(
        "Could not evaluate: required artifact unavailable ({})",
        roles.join(", ")
    ))
    .with("missing_roles", roles)
    .with("absence", reasons)
}

/// Mark a template-based result as computed over an incomplete template
/// set. PASS becomes WARN; WARN and FAIL are kept.
fn partial(check: &Check, result: CheckResult, skipped: &[Absence]) -> CheckResult {
    if skipped.is_empty() {
        return result;
    }

    let reasons: Vec<String> = skipped.iter().map(|a| a.to_string()).collect();
    let mut result = result.with("skipped_templates", reasons);
    if result.status == Status::Pass {
        debug!(check = check.name, skipped = skipped.len(), "pass downgraded");
        result.status = Status::Warn;
        result.message = format!(
            "{} ({} template file(s) could not be read)",
            result.message,
            skipped.len()
        );
    }
    result
}

/// FAIL result for a check whose rule errored or panicked.
fn fault(check: &Check, reason: String) -> CheckResult {
    warn!(check = check.name, %reason, "check evaluation failed");
    CheckResult::fail("Check raised an error during evaluation").with("error", vec![reason])
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::{Category, Detail};

    fn always_pass(_: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
        Ok(CheckResult::pass("fine"))
    }

    fn always_errors(_: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
        anyhow::bail!("pattern table corrupt")
    }

    fn always_panics(_: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
        panic!("index out of range")
    }

    const CUSTOM: &[Check] = &[
        Check {
            name: "check_first",
            category: Category::Security,
            roles: &[Role::StyleSheet],
            rule: always_pass,
        },
        Check {
            name: "check_errors",
            category: Category::Security,
            roles: &[Role::StyleSheet],
            rule: always_errors,
        },
        Check {
            name: "check_panics",
            category: Category::Functionality,
            roles: &[Role::StyleSheet],
            rule: always_panics,
        },
        Check {
            name: "check_needs_script",
            category: Category::Accessibility,
            roles: &[Role::PrimaryScript],
            rule: always_pass,
        },
    ];

    fn over_templates(_: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
        Ok(CheckResult::pass("templates fine"))
    }

    fn hazard_in_templates(_: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
        Ok(CheckResult::fail("hazard found"))
    }

    const TEMPLATE_CHECKS: &[Check] = &[
        Check {
            name: "check_over_templates",
            category: Category::Security,
            roles: &[Role::AllTemplates],
            rule: over_templates,
        },
        Check {
            name: "check_hazard_in_templates",
            category: Category::Security,
            roles: &[Role::AllTemplates],
            rule: hazard_in_templates,
        },
        Check {
            name: "check_style_only",
            category: Category::Accessibility,
            roles: &[Role::StyleSheet],
            rule: always_pass,
        },
    ];

    fn corpus() -> Corpus {
        Corpus::builder().style_sheet("body {}").build()
    }

    #[test]
    fn test_fault_isolation() {
        let layout = Layout::default();
        let outcome = Runner::new(&layout).run_checks(&corpus(), CUSTOM);

        assert_eq!(outcome.len(), CUSTOM.len());

        let all: Vec<_> = outcome.outcomes().collect();
        assert_eq!(all[0].result.status, Status::Pass);

        assert_eq!(all[1].name, "check_errors");
        assert_eq!(all[1].result.status, Status::Fail);
        assert_eq!(
            all[1].result.details.get("error"),
            Some(&Detail::List(vec!["pattern table corrupt".to_string()]))
        );

        // grouped in category order: security, accessibility, functionality
        assert_eq!(all[2].name, "check_needs_script");
        assert_eq!(all[3].name, "check_panics");
        assert_eq!(all[3].result.status, Status::Fail);
        assert!(matches!(
            all[3].result.details.get("error"),
            Some(Detail::List(v)) if v[0].contains("index out of range")
        ));
    }

    #[test]
    fn test_absent_role_degrades_to_warn() {
        let layout = Layout::default();
        let outcome = Runner::new(&layout).run_checks(&corpus(), CUSTOM);
        let needs_script = outcome
            .outcomes()
            .find(|o| o.name == "check_needs_script")
            .unwrap();

        assert_eq!(needs_script.result.status, Status::Warn);
        assert_eq!(
            needs_script.result.details.get("missing_roles"),
            Some(&Detail::List(vec!["primary_script".to_string()]))
        );
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let layout = Layout::default();
        let corpus = corpus();
        let parallel = Runner::new(&layout).run(&corpus);
        let sequential = Runner::new(&layout).sequential(true).run(&corpus);

        assert_eq!(parallel, sequential);
        assert_eq!(parallel.len(), registry::checks().len());
    }

    #[test]
    fn test_registry_order_preserved() {
        let layout = Layout::default();
        let outcome = Runner::new(&layout).run(&corpus());
        let names: Vec<_> = outcome.outcomes().map(|o| o.name.as_str()).collect();
        let expected: Vec<_> = registry::checks().iter().map(|c| c.name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_skipped_templates_downgrade_template_passes() {
        let layout = Layout::default();
        let corpus = Corpus::builder()
            .style_sheet("body {}")
            .template("index.php", "<main></main>")
            .skipped_template(Absence::NotText("legacy.php".to_string()))
            .build();
        let outcome = Runner::new(&layout).run_checks(&corpus, TEMPLATE_CHECKS);
        let all: Vec<_> = outcome.outcomes().collect();
        let skipped = Detail::List(vec!["legacy.php is not valid UTF-8 text".to_string()]);

        assert_eq!(all[0].result.status, Status::Warn);
        assert!(all[0].result.message.contains("1 template file(s) could not be read"));
        assert_eq!(all[0].result.details.get("skipped_templates"), Some(&skipped));

        // a FAIL stays a FAIL
        assert_eq!(all[1].result.status, Status::Fail);
        assert_eq!(all[1].result.details.get("skipped_templates"), Some(&skipped));

        assert_eq!(all[2].result.status, Status::Pass);
        assert!(all[2].result.details.get("skipped_templates").is_none());
    }

    #[test]
    fn test_complete_templates_are_not_annotated() {
        let layout = Layout::default();
        let corpus = Corpus::builder()
            .style_sheet("body {}")
            .template("index.php", "<main></main>")
            .build();
        let outcome = Runner::new(&layout).run_checks(&corpus, TEMPLATE_CHECKS);
        let first = outcome.outcomes().next().unwrap();

        assert_eq!(first.result.status, Status::Pass);
        assert!(first.result.details.get("skipped_templates").is_none());
    }
}
