//! The compliance audit: registry, rule evaluation and recommendations.

pub mod checks;
mod recommend;
mod registry;
mod rules;
mod runner;
mod types;

pub use recommend::{recommend, ACCESSIBILITY_ADVICE, SECURITY_ADVICE, UNCONDITIONAL_ADVICE};
pub use registry::{
    checks, checks_in, display_name, find, Check, CheckContext, RuleFn, CHECK_PREFIX,
};
pub use rules::{
    conjunctive, conjunctive_with, coverage_ratio, threshold_count, with_hazards, Verdicts,
    COVERAGE_PASS_RATIO,
};
pub use runner::{evaluate, Runner};
pub use types::{
    AuditOutcome, Category, CategoryResults, CheckOutcome, CheckResult, Detail, Details, Status,
};
