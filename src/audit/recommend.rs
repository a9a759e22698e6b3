//! Remediation advice derived from category state.
//!
//! Security and accessibility each get one fixed line when any of their
//! results is not PASS. The general launch-readiness lines are always
//! emitted, whatever the score.

use super::types::{AuditOutcome, Category};

pub const SECURITY_ADVICE: &str =
    "Security: Address security warnings to ensure user data protection.";
pub const ACCESSIBILITY_ADVICE: &str =
    "Accessibility: Improve accessibility features to meet WCAG 2.1 standards.";

/// Lines present in every report.
pub const UNCONDITIONAL_ADVICE: [&str; 4] = [
    "Performance: Consider implementing caching and image optimization.",
    "Testing: Test the theme across different devices and browsers.",
    "Content: Add real content and images before launch.",
    "Backup: Set up automated backups before going live.",
];

/// Build the ordered recommendation lines for a run.
pub fn recommend(outcome: &AuditOutcome) -> Vec<String> {
    let mut lines = Vec::new();

    for (category, advice) in [
        (Category::Security, SECURITY_ADVICE),
        (Category::Accessibility, ACCESSIBILITY_ADVICE),
    ] {
        let triggered = outcome
            .category(category)
            .map(|c| c.has_issues())
            .unwrap_or(false);
        if triggered {
            lines.push(advice.to_string());
        }
    }

    lines.extend(UNCONDITIONAL_ADVICE.iter().map(|s| s.to_string()));
    lines
}
