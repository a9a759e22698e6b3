//! Output formatting for audit results.
//!
//! [`build`] turns a run into the ordered report structure; the writers
//! render it:
//! - Pretty: colored terminal output for human readability
//! - JSON: the structure itself, for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::audit::{self, AuditOutcome, Category, Detail, Details, Status};
use crate::score::{self, Summary, Verdict};

// =============================================================================
// Report structure
// =============================================================================

/// The full externally observable result of an audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub version: String,
    pub theme: String,
    pub sections: Vec<Section>,
    pub summary: Summary,
    pub recommendations: Vec<String>,
}

/// Results of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub category: Category,
    pub title: String,
    pub results: Vec<ReportEntry>,
}

/// One rendered check result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub name: String,
    pub display_name: String,
    pub status: Status,
    pub message: String,
    pub details: Details,
}

/// Build the report for a run: sections in category order, then the
/// summary and recommendations derived from the same results.
pub fn build(theme: &str, outcome: &AuditOutcome) -> AuditReport {
    let sections = Category::ALL
        .iter()
        .filter_map(|category| outcome.category(*category))
        .map(|group| Section {
            category: group.category,
            title: group.category.title().to_string(),
            results: group
                .outcomes
                .iter()
                .map(|o| ReportEntry {
                    name: o.name.clone(),
                    display_name: audit::display_name(&o.name),
                    status: o.result.status,
                    message: o.result.message.clone(),
                    details: o.result.details.clone(),
                })
                .collect(),
        })
        .collect();

    AuditReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        theme: theme.to_string(),
        sections,
        summary: score::aggregate(outcome),
        recommendations: audit::recommend(outcome),
    }
}

/// Serialize a report as pretty JSON.
pub fn to_json(report: &AuditReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the report in JSON format.
pub fn write_json(report: &AuditReport) -> anyhow::Result<()> {
    let json = to_json(report)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", json)?;
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write the report in pretty (human-readable) format.
pub fn write_pretty(report: &AuditReport, show_details: bool) {
    // Header
    println!();
    print!("  ");
    print!("{}", "themecheck".cyan().bold());
    println!(" v{}", report.version);
    println!();
    print!("  {}", "Auditing: ".dimmed());
    println!("{}", report.theme);
    println!();

    for section in &report.sections {
        write_section(section, show_details);
        println!();
    }

    write_summary(&report.summary);
    println!();

    write_recommendations(&report.recommendations);
    println!();
}

fn write_section(section: &Section, show_details: bool) {
    println!("  {} ({}):", section.title.bold(), section.results.len());
    println!();

    for entry in &section.results {
        write_status_tag(entry.status);
        println!("  {}", entry.display_name);
        println!("            {}", entry.message);
        if show_details && !entry.details.is_empty() {
            for (key, value) in &entry.details {
                println!("              {}", format!("{}: {}", key, format_detail(value)).dimmed());
            }
        }
    }
}

fn write_status_tag(status: Status) {
    match status {
        Status::Pass => print!("    {}", "PASS".green()),
        Status::Warn => print!("    {}", "WARN".yellow()),
        Status::Fail => print!("    {}", "FAIL".red()),
    }
}

/// Render a detail value on one line.
pub fn format_detail(value: &Detail) -> String {
    match value {
        Detail::Count(n) => n.to_string(),
        Detail::Flag(b) => b.to_string(),
        Detail::List(items) if items.is_empty() => "(none)".to_string(),
        Detail::List(items) => items.join(", "),
    }
}

/// Pass rate rounded to one decimal, or "n/a" when no checks ran.
pub fn format_pass_rate(pass_rate: Option<f64>) -> String {
    match pass_rate {
        Some(rate) => format!("{:.1}%", rate),
        None => "n/a".to_string(),
    }
}

fn write_summary(summary: &Summary) {
    println!("  {}", "Summary:".bold());
    println!("    {:<12} {}", "Total", summary.total);
    println!("    {:<12} {}", "Passed", summary.passed.to_string().green());
    println!("    {:<12} {}", "Warnings", summary.warned.to_string().yellow());
    println!("    {:<12} {}", "Failed", summary.failed.to_string().red());
    println!("    {:<12} {}", "Pass Rate", format_pass_rate(summary.pass_rate));
    println!();

    print!("  Overall Status: ");
    write_colored_verdict(summary.verdict);
    println!("  {}", summary.verdict.description().dimmed());
}

fn write_colored_verdict(verdict: Verdict) {
    let label = verdict.as_str();
    match verdict {
        Verdict::Excellent => print!("{}", label.green().bold()),
        Verdict::Good => print!("{}", label.yellow()),
        Verdict::NeedsWork => print!("{}", label.red().bold()),
        Verdict::NoChecksRan => print!("{}", label.dimmed()),
    }
}

fn write_recommendations(lines: &[String]) {
    println!("  {}", "Recommendations:".bold());
    for line in lines {
        println!("    - {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{CheckOutcome, CheckResult};

    fn sample() -> AuditOutcome {
        let mut outcome = AuditOutcome::new();
        outcome.push(CheckOutcome {
            name: "check_skip_links".to_string(),
            category: Category::Accessibility,
            result: CheckResult::warn("Skip links missing or incomplete").with("skip_link", false),
        });
        outcome.push(CheckOutcome {
            name: "check_nonce_verification".to_string(),
            category: Category::Security,
            result: CheckResult::pass("ok").with("wp_verify_nonce", 2usize),
        });
        outcome
    }

    #[test]
    fn test_sections_follow_category_order() {
        let report = build("theme", &sample());
        let categories: Vec<_> = report.sections.iter().map(|s| s.category).collect();
        assert_eq!(categories, vec![Category::Security, Category::Accessibility]);
        assert_eq!(report.sections[0].results[0].display_name, "Nonce Verification");
        assert_eq!(report.sections[1].title, "Accessibility");
    }

    #[test]
    fn test_report_carries_summary_and_recommendations() {
        let report = build("theme", &sample());
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.pass_rate, Some(50.0));
        assert_eq!(report.recommendations[0], audit::ACCESSIBILITY_ADVICE);
        assert_eq!(report.recommendations.len(), 5);
    }

    #[test]
    fn test_json_is_stable() {
        let a = to_json(&build("theme", &sample())).unwrap();
        let b = to_json(&build("theme", &sample())).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("\"display_name\": \"Skip Links\""));
        assert!(a.contains("\"verdict\": \"NEEDS_WORK\""));
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_detail(&Detail::Count(3)), "3");
        assert_eq!(format_detail(&Detail::Flag(true)), "true");
        assert_eq!(format_detail(&Detail::List(vec![])), "(none)");
        assert_eq!(
            format_detail(&Detail::List(vec!["a".into(), "b".into()])),
            "a, b"
        );
        assert_eq!(format_pass_rate(Some(78.2608)), "78.3%");
        assert_eq!(format_pass_rate(None), "n/a");
    }
}
