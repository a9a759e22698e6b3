//! Core types for audit results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Security,
    Accessibility,
    Functionality,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Security,
        Category::Accessibility,
        Category::Functionality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Accessibility => "accessibility",
            Category::Functionality => "functionality",
        }
    }

    /// Heading used in rendered reports.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Security => "Security",
            Category::Accessibility => "Accessibility",
            Category::Functionality => "Functionality",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detail value: a raw count, a flag, or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Detail {
    Count(u64),
    Flag(bool),
    List(Vec<String>),
}

impl From<usize> for Detail {
    fn from(n: usize) -> Self {
        Detail::Count(n as u64)
    }
}

impl From<bool> for Detail {
    fn from(b: bool) -> Self {
        Detail::Flag(b)
    }
}

impl From<Vec<String>> for Detail {
    fn from(v: Vec<String>) -> Self {
        Detail::List(v)
    }
}

/// Details keyed by name. Ordered so serialization is stable.
pub type Details = BTreeMap<String, Detail>;

/// Result of evaluating one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: Status,
    pub message: String,
    #[serde(default)]
    pub details: Details,
}

impl CheckResult {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Details::new(),
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(Status::Pass, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Status::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Status::Fail, message)
    }

    /// Add a detail entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Detail>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn is_pass(&self) -> bool {
        self.status == Status::Pass
    }
}

/// A check's result, tagged with the check that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub category: Category,
    pub result: CheckResult,
}

/// Ordered results of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResults {
    pub category: Category,
    pub outcomes: Vec<CheckOutcome>,
}

impl CategoryResults {
    /// Whether any result in the category is not PASS.
    pub fn has_issues(&self) -> bool {
        self.outcomes.iter().any(|o| !o.result.is_pass())
    }

    pub fn count(&self, status: Status) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result.status == status)
            .count()
    }
}

/// Everything a run produced, grouped by category in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub categories: Vec<CategoryResults>,
}

impl AuditOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome to its category. Categories are kept in
    /// [`Category::ALL`] order whatever order outcomes arrive in.
    pub fn push(&mut self, outcome: CheckOutcome) {
        match self
            .categories
            .binary_search_by_key(&outcome.category, |c| c.category)
        {
            Ok(i) => self.categories[i].outcomes.push(outcome),
            Err(i) => self.categories.insert(
                i,
                CategoryResults {
                    category: outcome.category,
                    outcomes: vec![outcome],
                },
            ),
        }
    }

    /// Results of one category, if any check of it ran.
    pub fn category(&self, category: Category) -> Option<&CategoryResults> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// All outcomes in report order.
    pub fn outcomes(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.categories.iter().flat_map(|c| c.outcomes.iter())
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.outcomes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, category: Category, status: Status) -> CheckOutcome {
        CheckOutcome {
            name: name.to_string(),
            category,
            result: CheckResult::new(status, "test"),
        }
    }

    #[test]
    fn test_status_names() {
        assert_eq!(Status::Fail.to_string(), "FAIL");
        assert_eq!(serde_json::to_string(&Status::Warn).unwrap(), r#""WARN""#);
    }

    #[test]
    fn test_detail_serialization() {
        let result = CheckResult::pass("ok")
            .with("count", 3usize)
            .with("flag", true)
            .with("files", vec!["a.php".to_string()]);
        let json = serde_json::to_string(&result).unwrap();
        let expected = concat!(
            r#"{"status":"PASS","message":"ok","#,
            r#""details":{"count":3,"files":["a.php"],"flag":true}}"#
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn test_outcome_grouping_keeps_insertion_order() {
        let mut run = AuditOutcome::new();
        run.push(outcome("check_a", Category::Security, Status::Pass));
        run.push(outcome("check_b", Category::Accessibility, Status::Warn));
        run.push(outcome("check_c", Category::Security, Status::Fail));

        assert_eq!(run.len(), 3);
        let security = run.category(Category::Security).unwrap();
        let names: Vec<_> = security.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["check_a", "check_c"]);
        assert!(security.has_issues());
        assert_eq!(security.count(Status::Fail), 1);
        assert!(run.category(Category::Functionality).is_none());
    }

    #[test]
    fn test_categories_follow_report_order() {
        let mut run = AuditOutcome::new();
        run.push(outcome("check_a", Category::Functionality, Status::Pass));
        run.push(outcome("check_b", Category::Security, Status::Pass));
        run.push(outcome("check_c", Category::Accessibility, Status::Pass));
        run.push(outcome("check_d", Category::Security, Status::Warn));

        let order: Vec<_> = run.categories.iter().map(|c| c.category).collect();
        assert_eq!(order, Category::ALL.to_vec());

        let names: Vec<_> = run.outcomes().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["check_b", "check_d", "check_c", "check_a"]);
    }
}
