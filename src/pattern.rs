//! Occurrence-counting primitives used by the checks.
//!
//! Absent text counts as zero occurrences and never matches. Deciding what
//! absence means is left to the checks.

use regex::Regex;

use crate::corpus::TemplateFile;

/// Count non-overlapping occurrences of a literal.
pub fn count_substring(text: Option<&str>, literal: &str) -> usize {
    match text {
        Some(t) if !literal.is_empty() => t.matches(literal).count(),
        _ => 0,
    }
}

/// Whether a literal occurs at least once.
pub fn contains(text: Option<&str>, literal: &str) -> bool {
    count_substring(text, literal) > 0
}

/// Whether the regex matches anywhere in the text.
pub fn matches(text: Option<&str>, regex: &Regex) -> bool {
    text.map(|t| regex.is_match(t)).unwrap_or(false)
}

/// Count non-overlapping regex matches.
pub fn count_matches(text: Option<&str>, regex: &Regex) -> usize {
    text.map(|t| regex.find_iter(t).count()).unwrap_or(0)
}

/// Names of the template files in which the regex matches.
pub fn any_file_matches(files: Option<&[TemplateFile]>, regex: &Regex) -> Vec<String> {
    files
        .unwrap_or_default()
        .iter()
        .filter(|f| regex.is_match(&f.text))
        .map(|f| f.name.clone())
        .collect()
}

/// Sum a literal's occurrences across all template files.
pub fn count_substring_all(files: Option<&[TemplateFile]>, literal: &str) -> usize {
    files
        .unwrap_or_default()
        .iter()
        .map(|f| count_substring(Some(&f.text), literal))
        .sum()
}

/// Whether a literal occurs in any template file.
pub fn contains_any(files: Option<&[TemplateFile]>, literal: &str) -> bool {
    files
        .unwrap_or_default()
        .iter()
        .any(|f| f.text.contains(literal))
}
