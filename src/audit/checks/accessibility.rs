//! Accessibility checks over templates, the style sheet and the script.

use lazy_static::lazy_static;
use regex::Regex;

use crate::audit::registry::CheckContext;
use crate::audit::rules::{self, Verdicts};
use crate::audit::types::CheckResult;
use crate::corpus::Role;
use crate::pattern::{contains, contains_any, count_substring_all, matches};

lazy_static! {
    /// Escape key handled either by key code or by key name
    static ref ESCAPE_KEY: Regex =
        Regex::new(r#"keyCode\s*===?\s*27|key\s*===?\s*['"](Escape|Esc)['"]"#).unwrap();
}

/// Landmark elements a well-structured theme uses.
const SEMANTIC_ELEMENTS: &[&str] = &[
    "header", "nav", "main", "section", "article", "aside", "footer",
];

const ARIA_ATTRIBUTES: &[&str] = &[
    "aria-label",
    "aria-labelledby",
    "aria-describedby",
    "aria-expanded",
    "aria-hidden",
    "aria-live",
];

const SCREEN_READER_CLASSES: &[&str] = &["screen-reader-text", "visually-hidden", "sr-only"];

const ARIA_THRESHOLD: usize = 10;
const SCREEN_READER_THRESHOLD: usize = 5;

pub fn semantic_html(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let templates = ctx.corpus.templates();
    let found: Vec<&str> = SEMANTIC_ELEMENTS
        .iter()
        .copied()
        .filter(|el| contains_any(templates, &format!("<{}", el)))
        .collect();

    Ok(rules::coverage_ratio(
        SEMANTIC_ELEMENTS,
        &found,
        Verdicts {
            pass: "Good semantic HTML structure",
            warn: "Could improve semantic HTML usage",
        },
    ))
}

pub fn aria_labels(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let templates = ctx.corpus.templates();
    let counts: Vec<(&str, usize)> = ARIA_ATTRIBUTES
        .iter()
        .map(|a| (*a, count_substring_all(templates, a)))
        .collect();

    let result = rules::threshold_count(
        &counts,
        ARIA_THRESHOLD,
        "aria_count",
        Verdicts {
            pass: "Good ARIA attribute usage",
            warn: "Could improve ARIA attributes",
        },
    );
    Ok(result.with("has_roles", contains_any(templates, "role=")))
}

pub fn keyboard_navigation(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let script = ctx.corpus.text(Role::PrimaryScript);
    Ok(rules::conjunctive(
        &[
            ("keyboard_events", contains(script, "keydown")),
            ("escape_handling", matches(script, &ESCAPE_KEY)),
        ],
        &[("focus_management", contains(script, "focus()"))],
        Verdicts {
            pass: "Keyboard navigation implemented",
            warn: "Keyboard navigation needs improvement",
        },
    ))
}

pub fn screen_reader_text(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let templates = ctx.corpus.templates();
    let counts: Vec<(&str, usize)> = SCREEN_READER_CLASSES
        .iter()
        .map(|c| (*c, count_substring_all(templates, c)))
        .collect();

    Ok(rules::threshold_count(
        &counts,
        SCREEN_READER_THRESHOLD,
        "screen_reader_count",
        Verdicts {
            pass: "Good screen reader support",
            warn: "Could improve screen reader text",
        },
    ))
}

pub fn color_contrast(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let style = ctx.corpus.text(Role::StyleSheet);
    Ok(rules::conjunctive(
        &[
            ("contrast_media_query", contains(style, "prefers-contrast")),
            ("color_variables", contains(style, "--primary-color")),
        ],
        &[],
        Verdicts {
            pass: "Color contrast support implemented",
            warn: "Could improve color contrast support",
        },
    ))
}

pub fn focus_management(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let style = ctx.corpus.text(Role::StyleSheet);
    Ok(rules::conjunctive(
        &[
            ("focus_styles", contains(style, ":focus")),
            ("outline_styles", contains(style, "outline")),
        ],
        &[],
        Verdicts {
            pass: "Focus management implemented",
            warn: "Focus styles need improvement",
        },
    ))
}

pub fn skip_links(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let shell = ctx.corpus.text(Role::ShellTemplate);
    Ok(rules::conjunctive(
        &[
            ("skip_link", contains(shell, "skip-link")),
            ("skip_functionality", contains(shell, "Skip to content")),
        ],
        &[],
        Verdicts {
            pass: "Skip links implemented",
            warn: "Skip links missing or incomplete",
        },
    ))
}
