//! Functionality checks: forms, AJAX wiring, layout, content types,
//! navigation, customizer and SEO metadata.

use crate::audit::registry::CheckContext;
use crate::audit::rules::{self, Verdicts};
use crate::audit::types::CheckResult;
use crate::corpus::Role;
use crate::pattern::{contains, count_substring};

const AJAX_THRESHOLD: usize = 5;
const CUSTOMIZER_THRESHOLD: usize = 5;
const CUSTOMIZER_CALLS: &[&str] = &[
    "customize_register",
    "add_setting",
    "add_control",
    "add_section",
];
/// More than this many `@media` blocks counts as responsive.
const MIN_MEDIA_QUERIES: usize = 2;
/// More than this many `<meta` tags counts as SEO metadata.
const MIN_META_TAGS: usize = 5;

pub fn form_validation(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let script = ctx.corpus.text(Role::PrimaryScript);
    Ok(rules::conjunctive(
        &[
            ("has_validation", contains(script, "validateField")),
            ("email_validation", contains(script, "emailRegex")),
        ],
        &[("client_validation", contains(script, "is-invalid"))],
        Verdicts {
            pass: "Form validation implemented",
            warn: "Form validation incomplete",
        },
    ))
}

pub fn ajax_handlers(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let server = ctx.corpus.text(Role::ServerLogic);
    let actions: Vec<String> = ctx
        .layout
        .ajax_actions
        .iter()
        .map(|a| ctx.layout.prefixed(a))
        .collect();

    let mut counts: Vec<(&str, usize)> = actions
        .iter()
        .map(|a| (a.as_str(), count_substring(server, a)))
        .collect();
    counts.push(("wp_ajax_", count_substring(server, "wp_ajax_")));
    counts.push(("wp_ajax_nopriv_", count_substring(server, "wp_ajax_nopriv_")));

    Ok(rules::threshold_count(
        &counts,
        AJAX_THRESHOLD,
        "total_references",
        Verdicts {
            pass: "AJAX handlers properly registered",
            warn: "AJAX handlers incomplete",
        },
    ))
}

pub fn responsive_design(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let style = ctx.corpus.text(Role::StyleSheet);
    let media = count_substring(style, "@media");

    let result = rules::conjunctive(
        &[
            ("media_queries", media > MIN_MEDIA_QUERIES),
            ("mobile_breakpoints", contains(style, "768px")),
        ],
        &[("flexible_grid", contains(style, "grid-template-columns"))],
        Verdicts {
            pass: "Responsive design implemented",
            warn: "Responsive design needs improvement",
        },
    );
    Ok(result.with("media_query_count", media))
}

/// Every configured post type must be referenced at least once.
pub fn custom_post_types(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let server = ctx.corpus.text(Role::ServerLogic);
    let mut registered = Vec::new();
    let mut missing = Vec::new();
    for suffix in &ctx.layout.post_types {
        let name = ctx.layout.prefixed(suffix);
        if contains(server, &name) {
            registered.push(name);
        } else {
            missing.push(name);
        }
    }

    let result = if missing.is_empty() {
        CheckResult::pass("Custom post types properly registered")
    } else {
        CheckResult::warn("Some custom post types missing")
    };
    Ok(result
        .with("registered_count", registered.len())
        .with("expected_count", ctx.layout.post_types.len())
        .with("registered", registered)
        .with("missing", missing))
}

pub fn navigation_menus(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let server = ctx.corpus.text(Role::ServerLogic);
    let shell = ctx.corpus.text(Role::ShellTemplate);
    Ok(rules::conjunctive(
        &[
            ("nav_support", contains(server, "register_nav_menus")),
            ("nav_menu", contains(shell, "wp_nav_menu")),
        ],
        &[("walker_class", contains(server, "Walker_Nav_Menu"))],
        Verdicts {
            pass: "Navigation menus properly implemented",
            warn: "Navigation implementation incomplete",
        },
    ))
}

pub fn theme_customizer(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let server = ctx.corpus.text(Role::ServerLogic);
    let counts: Vec<(&str, usize)> = CUSTOMIZER_CALLS
        .iter()
        .map(|f| (*f, count_substring(server, f)))
        .collect();

    Ok(rules::threshold_count(
        &counts,
        CUSTOMIZER_THRESHOLD,
        "total_references",
        Verdicts {
            pass: "Theme customizer properly implemented",
            warn: "Theme customizer incomplete",
        },
    ))
}

/// Server logic is optional here: the helper function is informational.
pub fn seo_features(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let shell = ctx.corpus.text(Role::ShellTemplate);
    let server = ctx.corpus.text(Role::ServerLogic);
    let meta = count_substring(shell, "<meta");

    let result = rules::conjunctive(
        &[
            ("meta_tags", meta > MIN_META_TAGS),
            ("og_tags", contains(shell, "og:title")),
            ("structured_data", contains(shell, "application/ld+json")),
        ],
        &[("seo_function", contains(server, "add_structured_data"))],
        Verdicts {
            pass: "SEO features properly implemented",
            warn: "SEO implementation incomplete",
        },
    );
    Ok(result.with("meta_tag_count", meta))
}
