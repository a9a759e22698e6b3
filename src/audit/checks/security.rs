//! Security checks: request verification, sanitization, escaping and
//! injection hazards.

use lazy_static::lazy_static;
use regex::Regex;

use crate::audit::registry::CheckContext;
use crate::audit::rules::{self, Verdicts};
use crate::audit::types::{CheckResult, Status};
use crate::corpus::Role;
use crate::pattern::{any_file_matches, contains, count_substring, count_substring_all, matches};

lazy_static! {
    /// `echo $var` with no escaping call in between
    static ref DIRECT_ECHO: Regex = Regex::new(r"echo\s+\$[a-zA-Z_]").unwrap();
    /// Request superglobal echoed straight out
    static ref SUPERGLOBAL_ECHO: Regex =
        Regex::new(r"echo\s+\$_(GET|POST|REQUEST|COOKIE)").unwrap();
    static ref INNER_HTML: Regex = Regex::new(r"innerHTML\s*=").unwrap();
    /// Query string literal interpolating a variable
    static ref RAW_QUERY: Regex =
        Regex::new(r#"\$wpdb->query\s*\(\s*["'][^"']*\$"#).unwrap();
    static ref RAW_GET_VAR: Regex =
        Regex::new(r#"\$wpdb->get_var\s*\(\s*["'][^"']*\$"#).unwrap();
}

/// Minimum number of sanitizer calls in the server logic.
const SANITIZATION_THRESHOLD: usize = 5;
/// Minimum number of escaping calls across templates.
const ESCAPING_THRESHOLD: usize = 11;
/// Minimum number of safe output calls across templates.
const SAFE_OUTPUT_THRESHOLD: usize = 6;

pub fn nonce_verification(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let server = ctx.corpus.text(Role::ServerLogic);
    let verify = count_substring(server, "wp_verify_nonce");
    let create = count_substring(server, "wp_create_nonce");
    let referer = count_substring(server, "check_ajax_referer");

    let result = rules::conjunctive_with(
        &[("has_verification", verify > 0), ("has_creation", create > 0)],
        &[],
        Verdicts {
            pass: "Nonce verification properly implemented",
            warn: "Missing nonce verification in some handlers",
        },
        Status::Fail,
    );
    Ok(result
        .with("wp_verify_nonce", verify)
        .with("wp_create_nonce", create)
        .with("check_ajax_referer", referer))
}

pub fn input_sanitization(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let server = ctx.corpus.text(Role::ServerLogic);
    let counts: Vec<(&str, usize)> = [
        "sanitize_text_field",
        "sanitize_email",
        "sanitize_url",
        "wp_kses",
        "intval",
        "floatval",
    ]
    .iter()
    .map(|f| (*f, count_substring(server, f)))
    .collect();

    Ok(rules::threshold_count(
        &counts,
        SANITIZATION_THRESHOLD,
        "total_sanitization",
        Verdicts {
            pass: "Good input sanitization coverage",
            warn: "Could improve input sanitization",
        },
    ))
}

pub fn output_escaping(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let templates = ctx.corpus.templates();
    let counts: Vec<(&str, usize)> = ["esc_html(", "esc_attr(", "esc_url(", "wp_kses_post("]
        .iter()
        .map(|f| (f.trim_end_matches('('), count_substring_all(templates, f)))
        .collect();

    let result = rules::threshold_count(
        &counts,
        ESCAPING_THRESHOLD,
        "good_escaping_count",
        Verdicts {
            pass: "Output escaping properly implemented",
            warn: "Could improve output escaping coverage",
        },
    );
    Ok(rules::with_hazards(
        result,
        "files_with_issues",
        any_file_matches(templates, &DIRECT_ECHO),
        "Potential unescaped output found",
    ))
}

pub fn sql_injection_prevention(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let server = ctx.corpus.text(Role::ServerLogic);
    let safe: Vec<(&str, usize)> = ["wp_insert_post", "get_posts", "WP_Query", "$wpdb->prepare"]
        .iter()
        .map(|f| (*f, count_substring(server, f)))
        .collect();

    let mut dangerous = Vec::new();
    if matches(server, &RAW_QUERY) {
        dangerous.push("raw_sql".to_string());
    }
    if matches(server, &RAW_GET_VAR) {
        dangerous.push("direct_get_var".to_string());
    }

    // any safe call at all is enough
    let result = rules::threshold_count(
        &safe,
        1,
        "safe_function_count",
        Verdicts {
            pass: "No SQL injection vulnerabilities detected",
            warn: "No parameterized database access detected",
        },
    );
    Ok(rules::with_hazards(
        result,
        "dangerous_patterns",
        dangerous,
        "Potential SQL injection risks found",
    ))
}

pub fn xss_prevention(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let templates = ctx.corpus.templates();
    let counts: Vec<(&str, usize)> = ["esc_html(", "esc_attr(", "wp_kses("]
        .iter()
        .map(|f| (f.trim_end_matches('('), count_substring_all(templates, f)))
        .collect();

    let mut risks: Vec<String> = any_file_matches(templates, &SUPERGLOBAL_ECHO)
        .into_iter()
        .map(|f| format!("{} - Direct superglobal output", f))
        .collect();
    risks.extend(
        any_file_matches(templates, &INNER_HTML)
            .into_iter()
            .map(|f| format!("{} - innerHTML usage", f)),
    );

    let result = rules::threshold_count(
        &counts,
        SAFE_OUTPUT_THRESHOLD,
        "safe_outputs",
        Verdicts {
            pass: "No XSS vulnerabilities detected",
            warn: "Too few escaped outputs to rule out XSS",
        },
    );
    Ok(rules::with_hazards(
        result,
        "xss_risks",
        risks,
        "Potential XSS risks found",
    ))
}

pub fn csrf_protection(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let script = ctx.corpus.text(Role::PrimaryScript);
    let handle = format!("{}.nonce", ctx.layout.prefixed("ajax"));

    Ok(rules::conjunctive(
        &[
            ("nonce_usage", contains(script, "nonce")),
            ("ajax_security", contains(script, &handle)),
        ],
        &[],
        Verdicts {
            pass: "CSRF protection implemented",
            warn: "CSRF protection may be incomplete",
        },
    ))
}

/// Informational: the theme leaves uploads to the CMS core.
pub fn file_upload_security(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let server = ctx.corpus.text(Role::ServerLogic);
    Ok(
        CheckResult::pass("No direct file upload handling detected (uses CMS core)")
            .with("upload_filters", contains(server, "wp_handle_upload"))
            .with("mime_validation", contains(server, "wp_check_filetype"))
            .with("size_limits", contains(server, "upload_size_limit")),
    )
}

/// Informational: a public-facing theme needs few capability checks.
pub fn user_capability_checks(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let server = ctx.corpus.text(Role::ServerLogic);
    let mut result = CheckResult::pass("Appropriate capability checks for theme scope");
    for f in ["current_user_can", "user_can", "is_user_logged_in"] {
        result = result.with(f, count_substring(server, f));
    }
    Ok(result)
}

pub fn honeypot_implementation(ctx: &CheckContext<'_>) -> anyhow::Result<CheckResult> {
    let script = ctx.corpus.text(Role::PrimaryScript);
    Ok(rules::conjunctive(
        &[
            ("honeypot_setup", contains(script, "honeypot")),
            ("spam_check", contains(script, "website_url")),
        ],
        &[],
        Verdicts {
            pass: "Honeypot spam protection implemented",
            warn: "Honeypot implementation incomplete",
        },
    ))
}
