//! The fixed, ordered catalogue of checks.
//!
//! Declaration order is report order: categories appear in [`Category::ALL`]
//! order and checks within a category in the order listed here.

use crate::corpus::{Corpus, Role};
use crate::layout::Layout;

use super::checks::{accessibility, functionality, security};
use super::types::{Category, CheckResult};

/// Conventional prefix of every check name.
pub const CHECK_PREFIX: &str = "check_";

/// Read-only inputs a rule evaluates against.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    pub corpus: &'a Corpus,
    pub layout: &'a Layout,
}

/// Rule body of a check.
pub type RuleFn = fn(&CheckContext<'_>) -> anyhow::Result<CheckResult>;

/// A named audit rule.
#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    pub category: Category,
    /// Roles that must be present for the rule to run
    pub roles: &'static [Role],
    pub rule: RuleFn,
}

impl Check {
    /// Human-readable name: prefix stripped, underscores to spaces, title-cased.
    pub fn display_name(&self) -> String {
        display_name(self.name)
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("roles", &self.roles)
            .finish()
    }
}

/// Derive a display name from a check name.
pub fn display_name(name: &str) -> String {
    name.strip_prefix(CHECK_PREFIX)
        .unwrap_or(name)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

const SERVER: &[Role] = &[Role::ServerLogic];
const SCRIPT: &[Role] = &[Role::PrimaryScript];
const STYLE: &[Role] = &[Role::StyleSheet];
const SHELL: &[Role] = &[Role::ShellTemplate];
const TEMPLATES: &[Role] = &[Role::AllTemplates];
const SERVER_AND_SHELL: &[Role] = &[Role::ServerLogic, Role::ShellTemplate];

macro_rules! check {
    ($name:literal, $category:ident, $roles:expr, $rule:path $(,)?) => {
        Check {
            name: $name,
            category: Category::$category,
            roles: $roles,
            rule: $rule,
        }
    };
}

static CHECKS: &[Check] = &[
    // Security
    check!(
        "check_nonce_verification",
        Security,
        SERVER,
        security::nonce_verification,
    ),
    check!(
        "check_input_sanitization",
        Security,
        SERVER,
        security::input_sanitization,
    ),
    check!(
        "check_output_escaping",
        Security,
        TEMPLATES,
        security::output_escaping,
    ),
    check!(
        "check_sql_injection_prevention",
        Security,
        SERVER,
        security::sql_injection_prevention,
    ),
    check!(
        "check_xss_prevention",
        Security,
        TEMPLATES,
        security::xss_prevention,
    ),
    check!(
        "check_csrf_protection",
        Security,
        SCRIPT,
        security::csrf_protection,
    ),
    check!(
        "check_file_upload_security",
        Security,
        SERVER,
        security::file_upload_security,
    ),
    check!(
        "check_user_capability_checks",
        Security,
        SERVER,
        security::user_capability_checks,
    ),
    check!(
        "check_honeypot_implementation",
        Security,
        SCRIPT,
        security::honeypot_implementation,
    ),
    // Accessibility
    check!(
        "check_semantic_html",
        Accessibility,
        TEMPLATES,
        accessibility::semantic_html,
    ),
    check!(
        "check_aria_labels",
        Accessibility,
        TEMPLATES,
        accessibility::aria_labels,
    ),
    check!(
        "check_keyboard_navigation",
        Accessibility,
        SCRIPT,
        accessibility::keyboard_navigation,
    ),
    check!(
        "check_screen_reader_text",
        Accessibility,
        TEMPLATES,
        accessibility::screen_reader_text,
    ),
    check!(
        "check_color_contrast",
        Accessibility,
        STYLE,
        accessibility::color_contrast,
    ),
    check!(
        "check_focus_management",
        Accessibility,
        STYLE,
        accessibility::focus_management,
    ),
    check!(
        "check_skip_links",
        Accessibility,
        SHELL,
        accessibility::skip_links,
    ),
    // Functionality
    check!(
        "check_form_validation",
        Functionality,
        SCRIPT,
        functionality::form_validation,
    ),
    check!(
        "check_ajax_handlers",
        Functionality,
        SERVER,
        functionality::ajax_handlers,
    ),
    check!(
        "check_responsive_design",
        Functionality,
        STYLE,
        functionality::responsive_design,
    ),
    check!(
        "check_custom_post_types",
        Functionality,
        SERVER,
        functionality::custom_post_types,
    ),
    check!(
        "check_navigation_menus",
        Functionality,
        SERVER_AND_SHELL,
        functionality::navigation_menus,
    ),
    check!(
        "check_theme_customizer",
        Functionality,
        SERVER,
        functionality::theme_customizer,
    ),
    check!(
        "check_seo_features",
        Functionality,
        SHELL,
        functionality::seo_features,
    ),
];

/// All registered checks in report order.
pub fn checks() -> &'static [Check] {
    CHECKS
}

/// Checks of one category in registration order.
pub fn checks_in(category: Category) -> impl Iterator<Item = &'static Check> {
    CHECKS.iter().filter(move |c| c.category == category)
}

/// Find a check by name.
pub fn find(name: &str) -> Option<&'static Check> {
    CHECKS.iter().find(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("check_sql_injection_prevention"), "Sql Injection Prevention");
        assert_eq!(display_name("check_seo_features"), "Seo Features");
        assert_eq!(display_name("custom"), "Custom");
    }

    #[test]
    fn test_names_unique_within_category() {
        for category in Category::ALL {
            let mut seen = HashSet::new();
            for check in checks_in(category) {
                assert!(seen.insert(check.name), "duplicate check {}", check.name);
            }
        }
    }

    #[test]
    fn test_registry_is_grouped_in_category_order() {
        let order: Vec<Category> = checks().iter().map(|c| c.category).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted, "checks must be declared category by category");
    }

    #[test]
    fn test_registry_shape() {
        assert_eq!(checks().len(), 23);
        assert_eq!(checks_in(Category::Security).count(), 9);
        assert_eq!(checks_in(Category::Accessibility).count(), 7);
        assert_eq!(checks_in(Category::Functionality).count(), 7);
        for check in checks() {
            assert!(check.name.starts_with(CHECK_PREFIX));
            assert!(!check.roles.is_empty());
        }
    }

    #[test]
    fn test_find() {
        assert!(find("check_skip_links").is_some());
        assert!(find("check_nothing").is_none());
    }
}
