//! Themecheck - compliance auditor for content-site themes.
//!
//! Themecheck inspects a theme's source artifacts (templates, style sheet,
//! client-side script, server-side logic) and reports whether the patterns
//! expected of a launch-ready theme are present: security hardening,
//! accessibility affordances and functional features.
//!
//! # Architecture
//!
//! - `layout`: YAML layout describing where each artifact lives
//! - `corpus`: read-once snapshot of the artifacts, with absence tracking
//! - `pattern`: substring and regex queries over the snapshot
//! - `audit`: check registry, rule evaluation and recommendations
//! - `score`: tallies and verdicts
//! - `report`: output formatting (pretty, JSON)
//!
//! # Adding a Check
//!
//! Write the rule in `src/audit/checks/` and add a `check!` entry to the
//! registry table in `src/audit/registry.rs`.

pub mod audit;
pub mod cli;
pub mod corpus;
pub mod layout;
pub mod pattern;
pub mod report;
pub mod score;

pub use audit::{AuditOutcome, Category, Check, CheckOutcome, CheckResult, Runner, Status};
pub use corpus::{Absence, Corpus, Role, TemplateFile};
pub use layout::{Layout, LayoutError};
pub use report::AuditReport;
pub use score::{Summary, Verdict};
