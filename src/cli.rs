//! Command-line interface for themecheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::audit::{self, Runner};
use crate::corpus::Corpus;
use crate::layout::{self, Layout};
use crate::report;
use crate::score::Verdict;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Layout file names searched for in the theme root.
const DEFAULT_LAYOUT_NAMES: &[&str] = &["themecheck.yaml", ".themecheck.yaml"];

/// Default layout written by `init`.
const DEFAULT_LAYOUT: &str = include_str!("templates/default.yaml");

/// Compliance auditor for content-site themes.
///
/// Inspects a theme's templates, style sheet, script and server logic and
/// reports, category by category, whether expected security, accessibility
/// and functionality patterns are present.
#[derive(Parser)]
#[command(name = "themecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log every check evaluation to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit a theme directory
    Audit(AuditArgs),
    /// Write a layout file from the default template
    Init(InitArgs),
    /// List the registered checks
    Checks(ChecksArgs),
}

/// Arguments for the audit command.
#[derive(Parser)]
pub struct AuditArgs {
    /// Theme root directory
    pub path: PathBuf,

    /// Path to layout YAML file (default: auto-discover in the theme root)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Minimum pass rate (0-100) for a zero exit code
    #[arg(short, long)]
    pub min_pass_rate: Option<f64>,

    /// Evaluate checks one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Show result details in pretty output
    #[arg(long)]
    pub details: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "themecheck.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the checks command.
#[derive(Parser)]
pub struct ChecksArgs {
    /// Show a single check (with or without the `check_` prefix)
    pub name: Option<String>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Initialize tracing on stderr. `RUST_LOG` overrides the flags.
pub fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

/// Find a layout file in the theme root.
fn discover_layout(root: &Path) -> Option<PathBuf> {
    DEFAULT_LAYOUT_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
}

fn valid_format(format: &str) -> bool {
    format == "pretty" || format == "json"
}

/// Resolve the layout: explicit path, discovered file, or defaults.
fn resolve_layout(args: &AuditArgs, root: &Path) -> anyhow::Result<Layout> {
    let path = match &args.config {
        Some(p) => Some(p.clone()),
        None => discover_layout(root),
    };

    let layout = match path {
        Some(p) => {
            info!(layout = %p.display(), "using layout file");
            Layout::parse_file(&p)?
        }
        None => {
            debug!("no layout file, using defaults");
            Layout::default()
        }
    };
    layout::validate(&layout)?;
    Ok(layout)
}

/// Run the audit command.
pub fn run_audit(args: &AuditArgs) -> anyhow::Result<i32> {
    if !valid_format(&args.format) {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    if let Some(rate) = args.min_pass_rate {
        if !(0.0..=100.0).contains(&rate) {
            eprintln!("Error: --min-pass-rate must be between 0 and 100, got {}", rate);
            return Ok(EXIT_ERROR);
        }
    }

    let root = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };
    if !root.is_dir() {
        eprintln!("Error: {} is not a directory", root.display());
        return Ok(EXIT_ERROR);
    }

    let layout = match resolve_layout(args, &root) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Snapshot once; every check reads the same text.
    let corpus = Corpus::load(&root, &layout);
    let outcome = Runner::new(&layout)
        .sequential(args.sequential)
        .run(&corpus);

    let theme = args.path.to_string_lossy().to_string();
    let report = report::build(&theme, &outcome);

    match args.format.as_str() {
        "json" => report::write_json(&report)?,
        _ => report::write_pretty(&report, args.details),
    }

    let passed = match args.min_pass_rate {
        Some(min) => report.summary.meets(min),
        None => matches!(report.summary.verdict, Verdict::Excellent | Verdict::Good),
    };
    info!(verdict = %report.summary.verdict, passed, "audit finished");

    if passed {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or pass --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_LAYOUT) {
        eprintln!("Error: failed to write layout: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to match your theme", args.output.display());
    println!("  2. Run: themecheck audit <theme-dir> --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// Resolve the checks to list: the whole registry, or the one named.
fn select_checks(name: Option<&str>) -> Option<Vec<&'static audit::Check>> {
    match name {
        None => Some(audit::checks().iter().collect()),
        Some(name) => audit::find(name)
            .or_else(|| audit::find(&format!("{}{}", audit::CHECK_PREFIX, name)))
            .map(|c| vec![c]),
    }
}

/// Run the checks command.
pub fn run_checks(args: &ChecksArgs) -> anyhow::Result<i32> {
    if !valid_format(&args.format) {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let selected = match select_checks(args.name.as_deref()) {
        Some(checks) => checks,
        None => {
            let name = args.name.as_deref().unwrap_or_default();
            eprintln!("Error: unknown check {:?}", name);
            eprintln!("Run 'themecheck checks' to list all checks");
            return Ok(EXIT_ERROR);
        }
    };

    if args.format == "json" {
        let entries: Vec<serde_json::Value> = selected
            .iter()
            .map(|c| {
                serde_json::json!({
                    "name": c.name,
                    "display_name": c.display_name(),
                    "category": c.category,
                    "roles": c.roles,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(EXIT_SUCCESS);
    }

    for category in audit::Category::ALL {
        let in_category: Vec<_> = selected
            .iter()
            .filter(|c| c.category == category)
            .collect();
        if in_category.is_empty() {
            continue;
        }
        println!("{}:", category.title());
        for check in in_category {
            let roles: Vec<&str> = check.roles.iter().map(|r| r.as_str()).collect();
            println!("  {:<34} {}", check.name, roles.join(", "));
        }
        println!();
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout_template_parses() {
        let layout = Layout::parse_str(DEFAULT_LAYOUT).unwrap();
        layout::validate(&layout).unwrap();
        assert_eq!(layout.prefix, "ktbf");
        assert_eq!(layout.post_types.len(), 4);
    }

    #[test]
    fn test_discover_layout() {
        let temp = TempDir::new().unwrap();
        assert!(discover_layout(temp.path()).is_none());

        std::fs::write(temp.path().join(".themecheck.yaml"), "prefix: harbor\n").unwrap();
        assert_eq!(
            discover_layout(temp.path()),
            Some(temp.path().join(".themecheck.yaml"))
        );
    }

    #[test]
    fn test_run_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("conf/themecheck.yaml");
        let args = InitArgs {
            output: output.clone(),
            force: false,
        };

        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert!(output.is_file());
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);

        let forced = InitArgs {
            output,
            force: true,
        };
        assert_eq!(run_init(&forced).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn test_run_audit_rejects_bad_format() {
        let temp = TempDir::new().unwrap();
        let args = AuditArgs {
            path: temp.path().to_path_buf(),
            config: None,
            format: "html".to_string(),
            min_pass_rate: None,
            sequential: false,
            details: false,
        };
        assert_eq!(run_audit(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_run_audit_invalid_layout_is_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("themecheck.yaml"), "prefix: \"bad prefix\"\n").unwrap();
        let args = AuditArgs {
            path: temp.path().to_path_buf(),
            config: None,
            format: "json".to_string(),
            min_pass_rate: None,
            sequential: true,
            details: false,
        };
        assert_eq!(run_audit(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_run_audit_empty_theme_fails() {
        // every check degrades, so the verdict is NEEDS_WORK
        let temp = TempDir::new().unwrap();
        let args = AuditArgs {
            path: temp.path().to_path_buf(),
            config: None,
            format: "json".to_string(),
            min_pass_rate: None,
            sequential: true,
            details: false,
        };
        assert_eq!(run_audit(&args).unwrap(), EXIT_FAILED);
    }

    #[test]
    fn test_select_checks_by_name() {
        assert_eq!(select_checks(None).unwrap().len(), audit::checks().len());

        let full = select_checks(Some("check_skip_links")).unwrap();
        assert_eq!(full[0].name, "check_skip_links");

        let short = select_checks(Some("skip_links")).unwrap();
        assert_eq!(short[0].name, "check_skip_links");

        assert!(select_checks(Some("check_nothing")).is_none());
    }

    #[test]
    fn test_run_checks_unknown_name_is_error() {
        let args = ChecksArgs {
            name: Some("teleport".to_string()),
            format: "pretty".to_string(),
        };
        assert_eq!(run_checks(&args).unwrap(), EXIT_ERROR);
    }
}
