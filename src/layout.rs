//! Theme layout definitions for themecheck.
//!
//! A layout tells the auditor where each artifact role lives inside a theme
//! directory and which theme-specific identifiers the checks should expect.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or validating a layout file.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("reading layout {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing layout: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid prefix {0:?}, must be a non-empty identifier")]
    InvalidPrefix(String),
    #[error("artifact path {0:?} must be relative to the theme root")]
    AbsolutePath(String),
    #[error("invalid glob {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Top-level layout definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Layout {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    /// Identifier prefix used by the theme's hooks, handles and post types
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub artifacts: ArtifactPaths,
    /// Glob selecting template files directly under the theme root
    #[serde(default = "default_templates")]
    pub templates: String,
    /// Glob patterns for template files to leave out of the corpus
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Custom post type suffixes expected to be registered
    #[serde(default = "default_post_types")]
    pub post_types: Vec<String>,
    /// AJAX action suffixes expected to be wired
    #[serde(default = "default_ajax_actions")]
    pub ajax_actions: Vec<String>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: String::new(),
            prefix: default_prefix(),
            artifacts: ArtifactPaths::default(),
            templates: default_templates(),
            excluded_paths: Vec::new(),
            post_types: default_post_types(),
            ajax_actions: default_ajax_actions(),
        }
    }
}

/// Relative locations of the single-file artifact roles.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactPaths {
    #[serde(default = "default_server_logic")]
    pub server_logic: String,
    #[serde(default = "default_primary_script")]
    pub primary_script: String,
    #[serde(default = "default_style_sheet")]
    pub style_sheet: String,
    #[serde(default = "default_shell_template")]
    pub shell_template: String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            server_logic: default_server_logic(),
            primary_script: default_primary_script(),
            style_sheet: default_style_sheet(),
            shell_template: default_shell_template(),
        }
    }
}

fn default_prefix() -> String {
    "ktbf".to_string()
}

fn default_templates() -> String {
    "*.php".to_string()
}

fn default_post_types() -> Vec<String> {
    ["event", "scholar", "timeline", "board"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ajax_actions() -> Vec<String> {
    vec!["donate".to_string(), "register".to_string()]
}

fn default_server_logic() -> String {
    "functions.php".to_string()
}

fn default_primary_script() -> String {
    "assets/js/main.js".to_string()
}

fn default_style_sheet() -> String {
    "style.css".to_string()
}

fn default_shell_template() -> String {
    "header.php".to_string()
}

impl Layout {
    /// Parse a layout from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LayoutError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_str(&content)
    }

    /// Parse a layout from YAML text.
    pub fn parse_str(content: &str) -> Result<Self, LayoutError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Prefixed identifier, e.g. `ktbf_event`.
    pub fn prefixed(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Check if a template path should be excluded based on excluded_paths patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                if glob.compile_matcher().is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// Validate a layout for correctness.
pub fn validate(layout: &Layout) -> Result<(), LayoutError> {
    let prefix_ok = !layout.prefix.is_empty()
        && layout
            .prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !prefix_ok {
        return Err(LayoutError::InvalidPrefix(layout.prefix.clone()));
    }

    let a = &layout.artifacts;
    for p in [
        &a.server_logic,
        &a.primary_script,
        &a.style_sheet,
        &a.shell_template,
    ] {
        if Path::new(p).is_absolute() {
            return Err(LayoutError::AbsolutePath(p.clone()));
        }
    }

    for pattern in std::iter::once(&layout.templates).chain(&layout.excluded_paths) {
        globset::Glob::new(pattern).map_err(|source| LayoutError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
    }

    Ok(())
}
