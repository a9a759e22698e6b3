//! Immutable snapshot of the theme artifacts under audit.
//!
//! Every artifact is read at most once per run. An artifact that cannot be
//! used as text is recorded as [`Absence`] so each check can degrade on its
//! own instead of seeing misleading zero counts.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::layout::Layout;

/// Logical role an artifact plays in the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    ServerLogic,
    PrimaryScript,
    StyleSheet,
    ShellTemplate,
    AllTemplates,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::ServerLogic,
        Role::PrimaryScript,
        Role::StyleSheet,
        Role::ShellTemplate,
        Role::AllTemplates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ServerLogic => "server_logic",
            Role::PrimaryScript => "primary_script",
            Role::StyleSheet => "style_sheet",
            Role::ShellTemplate => "shell_template",
            Role::AllTemplates => "all_templates",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an artifact is not available as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Absence {
    #[error("{0} does not exist")]
    Missing(String),
    #[error("{0} is not valid UTF-8 text")]
    NotText(String),
    #[error("{path} could not be read: {reason}")]
    Unreadable { path: String, reason: String },
    #[error("no template files matched {0:?}")]
    NoTemplates(String),
}

/// A template file captured in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub name: String,
    pub text: String,
}

impl TemplateFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// The audit corpus: single-text roles plus the template set.
///
/// Template files that matched the layout but could not be captured are
/// kept as skipped reasons next to the set, so checks over templates can
/// report that their view is partial.
#[derive(Debug, Clone)]
pub struct Corpus {
    texts: BTreeMap<Role, Result<String, Absence>>,
    templates: Result<Vec<TemplateFile>, Absence>,
    skipped_templates: Vec<Absence>,
}

impl Corpus {
    /// Load every role from a theme directory according to the layout.
    pub fn load(root: &Path, layout: &Layout) -> Corpus {
        let mut reader = SnapshotReader::default();

        let mut texts = BTreeMap::new();
        let a = &layout.artifacts;
        for (role, rel) in [
            (Role::ServerLogic, &a.server_logic),
            (Role::PrimaryScript, &a.primary_script),
            (Role::StyleSheet, &a.style_sheet),
            (Role::ShellTemplate, &a.shell_template),
        ] {
            let entry = reader.read(&root.join(rel), rel);
            if let Err(absence) = &entry {
                warn!(role = %role, %absence, "artifact unavailable");
            }
            texts.insert(role, entry);
        }

        let (templates, skipped_templates) = load_templates(root, layout, &mut reader);
        if let Err(absence) = &templates {
            warn!(role = %Role::AllTemplates, %absence, "artifact unavailable");
        }

        debug!(files_read = reader.cache.len(), "corpus loaded");
        Corpus {
            texts,
            templates,
            skipped_templates,
        }
    }

    /// Start building a corpus from in-memory text.
    pub fn builder() -> CorpusBuilder {
        CorpusBuilder::default()
    }

    /// Text for a single-file role, `None` when absent or for `AllTemplates`.
    pub fn text(&self, role: Role) -> Option<&str> {
        match self.texts.get(&role) {
            Some(Ok(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// The template set, `None` when absent.
    pub fn templates(&self) -> Option<&[TemplateFile]> {
        self.templates.as_deref().ok()
    }

    /// Template files that matched but could not be captured, sorted.
    pub fn skipped_templates(&self) -> &[Absence] {
        &self.skipped_templates
    }

    /// Why a role is absent, or `None` when it is present.
    pub fn absence(&self, role: Role) -> Option<&Absence> {
        match role {
            Role::AllTemplates => self.templates.as_ref().err(),
            _ => match self.texts.get(&role) {
                Some(Err(absence)) => Some(absence),
                Some(Ok(_)) => None,
                None => None,
            },
        }
    }

    pub fn is_present(&self, role: Role) -> bool {
        match role {
            Role::AllTemplates => self.templates.is_ok(),
            _ => matches!(self.texts.get(&role), Some(Ok(_))),
        }
    }
}

/// Builder for corpora with injected text. Roles not set are missing.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    texts: BTreeMap<Role, String>,
    templates: Vec<TemplateFile>,
    skipped: Vec<Absence>,
}

impl CorpusBuilder {
    pub fn text(mut self, role: Role, text: impl Into<String>) -> Self {
        self.texts.insert(role, text.into());
        self
    }

    pub fn server_logic(self, text: impl Into<String>) -> Self {
        self.text(Role::ServerLogic, text)
    }

    pub fn primary_script(self, text: impl Into<String>) -> Self {
        self.text(Role::PrimaryScript, text)
    }

    pub fn style_sheet(self, text: impl Into<String>) -> Self {
        self.text(Role::StyleSheet, text)
    }

    pub fn shell_template(self, text: impl Into<String>) -> Self {
        self.text(Role::ShellTemplate, text)
    }

    pub fn template(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.push(TemplateFile::new(name, text));
        self
    }

    /// Record a template file that could not be captured.
    pub fn skipped_template(mut self, absence: Absence) -> Self {
        self.skipped.push(absence);
        self
    }

    pub fn build(mut self) -> Corpus {
        let mut texts = BTreeMap::new();
        for role in Role::ALL {
            if role == Role::AllTemplates {
                continue;
            }
            let entry = self
                .texts
                .remove(&role)
                .ok_or_else(|| Absence::Missing(role.to_string()));
            texts.insert(role, entry);
        }

        self.skipped.sort_by_key(|a| a.to_string());
        let templates = template_set(self.templates, &self.skipped, "<injected>");

        Corpus {
            texts,
            templates,
            skipped_templates: self.skipped,
        }
    }
}

/// Reads files once, sharing content between roles that name the same path.
#[derive(Default)]
struct SnapshotReader {
    cache: HashMap<PathBuf, Result<String, Absence>>,
}

impl SnapshotReader {
    fn read(&mut self, path: &Path, display: &str) -> Result<String, Absence> {
        self.cache
            .entry(path.to_path_buf())
            .or_insert_with(|| read_text(path, display))
            .clone()
    }
}

fn read_text(path: &Path, display: &str) -> Result<String, Absence> {
    match std::fs::read(path) {
        Ok(bytes) => {
            String::from_utf8(bytes).map_err(|_| Absence::NotText(display.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Absence::Missing(display.to_string()))
        }
        Err(e) => Err(Absence::Unreadable {
            path: display.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Collect template files directly under the root, sorted by name.
///
/// Returns the template set plus the reasons for every matching entry that
/// could not be captured: walk errors (unreadable root, broken links) and
/// files that are unreadable or not UTF-8.
fn load_templates(
    root: &Path,
    layout: &Layout,
    reader: &mut SnapshotReader,
) -> (Result<Vec<TemplateFile>, Absence>, Vec<Absence>) {
    let matcher = match globset::Glob::new(&layout.templates) {
        Ok(glob) => glob.compile_matcher(),
        Err(e) => {
            let absence = Absence::Unreadable {
                path: layout.templates.clone(),
                reason: e.to_string(),
            };
            return (Err(absence), Vec::new());
        }
    };
    let wanted =
        |name: &str| matcher.is_match(name) && !layout.is_path_excluded(Path::new(name));

    let mut names = Vec::new();
    let mut skipped = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    if wanted(name) {
                        names.push(name.to_string());
                    }
                }
            }
            Err(e) => {
                let reason = e
                    .io_error()
                    .map(|io| io.to_string())
                    .unwrap_or_else(|| e.to_string());
                let rel = e
                    .path()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default();
                if rel.is_empty() {
                    // the root itself
                    skipped.push(Absence::Unreadable {
                        path: root.display().to_string(),
                        reason,
                    });
                } else if wanted(&rel) {
                    skipped.push(Absence::Unreadable { path: rel, reason });
                }
            }
        }
    }
    names.sort();

    let mut files = Vec::with_capacity(names.len());
    for name in names {
        match reader.read(&root.join(&name), &name) {
            Ok(text) => files.push(TemplateFile { name, text }),
            Err(absence) => skipped.push(absence),
        }
    }

    skipped.sort_by_key(|a| a.to_string());
    for absence in &skipped {
        warn!(%absence, "template skipped");
    }

    (template_set(files, &skipped, &layout.templates), skipped)
}

/// The template role is present when at least one file was captured.
/// Otherwise the first skip reason explains the absence better than a
/// bare "nothing matched".
fn template_set(
    files: Vec<TemplateFile>,
    skipped: &[Absence],
    pattern: &str,
) -> Result<Vec<TemplateFile>, Absence> {
    if !files.is_empty() {
        return Ok(files);
    }
    Err(skipped
        .first()
        .cloned()
        .unwrap_or_else(|| Absence::NoTemplates(pattern.to_string())))
}
