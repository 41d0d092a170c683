//! Source tree discovery with per-level inclusion rules.

use crate::error::SyncError;
use crate::models::extension_of;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories whose name starts with this are never entered
const HIDDEN_MARKER: char = '.';

/// A file accepted by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute, canonical path
    pub path: PathBuf,
    /// Path relative to the scan root
    pub rel: PathBuf,
}

impl SourceFile {
    /// File name without its extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Which directories and files a scan accepts
#[derive(Debug, Clone, Default)]
pub struct WalkRules {
    /// Top-level directories must start with one of these. Empty disables the rule.
    pub include_prefixes: Vec<String>,
    /// Directory names skipped at every level
    pub exclude_names: HashSet<String>,
    /// Directories skipped wherever they sit (output directories inside the tree)
    pub exclude_paths: Vec<PathBuf>,
    /// Lowercase extensions without the dot
    pub extensions: HashSet<String>,
}

impl WalkRules {
    pub fn new<S: AsRef<str>>(extensions: impl IntoIterator<Item = S>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_prefixes(mut self, prefixes: &[String]) -> Self {
        self.include_prefixes = prefixes.to_vec();
        self
    }

    pub fn with_excluded_names(mut self, names: &[String]) -> Self {
        self.exclude_names.extend(names.iter().cloned());
        self
    }

    pub fn with_excluded_paths<I: IntoIterator<Item = PathBuf>>(mut self, paths: I) -> Self {
        self.exclude_paths.extend(paths);
        self
    }

    fn prefix_rule_active(&self) -> bool {
        !self.include_prefixes.is_empty()
    }

    pub fn accepts_file(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.contains(&ext))
    }

    fn accepts_dir(&self, entry: &DirEntry, exclude_paths: &[PathBuf]) -> bool {
        // The scan root itself is always entered, whatever its name
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with(HIDDEN_MARKER) || self.exclude_names.contains(name.as_ref()) {
            return false;
        }
        if exclude_paths.iter().any(|p| entry.path().starts_with(p)) {
            return false;
        }
        if entry.depth() == 1 && self.prefix_rule_active() {
            return self
                .include_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()));
        }
        true
    }
}

/// Collect every file under `root` accepted by `rules`
///
/// Depth-first, siblings in file-name order. Contents are never opened. Any
/// traversal error, including a missing root, aborts the scan.
pub fn discover(root: &Path, rules: &WalkRules) -> Result<Vec<SourceFile>, SyncError> {
    let root = root.canonicalize().map_err(|e| SyncError::io(root, e))?;
    let exclude_paths: Vec<PathBuf> = rules
        .exclude_paths
        .iter()
        .map(|p| resolve_existing_prefix(p))
        .collect();

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !entry.file_type().is_dir() || rules.accepts_dir(entry, &exclude_paths));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| SyncError::walk(&root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        // With a prefix rule only the matching folders are scanned, never the root itself
        if entry.depth() == 1 && rules.prefix_rule_active() {
            continue;
        }
        if rules.accepts_file(entry.path()) {
            let rel = entry
                .path()
                .strip_prefix(&root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path().to_path_buf());
            files.push(SourceFile {
                path: entry.into_path(),
                rel,
            });
        }
    }

    tracing::debug!("Discovered {} files under {:?}", files.len(), root);
    Ok(files)
}

/// Canonicalize the longest existing ancestor of `path` and re-append the rest
///
/// Output directories may not exist yet during a dry run, but they still have
/// to compare equal to the canonical paths the walker yields.
fn resolve_existing_prefix(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolve_existing_prefix(parent).join(name)
        }
        _ => path.to_path_buf(),
    }
}
