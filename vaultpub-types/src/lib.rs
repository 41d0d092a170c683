//! Shared types for vaultpub
//!
//! This crate provides the types that cross crate boundaries: the canonical
//! document path key and the records serialized into the search-index and
//! backlinks artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};

/// Canonical, output-relative document key.
///
/// Always forward-slash separated with no leading or trailing slash and no
/// empty segments. Every lookup key and artifact key goes through one of the
/// constructors here so separators are normalized in exactly one place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocPath(String);

impl DocPath {
    /// Normalize a raw string key (`\` becomes `/`, empty segments dropped).
    pub fn new(raw: impl AsRef<str>) -> Self {
        let joined = raw
            .as_ref()
            .split(['/', '\\'])
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    /// Build a key from a relative filesystem path, keeping the extension.
    pub fn from_relative(path: &Path) -> Self {
        let segments: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(seg) => Some(seg.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Self::new(segments.join("/"))
    }

    /// Same key with the final segment's extension swapped for `ext`.
    pub fn with_extension(&self, ext: &str) -> Self {
        Self(format!("{}.{}", self.without_extension().0, ext))
    }

    /// Drop the extension of the final segment, if any.
    ///
    /// ```
    /// use vaultpub_types::DocPath;
    ///
    /// assert_eq!(DocPath::new("projects/plan.md").without_extension().as_str(), "projects/plan");
    /// assert_eq!(DocPath::new(".hidden").without_extension().as_str(), ".hidden");
    /// ```
    pub fn without_extension(&self) -> Self {
        let (dir, file) = match self.0.rsplit_once('/') {
            Some((dir, file)) => (Some(dir), file),
            None => (None, self.0.as_str()),
        };
        let stem = match file.rfind('.') {
            Some(idx) if idx > 0 => &file[..idx],
            _ => file,
        };
        match dir {
            Some(dir) => Self(format!("{dir}/{stem}")),
            None => Self(stem.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocPath {
    fn from(raw: &str) -> Self {
        DocPath::new(raw)
    }
}

/// One entry of the search-index artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub path: DocPath,
    pub title: String,
    /// Plain text with markdown syntax removed and whitespace collapsed
    pub content: String,
}

/// A note linking into some target, as listed in the backlinks artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BacklinkEntry {
    pub path: DocPath,
    pub title: String,
}

/// Target path to every note that links to it.
///
/// Ordered so the serialized artifact is stable between runs.
pub type BacklinksMap = BTreeMap<DocPath, Vec<BacklinkEntry>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalizes_separators() {
        assert_eq!(DocPath::new("a\\b\\c.md").as_str(), "a/b/c.md");
        assert_eq!(DocPath::new("/a//b/").as_str(), "a/b");
        assert_eq!(DocPath::new("./a/./b").as_str(), "a/b");
    }

    #[test]
    fn test_from_relative() {
        let path: PathBuf = ["projects", "rust notes", "Ownership.md"].iter().collect();
        let doc = DocPath::from_relative(&path);
        assert_eq!(doc.as_str(), "projects/rust notes/Ownership.md");
        assert_eq!(doc.file_name(), "Ownership.md");
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(
            DocPath::new("papers/thesis.tex").with_extension("md").as_str(),
            "papers/thesis.md"
        );
        assert_eq!(DocPath::new("deck").with_extension("md").as_str(), "deck.md");
    }

    #[test]
    fn test_without_extension_keeps_dotted_dirs() {
        assert_eq!(
            DocPath::new("v1.2/notes").without_extension().as_str(),
            "v1.2/notes"
        );
        assert_eq!(
            DocPath::new("archive.tar.gz").without_extension().as_str(),
            "archive.tar"
        );
    }

    #[test]
    fn test_serializes_as_plain_string_key() {
        let mut map = BacklinksMap::new();
        map.insert(
            DocPath::new("bar"),
            vec![BacklinkEntry {
                path: DocPath::new("foo"),
                title: "foo".into(),
            }],
        );
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"bar":[{"path":"foo","title":"foo"}]}"#);
    }
}
