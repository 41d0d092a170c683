//! Content model structs for documents, the link graph, and run reports.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use vaultpub_types::{BacklinkEntry, BacklinksMap, DocPath, SearchRecord};

/// Kind of file found by the walker, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// A note: metadata block plus markdown body
    Markdown,
    /// LaTeX source or Anki deck turned into a generated page
    Converted,
    /// Document/archive picked up by the notes scan and copied verbatim
    Document,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Markdown => "markdown",
            FileCategory::Converted => "converted",
            FileCategory::Document => "document",
        }
    }
}

/// Lowercased extension of `path`, if any
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Metadata block of a markdown file
///
/// Kept as a raw YAML mapping: publishing rules look at keys whose presence
/// matters, so nothing is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frontmatter(pub Mapping);

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Non-empty `title` field
    pub fn title(&self) -> Option<&str> {
        self.get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A markdown source split into its metadata and body
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Absolute source path
    pub path: PathBuf,
    pub frontmatter: Frontmatter,
    /// The metadata block exactly as written, delimiters included
    pub raw_frontmatter: Option<String>,
    pub body: String,
}

/// A transformed document ready to be written
#[derive(Debug, Clone)]
pub struct OutputDocument {
    /// Output-relative path including the extension
    pub dest: DocPath,
    pub contents: String,
}

impl OutputDocument {
    /// Re-emit the metadata block verbatim in front of a rewritten body
    pub fn from_source(dest: DocPath, source: &SourceDocument, body: &str) -> Self {
        let mut contents = source.raw_frontmatter.clone().unwrap_or_default();
        contents.push_str(body);
        Self { dest, contents }
    }
}

/// What one transformed note contributes to the cross-document artifacts
#[derive(Debug, Clone)]
pub struct PublishedNote {
    pub record: SearchRecord,
    /// Resolved targets, one per occurrence
    pub edges: Vec<DocPath>,
}

/// Outgoing edges per note, inverted into backlinks once every note is in
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    outgoing: BTreeMap<DocPath, BTreeSet<DocPath>>,
    titles: BTreeMap<DocPath, String>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a note and the targets it links to
    ///
    /// Repeated targets collapse into one edge.
    pub fn add_note(&mut self, path: &DocPath, title: &str, targets: &[DocPath]) {
        self.titles.insert(path.clone(), title.to_string());
        self.outgoing
            .entry(path.clone())
            .or_default()
            .extend(targets.iter().cloned());
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(BTreeSet::len).sum()
    }

    /// Invert the edge set
    ///
    /// Targets nobody links to get no key. Entries are ordered by source path.
    pub fn backlinks(&self) -> BacklinksMap {
        let mut map = BacklinksMap::new();
        for (source, targets) in &self.outgoing {
            let title = self
                .titles
                .get(source)
                .cloned()
                .unwrap_or_else(|| source.file_name().to_string());
            for target in targets {
                map.entry(target.clone()).or_default().push(BacklinkEntry {
                    path: source.clone(),
                    title: title.clone(),
                });
            }
        }
        map
    }
}

/// Counters describing one run (or dry run) of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub notes_written: usize,
    pub documents_copied: usize,
    /// LaTeX sources and Anki decks published as generated pages
    pub documents_converted: usize,
    pub attachments_copied: usize,
    pub posts_published: usize,
    pub posts_skipped: usize,
    /// Documents dropped because their metadata block did not parse
    pub malformed: usize,
    /// Note stems hidden behind an earlier note with the same stem
    pub shadowed_stems: usize,
    /// Attachment names hidden behind an earlier attachment with the same name
    pub shadowed_attachments: usize,
    /// Sources dropped because an earlier source claimed the same destination
    pub collisions: usize,
    pub search_records: usize,
    pub backlink_targets: usize,
}
