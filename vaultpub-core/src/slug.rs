//! Name and URL normalization: heading fragments, folder prefixes, titles.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use vaultpub_types::DocPath;

static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();
static NUMERIC_PREFIX: OnceLock<Regex> = OnceLock::new();

fn whitespace_run() -> &'static Regex {
    WHITESPACE_RUN.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn numeric_prefix() -> &'static Regex {
    NUMERIC_PREFIX.get_or_init(|| Regex::new(r"^[0-9]+[-_ .]+").unwrap())
}

/// Convert a heading to the fragment used in note links
///
/// Lowercases and replaces every whitespace run with a single hyphen. Nothing
/// else is touched, so punctuation survives.
///
/// # Examples
///
/// ```
/// use vaultpub_core::slug::heading_fragment;
///
/// assert_eq!(heading_fragment("Memory Model"), "memory-model");
/// assert_eq!(heading_fragment("  Step 2:   Build "), "step-2:-build");
/// ```
pub fn heading_fragment(heading: &str) -> String {
    whitespace_run()
        .replace_all(heading.trim(), "-")
        .to_lowercase()
}

/// Strip a leading numeric ordering token from a folder name
///
/// "020-projects" becomes "projects". Names that are only digits, or that
/// would become empty, are returned unchanged.
pub fn strip_numeric_prefix(name: &str) -> &str {
    match numeric_prefix().find(name) {
        Some(m) if m.end() < name.len() => &name[m.end()..],
        _ => name,
    }
}

/// Destination key for a file at `rel` (relative to its scan root)
///
/// Only the top-level folder is normalized; files sitting directly at the root
/// keep their name.
pub fn destination_path(rel: &Path, strip_prefix: bool) -> DocPath {
    let doc = DocPath::from_relative(rel);
    if !strip_prefix {
        return doc;
    }
    match doc.as_str().split_once('/') {
        Some((top, rest)) => DocPath::new(format!("{}/{}", strip_numeric_prefix(top), rest)),
        None => doc,
    }
}

/// Title derived from a file stem: hyphens and underscores become spaces
pub fn title_from_stem(stem: &str) -> String {
    stem.replace(['-', '_'], " ")
}

/// Escape the characters that would end a markdown link destination early
///
/// Applied to the resolved path only, never to the heading fragment. Spaces
/// in vault folder and file names are the case that occurs in practice; the
/// other characters are escaped so an odd file name cannot break the link.
pub fn encode_url_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        match ch {
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            _ => out.push(ch),
        }
    }
    out
}
