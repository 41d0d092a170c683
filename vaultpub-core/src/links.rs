//! Wikilink rewriting for [[target]], [[target|text]] and ![[embed]] syntax.
//!
//! Two passes run in a fixed order. The attachment pass turns references to
//! known attachments into plain markdown links or images; the cross-reference
//! pass then resolves the remaining `[[Page#Heading|Alias]]` tokens against the
//! note stems. An attachment token that did not resolve is still wiki syntax
//! when the second pass runs and can be picked up as a page reference.

use crate::config::normalize_url_root;
use crate::lookup::Lookup;
use crate::slug::{encode_url_path, heading_fragment};
use regex::{Captures, Regex};
use std::sync::OnceLock;
use vaultpub_types::DocPath;

/// Extensions rendered as inline images when embedded
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "avif", "tif", "tiff", "ico",
];

static ATTACHMENT_REGEX: OnceLock<Regex> = OnceLock::new();
static CROSS_REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();

fn attachment_regex() -> &'static Regex {
    ATTACHMENT_REGEX
        .get_or_init(|| Regex::new(r"(!?)\[\[([^\[\]|#]+)(?:\|([^\[\]]*))?\]\]").unwrap())
}

fn cross_reference_regex() -> &'static Regex {
    CROSS_REFERENCE_REGEX.get_or_init(|| {
        Regex::new(r"\[\[([^\[\]|#]+)(?:#([^\[\]|]*))?(?:\|([^\[\]]*))?\]\]").unwrap()
    })
}

fn is_image(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn non_empty(m: Option<regex::Match<'_>>) -> Option<&str> {
    m.map(|m| m.as_str().trim()).filter(|s| !s.is_empty())
}

/// Rewrite attachment references that resolve through `attachments`
///
/// Lookup is by bare file name, so `[[assets/pic.png]]` resolves like
/// `[[pic.png]]`. Unresolved tokens are returned byte for byte.
pub fn rewrite_attachments(text: &str, attachments: &Lookup, url_root: &str) -> String {
    let root = normalize_url_root(url_root);
    attachment_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let target = caps[2].trim();
            let file_name = target.rsplit('/').next().unwrap_or(target);
            let Some(dest) = attachments.get(file_name) else {
                return caps[0].to_string();
            };

            let label = non_empty(caps.get(3)).unwrap_or(target);
            let url = format!("{}/{}", root, encode_url_path(dest.as_str()));
            if is_image(file_name) {
                format!("![{}]({})", label, url)
            } else {
                // `!` is dropped: only images embed
                format!("[{}]({})", label, url)
            }
        })
        .into_owned()
}

/// Rewrite page references that resolve through `notes`
///
/// Returns the new text and every resolved target, once per occurrence.
pub fn rewrite_cross_references(
    text: &str,
    notes: &Lookup,
    url_root: &str,
) -> (String, Vec<DocPath>) {
    let root = normalize_url_root(url_root);
    let mut targets = Vec::new();

    let rewritten = cross_reference_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let page = caps[1].trim();
            let Some(dest) = notes.get(page) else {
                return caps[0].to_string();
            };

            let mut url = format!("{}/{}", root, encode_url_path(dest.as_str()));
            if let Some(heading) = non_empty(caps.get(2)) {
                url.push('#');
                url.push_str(&heading_fragment(heading));
            }
            let label = non_empty(caps.get(3)).unwrap_or(page);

            targets.push(dest.clone());
            format!("[{}]({})", label, url)
        })
        .into_owned();

    (rewritten, targets)
}

/// Both passes bundled with the lookups they read
///
/// The lookups are frozen before any note is transformed and shared read-only
/// across concurrent workers.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    notes: Lookup,
    attachments: Lookup,
    notes_root: String,
    attachments_root: String,
}

impl LinkRewriter {
    pub fn new(notes: Lookup, attachments: Lookup, notes_root: &str, attachments_root: &str) -> Self {
        Self {
            notes,
            attachments,
            notes_root: normalize_url_root(notes_root),
            attachments_root: normalize_url_root(attachments_root),
        }
    }

    /// Attachment pass, then cross-reference pass over its output
    pub fn rewrite(&self, body: &str) -> (String, Vec<DocPath>) {
        if !body.contains("[[") {
            return (body.to_string(), Vec::new());
        }
        let text = rewrite_attachments(body, &self.attachments, &self.attachments_root);
        rewrite_cross_references(&text, &self.notes, &self.notes_root)
    }

    pub fn notes(&self) -> &Lookup {
        &self.notes
    }

    pub fn attachments(&self) -> &Lookup {
        &self.attachments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes() -> Lookup {
        [
            ("bar", DocPath::new("bar")),
            ("Rust Safety", DocPath::new("projects/Rust Safety")),
            ("pic.png", DocPath::new("misc/pic.png")),
        ]
        .into_iter()
        .collect()
    }

    fn attachments() -> Lookup {
        [
            ("pic.png", DocPath::new("projects/img/pic.png")),
            ("paper.pdf", DocPath::new("library/paper.pdf")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_image_embed_resolves() {
        let out = rewrite_attachments("see ![[pic.png]] here", &attachments(), "/attachments");
        assert_eq!(out, "see ![pic.png](/attachments/projects/img/pic.png) here");
    }

    #[test]
    fn test_unknown_attachment_is_untouched() {
        let text = "see ![[missing.png]] and [[missing.pdf|doc]]";
        assert_eq!(rewrite_attachments(text, &attachments(), "/attachments"), text);
    }

    #[test]
    fn test_non_image_embed_becomes_link() {
        let out = rewrite_attachments("![[paper.pdf|The Paper]]", &attachments(), "/attachments");
        assert_eq!(out, "[The Paper](/attachments/library/paper.pdf)");
    }

    #[test]
    fn test_image_without_bang_still_embeds() {
        let out = rewrite_attachments("[[pic.png|alt text]]", &attachments(), "/attachments/");
        assert_eq!(out, "![alt text](/attachments/projects/img/pic.png)");
    }

    #[test]
    fn test_attachment_with_folder_resolves_by_name() {
        let out = rewrite_attachments("![[img/pic.png]]", &attachments(), "/attachments");
        assert_eq!(out, "![img/pic.png](/attachments/projects/img/pic.png)");
    }

    #[test]
    fn test_simple_cross_reference() {
        let (out, targets) = rewrite_cross_references("Check [[bar]]", &notes(), "/notes");
        assert_eq!(out, "Check [bar](/notes/bar)");
        assert_eq!(targets, vec![DocPath::new("bar")]);
    }

    #[test]
    fn test_cross_reference_with_heading_and_alias() {
        let (out, targets) = rewrite_cross_references(
            "See [[Rust Safety#Memory  Model|this guide]]",
            &notes(),
            "/notes",
        );
        assert_eq!(
            out,
            "See [this guide](/notes/projects/Rust%20Safety#memory-model)"
        );
        assert_eq!(targets, vec![DocPath::new("projects/Rust Safety")]);
    }

    #[test]
    fn test_cross_reference_heading_without_alias() {
        let (out, _) = rewrite_cross_references("[[bar#Intro Part]]", &notes(), "/notes");
        assert_eq!(out, "[bar](/notes/bar#intro-part)");
    }

    #[test]
    fn test_heading_fragment_is_not_escaped() {
        let (out, _) = rewrite_cross_references("[[bar#Setup (Linux)]]", &notes(), "/notes");
        assert_eq!(out, "[bar](/notes/bar#setup-(linux))");
    }

    #[test]
    fn test_unresolved_cross_reference_untouched() {
        let text = "[[Nowhere]] and [[nowhere#x|y]]";
        let (out, targets) = rewrite_cross_references(text, &notes(), "/notes");
        assert_eq!(out, text);
        assert!(targets.is_empty());
    }

    #[test]
    fn test_repeated_references_are_all_reported() {
        let (_, targets) = rewrite_cross_references("[[bar]] [[bar|again]]", &notes(), "/notes");
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_stem_match_is_exact() {
        let (out, targets) = rewrite_cross_references("[[Bar]]", &notes(), "/notes");
        assert_eq!(out, "[[Bar]]");
        assert!(targets.is_empty());
    }

    #[test]
    fn test_attachment_pass_runs_first() {
        let rewriter = LinkRewriter::new(notes(), attachments(), "/notes", "/attachments");
        let (out, targets) = rewriter.rewrite("![[pic.png]] [[bar]]");
        assert_eq!(
            out,
            "![pic.png](/attachments/projects/img/pic.png) [bar](/notes/bar)"
        );
        assert_eq!(targets, vec![DocPath::new("bar")]);
    }

    #[test]
    fn test_unresolved_attachment_falls_through_to_notes() {
        let rewriter = LinkRewriter::new(notes(), Lookup::new(), "/notes", "/attachments");
        let (out, targets) = rewriter.rewrite("![[pic.png]]");
        assert_eq!(out, "![pic.png](/notes/misc/pic.png)");
        assert_eq!(targets, vec![DocPath::new("misc/pic.png")]);
    }

    #[test]
    fn test_body_without_links_is_unchanged() {
        let rewriter = LinkRewriter::new(notes(), attachments(), "/notes", "/attachments");
        let (out, targets) = rewriter.rewrite("plain [text](url)");
        assert_eq!(out, "plain [text](url)");
        assert!(targets.is_empty());
    }
}
