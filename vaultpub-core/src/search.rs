//! Plain-text extraction and search records.

use crate::models::Frontmatter;
use crate::slug::title_from_stem;
use regex::Regex;
use std::sync::OnceLock;
use vaultpub_types::{DocPath, SearchRecord};

struct Patterns {
    fenced_code: Regex,
    inline_code: Regex,
    image: Regex,
    link: Regex,
    markers: Regex,
    whitespace: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        fenced_code: Regex::new(r"(?s)```.*?```").unwrap(),
        inline_code: Regex::new(r"`[^`\n]*`").unwrap(),
        image: Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap(),
        link: Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap(),
        markers: Regex::new(r"[#*_~>`\[\]|\-]+").unwrap(),
        whitespace: Regex::new(r"\s+").unwrap(),
    })
}

/// Strip markdown down to searchable text
///
/// The steps run in a fixed order: code blocks, inline code and images go
/// first, links are unwrapped to their text before marker runs are turned
/// into spaces (brackets and hyphens are markers), then whitespace is collapsed.
///
/// ```
/// use vaultpub_core::search::plain_text;
///
/// let md = "# Title\n\nSee [the **guide**](/notes/guide) and `code`.\n![img](/a.png)";
/// assert_eq!(plain_text(md), "Title See the guide and .");
/// ```
pub fn plain_text(markdown: &str) -> String {
    let p = patterns();
    let text = p.fenced_code.replace_all(markdown, " ");
    let text = p.inline_code.replace_all(&text, " ");
    let text = p.image.replace_all(&text, "");
    let text = p.link.replace_all(&text, "$1");
    let text = p.markers.replace_all(&text, " ");
    p.whitespace.replace_all(&text, " ").trim().to_string()
}

/// Explicit `title` wins, otherwise the file stem with separators turned into spaces
pub fn resolve_title(frontmatter: &Frontmatter, stem: &str) -> String {
    frontmatter
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| title_from_stem(stem))
}

/// Search record for a transformed body
pub fn build_search_record(path: DocPath, title: &str, body: &str) -> SearchRecord {
    SearchRecord {
        path,
        title: title.to_string(),
        content: plain_text(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_code_removed() {
        let md = "before\n```rust\nfn main() { [[x]] }\n```\nafter";
        assert_eq!(plain_text(md), "before after");
    }

    #[test]
    fn test_links_unwrapped_before_markers() {
        let md = "Go to [my_page](/notes/my_page) now";
        assert_eq!(plain_text(md), "Go to my page now");
    }

    #[test]
    fn test_images_removed() {
        assert_eq!(plain_text("a ![pic.png](/attachments/pic.png) b"), "a b");
    }

    #[test]
    fn test_residual_wikilinks_lose_brackets() {
        assert_eq!(plain_text("see [[Missing Page]]"), "see Missing Page");
    }

    #[test]
    fn test_markers_and_whitespace() {
        let md = "## Heading\n\n> *quoted* ~~gone~~ text\n\n| a | b |";
        assert_eq!(plain_text(md), "Heading quoted gone text a b");
    }

    #[test]
    fn test_markers_separate_words() {
        assert_eq!(
            plain_text("snake_case_word a#b x`y`z - item well-known"),
            "snake case word a b x z item well known"
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(plain_text("  \n\n "), "");
    }

    #[test]
    fn test_resolve_title() {
        let fm: Frontmatter = serde_yaml::from_str("title: Explicit").unwrap();
        assert_eq!(resolve_title(&fm, "file-name"), "Explicit");
        assert_eq!(resolve_title(&Frontmatter::default(), "file-name_x"), "file name x");
    }

    #[test]
    fn test_build_search_record() {
        let record = build_search_record(DocPath::new("foo"), "foo", "[bar](/notes/bar)");
        assert_eq!(record.path.as_str(), "foo");
        assert_eq!(record.content, "bar");
    }
}
