//! Frontmatter parsing and the publish decision for blog posts.

use crate::models::{Frontmatter, SourceDocument};
use regex::Regex;
use serde_yaml::Value;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Frontmatter is not a mapping")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)^(---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|$))(.*)$").unwrap()
    })
}

/// Split markdown content into its metadata block and body
///
/// Content without a leading `---` block parses to empty metadata with the full
/// content as body.
///
/// # Example
///
/// ```
/// use vaultpub_core::frontmatter::parse_frontmatter;
/// use std::path::Path;
///
/// let content = "---\ntitle: My Post\npublish: true\n---\n# Hello World\n";
///
/// let doc = parse_frontmatter(Path::new("post.md"), content).unwrap();
/// assert_eq!(doc.frontmatter.title(), Some("My Post"));
/// assert_eq!(doc.body, "# Hello World\n");
/// ```
pub fn parse_frontmatter(path: &Path, content: &str) -> Result<SourceDocument, FrontmatterError> {
    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok(SourceDocument {
            path: path.to_path_buf(),
            frontmatter: Frontmatter::default(),
            raw_frontmatter: None,
            body: content.to_string(),
        });
    };

    let block = captures.get(1).map_or("", |m| m.as_str());
    let yaml = captures.get(2).map_or("", |m| m.as_str());
    let body = captures.get(3).map_or("", |m| m.as_str());

    let frontmatter = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => Frontmatter::default(),
        Value::Mapping(mapping) => Frontmatter(mapping),
        _ => return Err(FrontmatterError::NotAMapping),
    };

    Ok(SourceDocument {
        path: path.to_path_buf(),
        frontmatter,
        raw_frontmatter: Some(block.to_string()),
        body: body.to_string(),
    })
}

/// Decide whether a blog post is published
///
/// `publish` is consulted first, then `published`, then `draft`; the first
/// non-null value is the candidate. A post with no candidate and no `draft`
/// key stays private. When a `draft` key exists at all, even with a null
/// value, the answer is its negation regardless of which key was found first.
pub fn should_publish(frontmatter: &Frontmatter) -> bool {
    let field = ["publish", "published", "draft"]
        .iter()
        .find_map(|key| frontmatter.get(key).filter(|v| !v.is_null()));

    if let Some(draft) = frontmatter.get("draft") {
        return !truthy(draft);
    }

    field.is_some_and(truthy)
}

/// Loose boolean coercion for metadata values
///
/// Any non-empty string is true, including "false" and "no".
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i != 0
            } else if let Some(u) = n.as_u64() {
                u != 0
            } else {
                n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan())
            }
        }
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => truthy(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fm(yaml: &str) -> Frontmatter {
        parse_frontmatter(Path::new("t.md"), &format!("---\n{yaml}\n---\nbody"))
            .unwrap()
            .frontmatter
    }

    #[test]
    fn test_parse_valid_frontmatter() {
        let content = r#"---
title: Test Post
publish: true
tags: [a, b]
---

# Hello World

This is the content."#;

        let doc = parse_frontmatter(Path::new("post.md"), content).unwrap();
        assert_eq!(doc.frontmatter.title(), Some("Test Post"));
        assert_eq!(doc.frontmatter.get("publish"), Some(&Value::Bool(true)));
        assert!(doc.body.contains("# Hello World"));
        assert_eq!(
            doc.raw_frontmatter.as_deref(),
            Some("---\ntitle: Test Post\npublish: true\ntags: [a, b]\n---\n")
        );
    }

    #[test]
    fn test_parse_no_frontmatter() {
        let content = "# Just Content\n\nNo frontmatter here.";
        let doc = parse_frontmatter(Path::new("x.md"), content).unwrap();
        assert!(doc.frontmatter.is_empty());
        assert!(doc.raw_frontmatter.is_none());
        assert_eq!(doc.body, content);
    }

    #[test]
    fn test_parse_empty_block() {
        let doc = parse_frontmatter(Path::new("x.md"), "---\n---\nBody").unwrap();
        assert!(doc.frontmatter.is_empty());
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_parse_block_at_end_of_file() {
        let doc = parse_frontmatter(Path::new("x.md"), "---\ntitle: T\n---").unwrap();
        assert_eq!(doc.frontmatter.title(), Some("T"));
        assert_eq!(doc.body, "");
    }

    #[test]
    fn test_parse_crlf() {
        let doc = parse_frontmatter(Path::new("x.md"), "---\r\npublish: yes\r\n---\r\nBody").unwrap();
        assert!(doc.frontmatter.contains_key("publish"));
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn test_invalid_yaml() {
        let content = "---\ntitle: Test\ninvalid yaml: [unclosed\n---\n\nContent.";
        assert!(parse_frontmatter(Path::new("x.md"), content).is_err());
    }

    #[test]
    fn test_scalar_block_is_not_a_mapping() {
        let result = parse_frontmatter(Path::new("x.md"), "---\njust a string\n---\nBody");
        assert!(matches!(result, Err(FrontmatterError::NotAMapping)));
    }

    #[test]
    fn test_no_publish_keys_is_private() {
        assert!(!should_publish(&Frontmatter::default()));
        assert!(!should_publish(&fm("title: Hello\ntags: [x]")));
    }

    #[test]
    fn test_publish_field() {
        assert!(should_publish(&fm("publish: true")));
        assert!(!should_publish(&fm("publish: false")));
        assert!(should_publish(&fm("publish: 'true'")));
        assert!(should_publish(&fm("publish: 1")));
        assert!(!should_publish(&fm("publish: 0")));
        assert!(should_publish(&fm("publish: 'no'")));
        assert!(should_publish(&fm("publish: 'false'")));
        assert!(!should_publish(&fm("publish: ''")));
    }

    #[test]
    fn test_published_fallback() {
        assert!(should_publish(&fm("published: true")));
        assert!(!should_publish(&fm("published: false")));
        assert!(should_publish(&fm("publish: ~\npublished: true")));
    }

    #[test]
    fn test_draft_alone() {
        assert!(!should_publish(&fm("draft: true")));
        assert!(should_publish(&fm("draft: false")));
        // Any non-empty string counts as set
        assert!(!should_publish(&fm("draft: 'false'")));
    }

    #[test]
    fn test_draft_takes_priority() {
        assert!(!should_publish(&fm("publish: true\ndraft: true")));
        assert!(should_publish(&fm("publish: false\ndraft: false")));
        assert!(!should_publish(&fm("published: true\ndraft: yes")));
    }

    #[test]
    fn test_null_draft_with_publish() {
        // The key exists, so its (falsy) value is negated
        assert!(should_publish(&fm("publish: false\ndraft:")));
        assert!(should_publish(&fm("draft:")));
        assert!(should_publish(&fm("draft: ~")));
        // Null publish keys without a draft key leave nothing to go on
        assert!(!should_publish(&fm("publish: ~\npublished: ~")));
    }

    #[test]
    fn test_truthy() {
        assert!(!truthy(&Value::Null));
        assert!(truthy(&Value::String("TRUE".into())));
        assert!(truthy(&Value::String(" Off ".into())));
        assert!(truthy(&Value::String("0".into())));
        assert!(!truthy(&Value::String(String::new())));
        assert!(truthy(&Value::Sequence(vec![])));
        assert!(!truthy(&serde_yaml::from_str::<Value>("0.0").unwrap()));
        assert!(truthy(&serde_yaml::from_str::<Value>("0.5").unwrap()));
    }
}
