//! Generated pages for LaTeX sources and Anki decks.
//!
//! Neither format is markdown, so the file itself is not published as a note.
//! Instead a page with generated metadata is written next to where the note
//! would go, and the search index gets a short description of it.

use serde::Serialize;
use std::path::Path;

/// Formats found by the notes scan that get a generated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.tex`: source embedded in a fenced block
    Latex,
    /// `.apkg`: binary deck, described but not read
    AnkiDeck,
}

#[derive(Serialize)]
struct GeneratedMetadata<'a> {
    title: &'a str,
    description: String,
    publish: bool,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl DocumentFormat {
    pub const EXTENSIONS: [&'static str; 2] = ["tex", "apkg"];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "tex" => Some(DocumentFormat::Latex),
            "apkg" => Some(DocumentFormat::AnkiDeck),
            _ => None,
        }
    }

    /// Human-readable kind, also the prefix of the search text
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Latex => "LaTeX document",
            DocumentFormat::AnkiDeck => "Anki deck",
        }
    }

    fn page_type(&self) -> &'static str {
        match self {
            DocumentFormat::Latex => "latex",
            DocumentFormat::AnkiDeck => "anki",
        }
    }

    /// Whether the page embeds the file's text
    pub fn reads_source(&self) -> bool {
        matches!(self, DocumentFormat::Latex)
    }

    /// Full page: metadata block then body
    ///
    /// `source` is the file's text for formats that embed it.
    pub fn render(
        &self,
        title: &str,
        source_path: &Path,
        source: Option<&str>,
    ) -> Result<String, serde_yaml::Error> {
        let metadata = serde_yaml::to_string(&GeneratedMetadata {
            title,
            description: format!("{}: {}", self.label(), title),
            publish: true,
            kind: self.page_type(),
        })?;

        let body = match self {
            DocumentFormat::Latex => {
                format!("# {}\n\n```latex\n{}\n```", title, source.unwrap_or_default())
            }
            DocumentFormat::AnkiDeck => {
                let file_name = source_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!(
                    "# {}\n\n## Anki Deck\n\n\
                     This is an Anki flashcard deck. Download the file to import into Anki.\n\n\
                     **File:** `{}`\n\n\
                     *Note: This deck can be imported into Anki for spaced repetition learning.*",
                    title, file_name
                )
            }
        };

        Ok(format!("---\n{}---\n{}\n", metadata, body))
    }

    /// Text indexed for the generated page
    pub fn search_content(&self, title: &str) -> String {
        format!("{} {}", self.label(), title)
    }
}
