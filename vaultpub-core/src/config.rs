//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the vaultpub.yml schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub notes: NotesConfig,

    #[serde(default)]
    pub blog: BlogConfig,

    #[serde(default)]
    pub attachments: AttachmentsConfig,

    #[serde(default)]
    pub links: LinksConfig,

    // Internal: directory that relative paths resolve against
    #[serde(skip)]
    root: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the knowledge base (notes and attachments are discovered here)
    #[serde(default = "default_vault")]
    pub vault: PathBuf,

    /// Root scanned for blog posts
    #[serde(default = "default_blog_source")]
    pub blog_source: PathBuf,

    #[serde(default = "default_notes_output")]
    pub notes_output: PathBuf,

    #[serde(default = "default_blog_output")]
    pub blog_output: PathBuf,

    #[serde(default = "default_attachments_output")]
    pub attachments_output: PathBuf,

    #[serde(default = "default_search_index")]
    pub search_index: PathBuf,

    #[serde(default = "default_backlinks")]
    pub backlinks: PathBuf,
}

fn default_vault() -> PathBuf {
    PathBuf::from("..")
}

fn default_blog_source() -> PathBuf {
    PathBuf::from(".")
}

fn default_notes_output() -> PathBuf {
    PathBuf::from("src/content/notes")
}

fn default_blog_output() -> PathBuf {
    PathBuf::from("src/content/blog")
}

fn default_attachments_output() -> PathBuf {
    PathBuf::from("public/attachments")
}

fn default_search_index() -> PathBuf {
    PathBuf::from("public/search-index.json")
}

fn default_backlinks() -> PathBuf {
    PathBuf::from("public/backlinks.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            vault: default_vault(),
            blog_source: default_blog_source(),
            notes_output: default_notes_output(),
            blog_output: default_blog_output(),
            attachments_output: default_attachments_output(),
            search_index: default_search_index(),
            backlinks: default_backlinks(),
        }
    }
}

/// How note destinations are derived from source paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotesLayout {
    /// Mirror the vault structure
    #[default]
    Nested,
    /// File name only, every note lands directly in the notes directory
    Flat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Top-level vault folders are only descended into when they start with one of these
    #[serde(default = "default_include_prefixes")]
    pub include_prefixes: Vec<String>,

    /// Directory names skipped at every level
    #[serde(default = "default_notes_exclude")]
    pub exclude: Vec<String>,

    /// Extra document/archive formats copied verbatim next to the notes
    #[serde(default)]
    pub document_extensions: Vec<String>,

    /// Publish `.tex` sources and `.apkg` decks as generated pages
    #[serde(default = "default_true")]
    pub convert_documents: bool,

    #[serde(default)]
    pub layout: NotesLayout,

    /// Turn "020-projects" into "projects" for the top-level folder
    #[serde(default = "default_true")]
    pub strip_numeric_prefix: bool,
}

fn default_include_prefixes() -> Vec<String> {
    [
        "000", "100", "200", "300", "400", "500", "600", "700", "800", "900", "998", "999",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_notes_exclude() -> Vec<String> {
    ["Blog", "node_modules", ".git", ".obsidian"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            include_prefixes: default_include_prefixes(),
            exclude: default_notes_exclude(),
            document_extensions: Vec::new(),
            convert_documents: true,
            layout: NotesLayout::default(),
            strip_numeric_prefix: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory names skipped while scanning for posts
    #[serde(default = "default_blog_exclude")]
    pub exclude: Vec<String>,
}

fn default_blog_exclude() -> Vec<String> {
    ["node_modules", ".git", ".astro", "public"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exclude: default_blog_exclude(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentsConfig {
    #[serde(default = "default_attachment_extensions")]
    pub extensions: Vec<String>,
}

fn default_attachment_extensions() -> Vec<String> {
    [
        // images
        "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "avif", "tif", "tiff", "ico",
        // documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "csv", "txt",
        "epub", // audio
        "mp3", "wav", "ogg", "flac", "m4a", // video
        "mp4", "webm", "mov", "mkv", "avi", // archives
        "zip", "tar", "gz", "7z", "rar",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            extensions: default_attachment_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// URL segment prefixed to resolved note links
    #[serde(default = "default_notes_root")]
    pub notes_root: String,

    /// URL segment prefixed to resolved attachment links
    #[serde(default = "default_attachments_root")]
    pub attachments_root: String,
}

fn default_notes_root() -> String {
    String::from("/notes")
}

fn default_attachments_root() -> String {
    String::from("/attachments")
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            notes_root: default_notes_root(),
            attachments_root: default_attachments_root(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().canonicalize()?;
        let contents = std::fs::read_to_string(&path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Relative paths resolve against the config file's directory
        config.root = path.parent().map(Path::to_path_buf);

        Ok(config)
    }

    /// Parse configuration from YAML text. Relative paths stay relative to the cwd.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty document is a valid "all defaults" config
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Default configuration anchored at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn vault_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.vault)
    }

    pub fn blog_source_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.blog_source)
    }

    pub fn notes_output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.notes_output)
    }

    pub fn blog_output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.blog_output)
    }

    pub fn attachments_output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.attachments_output)
    }

    pub fn search_index_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.search_index)
    }

    pub fn backlinks_path(&self) -> PathBuf {
        self.resolve_path(&self.paths.backlinks)
    }

    /// Resolve a path relative to the config root
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(root) = &self.root {
            root.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

/// Ensure a URL root has a leading slash and no trailing slash ("/notes")
pub fn normalize_url_root(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
