//! # vaultpub-core
//!
//! Core library for the vaultpub publishing pipeline.
//!
//! This crate discovers notes, posts and attachments in a vault, rewrites
//! wiki-style links into site URLs, and produces the search index and
//! backlink map consumed by the site.

pub mod attachments;
pub mod builder;
pub mod config;
pub mod convert;
pub mod error;
pub mod frontmatter;
pub mod links;
pub mod lookup;
pub mod models;
pub mod search;
pub mod slug;
pub mod walker;
pub mod writer;

pub use builder::{PublishOutput, VaultPublisher};
pub use config::{Config, ConfigError, NotesLayout};
pub use error::SyncError;
pub use frontmatter::{parse_frontmatter, should_publish, FrontmatterError};
pub use links::LinkRewriter;
pub use lookup::Lookup;
pub use models::{Frontmatter, LinkGraph, RunReport};
