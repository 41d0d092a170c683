//! Publishing run - orchestrates discovery, link rewriting, and output.
//!
//! Discovery and lookup construction happen synchronously; once both lookups
//! are frozen, attachments are copied and notes and posts are transformed
//! concurrently, one task per file. Each task hands back its own result and
//! the results are merged in discovery order after the join.

use crate::{
    attachments::{copy_all, plan_attachments, CopyPlan},
    config::{Config, NotesLayout},
    convert::DocumentFormat,
    error::SyncError,
    frontmatter::{parse_frontmatter, should_publish},
    links::LinkRewriter,
    lookup::{DestinationSet, Lookup},
    models::*,
    search::{build_search_record, resolve_title},
    slug::destination_path,
    walker::{discover, SourceFile, WalkRules},
    writer::{clean_dir, write_document, write_json_artifact},
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use vaultpub_types::{BacklinksMap, DocPath, SearchRecord};

/// Which output tree a transformed document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    /// Vault note: always written once discovered
    Note,
    /// Blog post: written only when its metadata says so
    Post,
    /// Generated page for a non-markdown note source
    Converted(DocumentFormat),
}

/// A note, post or convertible document scheduled for transformation
#[derive(Debug, Clone)]
pub struct DocPlan {
    pub kind: DocKind,
    pub source: PathBuf,
    pub stem: String,
    /// Output-relative file, extension included
    pub file: DocPath,
    /// Extension-less key used in links, search records and backlinks
    pub key: DocPath,
}

/// Everything decided before any file is opened
#[derive(Debug)]
pub struct PublishPlan {
    pub notes: Vec<DocPlan>,
    pub posts: Vec<DocPlan>,
    /// Document-format files copied verbatim into the notes tree
    pub documents: Vec<CopyPlan>,
    pub attachments: Vec<CopyPlan>,
    pub rewriter: LinkRewriter,
    pub collisions: usize,
}

/// Result of one transformation unit
#[derive(Debug)]
enum DocOutcome {
    Published(PublishedNote),
    Unpublished,
    Malformed,
}

/// What a run produced, for callers that report on it
#[derive(Debug, Clone, Default)]
pub struct PublishOutput {
    pub report: RunReport,
    pub records: Vec<SearchRecord>,
    pub backlinks: BacklinksMap,
    pub shadowed_stems: Vec<(String, DocPath)>,
    pub shadowed_attachments: Vec<(String, DocPath)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Write,
    DryRun,
}

/// Main publishing pipeline
pub struct VaultPublisher {
    config: Config,
}

impl VaultPublisher {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline and write every output
    pub async fn publish(&self) -> Result<PublishOutput, SyncError> {
        self.execute(Mode::Write).await
    }

    /// Run discovery, classification and link resolution without writing anything
    pub async fn check(&self) -> Result<PublishOutput, SyncError> {
        self.execute(Mode::DryRun).await
    }

    async fn execute(&self, mode: Mode) -> Result<PublishOutput, SyncError> {
        let notes_out = self.config.notes_output_dir();
        let blog_out = self.config.blog_output_dir();
        let attachments_out = self.config.attachments_output_dir();

        if mode == Mode::Write {
            clean_dir(&notes_out).await?;
            clean_dir(&attachments_out).await?;
            if self.config.blog.enabled {
                clean_dir(&blog_out).await?;
            }
        }

        let plan = self.plan()?;
        let mut report = RunReport {
            shadowed_stems: plan.rewriter.notes().shadowed_count(),
            shadowed_attachments: plan.rewriter.attachments().shadowed_count(),
            collisions: plan.collisions,
            ..RunReport::default()
        };
        let shadowed_stems = plan.rewriter.notes().shadowed().to_vec();
        let shadowed_attachments = plan.rewriter.attachments().shadowed().to_vec();

        // Frozen from here on: workers only ever read the lookups
        let rewriter = Arc::new(plan.rewriter);

        match mode {
            Mode::Write => {
                report.attachments_copied = copy_all(plan.attachments, &attachments_out).await?;
                report.documents_copied = copy_all(plan.documents, &notes_out).await?;
            }
            Mode::DryRun => {
                report.attachments_copied = plan.attachments.len();
                report.documents_copied = plan.documents.len();
            }
        }
        tracing::info!(
            "Copied {} attachments and {} documents",
            report.attachments_copied,
            report.documents_copied
        );

        let write_to = |dir: &Path| (mode == Mode::Write).then(|| dir.to_path_buf());
        let note_outcomes = transform_all(plan.notes, &rewriter, write_to(&notes_out)).await?;
        let post_outcomes = transform_all(plan.posts, &rewriter, write_to(&blog_out)).await?;

        let mut graph = LinkGraph::new();
        let mut records = Vec::new();
        for (kind, outcome) in note_outcomes.into_iter().chain(post_outcomes) {
            match outcome {
                DocOutcome::Published(note) => {
                    match kind {
                        DocKind::Note => report.notes_written += 1,
                        DocKind::Post => report.posts_published += 1,
                        DocKind::Converted(_) => report.documents_converted += 1,
                    }
                    graph.add_note(&note.record.path, &note.record.title, &note.edges);
                    records.push(note.record);
                }
                DocOutcome::Unpublished => report.posts_skipped += 1,
                DocOutcome::Malformed => report.malformed += 1,
            }
        }

        let backlinks = graph.backlinks();
        report.search_records = records.len();
        report.backlink_targets = backlinks.len();

        if mode == Mode::Write {
            write_json_artifact(&self.config.search_index_path(), "search index", &records).await?;
            write_json_artifact(&self.config.backlinks_path(), "backlinks", &backlinks).await?;
        }

        tracing::info!(
            "Published {} notes, {} generated pages and {} posts ({} skipped, {} malformed), {} links",
            report.notes_written,
            report.documents_converted,
            report.posts_published,
            report.posts_skipped,
            report.malformed,
            graph.edge_count()
        );

        Ok(PublishOutput {
            report,
            records,
            backlinks,
            shadowed_stems,
            shadowed_attachments,
        })
    }

    /// Discover every source and build both lookups
    pub fn plan(&self) -> Result<PublishPlan, SyncError> {
        let config = &self.config;
        let vault = config.vault_dir();
        let outputs = [
            config.notes_output_dir(),
            config.blog_output_dir(),
            config.attachments_output_dir(),
        ];

        let mut note_extensions = vec!["md".to_string()];
        note_extensions.extend(config.notes.document_extensions.iter().cloned());
        if config.notes.convert_documents {
            note_extensions.extend(DocumentFormat::EXTENSIONS.iter().map(|e| e.to_string()));
        }
        let note_rules = WalkRules::new(&note_extensions)
            .with_prefixes(&config.notes.include_prefixes)
            .with_excluded_names(&config.notes.exclude)
            .with_excluded_paths(outputs.clone());
        let attachment_rules = WalkRules::new(&config.attachments.extensions)
            .with_prefixes(&config.notes.include_prefixes)
            .with_excluded_names(&config.notes.exclude)
            .with_excluded_paths(outputs.clone());

        let note_files = discover(&vault, &note_rules)?;
        let attachment_files = discover(&vault, &attachment_rules)?;
        tracing::info!(
            "Found {} note files and {} attachments in {:?}",
            note_files.len(),
            attachment_files.len(),
            vault
        );

        let mut note_claims = DestinationSet::new();
        let (notes, documents, note_lookup) = self.plan_notes(&note_files, &mut note_claims);

        let mut attachment_claims = DestinationSet::new();
        let (attachments, attachment_lookup) = plan_attachments(
            &attachment_files,
            config.notes.strip_numeric_prefix,
            &mut attachment_claims,
        );

        let mut post_claims = DestinationSet::new();
        let posts = if config.blog.enabled {
            let blog_rules = WalkRules::new(["md"])
                .with_excluded_names(&config.blog.exclude)
                .with_excluded_paths(outputs);
            let post_files = discover(&config.blog_source_dir(), &blog_rules)?;
            tracing::info!("Found {} candidate blog posts", post_files.len());
            plan_posts(&post_files, &mut post_claims)
        } else {
            Vec::new()
        };

        let rewriter = LinkRewriter::new(
            note_lookup,
            attachment_lookup,
            &config.links.notes_root,
            &config.links.attachments_root,
        );

        Ok(PublishPlan {
            notes,
            posts,
            documents,
            attachments,
            rewriter,
            collisions: note_claims.collisions()
                + attachment_claims.collisions()
                + post_claims.collisions(),
        })
    }

    fn plan_notes(
        &self,
        files: &[SourceFile],
        claims: &mut DestinationSet,
    ) -> (Vec<DocPlan>, Vec<CopyPlan>, Lookup) {
        let notes_config = &self.config.notes;
        let mut notes = Vec::new();
        let mut documents = Vec::new();
        let mut lookup = Lookup::new();

        for file in files {
            let file_dest = match notes_config.layout {
                NotesLayout::Nested => {
                    destination_path(&file.rel, notes_config.strip_numeric_prefix)
                }
                NotesLayout::Flat => DocPath::new(file.file_name()),
            };
            let extension = extension_of(&file.path).unwrap_or_default();
            let format = DocumentFormat::from_extension(&extension)
                .filter(|_| notes_config.convert_documents);
            let category = match (extension.as_str(), format) {
                ("md", _) => FileCategory::Markdown,
                (_, Some(_)) => FileCategory::Converted,
                _ => FileCategory::Document,
            };

            let file_dest = match category {
                FileCategory::Converted => file_dest.with_extension("md"),
                _ => file_dest,
            };
            if !claims.claim(&file_dest, &file.path) {
                continue;
            }
            tracing::debug!("Planned {} {:?} -> {}", category.as_str(), file.rel, file_dest);

            let kind = match (category, format) {
                (FileCategory::Markdown, _) => DocKind::Note,
                (FileCategory::Converted, Some(format)) => DocKind::Converted(format),
                _ => {
                    documents.push(CopyPlan {
                        source: file.path.clone(),
                        dest: file_dest,
                    });
                    continue;
                }
            };

            let key = file_dest.without_extension();
            let stem = file.stem();
            // Generated pages are indexed but never link targets
            if kind == DocKind::Note {
                lookup.insert_if_absent(stem.clone(), key.clone());
            }
            notes.push(DocPlan {
                kind,
                source: file.path.clone(),
                stem,
                file: file_dest,
                key,
            });
        }

        (notes, documents, lookup)
    }
}

/// Posts land flat in the blog directory under their own file name
fn plan_posts(files: &[SourceFile], claims: &mut DestinationSet) -> Vec<DocPlan> {
    files
        .iter()
        .filter_map(|file| {
            let dest = DocPath::new(file.file_name());
            if !claims.claim(&dest, &file.path) {
                return None;
            }
            Some(DocPlan {
                kind: DocKind::Post,
                source: file.path.clone(),
                stem: file.stem(),
                key: dest.without_extension(),
                file: dest,
            })
        })
        .collect()
}

/// Transform every planned document concurrently, results in plan order
async fn transform_all(
    plans: Vec<DocPlan>,
    rewriter: &Arc<LinkRewriter>,
    out_dir: Option<PathBuf>,
) -> Result<Vec<(DocKind, DocOutcome)>, SyncError> {
    let mut tasks = JoinSet::new();
    for (idx, plan) in plans.into_iter().enumerate() {
        let rewriter = Arc::clone(rewriter);
        let out_dir = out_dir.clone();
        tasks.spawn(async move {
            let kind = plan.kind;
            process_document(plan, &rewriter, out_dir.as_deref())
                .await
                .map(|outcome| (idx, kind, outcome))
        });
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined??);
    }
    outcomes.sort_by_key(|(idx, _, _)| *idx);
    Ok(outcomes
        .into_iter()
        .map(|(_, kind, outcome)| (kind, outcome))
        .collect())
}

async fn process_document(
    plan: DocPlan,
    rewriter: &LinkRewriter,
    out_dir: Option<&Path>,
) -> Result<DocOutcome, SyncError> {
    if let DocKind::Converted(format) = plan.kind {
        return convert_document(plan, format, out_dir).await;
    }

    let Some(source) = load_document(&plan.source).await? else {
        return Ok(DocOutcome::Malformed);
    };

    if plan.kind == DocKind::Post && !should_publish(&source.frontmatter) {
        tracing::debug!("Skipped {:?} (not marked for publishing)", plan.source);
        return Ok(DocOutcome::Unpublished);
    }

    let (body, edges) = rewriter.rewrite(&source.body);
    let title = resolve_title(&source.frontmatter, &plan.stem);
    let record = build_search_record(plan.key.clone(), &title, &body);

    if let Some(out_dir) = out_dir {
        let output = OutputDocument::from_source(plan.file.clone(), &source, &body);
        write_document(out_dir, &output.dest, &output.contents).await?;
        tracing::debug!("Wrote {:?} -> {}", plan.source, output.dest);
    }

    Ok(DocOutcome::Published(PublishedNote { record, edges }))
}

async fn convert_document(
    plan: DocPlan,
    format: DocumentFormat,
    out_dir: Option<&Path>,
) -> Result<DocOutcome, SyncError> {
    let source = if format.reads_source() {
        match read_text(&plan.source).await? {
            Some(text) => Some(text),
            None => return Ok(DocOutcome::Malformed),
        }
    } else {
        None
    };

    if let Some(out_dir) = out_dir {
        let contents = format
            .render(&plan.stem, &plan.source, source.as_deref())
            .map_err(|e| SyncError::Render {
                path: plan.source.clone(),
                source: e,
            })?;
        write_document(out_dir, &plan.file, &contents).await?;
        tracing::debug!("Converted {} {:?} -> {}", format.label(), plan.source, plan.file);
    }

    let record = SearchRecord {
        path: plan.key,
        title: plan.stem.clone(),
        content: format.search_content(&plan.stem),
    };
    Ok(DocOutcome::Published(PublishedNote {
        record,
        edges: Vec::new(),
    }))
}

/// Read a file as UTF-8, `None` (logged) when it is not valid UTF-8
async fn read_text(path: &Path) -> Result<Option<String>, SyncError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            tracing::error!("Skipping {:?}: not valid UTF-8", path);
            Ok(None)
        }
        Err(e) => Err(SyncError::io(path, e)),
    }
}

/// Read and split a markdown file
///
/// Content that is not UTF-8 or whose metadata does not parse is logged and
/// reported as `None`; any other read failure is fatal.
async fn load_document(path: &Path) -> Result<Option<SourceDocument>, SyncError> {
    let Some(content) = read_text(path).await? else {
        return Ok(None);
    };

    match parse_frontmatter(path, &content) {
        Ok(doc) => Ok(Some(doc)),
        Err(e) => {
            tracing::error!("Error parsing frontmatter in {:?}: {}", path, e);
            Ok(None)
        }
    }
}
