//! Attachment planning and concurrent copying.

use crate::error::SyncError;
use crate::lookup::{DestinationSet, Lookup};
use crate::slug::destination_path;
use crate::walker::SourceFile;
use crate::writer::copy_file;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use vaultpub_types::DocPath;

/// A file copied verbatim into an output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPlan {
    pub source: PathBuf,
    /// Output-relative destination, extension included
    pub dest: DocPath,
}

/// Map discovered attachments to destinations and build the name lookup
///
/// Every attachment with a free destination is planned for copying, but only
/// the first one per bare file name is reachable through the lookup.
pub fn plan_attachments(
    files: &[SourceFile],
    strip_numeric_prefix: bool,
    claims: &mut DestinationSet,
) -> (Vec<CopyPlan>, Lookup) {
    let mut plans = Vec::with_capacity(files.len());
    let mut lookup = Lookup::new();

    for file in files {
        let dest = destination_path(&file.rel, strip_numeric_prefix);
        if !claims.claim(&dest, &file.path) {
            continue;
        }
        lookup.insert_if_absent(dest.file_name(), dest.clone());
        plans.push(CopyPlan {
            source: file.path.clone(),
            dest,
        });
    }

    (plans, lookup)
}

/// Copy every planned file into `out_dir` concurrently
///
/// All copies start at once; the first failure aborts the stage.
pub async fn copy_all(plans: Vec<CopyPlan>, out_dir: &Path) -> Result<usize, SyncError> {
    let mut tasks = JoinSet::new();
    for plan in plans {
        let out_dir = out_dir.to_path_buf();
        tasks.spawn(async move {
            copy_file(&plan.source, &out_dir, &plan.dest).await?;
            tracing::debug!("Copied {:?} -> {}", plan.source, plan.dest);
            Ok::<_, SyncError>(())
        });
    }

    let mut copied = 0;
    while let Some(joined) = tasks.join_next().await {
        joined??;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(rel: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/vault").join(rel),
            rel: PathBuf::from(rel),
        }
    }

    #[test]
    fn test_plan_preserves_structure_and_strips_prefix() {
        let mut claims = DestinationSet::new();
        let files = [source("020-projects/img/pic.png"), source("100-areas/doc.pdf")];
        let (plans, lookup) = plan_attachments(&files, true, &mut claims);

        assert_eq!(plans[0].dest.as_str(), "projects/img/pic.png");
        assert_eq!(plans[1].dest.as_str(), "areas/doc.pdf");
        assert_eq!(
            lookup.get("pic.png"),
            Some(&DocPath::new("projects/img/pic.png"))
        );
    }

    #[test]
    fn test_same_name_first_wins_but_both_copied() {
        let mut claims = DestinationSet::new();
        let files = [source("000-a/pic.png"), source("100-b/pic.png")];
        let (plans, lookup) = plan_attachments(&files, false, &mut claims);

        assert_eq!(plans.len(), 2);
        assert_eq!(lookup.get("pic.png"), Some(&DocPath::new("000-a/pic.png")));
        assert_eq!(lookup.shadowed_count(), 1);
    }

    #[test]
    fn test_destination_collision_after_strip() {
        let mut claims = DestinationSet::new();
        let files = [source("010-notes/pic.png"), source("020-notes/pic.png")];
        let (plans, _) = plan_attachments(&files, true, &mut claims);

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].source, PathBuf::from("/vault/010-notes/pic.png"));
        assert_eq!(claims.collisions(), 1);
    }

    #[tokio::test]
    async fn test_copy_all() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.png"), [1u8, 2, 3]).unwrap();
        std::fs::write(src.path().join("b.pdf"), b"pdf").unwrap();

        let plans = vec![
            CopyPlan {
                source: src.path().join("a.png"),
                dest: DocPath::new("img/a.png"),
            },
            CopyPlan {
                source: src.path().join("b.pdf"),
                dest: DocPath::new("b.pdf"),
            },
        ];
        let copied = copy_all(plans, out.path()).await.unwrap();

        assert_eq!(copied, 2);
        assert_eq!(std::fs::read(out.path().join("img/a.png")).unwrap(), vec![1, 2, 3]);
        assert!(out.path().join("b.pdf").is_file());
    }

    #[tokio::test]
    async fn test_copy_failure_is_fatal() {
        let out = tempfile::tempdir().unwrap();
        let plans = vec![CopyPlan {
            source: out.path().join("missing.png"),
            dest: DocPath::new("missing.png"),
        }];
        assert!(copy_all(plans, out.path()).await.is_err());
    }
}
