//! Output directory management and artifact serialization.

use crate::error::SyncError;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use vaultpub_types::DocPath;

/// Empty `dir` and recreate it
///
/// Files are unlinked and subdirectories removed recursively. A directory
/// that does not exist yet counts as already clean.
pub async fn clean_dir(dir: &Path) -> Result<(), SyncError> {
    match fs::read_dir(dir).await {
        Ok(mut entries) => {
            let mut removed = 0usize;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| SyncError::io(dir, e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| SyncError::io(&path, e))?;
                let removal = if file_type.is_dir() {
                    fs::remove_dir_all(&path).await
                } else {
                    fs::remove_file(&path).await
                };
                removal.map_err(|e| SyncError::io(&path, e))?;
                removed += 1;
            }
            tracing::info!("Cleaned {:?} ({} entries)", dir, removed);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("{:?} does not exist, nothing to clean", dir);
        }
        Err(e) => return Err(SyncError::io(dir, e)),
    }

    fs::create_dir_all(dir)
        .await
        .map_err(|e| SyncError::io(dir, e))
}

/// Write `contents` to `out_dir/dest`, creating parent directories
pub async fn write_document(out_dir: &Path, dest: &DocPath, contents: &str) -> Result<(), SyncError> {
    let path = out_dir.join(dest.as_str());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SyncError::io(parent, e))?;
    }
    fs::write(&path, contents)
        .await
        .map_err(|e| SyncError::io(&path, e))
}

/// Copy `source` to `out_dir/dest`, creating parent directories and overwriting
pub async fn copy_file(source: &Path, out_dir: &Path, dest: &DocPath) -> Result<(), SyncError> {
    let path = out_dir.join(dest.as_str());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SyncError::io(parent, e))?;
    }
    fs::copy(source, &path)
        .await
        .map_err(|e| SyncError::io(source, e))?;
    Ok(())
}

/// Serialize `value` as pretty-printed JSON with a trailing newline
pub async fn write_json_artifact<T: Serialize + ?Sized>(
    path: &Path,
    artifact: &'static str,
    value: &T,
) -> Result<(), SyncError> {
    let mut json = serde_json::to_string_pretty(value)
        .map_err(|source| SyncError::Serialize { artifact, source })?;
    json.push('\n');

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SyncError::io(parent, e))?;
    }
    fs::write(path, json)
        .await
        .map_err(|e| SyncError::io(path, e))?;

    tracing::info!("Generated {}", artifact);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clean_missing_dir_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out/notes");
        clean_dir(&target).await.unwrap();
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_clean_removes_files_and_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("notes");
        std::fs::create_dir_all(target.join("sub/deeper")).unwrap();
        std::fs::write(target.join("a.md"), "a").unwrap();
        std::fs::write(target.join("sub/deeper/b.md"), "b").unwrap();

        clean_dir(&target).await.unwrap();
        assert!(target.is_dir());
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_document_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        write_document(dir.path(), &DocPath::new("a/b/c.md"), "hi")
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a/b/c.md")).unwrap(),
            "hi"
        );
    }

    #[tokio::test]
    async fn test_copy_missing_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = copy_file(&dir.path().join("nope.png"), dir.path(), &DocPath::new("x.png")).await;
        assert!(matches!(result, Err(SyncError::Io { .. })));
    }

    #[tokio::test]
    async fn test_json_artifact_is_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public/index.json");
        write_json_artifact(&path, "index.json", &vec![1, 2]).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\n  1,\n  2\n]\n");
    }
}
