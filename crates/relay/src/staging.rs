//! Staged file ownership and cleanup.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Owns the on-disk files of one request and deletes them when dropped.
///
/// Deletion is best-effort: failures are logged and never surface as errors.
#[derive(Debug, Default)]
pub struct StagedFiles {
    paths: Vec<PathBuf>,
}

impl StagedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `path`. It is deleted on cleanup even if it does
    /// not exist yet.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Deletes every registered file. Returns how many were removed.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    tracing::debug!(path = %path.display(), "removed staged file");
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove staged file");
                }
            }
        }
        removed
    }
}

// Deletes run synchronously on the dropping thread. A request stages a
// handful of files, so the blocking time on a runtime worker is small.
impl Drop for StagedFiles {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Copies `source` into `staging_dir` under a unique name and returns the
/// staged path.
pub async fn stage_file(staging_dir: &Path, source: &Path) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(staging_dir).await?;
    let staged = staging_dir.join(format!("upload-{}", Uuid::new_v4()));
    tokio::fs::copy(source, &staged).await?;
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn drop_removes_registered_files() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        {
            let mut staged = StagedFiles::new();
            staged.register(&a);
            staged.register(&b);
            assert_eq!(staged.paths().len(), 2);
        }

        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn missing_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present");
        std::fs::write(&present, b"x").unwrap();

        let mut staged = StagedFiles::new();
        staged.register(dir.path().join("never-created"));
        staged.register(&present);
        assert_eq!(staged.cleanup(), 1);
        assert!(!present.exists());
        assert!(staged.paths().is_empty());
    }

    #[test]
    fn cleanup_on_early_return() {
        fn fails(path: &Path) -> Result<(), &'static str> {
            let mut staged = StagedFiles::new();
            staged.register(path);
            Err("bail")
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, b"x").unwrap();
        assert!(fails(&path).is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn stage_file_copies_into_staging_dir() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("kick.wav");
        std::fs::write(&source, b"kick").unwrap();
        let staging = dir.path().join("staging");

        let staged = stage_file(&staging, &source).await.unwrap();
        assert!(staged.starts_with(&staging));
        assert_eq!(std::fs::read(&staged).unwrap(), b"kick");
        assert!(source.exists());

        let again = stage_file(&staging, &source).await.unwrap();
        assert_ne!(staged, again);
    }
}
