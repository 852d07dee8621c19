//! Proof-file store.
//!
//! Uploaded binaries land under a fixed root; filenames are derived from
//! the current timestamp plus a random suffix plus the original extension,
//! so concurrent uploads do not collide. The store hands back root-relative
//! reference strings (`/uploads/activities/<name>`) which are what gets
//! persisted on the activity row and served statically.

use std::path::{Path, PathBuf};

use rand::distr::Alphanumeric;
use rand::Rng;

/// Prefix of every reference string handed out by the store.
pub const REFERENCE_PREFIX: &str = "/uploads/activities";

/// Length of the random filename suffix.
const SUFFIX_LEN: usize = 10;

/// Writes and removes uploaded proof files beneath a fixed root directory.
#[derive(Debug)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory files are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a payload, returning its root-relative reference.
    ///
    /// The filename is `{unix_millis}-{random}{ext}`; collisions are
    /// treated as negligible, not formally prevented.
    pub async fn save(&self, data: &[u8], original_name: &str) -> std::io::Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let stamp = chrono::Utc::now().timestamp_millis();
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let filename = format!("{stamp}-{suffix}{ext}");
        tokio::fs::write(self.root.join(&filename), data).await?;

        Ok(format!("{REFERENCE_PREFIX}/{filename}"))
    }

    /// Best-effort removal of a stored file by its reference.
    ///
    /// A missing file, a reference from outside the store, or an unlink
    /// failure are all logged and swallowed -- deletion never fails the
    /// surrounding operation.
    pub async fn remove(&self, reference: &str) {
        let Some(filename) = Self::filename_of(reference) else {
            tracing::warn!(reference, "Ignoring proof reference outside the upload root");
            return;
        };

        if let Err(e) = tokio::fs::remove_file(self.root.join(filename)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(reference, error = %e, "Failed to remove proof file");
            }
        }
    }

    /// Extract the bare filename from a reference, rejecting anything that
    /// could escape the root.
    fn filename_of(reference: &str) -> Option<&str> {
        let filename = reference.strip_prefix(REFERENCE_PREFIX)?.strip_prefix('/')?;
        if filename.is_empty() || filename.contains('/') || filename.contains("..") {
            return None;
        }
        Some(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_returns_reference_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let reference = store.save(b"proof-bytes", "report.pdf").await.unwrap();
        assert!(reference.starts_with("/uploads/activities/"));
        assert!(reference.ends_with(".pdf"));

        let filename = UploadStore::filename_of(&reference).unwrap();
        let on_disk = tokio::fs::read(dir.path().join(filename)).await.unwrap();
        assert_eq!(on_disk, b"proof-bytes");
    }

    #[tokio::test]
    async fn save_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let reference = store.save(b"data", "no_extension").await.unwrap();
        let filename = UploadStore::filename_of(&reference).unwrap();
        assert!(!filename.contains('.'));
    }

    #[tokio::test]
    async fn remove_deletes_the_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let reference = store.save(b"x", "a.png").await.unwrap();
        store.remove(&reference).await;
        let filename = UploadStore::filename_of(&reference).unwrap();
        assert!(!dir.path().join(filename).exists());

        // Removing again is a no-op, not an error.
        store.remove(&reference).await;
    }

    #[test]
    fn references_outside_the_root_are_rejected() {
        assert!(UploadStore::filename_of("/uploads/activities/ok.png").is_some());
        assert!(UploadStore::filename_of("/etc/passwd").is_none());
        assert!(UploadStore::filename_of("/uploads/activities/../escape").is_none());
        assert!(UploadStore::filename_of("/uploads/activities/a/b").is_none());
        assert!(UploadStore::filename_of("/uploads/activities/").is_none());
    }
}
