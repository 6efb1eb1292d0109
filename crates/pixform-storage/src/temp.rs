use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use futures::Stream;
use futures::StreamExt;
use pixform_core::normalize_format;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncRead;
use uuid::Uuid;

/// Chunked file contents, as served by the download endpoint
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Temporary file store rooted at one flat directory
#[derive(Debug, Clone)]
pub struct TempFileStore {
    root: PathBuf,
}

impl TempFileStore {
    /// Create the store, creating `root` if it does not exist yet
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create temp directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(TempFileStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an upload to a fresh `{uuid}.{ext}` file and return its path.
    ///
    /// Only the extension of `original_name` is kept, and only if it is plain ASCII
    /// alphanumeric.
    pub async fn save_upload<R>(&self, original_name: &str, mut reader: R) -> StorageResult<PathBuf>
    where
        R: AsyncRead + Unpin,
    {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

        let filename = match extension {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let path = self.root.join(filename);
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let write_result = async {
            let bytes_copied = tokio::io::copy(&mut reader, &mut file).await?;
            file.sync_all().await?;
            Ok::<u64, std::io::Error>(bytes_copied)
        }
        .await;

        let bytes_copied = match write_result {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                self.delete(&path).await;
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        tracing::debug!(
            path = %path.display(),
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Saved upload to temp store"
        );

        Ok(path)
    }

    /// Map a bare filename to a path directly inside the temp root.
    ///
    /// Anything that is not a single plain path component is rejected.
    pub fn resolve(&self, filename: &str) -> StorageResult<PathBuf> {
        if filename.is_empty()
            || filename == "."
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains('\0')
        {
            return Err(StorageError::InvalidName(filename.to_string()));
        }

        Ok(self.root.join(filename))
    }

    /// Fresh, unique path for a converted artifact: `{uuid}_{output_filename}`
    pub fn output_path(&self, output_filename: &str) -> StorageResult<PathBuf> {
        self.resolve(&format!("{}_{}", Uuid::new_v4(), output_filename))
    }

    /// Best-effort removal; never fails.
    ///
    /// A missing file is fine. Other errors are logged and dropped.
    pub async fn delete(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted temp file");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to delete temp file"
                );
            }
        }
    }

    /// Delete every regular file in the root whose mtime is older than `max_age`.
    ///
    /// Returns how many files were removed. Entries that cannot be inspected are skipped.
    pub async fn cleanup_older_than(&self, max_age: Duration) -> StorageResult<usize> {
        let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
            return Ok(0);
        };

        let mut entries = fs::read_dir(&self.root).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if !metadata.is_file() {
                continue;
            }

            let Ok(modified) = metadata.modified() else {
                continue;
            };

            if modified < cutoff {
                let path = entry.path();
                self.delete(&path).await;
                if !fs::try_exists(&path).await.unwrap_or(true) {
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }

    /// Open a stored file for streaming. Returns the stream and the file size.
    pub async fn open_stream(&self, filename: &str) -> StorageResult<(ByteStream, u64)> {
        let path = self.resolve(filename)?;

        let file = match fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(filename.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(filename.to_string()));
        }

        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(path = %path_display, error = %e, "Temp file stream read error");
                StorageError::IoError(e)
            })
        });

        Ok((Box::pin(stream), metadata.len()))
    }
}

/// Removes its file on drop unless [`TempFileGuard::release`] was called.
///
/// Covers request futures that are dropped mid-flight; the normal path releases the
/// guard and deletes through [`TempFileStore::delete`].
#[derive(Debug)]
pub struct TempFileGuard {
    path: Option<PathBuf>,
}

impl TempFileGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Disarm the guard and hand back the path
    pub fn release(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed abandoned temp file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove abandoned temp file"
                ),
            }
        }
    }
}

/// `{stem}_converted.{format}` with `jpg` written as `jpeg`
pub fn generate_output_name(original_name: &str, output_format: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    format!("{}_converted.{}", stem, normalize_format(output_format))
}

/// Name offered to the client for a stored artifact: everything after the first `_`.
pub fn display_name(stored_name: &str) -> &str {
    match stored_name.split_once('_') {
        Some((_, rest)) => rest,
        None => stored_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn store() -> (tempfile::TempDir, TempFileStore) {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    fn set_age(path: &Path, age: Duration) {
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn test_new_creates_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("temp");
        let store = TempFileStore::new(&root).await.unwrap();
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn test_save_upload_uses_generated_name() {
        let (_dir, store) = store().await;
        let data: &[u8] = b"image bytes";

        let path = store.save_upload("../../evil name.PNG", data).await.unwrap();

        assert_eq!(path.parent().unwrap(), store.root());
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(".PNG"));
        assert!(!name.contains("evil"));
        let stem = name.trim_end_matches(".PNG");
        assert!(Uuid::parse_str(stem).is_ok());
        assert_eq!(std::fs::read(&path).unwrap(), b"image bytes");
    }

    #[tokio::test]
    async fn test_save_upload_drops_unsafe_extension() {
        let (_dir, store) = store().await;
        let data: &[u8] = b"x";
        let path = store.save_upload("photo.p<ng", data).await.unwrap();
        assert!(path.extension().is_none());
    }

    #[tokio::test]
    async fn test_resolve_rejects_escape() {
        let (_dir, store) = store().await;
        for bad in ["", "..", "../secret", "a/b", "a\\b", "x..y"] {
            assert!(
                matches!(store.resolve(bad), Err(StorageError::InvalidName(_))),
                "accepted {:?}",
                bad
            );
        }
        assert_eq!(
            store.resolve("abc_cat_converted.png").unwrap(),
            store.root().join("abc_cat_converted.png")
        );
    }

    #[tokio::test]
    async fn test_output_path_is_unique() {
        let (_dir, store) = store().await;
        let a = store.output_path("cat_converted.png").unwrap();
        let b = store.output_path("cat_converted.png").unwrap();
        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_str().unwrap();
        assert_eq!(display_name(name), "cat_converted.png");
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let (_dir, store) = store().await;
        store.delete(&store.root().join("nope.png")).await;
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let (_dir, store) = store().await;
        let data: &[u8] = b"x";
        let path = store.save_upload("a.png", data).await.unwrap();
        store.delete(&path).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cleanup_older_than_removes_only_old_files() {
        let (_dir, store) = store().await;
        let old = store.root().join("old.png");
        let fresh = store.root().join("fresh.png");
        std::fs::write(&old, b"old").unwrap();
        std::fs::write(&fresh, b"fresh").unwrap();
        set_age(&old, Duration::from_secs(3 * 3600));
        set_age(&fresh, Duration::from_secs(3600));

        let removed = store
            .cleanup_older_than(Duration::from_secs(2 * 3600))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_cleanup_skips_directories() {
        let (_dir, store) = store().await;
        let sub = store.root().join("subdir");
        std::fs::create_dir(&sub).unwrap();

        let removed = store.cleanup_older_than(Duration::ZERO).await.unwrap();
        assert_eq!(removed, 0);
        assert!(sub.is_dir());
    }

    #[tokio::test]
    async fn test_open_stream_reads_contents() {
        let (_dir, store) = store().await;
        std::fs::write(store.root().join("id_cat.png"), b"converted").unwrap();

        let (mut stream, len) = store.open_stream("id_cat.png").await.unwrap();
        assert_eq!(len, 9);

        let mut downloaded = Vec::new();
        while let Some(chunk) = stream.next().await {
            downloaded.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(downloaded, b"converted");
    }

    #[tokio::test]
    async fn test_open_stream_missing_is_not_found() {
        let (_dir, store) = store().await;
        assert!(matches!(
            store.open_stream("missing.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_guard_removes_file_on_drop() {
        let (_dir, store) = store().await;
        let data: &[u8] = b"x";
        let path = store.save_upload("a.png", data).await.unwrap();

        drop(TempFileGuard::new(path.clone()));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_guard_release_keeps_file() {
        let (_dir, store) = store().await;
        let data: &[u8] = b"x";
        let path = store.save_upload("a.png", data).await.unwrap();

        let guard = TempFileGuard::new(path.clone());
        assert_eq!(guard.path(), path.as_path());
        assert_eq!(guard.release(), path);
        assert!(path.exists());
    }

    #[test]
    fn test_generate_output_name_normalizes_jpg() {
        assert_eq!(generate_output_name("photo.png", "jpg"), "photo_converted.jpeg");
        assert_eq!(generate_output_name("photo.png", "webp"), "photo_converted.webp");
        assert_eq!(
            generate_output_name("archive.v2.gif", "png"),
            "archive.v2_converted.png"
        );
    }

    #[test]
    fn test_display_name_strips_id_prefix() {
        assert_eq!(
            display_name("3f2b9c4e-0000-4000-8000-000000000000_cat_converted.png"),
            "cat_converted.png"
        );
        assert_eq!(display_name("plain.png"), "plain.png");
    }
}
