use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument};

use pathnice_base::{PathNiceError, PathNiceResult};

use super::{FileKind, FileStat, FsApi};

/// Concrete filesystem implementation using the real filesystem via
/// `tokio::fs`.
#[derive(Debug, Default)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }

    fn wrap(path: &str, source: std::io::Error) -> Box<PathNiceError> {
        Box::new(PathNiceError::file_error(PathBuf::from(path), source))
    }

    fn stat_of(metadata: std::fs::Metadata) -> FileStat {
        let file_type = metadata.file_type();
        let kind = if file_type.is_file() {
            FileKind::File
        } else if file_type.is_dir() {
            FileKind::Dir
        } else if file_type.is_symlink() {
            FileKind::Symlink
        } else {
            FileKind::Other
        };
        FileStat {
            kind,
            size: metadata.len(),
        }
    }
}

#[async_trait]
impl FsApi for RealFs {
    #[instrument(skip(self))]
    async fn stat(&self, path: &str) -> PathNiceResult<FileStat> {
        let metadata = fs::metadata(path).await.map_err(|e| {
            debug!(error = %e, "stat failed");
            Self::wrap(path, e)
        })?;
        Ok(Self::stat_of(metadata))
    }

    #[instrument(skip(self))]
    async fn lstat(&self, path: &str) -> PathNiceResult<FileStat> {
        let metadata = fs::symlink_metadata(path).await.map_err(|e| {
            debug!(error = %e, "lstat failed");
            Self::wrap(path, e)
        })?;
        Ok(Self::stat_of(metadata))
    }

    #[instrument(skip(self))]
    async fn readdir(&self, path: &str) -> PathNiceResult<Vec<String>> {
        let mut entries = fs::read_dir(path).await.map_err(|e| {
            debug!(error = %e, "readdir failed");
            Self::wrap(path, e)
        })?;
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::wrap(path, e))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        debug!(count = names.len(), "listed directory");
        Ok(names)
    }

    #[instrument(skip(self))]
    async fn mkdir(&self, path: &str, recursive: bool) -> PathNiceResult<()> {
        let result = if recursive {
            fs::create_dir_all(path).await
        } else {
            fs::create_dir(path).await
        };
        result.map_err(|e| {
            debug!(error = %e, "mkdir failed");
            Self::wrap(path, e)
        })
    }

    #[instrument(skip(self))]
    async fn read_file(&self, path: &str) -> PathNiceResult<Vec<u8>> {
        fs::read(path).await.map_err(|e| {
            debug!(error = %e, "read failed");
            Self::wrap(path, e)
        })
    }

    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn write_file(&self, path: &str, data: &[u8]) -> PathNiceResult<()> {
        fs::write(path, data).await.map_err(|e| {
            debug!(error = %e, "write failed");
            Self::wrap(path, e)
        })
    }

    // tokio has no single remove primitive, so the entry's link status is
    // inspected first and the matching removal dispatched.
    #[instrument(skip(self))]
    async fn rm(&self, path: &str, recursive: bool, force: bool) -> PathNiceResult<()> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && force => {
                debug!("nothing to remove");
                return Ok(());
            }
            Err(e) => return Err(Self::wrap(path, e)),
        };
        let result = if metadata.is_dir() {
            if recursive {
                fs::remove_dir_all(path).await
            } else {
                fs::remove_dir(path).await
            }
        } else {
            fs::remove_file(path).await
        };
        result.map_err(|e| {
            debug!(error = %e, "remove failed");
            Self::wrap(path, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, RealFs) {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        (temp_dir, RealFs::new())
    }

    fn p(temp_dir: &TempDir, tail: &str) -> String {
        temp_dir.path().join(tail).to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_stat_file_and_dir() {
        let (temp_dir, fs_impl) = setup();
        std::fs::write(temp_dir.path().join("f.txt"), "abc").unwrap();

        let stat = fs_impl.stat(&p(&temp_dir, "f.txt")).await.unwrap();
        assert!(stat.is_file());
        assert_eq!(stat.size, 3);

        let stat = fs_impl
            .stat(&temp_dir.path().to_string_lossy())
            .await
            .unwrap();
        assert!(stat.is_dir());
    }

    #[tokio::test]
    async fn test_stat_missing_is_not_found() {
        let (temp_dir, fs_impl) = setup();
        let err = fs_impl.stat(&p(&temp_dir, "missing")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_mkdir_recursive_and_readdir() {
        let (temp_dir, fs_impl) = setup();
        fs_impl.mkdir(&p(&temp_dir, "a/b/c"), true).await.unwrap();
        assert!(temp_dir.path().join("a/b/c").is_dir());

        let names = fs_impl.readdir(&p(&temp_dir, "a")).await.unwrap();
        assert_eq!(names, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_mkdir_non_recursive_requires_parent() {
        let (temp_dir, fs_impl) = setup();
        let err = fs_impl
            .mkdir(&p(&temp_dir, "missing/child"), false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_write_and_read_round_trip() {
        let (temp_dir, fs_impl) = setup();
        let path = p(&temp_dir, "data.bin");
        fs_impl.write_file(&path, b"payload").await.unwrap();
        let bytes = fs_impl.read_file(&path).await.unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[tokio::test]
    async fn test_rm_missing_with_force_is_noop() {
        let (temp_dir, fs_impl) = setup();
        fs_impl
            .rm(&p(&temp_dir, "missing"), true, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rm_missing_without_force_fails() {
        let (temp_dir, fs_impl) = setup();
        let err = fs_impl
            .rm(&p(&temp_dir, "missing"), true, false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rm_recursive_directory() {
        let (temp_dir, fs_impl) = setup();
        std::fs::create_dir_all(temp_dir.path().join("d/e")).unwrap();
        std::fs::write(temp_dir.path().join("d/e/f.txt"), "x").unwrap();

        fs_impl.rm(&p(&temp_dir, "d"), true, false).await.unwrap();
        assert!(!temp_dir.path().join("d").exists());
    }

    #[tokio::test]
    async fn test_rm_file() {
        let (temp_dir, fs_impl) = setup();
        std::fs::write(temp_dir.path().join("f.txt"), "x").unwrap();
        fs_impl
            .rm(&p(&temp_dir, "f.txt"), false, false)
            .await
            .unwrap();
        assert!(!temp_dir.path().join("f.txt").exists());
    }
}
