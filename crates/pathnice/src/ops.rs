//! Filesystem helper library: composed, multi-step operations over a
//! filesystem capability, each with defined recovery and idempotence
//! behavior.
//!
//! Errors from the filesystem are never swallowed except in the two
//! documented cases: "already exists as a directory" in [`ensure_dir`] and
//! "does not exist" in [`remove`].

use futures::future::join_all;
use tracing::debug;

use pathnice_base::{ErrorKind, PathNiceError, PathNiceResult, ResultExt};

use crate::fs::{FsApi, FsHandle};
use crate::platform::PathApi;

/// Create `target` as a directory, creating all missing intermediate
/// directories. Idempotent: succeeds silently if the directory already
/// exists; any other error propagates.
pub async fn ensure_dir(fs: &FsHandle, target: &str) -> PathNiceResult<()> {
    match fs.mkdir(target, true).await {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Ok(stat) = fs.stat(target).await {
                if stat.is_dir() {
                    debug!(%target, "directory already exists");
                    return Ok(());
                }
            }
            Err(err).context("ensure_dir")
        }
    }
}

/// Ensure `target` exists as a regular file.
///
/// An existing regular file is left untouched. An existing entry of any
/// other kind is a conflict error naming the path. A missing target is
/// created empty, after its parent directory is created if that is missing
/// too; a parent that exists but is not a directory is a conflict error
/// naming the parent. Any error other than "not found" while inspecting
/// the parent propagates unchanged.
pub async fn ensure_file(
    platform: &dyn PathApi,
    fs: &FsHandle,
    target: &str,
) -> PathNiceResult<()> {
    match fs.stat(target).await {
        Ok(stat) => {
            if stat.is_file() {
                debug!(%target, "file already exists");
                Ok(())
            } else {
                Err(Box::new(PathNiceError::conflict(
                    target,
                    "ensure_file target exists but is not a regular file",
                )))
            }
        }
        Err(err) if err.is_not_found() => {
            let parent = platform.dirname(target);
            match fs.stat(&parent).await {
                Err(parent_err) if parent_err.is_not_found() => {
                    debug!(%target, %parent, "creating parent and file");
                    ensure_dir(fs, &parent).await?;
                    fs.write_file(target, b"").await.context("ensure_file")
                }
                Ok(parent_stat) if parent_stat.is_dir() => {
                    debug!(%target, "creating file");
                    fs.write_file(target, b"").await.context("ensure_file")
                }
                Ok(_) => Err(Box::new(PathNiceError::conflict(
                    parent.as_str(),
                    "ensure_file parent exists but is not a directory",
                ))),
                Err(parent_err) => Err(parent_err),
            }
        }
        Err(err) => Err(err),
    }
}

/// Remove `target`, whether it is a file or a directory (recursively), and
/// tolerate a missing target as a no-op.
pub async fn remove(fs: &FsHandle, target: &str) -> PathNiceResult<()> {
    fs.rm(target, true, true).await.context("remove")
}

/// Leave `target` as an existing, empty directory.
///
/// If listing `target` fails (it does not exist or is not a directory),
/// fall back to [`ensure_dir`]. Otherwise remove every direct child
/// concurrently and wait for the full set to settle; if any removal
/// failed the helper fails, and children that were already removed stay
/// removed.
pub async fn empty_dir(platform: &dyn PathApi, fs: &FsHandle, target: &str) -> PathNiceResult<()> {
    let children = match fs.readdir(target).await {
        Ok(children) => children,
        Err(err) => {
            debug!(%target, error = %err, "listing failed, ensuring directory instead");
            return ensure_dir(fs, target).await;
        }
    };
    debug!(%target, count = children.len(), "removing directory children");
    let removals = children.iter().map(|child| {
        let child_path = platform.join(&[target, child.as_str()]);
        async move { remove(fs, &child_path).await }
    });
    settle(join_all(removals).await).context("empty_dir")
}

/// Collapse a batch of settled results: zero failures succeed, a single
/// failure propagates as itself, several aggregate into `Multiple`.
pub(crate) fn settle(results: Vec<PathNiceResult<()>>) -> PathNiceResult<()> {
    let mut errors: Vec<PathNiceError> = results
        .into_iter()
        .filter_map(|result| result.err())
        .map(|boxed| *boxed)
        .collect();
    match errors.len() {
        0 => Ok(()),
        1 => Err(Box::new(errors.remove(0))),
        count => Err(Box::new(PathNiceError::new(ErrorKind::Multiple {
            errors,
            count,
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FsApi, FsHandle, MemFs};
    use crate::platform::PosixPlatform;

    fn setup() -> (MemFs, FsHandle, PosixPlatform) {
        let mem = MemFs::new();
        let handle = FsHandle::new(mem.clone());
        (mem, handle, PosixPlatform)
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_missing_chain() {
        let (mem, fs, _) = setup();
        ensure_dir(&fs, "a/b/c").await.unwrap();
        assert!(mem.stat("a/b/c").await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let (mem, fs, _) = setup();
        ensure_dir(&fs, "a/b").await.unwrap();
        ensure_dir(&fs, "a/b").await.unwrap();
        assert!(mem.stat("a/b").await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_ensure_dir_over_file_fails() {
        let (mem, fs, _) = setup();
        mem.add_file("f.txt", "");
        assert!(ensure_dir(&fs, "f.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_file_on_existing_file_is_noop() {
        let (mem, fs, platform) = setup();
        mem.add_file("f.txt", "original");
        ensure_file(&platform, &fs, "f.txt").await.unwrap();
        assert_eq!(mem.read_file("f.txt").await.unwrap(), b"original");
    }

    #[tokio::test]
    async fn test_ensure_file_on_directory_is_conflict() {
        let (mem, fs, platform) = setup();
        mem.add_dir("d");
        let err = ensure_file(&platform, &fs, "d").await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_ensure_file_creates_missing_parent_and_file() {
        let (mem, fs, platform) = setup();
        ensure_file(&platform, &fs, "a/b/f.txt").await.unwrap();
        assert!(mem.stat("a/b").await.unwrap().is_dir());
        let stat = mem.stat("a/b/f.txt").await.unwrap();
        assert!(stat.is_file());
        assert_eq!(stat.size, 0);
    }

    #[tokio::test]
    async fn test_ensure_file_with_existing_parent() {
        let (mem, fs, platform) = setup();
        mem.add_dir("a");
        ensure_file(&platform, &fs, "a/f.txt").await.unwrap();
        assert!(mem.stat("a/f.txt").await.unwrap().is_file());
    }

    #[tokio::test]
    async fn test_ensure_file_parent_is_file_is_conflict() {
        let (mem, fs, platform) = setup();
        mem.add_file("a", "");
        let err = ensure_file(&platform, &fs, "a/f.txt").await.unwrap_err();
        match err.kind() {
            ErrorKind::Conflict { path, .. } => {
                assert_eq!(path.to_string_lossy(), "a");
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let (_, fs, _) = setup();
        remove(&fs, "missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_file_and_directory() {
        let (mem, fs, _) = setup();
        mem.add_file("f.txt", "");
        mem.add_file("d/nested/deep.txt", "");

        remove(&fs, "f.txt").await.unwrap();
        remove(&fs, "d").await.unwrap();
        assert!(mem.stat("f.txt").await.unwrap_err().is_not_found());
        assert!(mem.stat("d").await.unwrap_err().is_not_found());
        assert!(mem.stat("d/nested/deep.txt").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_empty_dir_removes_all_children() {
        let (mem, fs, platform) = setup();
        mem.add_file("d/a.txt", "");
        mem.add_file("d/b.txt", "");
        mem.add_file("d/sub/c.txt", "");

        empty_dir(&platform, &fs, "d").await.unwrap();
        assert!(mem.stat("d").await.unwrap().is_dir());
        assert_eq!(mem.readdir("d").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_empty_dir_creates_missing_target() {
        let (mem, fs, platform) = setup();
        empty_dir(&platform, &fs, "fresh").await.unwrap();
        assert!(mem.stat("fresh").await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_empty_dir_on_file_fails() {
        let (mem, fs, platform) = setup();
        mem.add_file("f.txt", "");
        // Listing fails, and the ensure_dir fallback cannot turn a file
        // into a directory.
        assert!(empty_dir(&platform, &fs, "f.txt").await.is_err());
        assert!(mem.stat("f.txt").await.unwrap().is_file());
    }

    #[test]
    fn test_settle_aggregates_failures() {
        assert!(settle(vec![Ok(()), Ok(())]).is_ok());

        let one = settle(vec![
            Ok(()),
            Err(Box::new(PathNiceError::message("boom"))),
        ])
        .unwrap_err();
        assert_eq!(one.to_string(), "boom");

        let many = settle(vec![
            Err(Box::new(PathNiceError::message("first"))),
            Err(Box::new(PathNiceError::message("second"))),
        ])
        .unwrap_err();
        match many.kind() {
            ErrorKind::Multiple { count, errors } => {
                assert_eq!(*count, 2);
                assert_eq!(errors.len(), 2);
            }
            other => panic!("expected Multiple, got {:?}", other),
        }
    }
}
