//! Filesystem capability: the async `FsApi` trait, its shared-ownership
//! handle, and the process-wide default backend.
//!
//! Two implementations are provided:
//! - `RealFs`: uses the real filesystem via `tokio::fs`
//! - `MemFs`: in-memory implementation for tests and sandboxing

mod mem_fs;
mod real_fs;

pub use mem_fs::MemFs;
pub use real_fs::RealFs;

use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use pathnice_base::PathNiceResult;

/// The kind of filesystem entry a stat call observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// Result of a stat call: what the entry is and how large it is.
#[derive(Debug, Clone)]
pub struct FileStat {
    pub kind: FileKind,
    pub size: u64,
}

impl FileStat {
    /// True if the entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    /// True if the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    /// True if the entry is a symbolic link (only observable via `lstat`).
    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }
}

/// Capability providing asynchronous filesystem primitives.
///
/// Every operation either completes or fails with an error that carries a
/// distinguishable "not found" code (see
/// [`PathNiceError::is_not_found`](pathnice_base::PathNiceError::is_not_found));
/// the helper library relies on that predicate for its idempotent fallbacks.
#[async_trait]
pub trait FsApi: fmt::Debug + Send + Sync + 'static {
    /// Stat the entry at `path`, following symbolic links.
    async fn stat(&self, path: &str) -> PathNiceResult<FileStat>;

    /// Stat the entry at `path` without following symbolic links.
    async fn lstat(&self, path: &str) -> PathNiceResult<FileStat>;

    /// List the names (not paths) of the direct children of the directory
    /// at `path`.
    async fn readdir(&self, path: &str) -> PathNiceResult<Vec<String>>;

    /// Create a directory at `path`; with `recursive`, create all missing
    /// ancestors as well.
    async fn mkdir(&self, path: &str, recursive: bool) -> PathNiceResult<()>;

    /// Read the entire file at `path`.
    async fn read_file(&self, path: &str) -> PathNiceResult<Vec<u8>>;

    /// Write `data` as the entire content of the file at `path`, creating
    /// or truncating it. The parent directory must exist.
    async fn write_file(&self, path: &str, data: &[u8]) -> PathNiceResult<()>;

    /// Remove the entry at `path`. With `recursive`, directories are
    /// removed with their contents; with `force`, a missing entry is not an
    /// error. Implementations without a native single remove primitive
    /// inspect the entry's link status first and dispatch to the matching
    /// removal.
    async fn rm(&self, path: &str, recursive: bool, force: bool) -> PathNiceResult<()>;
}

/// Handle to a filesystem implementation, enabling shared ownership.
///
/// Internally wraps `Arc<dyn FsApi>` for cheap cloning and thread-safe
/// sharing. Handle identity (the `Arc` allocation) is what the module cache
/// keys on: binding the same handle always yields the same module.
#[derive(Debug, Clone)]
pub struct FsHandle(Arc<dyn FsApi>);

impl FsHandle {
    /// Create a new FsHandle from an FsApi implementation.
    pub fn new(fs: impl FsApi + 'static) -> Self {
        Self(Arc::new(fs))
    }

    /// Returns true if both handles refer to the same implementation
    /// instance.
    pub fn ptr_eq(&self, other: &FsHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Opaque identity token used as a cache key.
    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl std::ops::Deref for FsHandle {
    type Target = dyn FsApi;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

/// The process-wide default filesystem handle, backing modules that were
/// requested without an explicit filesystem.
pub fn default_fs() -> FsHandle {
    static CELL: OnceLock<FsHandle> = OnceLock::new();
    CELL.get_or_init(|| FsHandle::new(RealFs::new())).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fs_is_stable() {
        assert!(default_fs().ptr_eq(&default_fs()));
        assert_eq!(default_fs().key(), default_fs().key());
    }

    #[test]
    fn test_distinct_handles_have_distinct_identity() {
        let a = FsHandle::new(MemFs::new());
        let b = FsHandle::new(MemFs::new());
        assert!(!a.ptr_eq(&b));
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_handle_clone_preserves_identity() {
        let a = FsHandle::new(MemFs::new());
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_file_stat_predicates() {
        let file = FileStat {
            kind: FileKind::File,
            size: 3,
        };
        assert!(file.is_file());
        assert!(!file.is_dir());
        assert!(!file.is_symlink());

        let dir = FileStat {
            kind: FileKind::Dir,
            size: 0,
        };
        assert!(dir.is_dir());
        assert!(!dir.is_file());
    }
}
