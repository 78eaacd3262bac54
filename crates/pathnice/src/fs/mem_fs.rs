use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use pathnice_base::{PathNiceError, PathNiceResult};

use super::{FileKind, FileStat, FsApi};

/// In-memory filesystem implementation.
///
/// Stores a directory tree in a map behind a mutex and supports all FsApi
/// operations without touching the real filesystem. Parent-directory and
/// entry-kind rules mirror a real filesystem so that error paths (missing
/// parent, not a directory) are reproducible in tests.
///
/// # Examples
///
/// ```
/// use pathnice::fs::{FsApi, MemFs};
///
/// # async fn demo() -> pathnice_base::PathNiceResult<()> {
/// let fs = MemFs::new();
/// fs.add_file("notes/todo.txt", "content");
/// let stat = fs.stat("notes/todo.txt").await?;
/// assert!(stat.is_file());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemFs {
    entries: Arc<Mutex<BTreeMap<String, MemNode>>>,
}

#[derive(Debug, Clone)]
enum MemNode {
    File(Vec<u8>),
    Dir,
}

enum Found {
    Missing,
    File,
    Dir,
}

/// Normalize a path into the map key form: separator-agnostic components
/// joined with `/`, no leading or trailing separator. The empty key is the
/// implicit root directory.
fn key_of(path: &str) -> String {
    path.split(|c| c == '/' || c == '\\')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn parent_key(key: &str) -> &str {
    match key.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    }
}

fn not_found(path: &str) -> Box<PathNiceError> {
    Box::new(PathNiceError::file_error(
        PathBuf::from(path),
        io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
    ))
}

fn already_exists(path: &str) -> Box<PathNiceError> {
    Box::new(PathNiceError::file_error(
        PathBuf::from(path),
        io::Error::new(io::ErrorKind::AlreadyExists, "file exists"),
    ))
}

fn not_a_directory(path: &str) -> Box<PathNiceError> {
    Box::new(PathNiceError::file_error(
        PathBuf::from(path),
        io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
    ))
}

fn is_a_directory(path: &str) -> Box<PathNiceError> {
    Box::new(PathNiceError::file_error(
        PathBuf::from(path),
        io::Error::new(io::ErrorKind::IsADirectory, "is a directory"),
    ))
}

impl MemFs {
    /// Create a new empty MemFs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, creating any missing ancestor directories.
    pub fn add_file(&self, path: &str, content: impl Into<Vec<u8>>) {
        let key = key_of(path);
        let mut entries = self.entries.lock();
        insert_ancestors(&mut entries, &key);
        entries.insert(key, MemNode::File(content.into()));
    }

    /// Seed a directory, creating any missing ancestor directories.
    pub fn add_dir(&self, path: &str) {
        let key = key_of(path);
        if key.is_empty() {
            return;
        }
        let mut entries = self.entries.lock();
        insert_ancestors(&mut entries, &key);
        entries.insert(key, MemNode::Dir);
    }

    /// Number of stored entries (files and directories), for assertions.
    pub fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }

    fn lookup(entries: &BTreeMap<String, MemNode>, key: &str) -> Found {
        match entries.get(key) {
            None => Found::Missing,
            Some(MemNode::File(_)) => Found::File,
            Some(MemNode::Dir) => Found::Dir,
        }
    }
}

fn insert_ancestors(entries: &mut BTreeMap<String, MemNode>, key: &str) {
    let parent = parent_key(key);
    if parent.is_empty() {
        return;
    }
    let mut acc = String::new();
    for component in parent.split('/') {
        if !acc.is_empty() {
            acc.push('/');
        }
        acc.push_str(component);
        entries.entry(acc.clone()).or_insert(MemNode::Dir);
    }
}

#[async_trait]
impl FsApi for MemFs {
    async fn stat(&self, path: &str) -> PathNiceResult<FileStat> {
        let key = key_of(path);
        if key.is_empty() {
            return Ok(FileStat {
                kind: FileKind::Dir,
                size: 0,
            });
        }
        let entries = self.entries.lock();
        match entries.get(&key) {
            Some(MemNode::File(data)) => Ok(FileStat {
                kind: FileKind::File,
                size: data.len() as u64,
            }),
            Some(MemNode::Dir) => Ok(FileStat {
                kind: FileKind::Dir,
                size: 0,
            }),
            None => Err(not_found(path)),
        }
    }

    // MemFs stores no symbolic links, so lstat and stat observe the same
    // entries.
    async fn lstat(&self, path: &str) -> PathNiceResult<FileStat> {
        self.stat(path).await
    }

    async fn readdir(&self, path: &str) -> PathNiceResult<Vec<String>> {
        let key = key_of(path);
        let entries = self.entries.lock();
        if !key.is_empty() {
            match Self::lookup(&entries, &key) {
                Found::Dir => {}
                Found::File => return Err(not_a_directory(path)),
                Found::Missing => return Err(not_found(path)),
            }
        }
        let prefix = if key.is_empty() {
            String::new()
        } else {
            format!("{}/", key)
        };
        let mut names = Vec::new();
        for child in entries.keys() {
            if let Some(rest) = child.strip_prefix(&prefix) {
                if !rest.is_empty() && !rest.contains('/') {
                    names.push(rest.to_string());
                }
            }
        }
        Ok(names)
    }

    async fn mkdir(&self, path: &str, recursive: bool) -> PathNiceResult<()> {
        let key = key_of(path);
        let mut entries = self.entries.lock();
        if key.is_empty() {
            // The root always exists.
            return if recursive {
                Ok(())
            } else {
                Err(already_exists(path))
            };
        }
        match Self::lookup(&entries, &key) {
            Found::File => return Err(already_exists(path)),
            Found::Dir => {
                return if recursive {
                    Ok(())
                } else {
                    Err(already_exists(path))
                };
            }
            Found::Missing => {}
        }
        if recursive {
            let mut acc = String::new();
            for component in key.split('/') {
                if !acc.is_empty() {
                    acc.push('/');
                }
                acc.push_str(component);
                match Self::lookup(&entries, &acc) {
                    Found::File => return Err(not_a_directory(path)),
                    Found::Dir => {}
                    Found::Missing => {
                        entries.insert(acc.clone(), MemNode::Dir);
                    }
                }
            }
            Ok(())
        } else {
            let parent = parent_key(&key);
            if !parent.is_empty() {
                match Self::lookup(&entries, parent) {
                    Found::Dir => {}
                    Found::File => return Err(not_a_directory(path)),
                    Found::Missing => return Err(not_found(path)),
                }
            }
            entries.insert(key, MemNode::Dir);
            Ok(())
        }
    }

    async fn read_file(&self, path: &str) -> PathNiceResult<Vec<u8>> {
        let key = key_of(path);
        if key.is_empty() {
            return Err(is_a_directory(path));
        }
        let entries = self.entries.lock();
        match entries.get(&key) {
            Some(MemNode::File(data)) => Ok(data.clone()),
            Some(MemNode::Dir) => Err(is_a_directory(path)),
            None => Err(not_found(path)),
        }
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> PathNiceResult<()> {
        let key = key_of(path);
        if key.is_empty() {
            return Err(is_a_directory(path));
        }
        let mut entries = self.entries.lock();
        let parent = parent_key(&key);
        if !parent.is_empty() {
            match Self::lookup(&entries, parent) {
                Found::Dir => {}
                Found::File => return Err(not_a_directory(path)),
                Found::Missing => return Err(not_found(path)),
            }
        }
        if let Found::Dir = Self::lookup(&entries, &key) {
            return Err(is_a_directory(path));
        }
        entries.insert(key, MemNode::File(data.to_vec()));
        Ok(())
    }

    async fn rm(&self, path: &str, recursive: bool, force: bool) -> PathNiceResult<()> {
        let key = key_of(path);
        let mut entries = self.entries.lock();
        if key.is_empty() {
            if recursive {
                entries.clear();
                return Ok(());
            }
            return Err(Box::new(PathNiceError::file_error(
                PathBuf::from(path),
                io::Error::other("cannot remove the root directory"),
            )));
        }
        match Self::lookup(&entries, &key) {
            Found::Missing => {
                if force {
                    Ok(())
                } else {
                    Err(not_found(path))
                }
            }
            Found::File => {
                entries.remove(&key);
                Ok(())
            }
            Found::Dir => {
                let prefix = format!("{}/", key);
                let has_children = entries.keys().any(|k| k.starts_with(&prefix));
                if has_children && !recursive {
                    return Err(Box::new(PathNiceError::file_error(
                        PathBuf::from(path),
                        io::Error::other("directory not empty"),
                    )));
                }
                entries.retain(|k, _| k != &key && !k.starts_with(&prefix));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stat_seeded_file() {
        let fs = MemFs::new();
        fs.add_file("a/b.txt", "content");

        let stat = fs.stat("a/b.txt").await.unwrap();
        assert!(stat.is_file());
        assert_eq!(stat.size, 7);

        let stat = fs.stat("a").await.unwrap();
        assert!(stat.is_dir());
    }

    #[tokio::test]
    async fn test_stat_missing_is_not_found() {
        let fs = MemFs::new();
        let err = fs.stat("missing.txt").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_root_always_exists() {
        let fs = MemFs::new();
        assert!(fs.stat("/").await.unwrap().is_dir());
        assert_eq!(fs.readdir("/").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_readdir_lists_direct_children_only() {
        let fs = MemFs::new();
        fs.add_file("dir/a.txt", "");
        fs.add_file("dir/sub/b.txt", "");

        let mut names = fs.readdir("dir").await.unwrap();
        names.sort();
        assert_eq!(names, vec!["a.txt".to_string(), "sub".to_string()]);
    }

    #[tokio::test]
    async fn test_readdir_on_file_fails() {
        let fs = MemFs::new();
        fs.add_file("f.txt", "");
        let err = fs.readdir("f.txt").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_mkdir_recursive_creates_ancestors() {
        let fs = MemFs::new();
        fs.mkdir("a/b/c", true).await.unwrap();
        assert!(fs.stat("a").await.unwrap().is_dir());
        assert!(fs.stat("a/b").await.unwrap().is_dir());
        assert!(fs.stat("a/b/c").await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_mkdir_recursive_is_idempotent() {
        let fs = MemFs::new();
        fs.mkdir("a/b", true).await.unwrap();
        fs.mkdir("a/b", true).await.unwrap();
    }

    #[tokio::test]
    async fn test_mkdir_over_file_fails() {
        let fs = MemFs::new();
        fs.add_file("f.txt", "");
        assert!(fs.mkdir("f.txt", true).await.is_err());
        assert!(fs.mkdir("f.txt", false).await.is_err());
    }

    #[tokio::test]
    async fn test_mkdir_non_recursive_requires_parent() {
        let fs = MemFs::new();
        let err = fs.mkdir("missing/child", false).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_write_requires_existing_parent() {
        let fs = MemFs::new();
        let err = fs.write_file("missing/f.txt", b"x").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_write_and_read_round_trip() {
        let fs = MemFs::new();
        fs.mkdir("dir", true).await.unwrap();
        fs.write_file("dir/f.txt", b"payload").await.unwrap();
        assert_eq!(fs.read_file("dir/f.txt").await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_write_over_directory_fails() {
        let fs = MemFs::new();
        fs.add_dir("d");
        assert!(fs.write_file("d", b"x").await.is_err());
    }

    #[tokio::test]
    async fn test_rm_missing_with_force_is_noop() {
        let fs = MemFs::new();
        fs.rm("missing", true, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_rm_missing_without_force_fails() {
        let fs = MemFs::new();
        let err = fs.rm("missing", true, false).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rm_recursive_removes_subtree() {
        let fs = MemFs::new();
        fs.add_file("d/a.txt", "");
        fs.add_file("d/sub/b.txt", "");
        fs.add_file("keep.txt", "");

        fs.rm("d", true, false).await.unwrap();
        assert!(fs.stat("d").await.unwrap_err().is_not_found());
        assert!(fs.stat("d/sub/b.txt").await.unwrap_err().is_not_found());
        assert!(fs.stat("keep.txt").await.unwrap().is_file());
    }

    #[tokio::test]
    async fn test_rm_non_recursive_rejects_populated_directory() {
        let fs = MemFs::new();
        fs.add_file("d/a.txt", "");
        assert!(fs.rm("d", false, false).await.is_err());
        assert!(fs.stat("d/a.txt").await.unwrap().is_file());
    }

    #[tokio::test]
    async fn test_separator_agnostic_keys() {
        let fs = MemFs::new();
        fs.add_file("a\\b.txt", "x");
        assert!(fs.stat("a/b.txt").await.unwrap().is_file());
    }
}
