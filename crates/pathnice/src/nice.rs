use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;

use pathnice_base::{PathNiceError, PathNiceResult, err};

use crate::fs::{FileStat, FsApi};
use crate::module::PathModule;
use crate::ops;
use crate::platform::ParsedPath;

/// An immutable path value: a raw path string bound to one
/// [`PathModule`] (and through it, to one platform and one filesystem
/// capability).
///
/// Every transformation returns a new value sharing the same module; the
/// raw string is never mutated in place. Values created by different
/// modules are incompatible and refuse to combine (see
/// [`join_path`](PathNice::join_path)); the module cache makes module
/// identity equivalent to capability-pair identity, so this single pointer
/// comparison is the whole compatibility rule.
///
/// # Examples
///
/// ```
/// # fn main() -> pathnice_base::PathNiceResult<()> {
/// let module = pathnice::posix();
/// let readme = module.path(&["docs"])?.join("guide").join("README.md");
/// assert_eq!(readme.raw(), "docs/guide/README.md");
/// assert_eq!(readme.extname(), ".md");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PathNice {
    raw: String,
    module: Arc<PathModule>,
}

impl PathNice {
    pub(crate) fn new(raw: String, module: Arc<PathModule>) -> Self {
        Self { raw, module }
    }

    /// The raw path string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Consumes the value and returns the raw path string.
    pub fn into_raw(self) -> String {
        self.raw
    }

    /// The module this value is bound to.
    pub fn module(&self) -> &Arc<PathModule> {
        &self.module
    }

    /// The separator of the bound platform.
    pub fn separator(&self) -> &'static str {
        self.module.sep()
    }

    fn derive(&self, raw: String) -> PathNice {
        PathNice::new(raw, Arc::clone(&self.module))
    }

    fn check_compatible(&self, other: &PathNice) -> PathNiceResult<()> {
        if Arc::ptr_eq(&self.module, &other.module) {
            Ok(())
        } else {
            Err(Box::new(PathNiceError::incompatible(
                "cannot combine path values bound to different platform or filesystem implementations",
            )))
        }
    }

    /// A new value with `part` joined onto this path.
    pub fn join(&self, part: impl AsRef<str>) -> PathNice {
        self.derive(self.module.join(&[self.raw.as_str(), part.as_ref()]))
    }

    /// A new value with another path value joined onto this one.
    ///
    /// Both values must be bound to the same module; otherwise this fails
    /// with an incompatibility error and performs no filesystem access.
    pub fn join_path(&self, other: &PathNice) -> PathNiceResult<PathNice> {
        self.check_compatible(other)?;
        Ok(self.join(&other.raw))
    }

    /// The directory portion of this path, as a new value.
    pub fn dirname(&self) -> PathNice {
        self.derive(self.module.dirname(&self.raw))
    }

    /// The final component of this path.
    pub fn basename(&self) -> String {
        self.module.basename(&self.raw)
    }

    /// The extension of the final component, including the leading dot.
    pub fn extname(&self) -> String {
        self.module.extname(&self.raw)
    }

    /// A new value with the final component replaced.
    pub fn with_basename(&self, base: impl AsRef<str>) -> PathNice {
        self.dirname().join(base)
    }

    /// A new value with the extension of the final component replaced.
    /// The dot may be included or omitted in `ext`.
    pub fn with_extname(&self, ext: impl AsRef<str>) -> PathNice {
        let ext = ext.as_ref();
        let dotted = if ext.is_empty() || ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        };
        let base = self.basename();
        let current = self.extname();
        let stem = &base[..base.len() - current.len()];
        self.with_basename(format!("{}{}", stem, dotted))
    }

    /// This path normalized, as a new value.
    pub fn normalize(&self) -> PathNice {
        self.derive(self.module.normalize(&self.raw))
    }

    /// This path resolved to an absolute path, as a new value.
    pub fn resolve(&self) -> PathNice {
        self.derive(self.module.resolve(&[self.raw.as_str()]))
    }

    /// The relative path from this value to `to`, as a new value.
    ///
    /// Both values must be bound to the same module.
    pub fn relative(&self, to: &PathNice) -> PathNiceResult<PathNice> {
        self.check_compatible(to)?;
        Ok(self.derive(self.module.relative(&self.raw, &to.raw)))
    }

    /// Whether this path is absolute for the bound platform.
    pub fn is_absolute(&self) -> bool {
        self.module.is_absolute(&self.raw)
    }

    /// This path split into its pieces.
    pub fn parse(&self) -> ParsedPath {
        self.module.parse(&self.raw)
    }

    /// The namespace-prefixed form of this path, as a new value.
    pub fn to_namespaced(&self) -> PathNice {
        self.derive(self.module.to_namespaced_path(&self.raw))
    }

    // Asynchronous operations against the bound filesystem. These return
    // pending futures and never block the caller.

    /// See [`ops::ensure_dir`].
    pub async fn ensure_dir(&self) -> PathNiceResult<()> {
        ops::ensure_dir(self.module.fs(), &self.raw).await
    }

    /// See [`ops::ensure_file`].
    pub async fn ensure_file(&self) -> PathNiceResult<()> {
        ops::ensure_file(&**self.module.platform(), self.module.fs(), &self.raw).await
    }

    /// See [`ops::remove`].
    pub async fn remove(&self) -> PathNiceResult<()> {
        ops::remove(self.module.fs(), &self.raw).await
    }

    /// See [`ops::empty_dir`].
    pub async fn empty_dir(&self) -> PathNiceResult<()> {
        ops::empty_dir(&**self.module.platform(), self.module.fs(), &self.raw).await
    }

    async fn stat_optional(&self) -> PathNiceResult<Option<FileStat>> {
        match self.module.fs().stat(&self.raw).await {
            Ok(stat) => Ok(Some(stat)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Whether an entry exists at this path.
    pub async fn exists(&self) -> PathNiceResult<bool> {
        Ok(self.stat_optional().await?.is_some())
    }

    /// Whether a directory exists at this path.
    pub async fn is_dir(&self) -> PathNiceResult<bool> {
        Ok(self.stat_optional().await?.is_some_and(|s| s.is_dir()))
    }

    /// Whether a regular file exists at this path.
    pub async fn is_file(&self) -> PathNiceResult<bool> {
        Ok(self.stat_optional().await?.is_some_and(|s| s.is_file()))
    }

    /// Stat this path, following symbolic links.
    pub async fn stat(&self) -> PathNiceResult<FileStat> {
        self.module.fs().stat(&self.raw).await
    }

    /// Stat this path without following symbolic links.
    pub async fn lstat(&self) -> PathNiceResult<FileStat> {
        self.module.fs().lstat(&self.raw).await
    }

    /// The direct children of the directory at this path, joined onto it.
    pub async fn readdir(&self) -> PathNiceResult<PathNiceArr> {
        let names = self.module.fs().readdir(&self.raw).await?;
        let items = names.iter().map(|name| self.join(name)).collect();
        Ok(PathNiceArr::new_unchecked(items, Arc::clone(&self.module)))
    }

    /// Read the entire file at this path.
    pub async fn read_bytes(&self) -> PathNiceResult<Vec<u8>> {
        self.module.fs().read_file(&self.raw).await
    }

    /// Read the entire file at this path as a UTF-8 string.
    pub async fn read_to_string(&self) -> PathNiceResult<String> {
        let bytes = self.read_bytes().await?;
        String::from_utf8(bytes).map_err(|_e| err!("File is not valid UTF-8: {}", self.raw))
    }

    /// Write `data` as the entire content of the file at this path.
    pub async fn write_bytes(&self, data: &[u8]) -> PathNiceResult<()> {
        self.module.fs().write_file(&self.raw, data).await
    }

    /// Write `text` as the entire content of the file at this path.
    pub async fn write_str(&self, text: &str) -> PathNiceResult<()> {
        self.write_bytes(text.as_bytes()).await
    }

    /// Read and deserialize the JSON file at this path.
    pub async fn read_json<T: DeserializeOwned>(&self) -> PathNiceResult<T> {
        let bytes = self.read_bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| err!("failed to parse JSON from {}: {}", self.raw, e))
    }

    /// Serialize `value` as pretty-printed JSON into the file at this path.
    pub async fn write_json<T: Serialize>(&self, value: &T) -> PathNiceResult<()> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| err!("failed to serialize JSON for {}: {}", self.raw, e))?;
        self.write_bytes(&bytes).await
    }

    /// Copy the file at this path to `dest` through the shared filesystem.
    ///
    /// Both values must be bound to the same module.
    pub async fn copy_to(&self, dest: &PathNice) -> PathNiceResult<()> {
        self.check_compatible(dest)?;
        let bytes = self.read_bytes().await?;
        dest.write_bytes(&bytes).await
    }
}

impl fmt::Display for PathNice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for PathNice {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && Arc::ptr_eq(&self.module, &other.module)
    }
}

impl Eq for PathNice {}

impl Hash for PathNice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
        (Arc::as_ptr(&self.module) as usize).hash(state);
    }
}

/// An ordered set of [`PathNice`] values sharing one module, with batch
/// variants of the chainable and asynchronous operations.
///
/// A set is always a set: constructing one from a one-element list does
/// not collapse it into a bare value.
#[derive(Debug, Clone)]
pub struct PathNiceArr {
    items: Vec<PathNice>,
    module: Arc<PathModule>,
}

impl PathNiceArr {
    pub(crate) fn new_unchecked(items: Vec<PathNice>, module: Arc<PathModule>) -> Self {
        Self { items, module }
    }

    /// Build a set from existing values.
    ///
    /// All values must be bound to the same module; mixing modules fails
    /// with an incompatibility error, and an empty list is an argument
    /// error because it names no module to bind to.
    pub fn from_values(values: Vec<PathNice>) -> PathNiceResult<PathNiceArr> {
        let Some(first) = values.first() else {
            return Err(Box::new(PathNiceError::invalid_argument(
                "from_values() requires at least one path value",
            )));
        };
        let module = Arc::clone(&first.module);
        for value in &values {
            if !Arc::ptr_eq(&value.module, &module) {
                return Err(Box::new(PathNiceError::incompatible(
                    "cannot build a path set from values bound to different modules",
                )));
            }
        }
        Ok(Self::new_unchecked(values, module))
    }

    /// The module this set is bound to.
    pub fn module(&self) -> &Arc<PathModule> {
        &self.module
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PathNice> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathNice> {
        self.items.iter()
    }

    /// The raw strings of all values, in order.
    pub fn raws(&self) -> Vec<&str> {
        self.items.iter().map(PathNice::raw).collect()
    }

    pub fn into_vec(self) -> Vec<PathNice> {
        self.items
    }

    /// Join `part` onto every value in the set.
    pub fn join(&self, part: impl AsRef<str>) -> PathNiceArr {
        let part = part.as_ref();
        let items = self.items.iter().map(|item| item.join(part)).collect();
        Self::new_unchecked(items, Arc::clone(&self.module))
    }

    /// The directory portion of every value in the set.
    pub fn dirname(&self) -> PathNiceArr {
        let items = self.items.iter().map(PathNice::dirname).collect();
        Self::new_unchecked(items, Arc::clone(&self.module))
    }

    /// Replace the extension of every value in the set.
    pub fn with_extname(&self, ext: impl AsRef<str>) -> PathNiceArr {
        let ext = ext.as_ref();
        let items = self
            .items
            .iter()
            .map(|item| item.with_extname(ext))
            .collect();
        Self::new_unchecked(items, Arc::clone(&self.module))
    }

    /// Ensure every path in the set exists as a directory. The element
    /// operations run concurrently and all settle before this resolves.
    pub async fn ensure_dir(&self) -> PathNiceResult<()> {
        ops::settle(join_all(self.items.iter().map(PathNice::ensure_dir)).await)
    }

    /// Ensure every path in the set exists as a regular file.
    pub async fn ensure_file(&self) -> PathNiceResult<()> {
        ops::settle(join_all(self.items.iter().map(PathNice::ensure_file)).await)
    }

    /// Remove every path in the set, tolerating missing entries.
    pub async fn remove(&self) -> PathNiceResult<()> {
        ops::settle(join_all(self.items.iter().map(PathNice::remove)).await)
    }
}

impl<'a> IntoIterator for &'a PathNiceArr {
    type Item = &'a PathNice;
    type IntoIter = std::slice::Iter<'a, PathNice>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
