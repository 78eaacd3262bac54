use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use pathnice_base::{PathNiceError, PathNiceResult};

use crate::cache;
use crate::fs::{FsHandle, default_fs};
use crate::nice::{PathNice, PathNiceArr};
use crate::platform::{ParsedPath, PathApi, PlatformHandle};

/// The complete produced API surface for one (platform, filesystem)
/// capability pair: path value entry points, the full passthrough of the
/// platform's operations and constants, filesystem rebinding, and the lazy
/// `posix`/`win32` sibling modules.
///
/// Modules are only ever obtained through the process-wide cache (via
/// [`PathModule::of`], [`bind_fs`](PathModule::bind_fs), or the sibling
/// accessors), so two modules over the same pair are always the same
/// object, and path values may use module identity as their compatibility
/// check.
pub struct PathModule {
    platform: PlatformHandle,
    fs: FsHandle,
    // Back-reference to the Arc the cache stores this module in, so entry
    // points can hand path values a shared module reference.
    me: Weak<PathModule>,
    posix: OnceLock<Arc<PathModule>>,
    win32: OnceLock<Arc<PathModule>>,
}

// The sibling cells may point back at this module, so the derived Debug
// would recurse; print the capabilities only.
impl fmt::Debug for PathModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathModule")
            .field("platform", &self.platform)
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl PathModule {
    /// Called by the cache only; everything else goes through [`of`].
    ///
    /// Construction performs no I/O and cannot fail. The sibling cells
    /// start empty: building a module never eagerly builds its siblings.
    ///
    /// [`of`]: PathModule::of
    pub(crate) fn build(platform: PlatformHandle, fs: FsHandle) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            platform,
            fs,
            me: me.clone(),
            posix: OnceLock::new(),
            win32: OnceLock::new(),
        })
    }

    /// The Arc this module lives in. Modules exist only inside the cache's
    /// Arc (see [`build`](PathModule::build)), so the upgrade cannot fail
    /// once construction has returned.
    fn shared(&self) -> Arc<PathModule> {
        self.me
            .upgrade()
            .expect("modules are cached for the lifetime of the process")
    }

    /// The module for an explicit capability pair, through the cache.
    pub fn of(platform: PlatformHandle, fs: FsHandle) -> Arc<PathModule> {
        cache::get(&platform, &fs)
    }

    /// The module for the host platform flavor and the default filesystem.
    pub fn native() -> Arc<PathModule> {
        Self::of(crate::platform::native(), default_fs())
    }

    /// The platform capability this module closes over.
    pub fn platform(&self) -> &PlatformHandle {
        &self.platform
    }

    /// The filesystem capability this module closes over.
    pub fn fs(&self) -> &FsHandle {
        &self.fs
    }

    /// Construct a single path value.
    ///
    /// Zero segments is an argument-count error; several segments are
    /// joined through the platform, so
    /// `module.path(&["a", "b", "c"])?.raw()` equals
    /// `module.join(&["a", "b", "c"])`.
    pub fn path<S: AsRef<str>>(&self, segments: &[S]) -> PathNiceResult<PathNice> {
        if segments.is_empty() {
            return Err(Box::new(PathNiceError::invalid_argument(
                "path() requires at least one segment",
            )));
        }
        let parts: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
        let raw = if parts.len() == 1 {
            parts[0].to_string()
        } else {
            self.platform.join(&parts)
        };
        Ok(PathNice::new(raw, self.shared()))
    }

    /// Construct a path value set over the given list.
    ///
    /// The result is always a set, even for a one-element list: an
    /// explicit list is never collapsed into a bare value.
    pub fn paths<S: AsRef<str>>(&self, list: &[S]) -> PathNiceArr {
        let items = list
            .iter()
            .map(|s| PathNice::new(s.as_ref().to_string(), self.shared()))
            .collect();
        PathNiceArr::new_unchecked(items, self.shared())
    }

    /// The module over the same platform and a different filesystem.
    ///
    /// Rebinding goes through the cache: binding the same filesystem handle
    /// twice yields the same module object, and rebinding back to this
    /// module's own filesystem yields this module.
    pub fn bind_fs(&self, fs: FsHandle) -> Arc<PathModule> {
        cache::get(&self.platform, &fs)
    }

    /// The POSIX-flavor sibling of this module, over the same filesystem.
    ///
    /// Resolved through the cache on first access and memoized; later
    /// accesses are plain reads. A flavor module's matching accessor
    /// returns itself.
    pub fn posix(&self) -> Arc<PathModule> {
        self.posix
            .get_or_init(|| cache::get(&self.platform.posix(), &self.fs))
            .clone()
    }

    /// The Windows-flavor sibling of this module, over the same filesystem.
    ///
    /// See [`posix`](PathModule::posix).
    pub fn win32(&self) -> Arc<PathModule> {
        self.win32
            .get_or_init(|| cache::get(&self.platform.win32(), &self.fs))
            .clone()
    }

    // Passthrough of the platform surface. Each operation forwards
    // unchanged, so calling it on the module is identical to calling the
    // platform capability directly.

    /// Path segment separator of this module's platform.
    pub fn sep(&self) -> &'static str {
        self.platform.sep()
    }

    /// Search-path list delimiter of this module's platform.
    pub fn delimiter(&self) -> &'static str {
        self.platform.delimiter()
    }

    /// See [`PathApi::join`](crate::platform::PathApi::join).
    pub fn join(&self, parts: &[&str]) -> String {
        self.platform.join(parts)
    }

    /// See [`PathApi::normalize`](crate::platform::PathApi::normalize).
    pub fn normalize(&self, path: &str) -> String {
        self.platform.normalize(path)
    }

    /// See [`PathApi::resolve`](crate::platform::PathApi::resolve).
    pub fn resolve(&self, parts: &[&str]) -> String {
        self.platform.resolve(parts)
    }

    /// See [`PathApi::relative`](crate::platform::PathApi::relative).
    pub fn relative(&self, from: &str, to: &str) -> String {
        self.platform.relative(from, to)
    }

    /// See [`PathApi::dirname`](crate::platform::PathApi::dirname).
    pub fn dirname(&self, path: &str) -> String {
        self.platform.dirname(path)
    }

    /// See [`PathApi::basename`](crate::platform::PathApi::basename).
    pub fn basename(&self, path: &str) -> String {
        self.platform.basename(path)
    }

    /// See [`PathApi::extname`](crate::platform::PathApi::extname).
    pub fn extname(&self, path: &str) -> String {
        self.platform.extname(path)
    }

    /// See [`PathApi::is_absolute`](crate::platform::PathApi::is_absolute).
    pub fn is_absolute(&self, path: &str) -> bool {
        self.platform.is_absolute(path)
    }

    /// See [`PathApi::parse`](crate::platform::PathApi::parse).
    pub fn parse(&self, path: &str) -> ParsedPath {
        self.platform.parse(path)
    }

    /// See [`PathApi::format`](crate::platform::PathApi::format).
    pub fn format(&self, parsed: &ParsedPath) -> String {
        self.platform.format(parsed)
    }

    /// See [`PathApi::to_namespaced_path`](crate::platform::PathApi::to_namespaced_path).
    pub fn to_namespaced_path(&self, path: &str) -> String {
        self.platform.to_namespaced_path(path)
    }
}
